//! [UpsertClient] that records calls instead of sending them

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use http::StatusCode;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::{Acknowledgement, SentUpsert, UpsertClient, UpsertError};
use crate::rule::RuleDefinition;

/// what the next upsert call answers with
pub enum Reply {
	Ack(Acknowledgement),
	Reject { status: StatusCode, code: String, message: String },
}

/// keeps the arguments of the most recent call for inspection
pub struct CapturingClient {
	reply: Mutex<Reply>,
	last_sent: Mutex<Option<SentUpsert>>,
	calls: AtomicUsize,
}

impl CapturingClient {
	/// answers every call with `200 OK`
	pub fn new() -> Self {
		Self::with_reply(Reply::Ack(Acknowledgement {
			request_id: "00000000-0000-4000-8000-000000000000".to_owned(),
			status_code: StatusCode::OK,
		}))
	}

	pub fn with_reply(reply: Reply) -> Self {
		Self { reply: Mutex::new(reply), last_sent: Mutex::new(None), calls: AtomicUsize::new(0) }
	}

	/// number of upsert calls so far
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl UpsertClient for CapturingClient {
	async fn upsert(
		&self,
		resource_group: &str,
		definition: &RuleDefinition,
		cancel: &CancellationToken,
	) -> Result<Acknowledgement, UpsertError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		*self.last_sent.lock().await = Some(SentUpsert::new(resource_group, definition)?);

		if cancel.is_cancelled() {
			return Err(UpsertError::Cancelled);
		}

		match &*self.reply.lock().await {
			Reply::Ack(ack) => Ok(ack.clone()),
			Reply::Reject { status, code, message } => Err(UpsertError::RemoteRejected {
				status: *status,
				code: code.clone(),
				message: message.clone(),
			}),
		}
	}

	async fn last_sent(&self) -> Option<SentUpsert> {
		self.last_sent.lock().await.clone()
	}
}
