//! the boundary a built [RuleDefinition] crosses: an upsert call against the
//! management service
//!
//! [http_client::ManagementClient] talks to the real service, tests use the
//! capturing client from `capture` instead.

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::rule::RuleDefinition;

#[cfg(test)]
pub mod capture;
pub mod http_client;
pub mod settings;

/// confirmation of the service that it stored the rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
	/// request id assigned by the service
	pub request_id: String,
	pub status_code: StatusCode,
}

/// an upsert call as it was handed to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentUpsert {
	pub resource_group: String,
	pub definition: RuleDefinition,
	/// the serialized request body
	pub payload: Bytes,
}

impl SentUpsert {
	/// serialize `definition` into the request body
	pub fn new(resource_group: &str, definition: &RuleDefinition) -> Result<Self, UpsertError> {
		Ok(Self {
			resource_group: resource_group.to_owned(),
			definition: definition.clone(),
			payload: Bytes::from(serde_json::to_vec(definition)?),
		})
	}
}

/// Errors of an upsert call. Transport failures and rejections by the
/// service are kept apart, nothing is retried.
#[derive(Error, Debug)]
pub enum UpsertError {
	/// the service couldn't be reached or didn't answer in time
	#[error("failed to reach management endpoint")]
	Transport(#[source] reqwest::Error),
	/// the service answered but refused the definition
	#[error("management endpoint rejected the rule with {status}: {code}: {message}")]
	RemoteRejected { status: StatusCode, code: String, message: String },
	/// the caller cancelled the call before it completed
	#[error("upsert was cancelled")]
	Cancelled,
	#[error("failed to serialize rule definition")]
	Encode(#[from] serde_json::Error),
}

impl UpsertError {
	/// short name of the error kind, used as log field
	pub fn kind(&self) -> &'static str {
		match self {
			UpsertError::Transport(_) => "transport",
			UpsertError::RemoteRejected { .. } => "remote_rejected",
			UpsertError::Cancelled => "cancelled",
			UpsertError::Encode(_) => "encode",
		}
	}
}

/// create-or-update of a rule definition on the management service
#[async_trait]
pub trait UpsertClient: Send + Sync {
	/// Create or update `definition` in `resource_group`. Each call stands on
	/// its own, cancelling `cancel` only aborts this call.
	async fn upsert(
		&self,
		resource_group: &str,
		definition: &RuleDefinition,
		cancel: &CancellationToken,
	) -> Result<Acknowledgement, UpsertError>;

	/// the last call handed to [upsert][UpsertClient::upsert], also if it
	/// failed
	async fn last_sent(&self) -> Option<SentUpsert>;
}
