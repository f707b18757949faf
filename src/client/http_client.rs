//! upserts rule definitions through the management REST api and records
//! prometheus metrics about it
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use once_cell::sync::OnceCell;
use prometheus::{HistogramVec, IntCounterVec};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

use super::{settings::ManagementSettings, Acknowledgement, SentUpsert, UpsertClient, UpsertError};
use crate::rule::RuleDefinition;

/// header carrying the id we generate for every request
const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";
/// header carrying the id the service assigned to the request
const REQUEST_ID: &str = "x-ms-request-id";

static METRICS: OnceCell<Metrics> = OnceCell::new();

#[derive(Debug, Clone)]
/// prometheus meters for the management http client
struct Metrics {
	/// total number of upsert requests
	requests: IntCounterVec,
	/// number of upsert requests the service didn't accept
	requests_failed: IntCounterVec,
	/// time spent by upsert requests
	request_duration: HistogramVec,
}

impl Metrics {
	/// construct and register prometheus meters, only once per process
	fn global() -> Result<&'static Self, prometheus::Error> {
		METRICS.get_or_try_init(Self::new)
	}

	fn new() -> Result<Self, prometheus::Error> {
		use prometheus::{
			exponential_buckets, histogram_opts, opts, register_histogram_vec,
			register_int_counter_vec,
		};

		let requests = register_int_counter_vec!(
			opts!("requests_total", "total number of upsert requests")
				.namespace("webtest_alert")
				.subsystem("management_client"),
			&["host"]
		)?;

		let requests_failed = register_int_counter_vec!(
			opts!("requests_failed", "number of upsert requests answered with an error status")
				.namespace("webtest_alert")
				.subsystem("management_client"),
			&["host", "status_code"]
		)?;

		let request_duration = register_histogram_vec!(
			histogram_opts!(
				"request_duration_seconds",
				"total time of an upsert request in seconds",
				exponential_buckets(0.01, 2., 12)?
			)
			.namespace("webtest_alert")
			.subsystem("management_client"),
			&["host"]
		)?;

		Ok(Self { requests, requests_failed, request_duration })
	}
}

/// error body of the management api, either wrapped in `error` or flat
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
	#[serde(default)]
	error: Option<ErrorBody>,
	#[serde(default)]
	code: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
	#[serde(default)]
	code: String,
	#[serde(default)]
	message: String,
}

/// [UpsertClient] for the management REST api. Doesn't retry, errors are
/// handed to the caller as they are.
#[derive(Debug)]
pub struct ManagementClient {
	/// http client
	client: reqwest::Client,
	settings: ManagementSettings,
	/// prometheus meters for http requests
	metrics: &'static Metrics,
	/// echo of the last upsert call
	last_sent: Mutex<Option<SentUpsert>>,
}

impl ManagementClient {
	/// construct http client
	pub fn new(settings: ManagementSettings) -> Result<Self> {
		if settings.endpoint.cannot_be_a_base() {
			bail!("management endpoint {} can't be used as base url", settings.endpoint);
		}

		Ok(Self {
			client: reqwest::Client::builder()
				.timeout(settings.timeout)
				.build()
				.context("failed to build reqwest client")?,
			settings,
			metrics: Metrics::global().context("failed to register prometheus meters")?,
			last_sent: Mutex::new(None),
		})
	}

	/// `PUT` target of the rule `name` in `resource_group`
	fn rule_url(&self, resource_group: &str, name: &str) -> Url {
		let mut url = self.settings.endpoint.clone();

		// checked in `new`
		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().extend([
				"subscriptions",
				self.settings.subscription_id.as_str(),
				"resourceGroups",
				resource_group,
				"providers",
				"microsoft.insights",
				"alertrules",
				name,
			]);
		}

		url.query_pairs_mut().append_pair("api-version", &self.settings.api_version);

		url
	}

	/// send `payload` and turn the response into an [Acknowledgement]
	async fn put(
		&self,
		url: Url,
		payload: Bytes,
		cancel: &CancellationToken,
	) -> Result<Acknowledgement, UpsertError> {
		let host = url.host_str().unwrap_or_default().to_owned();
		let client_request_id = client_request_id();

		self.metrics.requests.with_label_values(&[host.as_str()]).inc();
		let _timer = self.metrics.request_duration.with_label_values(&[host.as_str()]).start_timer();

		tracing::debug!("PUT {url} ({CLIENT_REQUEST_ID}: {client_request_id})");

		let request = self
			.client
			.put(url)
			.bearer_auth(&self.settings.access_token)
			.header(CONTENT_TYPE, "application/json")
			.header(CLIENT_REQUEST_ID, &client_request_id)
			.body(payload);

		let response = tokio::select! {
			biased;

			_ = cancel.cancelled() => return Err(UpsertError::Cancelled),
			response = request.send() => response.map_err(UpsertError::Transport)?,
		};

		let status = response.status();

		if status.is_success() {
			let request_id = response
				.headers()
				.get(REQUEST_ID)
				.and_then(|value| value.to_str().ok())
				.map_or(client_request_id, str::to_owned);

			return Ok(Acknowledgement { request_id, status_code: status });
		}

		self.metrics.requests_failed.with_label_values(&[host.as_str(), status.as_str()]).inc();

		let body = tokio::select! {
			biased;

			_ = cancel.cancelled() => return Err(UpsertError::Cancelled),
			body = response.bytes() => body.map_err(UpsertError::Transport)?,
		};

		Err(rejection(status, &body))
	}
}

#[async_trait]
impl UpsertClient for ManagementClient {
	async fn upsert(
		&self,
		resource_group: &str,
		definition: &RuleDefinition,
		cancel: &CancellationToken,
	) -> Result<Acknowledgement, UpsertError> {
		let sent = SentUpsert::new(resource_group, definition)?;
		let payload = sent.payload.clone();

		*self.last_sent.lock().await = Some(sent);

		self.put(self.rule_url(resource_group, &definition.name), payload, cancel).await
	}

	async fn last_sent(&self) -> Option<SentUpsert> {
		self.last_sent.lock().await.clone()
	}
}

/// turn an error response into [UpsertError::RemoteRejected], keeping
/// whatever diagnostic the service sent
fn rejection(status: StatusCode, body: &[u8]) -> UpsertError {
	let (code, message) = match serde_json::from_slice::<ErrorResponse>(body) {
		Ok(ErrorResponse { error: Some(ErrorBody { code, message }), .. }) => (code, message),
		Ok(ErrorResponse { code: Some(code), message, .. }) => (code, message.unwrap_or_default()),
		_ => (
			status.canonical_reason().unwrap_or_default().to_owned(),
			String::from_utf8_lossy(body).into_owned(),
		),
	};

	UpsertError::RemoteRejected { status, code, message }
}

/// random (version 4) uuid identifying a single request
fn client_request_id() -> String {
	Uuid::new_v4().to_string()
}
