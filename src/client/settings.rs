//! config file options for the management endpoint

use std::time::Duration;

use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use url::Url;

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
/// where and as whom to upsert rules
pub struct ManagementSettings {
	/// base url of the management api
	#[serde(default = "default_endpoint")]
	pub endpoint: Url,
	pub subscription_id: String,
	/// bearer token, usually set through `WEBTEST_ALERT__MANAGEMENT__ACCESS_TOKEN`
	pub access_token: String,
	#[serde(default = "default_api_version")]
	pub api_version: String,
	/// timeout of a single request
	#[serde_as(as = "DurationSeconds<f64>")]
	#[serde(default = "default_timeout")]
	pub timeout: Duration,
}

#[allow(clippy::expect_used)]
fn default_endpoint() -> Url {
	Url::parse("https://management.azure.com").expect("default endpoint is a valid url")
}

fn default_api_version() -> String {
	String::from("2016-03-01")
}

fn default_timeout() -> Duration {
	Duration::from_secs(30)
}
