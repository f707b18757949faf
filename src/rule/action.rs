//! notification actions attached to a rule
//!
//! The variants are copied into the rule definition as they are. On the wire
//! they are told apart by the `odata.type` discriminator the management api
//! expects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "odata.type")]
/// an action the monitoring service runs once the rule fires
pub enum Action {
	/// send an email
	#[serde(rename = "Microsoft.Azure.Management.Insights.Models.RuleEmailAction")]
	Email(EmailAction),
	/// call a webhook
	#[serde(rename = "Microsoft.Azure.Management.Insights.Models.RuleWebhookAction")]
	Webhook(WebhookAction),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// email notification
pub struct EmailAction {
	/// also mail the owners of the monitored resource
	pub send_to_service_owners: bool,
	/// additional recipients
	pub custom_emails: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// webhook notification
pub struct WebhookAction {
	/// absolute uri the service posts to, kept exactly as the operator wrote it
	pub service_uri: String,
	/// custom properties included in the webhook payload
	pub properties: IndexMap<String, String>,
}

impl From<EmailAction> for Action {
	fn from(action: EmailAction) -> Self {
		Action::Email(action)
	}
}

impl From<WebhookAction> for Action {
	fn from(action: WebhookAction) -> Self {
		Action::Webhook(action)
	}
}
