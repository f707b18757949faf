//! config file options for the rule

use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};

use super::{
	action::{Action, EmailAction, WebhookAction},
	input::{RuleInput, DEFAULT_WINDOW_SIZE},
};

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
/// rule parameters as written in the config file
pub struct RuleSettings {
	pub name: String,
	pub location: String,
	pub resource_group: String,
	pub failed_location_count: u32,
	#[serde_as(as = "DurationSeconds<f64>")]
	#[serde(default = "default_window_size")]
	pub window_size: Duration,
	#[serde(default)]
	pub disable_rule: bool,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub target_resource_uri: Option<String>,
	#[serde(default)]
	pub tags: IndexMap<String, String>,
	/// a missing key leaves the action policy unset, `[]` sets it empty
	#[serde(default)]
	pub actions: Option<Vec<ActionSettings>>,
}

fn default_window_size() -> Duration {
	DEFAULT_WINDOW_SIZE
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// an action as written in the config file
pub enum ActionSettings {
	Email {
		#[serde(default)]
		send_to_service_owners: bool,
		#[serde(default)]
		custom_emails: Vec<String>,
	},
	Webhook {
		service_uri: String,
		#[serde(default)]
		properties: IndexMap<String, String>,
	},
}

impl From<ActionSettings> for Action {
	fn from(settings: ActionSettings) -> Self {
		match settings {
			ActionSettings::Email { send_to_service_owners, custom_emails } => {
				Action::Email(EmailAction { send_to_service_owners, custom_emails })
			}
			ActionSettings::Webhook { service_uri, properties } => {
				Action::Webhook(WebhookAction { service_uri, properties })
			}
		}
	}
}

impl From<RuleSettings> for RuleInput {
	fn from(settings: RuleSettings) -> Self {
		let RuleSettings {
			name,
			location,
			resource_group,
			failed_location_count,
			window_size,
			disable_rule,
			description,
			target_resource_uri,
			tags,
			actions,
		} = settings;

		let mut input = RuleInput::new(name, location, resource_group, failed_location_count);
		input.window_size = window_size;
		input.disable_rule = disable_rule;
		input.description = description;
		input.target_resource_uri = target_resource_uri;
		input.tags = tags;
		input.actions = actions.map(|actions| actions.into_iter().map(Action::from).collect());

		input
	}
}
