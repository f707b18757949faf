//! compiles [RuleInput] into a [RuleDefinition]
//!
//! Pure function, no io. Validation errors are returned before anything could
//! reach the network.

use indexmap::IndexMap;
use thiserror::Error;
use url::Url;

use super::{
	action::{Action, WebhookAction},
	definition::{
		LocationThresholdCondition, RuleDefinition, HIDDEN_LINK_PREFIX, HIDDEN_LINK_VALUE,
	},
	input::RuleInput,
};

/// input that can't be compiled into a rule definition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidDefinition {
	#[error("rule name is empty")]
	EmptyName,
	#[error("resource group is empty")]
	EmptyResourceGroup,
	#[error("failed location count must be positive")]
	NonPositiveFailedLocationCount,
	#[error("window size must be positive")]
	NonPositiveWindowSize,
	/// operator tags can't touch the `hidden-link:` tag
	#[error("tag `{key}` uses the reserved prefix `hidden-link:`")]
	ReservedTag { key: String },
	#[error("webhook uri `{uri}` is not an absolute uri: {source}")]
	InvalidServiceUri {
		uri: String,
		#[source]
		source: url::ParseError,
	},
}

/// Build a fresh [RuleDefinition] from the current state of `input`.
///
/// Building twice from the same input gives equal definitions. Actions are
/// copied in order without any interpretation, an unset action list stays
/// unset.
pub fn build(input: &RuleInput) -> Result<RuleDefinition, InvalidDefinition> {
	validate(input)?;

	Ok(RuleDefinition {
		name: input.name.clone(),
		location: input.location.clone(),
		description: input.description.clone(),
		tags: tags(input),
		is_enabled: !input.disable_rule,
		condition: LocationThresholdCondition::new(input.failed_location_count, input.window_size),
		actions: input.actions.clone(),
	})
}

fn validate(input: &RuleInput) -> Result<(), InvalidDefinition> {
	if input.name.is_empty() {
		return Err(InvalidDefinition::EmptyName);
	}

	if input.resource_group.is_empty() {
		return Err(InvalidDefinition::EmptyResourceGroup);
	}

	if input.failed_location_count == 0 {
		return Err(InvalidDefinition::NonPositiveFailedLocationCount);
	}

	if input.window_size.is_zero() {
		return Err(InvalidDefinition::NonPositiveWindowSize);
	}

	if let Some(key) = input.tags.keys().find(|key| key.starts_with(HIDDEN_LINK_PREFIX)) {
		return Err(InvalidDefinition::ReservedTag { key: key.clone() });
	}

	for action in input.actions.iter().flatten() {
		if let Action::Webhook(WebhookAction { service_uri, .. }) = action {
			// Url only parses absolute uris
			Url::parse(service_uri).map_err(|source| InvalidDefinition::InvalidServiceUri {
				uri: service_uri.clone(),
				source,
			})?;
		}
	}

	Ok(())
}

/// the `hidden-link:` tag first, operator tags after it
fn tags(input: &RuleInput) -> IndexMap<String, String> {
	let hidden_link = format!(
		"{HIDDEN_LINK_PREFIX}{}",
		input.target_resource_uri.as_deref().unwrap_or_default()
	);

	let mut tags = IndexMap::with_capacity(input.tags.len() + 1);
	tags.insert(hidden_link, HIDDEN_LINK_VALUE.to_owned());

	for (key, value) in &input.tags {
		tags.entry(key.clone()).or_insert_with(|| value.clone());
	}

	tags
}
