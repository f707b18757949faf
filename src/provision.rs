//! build a rule definition and hand it to an [UpsertClient]
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
	client::{Acknowledgement, UpsertClient, UpsertError},
	rule::{build, InvalidDefinition, RuleInput},
};

/// why provisioning a rule failed
#[derive(Error, Debug)]
pub enum ProvisionError {
	/// the input was rejected locally, nothing was sent
	#[error("invalid rule definition")]
	Invalid(#[from] InvalidDefinition),
	#[error("upsert failed")]
	Upsert(#[from] UpsertError),
}

impl ProvisionError {
	/// short name of the error kind, used as log field
	pub fn kind(&self) -> &'static str {
		match self {
			ProvisionError::Invalid(_) => "invalid_definition",
			ProvisionError::Upsert(err) => err.kind(),
		}
	}
}

/// Build the definition for the current state of `input` and upsert it into
/// `input.resource_group`. An invalid input never reaches `client`.
#[tracing::instrument(skip_all, fields(rule = %input.name, resource_group = %input.resource_group))]
pub async fn provision(
	client: &impl UpsertClient,
	input: &RuleInput,
	cancel: &CancellationToken,
) -> Result<Acknowledgement, ProvisionError> {
	let definition = build(input)?;

	tracing::debug!(
		"built definition: enabled={}, actions={:?}, window={}min",
		definition.is_enabled,
		definition.actions.as_ref().map(Vec::len),
		definition.condition.window_minutes(),
	);

	let ack = client.upsert(&input.resource_group, &definition, cancel).await?;

	tracing::info!("rule upserted with status {} (request {})", ack.status_code, ack.request_id);

	Ok(ack)
}
