//! provisions a webtest alert rule on the monitoring control plane
//!
//! Features:
//! - rule parameters from a config file, overridable by environment and
//!   command line
//! - validates the rule locally before anything is sent
//! - `--dry-run` prints the exact definition that would be upserted

use anyhow::{Context, Result};
use settings::Settings;
use tokio_util::sync::CancellationToken;
use webtest_alert::{
	client::{http_client::ManagementClient, UpsertClient},
	provision::provision,
	rule::{self, RuleInput},
};

mod log;
mod settings;
mod telemetry;

/// exit the complete program if one thread panics
fn setup_panic_handler() {
	let default_panic = std::panic::take_hook();
	std::panic::set_hook(Box::new(move |info| {
		default_panic(info);
		std::process::exit(1);
	}));
}

/// the entry point of the program
#[tokio::main]
pub async fn main() -> Result<()> {
	setup_panic_handler();

	log::setup_logging().context("could not setup logging")?;

	let settings = Settings::global();
	let input = RuleInput::from(settings.rule.clone());

	if settings.dry_run {
		let definition = rule::build(&input).context("invalid rule definition")?;
		println!(
			"{}",
			serde_json::to_string_pretty(&definition).context("failed to serialize definition")?
		);
		return Ok(());
	}

	let management =
		settings.management.clone().context("config has no `management` section")?;
	let client =
		ManagementClient::new(management).context("failed to construct management client")?;

	let cancel = CancellationToken::new();

	tokio::spawn({
		let cancel = cancel.clone();
		async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				tracing::warn!("interrupted, cancelling upsert");
				cancel.cancel();
			}
		}
	});

	let result = provision(&client, &input, &cancel).await;

	if let Some(sent) = client.last_sent().await {
		tracing::debug!(
			"sent to resource group {}: {}",
			sent.resource_group,
			String::from_utf8_lossy(&sent.payload)
		);
	}

	telemetry::log_metrics();

	match result {
		Ok(ack) => {
			println!("{} {}", ack.status_code, ack.request_id);
			Ok(())
		}
		Err(err) => {
			tracing::error!(kind = err.kind(), "failed to provision rule {}", input.name);
			Err(err).context(format!("failed to provision rule {}", input.name))
		}
	}
}
