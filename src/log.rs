use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing_subscriber::{
	filter::LevelFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
	EnvFilter,
};

use crate::settings::Settings;

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
	#[serde(default = "default_level")]
	pub level: String,
}

impl Default for LogSettings {
	fn default() -> Self {
		Self { level: default_level() }
	}
}

fn default_level() -> String {
	String::from("info")
}

impl LogSettings {
	pub fn global() -> &'static Self {
		&Settings::global().log
	}
}

pub fn setup_logging() -> Result<()> {
	let level = tracing::Level::from_str(LogSettings::global().level.as_str())
		.context("invalid log level")?;

	// stdout is reserved for the definition/acknowledgement output
	let fmt_layer = fmt::layer().with_writer(std::io::stderr);

	let filter_layer = EnvFilter::default()
		.add_directive(LevelFilter::from_level(level).into())
		.add_directive("hyper=warn".parse()?)
		.add_directive("reqwest=warn".parse()?);

	tracing_subscriber::registry().with(filter_layer).with(fmt_layer).init();

	Ok(())
}
