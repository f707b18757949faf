use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, Source};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use webtest_alert::{client::settings::ManagementSettings, rule::settings::RuleSettings};

use crate::log::LogSettings;

static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// prefix of environment variables overriding the config file, e.g.
/// `WEBTEST_ALERT__MANAGEMENT__ACCESS_TOKEN`
const ENV_PREFIX: &str = "WEBTEST_ALERT";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
	#[serde(default)]
	pub log: LogSettings,
	/// only needed when actually sending the rule
	#[serde(default)]
	pub management: Option<ManagementSettings>,
	pub rule: RuleSettings,
	/// print the definition instead of upserting it
	#[serde(skip)]
	pub dry_run: bool,
}

impl Settings {
	pub fn global() -> &'static Self {
		SETTINGS.get_or_init(|| {
			match Self::load().context("failed to load config and command line arguments") {
				Ok(settings) => settings,
				Err(err) => {
					// tracing wasn't setup yet
					panic!("{:#?}", err);
				}
			}
		})
	}

	fn load() -> Result<Self> {
		let opts = Self::command().get_matches();

		let config_path = opts.value_of("config").context("no config path given")?;

		Self::from_matches(&opts, config::File::with_name(config_path))
	}

	fn command() -> Command<'static> {
		Command::new(clap::crate_name!())
			.version(clap::crate_version!())
			.about(clap::crate_description!())
			.author(clap::crate_authors!())
			.args([
				Arg::new("config")
					.help("path of config file")
					.takes_value(true)
					.short('c')
					.long("config")
					.default_value("./config.yaml"),
				Arg::new("level")
					.help("log level")
					.possible_values(["Error", "Warn", "Info", "Debug", "Trace"])
					.ignore_case(true)
					.takes_value(true)
					.long("log"),
				Arg::new("name").help("name of the rule").takes_value(true).long("name"),
				Arg::new("location")
					.help("region of the rule, e.g. \"East US\"")
					.takes_value(true)
					.long("location"),
				Arg::new("resource-group")
					.help("resource group the rule is stored in")
					.takes_value(true)
					.long("resource-group"),
				Arg::new("failed-location-count")
					.help("number of probe locations that have to fail")
					.takes_value(true)
					.long("failed-location-count"),
				Arg::new("window-size")
					.help("evaluation window in seconds")
					.takes_value(true)
					.long("window-size"),
				Arg::new("disable-rule").help("provision the rule disabled").long("disable-rule"),
				Arg::new("dry-run")
					.help("print the rule definition instead of sending it")
					.long("dry-run"),
			])
	}

	/// merge `file`, the environment and the command line overrides
	fn from_matches<S>(opts: &ArgMatches, file: S) -> Result<Self>
	where
		S: Source + Send + Sync + 'static,
	{
		let builder = Config::builder().add_source(file).add_source(
			Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__"),
		);

		let conf = Self::overrides(builder, opts)?.build().context("can't load config")?;

		let mut settings: Settings = conf.try_deserialize().context("can't load config")?;

		settings.dry_run = opts.is_present("dry-run");

		Ok(settings)
	}

	/// command line arguments win over config file and environment
	fn overrides(
		mut builder: ConfigBuilder<DefaultState>,
		opts: &ArgMatches,
	) -> Result<ConfigBuilder<DefaultState>> {
		if let Some(level) = opts.value_of("level") {
			builder = builder.set_override("log.level", level)?;
		}

		for (arg, key) in
			[("name", "rule.name"), ("location", "rule.location"), ("resource-group", "rule.resource_group")]
		{
			if let Some(value) = opts.value_of(arg) {
				builder = builder.set_override(key, value)?;
			}
		}

		if let Some(count) = opts.value_of("failed-location-count") {
			let count: u32 = count.parse().context("failed location count isn't a number")?;
			builder = builder.set_override("rule.failed_location_count", i64::from(count))?;
		}

		if let Some(window) = opts.value_of("window-size") {
			let window: f64 = window.parse().context("window size isn't a number of seconds")?;
			builder = builder.set_override("rule.window_size", window)?;
		}

		if opts.is_present("disable-rule") {
			builder = builder.set_override("rule.disable_rule", true)?;
		}

		Ok(builder)
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use config::{File, FileFormat};
	use webtest_alert::rule::RuleInput;

	use super::*;

	const CONFIG: &str = r#"
management:
  subscription_id: sub
  access_token: token
rule:
  name: homepage
  location: East US
  resource_group: web-rg
  failed_location_count: 3
"#;

	fn settings(config: &'static str, args: &[&str]) -> Settings {
		let opts = Settings::command()
			.try_get_matches_from(std::iter::once("webtest-alert").chain(args.iter().copied()))
			.unwrap();

		Settings::from_matches(&opts, File::from_str(config, FileFormat::Yaml)).unwrap()
	}

	#[test]
	fn config_file_only() {
		let settings = settings(CONFIG, &[]);

		assert_eq!(settings.log.level, "info");
		assert!(!settings.dry_run);

		let management = settings.management.unwrap();
		assert_eq!(management.endpoint.as_str(), "https://management.azure.com/");
		assert_eq!(management.api_version, "2016-03-01");
		assert_eq!(management.timeout, Duration::from_secs(30));

		assert_eq!(
			RuleInput::from(settings.rule),
			RuleInput::new("homepage", "East US", "web-rg", 3)
		);
	}

	#[test]
	fn command_line_overrides_config_file() {
		let settings = settings(
			CONFIG,
			&[
				"--log",
				"debug",
				"--name",
				"checkout",
				"--failed-location-count",
				"5",
				"--window-size",
				"18000",
				"--disable-rule",
				"--dry-run",
			],
		);

		assert_eq!(settings.log.level, "debug");
		assert!(settings.dry_run);

		let input = RuleInput::from(settings.rule);
		assert_eq!(input.name, "checkout");
		assert_eq!(input.location, "East US");
		assert_eq!(input.failed_location_count, 5);
		assert_eq!(input.window_size, Duration::from_secs(300 * 60));
		assert!(input.disable_rule);
	}

	#[test]
	fn management_section_is_optional() {
		let settings = settings(
			r#"
rule:
  name: homepage
  location: East US
  resource_group: web-rg
  failed_location_count: 3
"#,
			&["--dry-run"],
		);

		assert!(settings.management.is_none());
	}
}
