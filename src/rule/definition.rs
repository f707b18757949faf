//! the canonical rule definition handed to the upsert call
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{action::Action, window_size};

/// prefix of the tag linking a rule to the resource it monitors, the portal
/// uses it for navigating from the resource to its alert rules
pub const HIDDEN_LINK_PREFIX: &str = "hidden-link:";

/// value of the [HIDDEN_LINK_PREFIX] tag
pub const HIDDEN_LINK_VALUE: &str = "Resource";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Snapshot of a webtest alert rule. Built by [build][super::build], never
/// changed afterwards.
pub struct RuleDefinition {
	/// identity of the rule, an upsert with the same name updates it
	pub name: String,
	/// region the rule lives in
	pub location: String,
	/// free form description shown in the portal
	pub description: String,
	/// always contains a key starting with [HIDDEN_LINK_PREFIX]
	pub tags: IndexMap<String, String>,
	pub is_enabled: bool,
	pub condition: LocationThresholdCondition,
	/// `None` means no action policy at all, which the service treats
	/// differently from an empty list
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub actions: Option<Vec<Action>>,
}

impl RuleDefinition {
	/// the reserved `hidden-link:` tag
	pub fn hidden_link(&self) -> Option<(&String, &String)> {
		self.tags.iter().find(|(key, _)| key.starts_with(HIDDEN_LINK_PREFIX))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// fires once `failed_location_count` probe locations failed within
/// `window_size`
pub struct LocationThresholdCondition {
	#[serde(rename = "odata.type")]
	odata_type: ConditionType,
	pub data_source: MetricDataSource,
	pub failed_location_count: u32,
	#[serde(with = "window_size")]
	pub window_size: Duration,
}

impl LocationThresholdCondition {
	pub fn new(failed_location_count: u32, window_size: Duration) -> Self {
		Self {
			odata_type: ConditionType::LocationThreshold,
			data_source: MetricDataSource::default(),
			failed_location_count,
			window_size,
		}
	}

	/// length of the evaluation window in (possibly fractional) minutes
	pub fn window_minutes(&self) -> f64 {
		self.window_size.as_secs_f64() / 60.
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum ConditionType {
	#[serde(rename = "Microsoft.Azure.Management.Insights.Models.LocationThresholdRuleCondition")]
	LocationThreshold,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Metric data source of the condition. Webtest rules are evaluated on the
/// availability signal of the probes, so the fields stay `None` and are sent
/// as explicit nulls.
pub struct MetricDataSource {
	#[serde(rename = "odata.type")]
	odata_type: DataSourceType,
	pub metric_name: Option<String>,
	pub resource_uri: Option<String>,
	pub metric_namespace: Option<String>,
}

impl MetricDataSource {
	pub fn is_empty(&self) -> bool {
		self.metric_name.is_none() && self.resource_uri.is_none() && self.metric_namespace.is_none()
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum DataSourceType {
	#[default]
	#[serde(rename = "Microsoft.Azure.Management.Insights.Models.RuleMetricDataSource")]
	Metric,
}
