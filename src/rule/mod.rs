//! webtest alert rules: what the operator configures and what gets sent to
//! the monitoring service

pub mod action;
pub mod builder;
pub mod definition;
pub mod input;
pub mod settings;

mod window_size;

pub use self::{
	action::{Action, EmailAction, WebhookAction},
	builder::{build, InvalidDefinition},
	definition::{LocationThresholdCondition, MetricDataSource, RuleDefinition},
	input::RuleInput,
};
