//! operator supplied rule parameters
use std::time::Duration;

use indexmap::IndexMap;

use super::action::Action;

/// window size used when the operator doesn't specify one
pub const DEFAULT_WINDOW_SIZE: Duration = Duration::from_secs(15 * 60);

/// Parameters of a webtest alert rule as the operator configured them.
///
/// Meant to be kept around and changed between builds, every
/// [build][super::build] only looks at the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleInput {
	/// identity of the rule
	pub name: String,
	/// region of the rule
	pub location: String,
	/// resource group the rule is stored in
	pub resource_group: String,
	/// how many probe locations have to fail within `window_size`
	pub failed_location_count: u32,
	/// interval the failed locations are counted in
	pub window_size: Duration,
	/// provision the rule disabled
	pub disable_rule: bool,
	/// `None` leaves the action policy unconfigured, `Some(vec![])` configures
	/// it with no actions
	pub actions: Option<Vec<Action>>,
	pub description: String,
	/// resource id the `hidden-link:` tag points to
	pub target_resource_uri: Option<String>,
	/// additional tags, they can't use the `hidden-link:` prefix
	pub tags: IndexMap<String, String>,
}

impl RuleInput {
	/// construct input with the required parameters, everything else uses its
	/// default
	pub fn new(
		name: impl Into<String>,
		location: impl Into<String>,
		resource_group: impl Into<String>,
		failed_location_count: u32,
	) -> Self {
		Self {
			name: name.into(),
			location: location.into(),
			resource_group: resource_group.into(),
			failed_location_count,
			window_size: DEFAULT_WINDOW_SIZE,
			disable_rule: false,
			actions: None,
			description: String::new(),
			target_resource_uri: None,
			tags: IndexMap::new(),
		}
	}

	/// append an action, configuring the action policy if it was unset
	pub fn push_action(&mut self, action: impl Into<Action>) {
		self.actions.get_or_insert_with(Vec::new).push(action.into());
	}

	/// replace the action policy, an empty `actions` still counts as configured
	pub fn set_actions(&mut self, actions: Vec<Action>) {
		self.actions = Some(actions);
	}

	/// go back to an unconfigured action policy
	pub fn clear_actions(&mut self) {
		self.actions = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rule::action::EmailAction;

	#[test]
	fn defaults() {
		let input = RuleInput::new("N", "East US", "RG", 10);

		assert_eq!(input.window_size, Duration::from_secs(900));
		assert!(!input.disable_rule);
		assert_eq!(input.actions, None);
		assert!(input.tags.is_empty());
	}

	#[test]
	fn action_policy_states() {
		let mut input = RuleInput::new("N", "East US", "RG", 10);

		input.set_actions(Vec::new());
		assert_eq!(input.actions, Some(Vec::new()));

		input.clear_actions();
		assert_eq!(input.actions, None);

		input.push_action(EmailAction::default());
		assert_eq!(input.actions.as_ref().map(Vec::len), Some(1));
	}
}
