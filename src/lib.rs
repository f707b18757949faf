//! Declares webtest (synthetic availability) alert rules and upserts them into
//! a monitoring control plane.
//!
//! [rule::build] compiles operator input into a canonical
//! [RuleDefinition][rule::RuleDefinition], [provision::provision] sends it
//! through an [UpsertClient][client::UpsertClient].

pub mod client;
pub mod provision;
pub mod rule;
