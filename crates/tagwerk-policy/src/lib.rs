#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Policy backtesting for tagwerk.
//!
//! Rules are user-declared hypotheses of the form "when the state looks like
//! this, take that action". This crate checks them against the recorded
//! history and reports the evidence. It never applies a rule, never tunes
//! one and never arbitrates between rules that match the same day.

pub mod audit;
pub mod evaluate;
pub mod rule;
pub mod stats;

pub use audit::{weekly_audit, AuditInput, PolicySummary, RewardHealth, Trajectory, WeeklyAudit};
pub use evaluate::{evaluate_rules, suggest_action, EvaluatedRule, PolicyParams, RuleStatus};
pub use rule::{CompiledRule, Condition, Operator, PolicyRule, RuleSource};
pub use stats::{action_stats, component_stats, exploration_ratio, ActionStats, ComponentStats};
