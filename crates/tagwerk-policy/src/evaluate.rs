//! Backtests policy rules against the transition history.
//!
//! Strictly descriptive: rules are counted and averaged, never weighted,
//! ranked against each other or applied.

use crate::rule::{CompiledRule, PolicyRule};
use serde::{Deserialize, Serialize};
use tagwerk_core::{stats, StateVector, Transition};
use time::{Date, Duration};

/// Knobs of the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyParams {
    /// Days the latest transition may lag behind `today` and still count as
    /// "current" for [`EvaluatedRule::is_active`].
    pub active_staleness_days: u32,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            active_staleness_days: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RuleStatus {
    Valid,
    /// Skipped; the reason names the offending condition.
    Malformed { reason: String },
}

/// Backtest result of one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedRule {
    #[serde(flatten)]
    pub rule: PolicyRule,
    pub status: RuleStatus,
    pub match_count: usize,
    /// Matched days whose action set contained the rule's action.
    pub followed_count: usize,
    pub avg_reward_when_followed: Option<f64>,
    pub avg_reward_when_ignored: Option<f64>,
    /// The rule holds for the current transition.
    pub is_active: bool,
}

impl EvaluatedRule {
    fn malformed(rule: &PolicyRule, reason: String) -> Self {
        Self {
            rule: rule.clone(),
            status: RuleStatus::Malformed { reason },
            match_count: 0,
            followed_count: 0,
            avg_reward_when_followed: None,
            avg_reward_when_ignored: None,
            is_active: false,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == RuleStatus::Valid
    }

    #[must_use]
    pub fn ignored_count(&self) -> usize {
        self.match_count - self.followed_count
    }

    /// Following the rule paid off worse than ignoring it.
    #[must_use]
    pub fn underperforms(&self) -> bool {
        matches!(
            (self.avg_reward_when_followed, self.avg_reward_when_ignored),
            (Some(followed), Some(ignored)) if followed < ignored
        )
    }
}

/// Evaluates each rule independently against every transition.
///
/// A transition may match several rules at once; there is no conflict
/// resolution. Malformed rules are annotated and reported with zero counts
/// without affecting the others. `today` only feeds `is_active`.
#[must_use]
pub fn evaluate_rules(
    rules: &[PolicyRule],
    transitions: &[Transition],
    today: Date,
    params: &PolicyParams,
) -> Vec<EvaluatedRule> {
    let current = current_transition(transitions, today, params);
    rules
        .iter()
        .map(|rule| match rule.compile() {
            Ok(compiled) => backtest(rule, &compiled, transitions, current),
            Err(reason) => {
                tagwerk_core::warn_event!("rule '{}' is malformed: {reason}", rule.id);
                EvaluatedRule::malformed(rule, reason)
            }
        })
        .collect()
}

fn backtest(
    rule: &PolicyRule,
    compiled: &CompiledRule,
    transitions: &[Transition],
    current: Option<&Transition>,
) -> EvaluatedRule {
    let mut followed = Vec::new();
    let mut ignored = Vec::new();
    for t in transitions.iter().filter(|t| compiled.holds(&t.state)) {
        if t.took(rule.action) {
            followed.push(t.reward);
        } else {
            ignored.push(t.reward);
        }
    }

    EvaluatedRule {
        rule: rule.clone(),
        status: RuleStatus::Valid,
        match_count: followed.len() + ignored.len(),
        followed_count: followed.len(),
        avg_reward_when_followed: stats::mean(&followed),
        avg_reward_when_ignored: stats::mean(&ignored),
        is_active: current.is_some_and(|t| compiled.holds(&t.state)),
    }
}

/// Latest transition on or before `today`, unless it is stale.
fn current_transition<'a>(
    transitions: &'a [Transition],
    today: Date,
    params: &PolicyParams,
) -> Option<&'a Transition> {
    let latest = transitions.iter().filter(|t| t.date <= today).max_by_key(|t| t.date)?;
    let lag = today - latest.date;
    (lag <= Duration::days(i64::from(params.active_staleness_days))).then_some(latest)
}

/// Best-backed rule that holds for `state`.
///
/// Among valid rules whose conditions hold, the highest
/// `avg_reward_when_followed` wins (rules never followed rank last), then
/// the larger match count, then list order.
#[must_use]
pub fn suggest_action<'a>(
    state: &StateVector,
    evaluated: &'a [EvaluatedRule],
) -> Option<&'a EvaluatedRule> {
    let mut best: Option<&EvaluatedRule> = None;
    for candidate in evaluated.iter().filter(|e| e.is_valid()) {
        let Ok(compiled) = candidate.rule.compile() else {
            continue;
        };
        if !compiled.holds(state) {
            continue;
        }
        best = match best {
            Some(current) if !outranks(candidate, current) => Some(current),
            _ => Some(candidate),
        };
    }
    best
}

fn outranks(a: &EvaluatedRule, b: &EvaluatedRule) -> bool {
    let score = |e: &EvaluatedRule| e.avg_reward_when_followed.unwrap_or(f64::NEG_INFINITY);
    match score(a).total_cmp(&score(b)) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => a.match_count > b.match_count,
    }
}
