//! Deterministic weekly audit of one seven-day episode.
//!
//! Values, TD errors and rule backtests are computed over the full history;
//! only the reporting is restricted to the week.

use crate::evaluate::{evaluate_rules, EvaluatedRule, PolicyParams};
use crate::rule::PolicyRule;
use crate::stats::{component_stats, exploration_ratio};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tagwerk_core::{stats, ActionTag, Component, Transition};
use tagwerk_regimes::{estimate_values, td_errors, RegimeTable, ValueParams};
use time::{Date, Duration};

/// Minimum change of the average reward against the prior week that counts
/// as a trend.
const TRAJECTORY_BAND: f64 = 0.3;
const WEEK_DAYS: i64 = 7;
const BASELINE_DAYS: i64 = 28;

/// Everything the audit reads.
#[derive(Debug, Clone, Copy)]
pub struct AuditInput<'a> {
    /// First day of the audited week; the week covers seven days.
    pub week_start: Date,
    /// Full chronological history, not just the week.
    pub transitions: &'a [Transition],
    pub rules: &'a [PolicyRule],
    pub table: &'a RegimeTable,
    pub value_params: &'a ValueParams,
    pub policy_params: &'a PolicyParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    Improving,
    Declining,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeShift {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySummary {
    pub rules_evaluated: usize,
    /// Rules followed at least once.
    pub rules_followed: usize,
    /// Σ followed / Σ matched over all valid rules.
    pub follow_rate: Option<f64>,
    pub top_performing_rule: Option<String>,
    pub underperforming_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdHighlight {
    pub date: Date,
    pub regime: String,
    pub td_error: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardHealth {
    pub at_floor: Vec<Component>,
    pub at_ceiling: Vec<Component>,
    pub volatile: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAudit {
    pub week_start: Date,
    pub week_end: Date,
    pub transition_count: usize,
    pub avg_reward: Option<f64>,
    pub prior_week_avg_reward: Option<f64>,
    pub four_week_avg_reward: Option<f64>,
    pub trajectory: Trajectory,
    pub action_distribution: BTreeMap<ActionTag, usize>,
    pub exploration_ratio: Option<f64>,
    pub dominant_regime: Option<String>,
    /// Regime of the first and last day; needs two days in the week.
    pub regime_shift: Option<RegimeShift>,
    pub policy: PolicySummary,
    /// Largest surprises first.
    pub td_errors: Vec<TdHighlight>,
    pub reward_health: RewardHealth,
}

/// Builds the audit for `[week_start, week_start + 6]`.
#[must_use]
pub fn weekly_audit(input: &AuditInput<'_>) -> WeeklyAudit {
    // Windows are cut at the ends of the calendar.
    let week_end = input
        .week_start
        .checked_add(Duration::days(WEEK_DAYS - 1))
        .unwrap_or(Date::MAX);
    let all = input.transitions;
    let within = |from: Date, to: Date| {
        all.iter()
            .filter(|t| t.date >= from && t.date <= to)
            .collect::<Vec<_>>()
    };
    let before_week = |days: i64| match input.week_start.previous_day() {
        Some(last) => within(
            input
                .week_start
                .checked_sub(Duration::days(days))
                .unwrap_or(Date::MIN),
            last,
        ),
        None => Vec::new(),
    };

    let week: Vec<Transition> = within(input.week_start, week_end).into_iter().cloned().collect();
    let avg_reward = mean_reward(week.iter());
    let prior_week_avg_reward = mean_reward(before_week(WEEK_DAYS).into_iter());
    let four_week_avg_reward = mean_reward(before_week(BASELINE_DAYS).into_iter());

    let labels: BTreeMap<Date, String> = all
        .iter()
        .map(|t| {
            let label = input.table.label(input.table.assign(&t.state)).unwrap_or_default();
            (t.date, label.to_string())
        })
        .collect();

    let mut action_distribution = BTreeMap::new();
    for action in week.iter().flat_map(|t| t.actions.iter()) {
        *action_distribution.entry(*action).or_insert(0) += 1;
    }

    let week_labels: Vec<&str> = week
        .iter()
        .filter_map(|t| labels.get(&t.date).map(String::as_str))
        .collect();
    let regime_shift = match week_labels.as_slice() {
        [first, .., last] => Some(RegimeShift {
            from: (*first).to_string(),
            to: (*last).to_string(),
        }),
        _ => None,
    };

    let evaluated = evaluate_rules(input.rules, all, week_end, input.policy_params);
    let health = component_stats(&week);

    WeeklyAudit {
        week_start: input.week_start,
        week_end,
        transition_count: week.len(),
        avg_reward,
        prior_week_avg_reward,
        four_week_avg_reward,
        trajectory: trajectory(avg_reward, prior_week_avg_reward),
        action_distribution,
        exploration_ratio: exploration_ratio(&week),
        dominant_regime: dominant_regime(&week_labels, input.table),
        regime_shift,
        policy: summarize(&evaluated),
        td_errors: week_td_errors(input, week_end),
        reward_health: RewardHealth {
            at_floor: health.iter().filter(|c| c.at_floor).map(|c| c.component).collect(),
            at_ceiling: health.iter().filter(|c| c.at_ceiling).map(|c| c.component).collect(),
            volatile: health.iter().filter(|c| c.volatile).map(|c| c.component).collect(),
        },
    }
}

fn mean_reward<'a>(transitions: impl Iterator<Item = &'a Transition>) -> Option<f64> {
    let rewards: Vec<f64> = transitions.map(|t| t.reward).collect();
    stats::mean(&rewards)
}

fn trajectory(current: Option<f64>, prior: Option<f64>) -> Trajectory {
    match (current, prior) {
        (Some(now), Some(before)) if now > before + TRAJECTORY_BAND => Trajectory::Improving,
        (Some(now), Some(before)) if now < before - TRAJECTORY_BAND => Trajectory::Declining,
        _ => Trajectory::Flat,
    }
}

/// Most frequent regime of the week; ties go to the earlier table entry.
fn dominant_regime(week_labels: &[&str], table: &RegimeTable) -> Option<String> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for label in week_labels {
        if let Some(idx) = table.index_of(label) {
            *counts.entry(idx).or_insert(0) += 1;
        }
    }
    let best = counts.values().copied().max()?;
    counts
        .into_iter()
        .find(|&(_, count)| count == best)
        .and_then(|(idx, _)| table.label(idx))
        .map(str::to_string)
}

fn summarize(evaluated: &[EvaluatedRule]) -> PolicySummary {
    let valid: Vec<&EvaluatedRule> = evaluated.iter().filter(|e| e.is_valid()).collect();
    let matched: usize = valid.iter().map(|e| e.match_count).sum();
    let followed: usize = valid.iter().map(|e| e.followed_count).sum();
    #[allow(clippy::cast_precision_loss)]
    let follow_rate = (matched > 0).then(|| followed as f64 / matched as f64);

    let mut top: Option<(&EvaluatedRule, f64)> = None;
    for &rule in &valid {
        if let Some(avg) = rule.avg_reward_when_followed {
            if top.map_or(true, |(_, best)| avg > best) {
                top = Some((rule, avg));
            }
        }
    }

    PolicySummary {
        rules_evaluated: evaluated.len(),
        rules_followed: valid.iter().filter(|e| e.followed_count > 0).count(),
        follow_rate,
        top_performing_rule: top.map(|(rule, _)| rule.rule.name.clone()),
        underperforming_rules: valid
            .iter()
            .filter(|e| e.underperforms())
            .map(|e| e.rule.name.clone())
            .collect(),
    }
}

fn week_td_errors(input: &AuditInput<'_>, week_end: Date) -> Vec<TdHighlight> {
    let Some(estimates) = estimate_values(input.transitions, input.table, input.value_params).ready()
    else {
        return Vec::new();
    };
    let Some(enriched) =
        td_errors(input.transitions, input.table, &estimates, input.value_params).ready()
    else {
        return Vec::new();
    };

    let mut highlights: Vec<TdHighlight> = enriched
        .into_iter()
        .filter(|t| t.transition.date >= input.week_start && t.transition.date <= week_end)
        .filter_map(|t| {
            Some(TdHighlight {
                date: t.transition.date,
                td_error: t.transition.td_error?,
                regime: t.regime,
            })
        })
        .collect();
    highlights.sort_by(|a, b| {
        b.td_error
            .abs()
            .total_cmp(&a.td_error.abs())
            .then_with(|| a.date.cmp(&b.date))
    });
    highlights
}
