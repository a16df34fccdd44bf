//! Reward & state builder.
//!
//! Turns one [`DayRecord`] into a [`StateVector`] and a scalar reward. Every
//! component has its own normalization rule. Components without any logged
//! input stay absent and are left out of the aggregate instead of being
//! defaulted.
//!
//! Reward order of operations:
//!
//! ```text
//! reward = (K / n) · Σ ln(max(c, floor))      over the n present positive constructs
//!        + ln(max(gate, floor))               gate multiplies the product, i.e. adds in log space
//!        − w_frag  · fragmentation
//!        + w_theta · theta
//! ```
//!
//! `K` is the number of positive constructs. Scaling by `K / n` keeps the
//! magnitude comparable between fully and partially logged days.

use crate::error::{EngineError, Result};
use crate::record::{
    BodyFelt, DayRecord, NervousSystemState, Project, ProjectStatus, RevenueStreamType,
    TrainingType,
};
use crate::state::{Component, StateVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// Generative energy sub-score weights
const GE_SLEEP_WEIGHT: f64 = 0.35;
const GE_TRAINING_WEIGHT: f64 = 0.2;
const GE_BODY_WEIGHT: f64 = 0.2;
const GE_NERVOUS_WEIGHT: f64 = 0.25;

/// Score of a logged but empty training list.
const TRAINING_NONE_SCORE: f64 = 0.2;

/// Share of focus assigned to the spine project when estimating fragmentation.
const SPINE_FOCUS_SHARE: f64 = 0.9;

/// Daily targets for the discovery and network components.
const CONVERSATION_TARGET: f64 = 2.0;
const SIGNAL_REVIEW_TARGET: f64 = 5.0;
const INTRO_TARGET: f64 = 2.0;

/// Upper end of the PsyCap scale.
const PSYCAP_SCALE: f64 = 5.0;

/// Tunable parameters of the reward builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardSettings {
    pub sleep_target_hours: f64,
    pub focus_target_hours: f64,
    /// Revenue asks per day that count as a full quota.
    pub ask_quota: f64,
    /// Lower bound for positive constructs, keeps `ln` finite.
    pub floor: f64,
    pub fragmentation_weight: f64,
    pub coherence_weight: f64,
    /// Days (including today) over which touched thesis pillars are collected.
    pub coherence_window_days: u32,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            sleep_target_hours: 7.5,
            focus_target_hours: 6.0,
            ask_quota: 2.0,
            floor: 0.05,
            fragmentation_weight: 1.0,
            coherence_weight: 0.5,
            coherence_window_days: 7,
        }
    }
}

impl RewardSettings {
    /// Rejects settings that would make the reward undefined or meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.floor > 0.0 && self.floor < 1.0) {
            return Err(EngineError::InvalidParameter {
                name: "floor",
                reason: format!("must lie in (0, 1), got {}", self.floor),
            });
        }
        let non_negative = [
            ("sleep_target_hours", self.sleep_target_hours),
            ("focus_target_hours", self.focus_target_hours),
            ("ask_quota", self.ask_quota),
            ("fragmentation_weight", self.fragmentation_weight),
            ("coherence_weight", self.coherence_weight),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidParameter {
                    name,
                    reason: format!("must be a finite non-negative number, got {value}"),
                });
            }
        }
        if self.coherence_window_days == 0 {
            return Err(EngineError::InvalidParameter {
                name: "coherence_window_days",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Inputs beyond the day itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardContext<'a> {
    /// Project portfolio; archived projects are ignored.
    pub projects: &'a [Project],
    /// Earlier records inside the coherence window (today excluded).
    pub recent: &'a [DayRecord],
}

/// State and reward of a day with usable data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredDay {
    pub state: StateVector,
    pub reward: f64,
}

/// Builds the state vector and reward for one day.
///
/// Returns `None` (undefined) for a day without any logged field, or when no
/// positive construct has evidence. Callers skip such days.
#[must_use]
pub fn build_state(
    record: &DayRecord,
    context: &RewardContext<'_>,
    settings: &RewardSettings,
) -> Option<ScoredDay> {
    if record.is_unlogged() {
        return None;
    }

    let state = state_vector(record, context, settings);
    let reward = reward_for(&state, settings)?;
    Some(ScoredDay { state, reward })
}

/// Normalizes every component of `record` that has evidence.
#[must_use]
pub fn state_vector(
    record: &DayRecord,
    context: &RewardContext<'_>,
    settings: &RewardSettings,
) -> StateVector {
    let floor = settings.floor;
    let active: Vec<&Project> = context.projects.iter().filter(|p| p.is_active()).collect();

    let components = [
        (Component::Ge, generative_energy(record, settings)),
        (Component::Gi, intelligence_growth(record, floor)),
        (Component::Gvc, value_creation(record, settings)),
        (Component::Kappa, capture_ratio(record, settings)),
        (Component::Optionality, optionality(&active, floor)),
        (Component::Gd, discovery(record, floor)),
        (Component::Gn, network(record, floor)),
        (Component::J, judgment(record, floor)),
        (Component::Fragmentation, fragmentation(record, &active)),
        (Component::Theta, coherence(record, context.recent)),
        (Component::Gate, record.nervous_system_state.map(gate_multiplier)),
    ];

    let mut state = StateVector::new();
    for (component, value) in components {
        if let Some(v) = value {
            state.set(component, v);
        }
    }
    state
}

/// Scalar reward of a state, `None` without any positive evidence.
#[must_use]
pub fn reward_for(state: &StateVector, settings: &RewardSettings) -> Option<f64> {
    let floor = settings.floor;
    let logs: Vec<f64> = Component::POSITIVE
        .iter()
        .filter_map(|&c| state.get(c))
        .map(|v| v.max(floor).ln())
        .collect();
    if logs.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let scale = Component::POSITIVE.len() as f64 / logs.len() as f64;
    let aggregate = scale * logs.iter().sum::<f64>();

    let gate = state.get(Component::Gate).unwrap_or(1.0).max(floor).ln();
    let penalty = settings.fragmentation_weight * state.get(Component::Fragmentation).unwrap_or(0.0);
    let bonus = settings.coherence_weight * state.get(Component::Theta).unwrap_or(0.0);

    Some(aggregate + gate - penalty + bonus)
}

/// Gate multiplier for a nervous-system state.
#[must_use]
pub fn gate_multiplier(state: NervousSystemState) -> f64 {
    match state {
        NervousSystemState::Regulated => 1.0,
        NervousSystemState::SlightlySpiked => 0.7,
        NervousSystemState::Spiked => 0.3,
        NervousSystemState::Sick => 0.2,
    }
}

fn floored(value: f64, floor: f64) -> f64 {
    value.clamp(0.0, 1.0).max(floor)
}

fn ratio(value: f64, target: f64) -> f64 {
    if target > 0.0 {
        (value / target).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn training_score(kind: TrainingType) -> f64 {
    match kind {
        TrainingType::Strength | TrainingType::Vo2 => 1.0,
        TrainingType::Zone2 => 0.9,
        TrainingType::Yoga => 0.8,
        TrainingType::Rest => 0.5,
        TrainingType::None => TRAINING_NONE_SCORE,
    }
}

fn body_score(body: BodyFelt) -> f64 {
    match body {
        BodyFelt::Open => 1.0,
        BodyFelt::Neutral => 0.6,
        BodyFelt::Tense => 0.2,
    }
}

fn nervous_energy_score(state: NervousSystemState) -> f64 {
    match state {
        NervousSystemState::Regulated => 1.0,
        NervousSystemState::SlightlySpiked => 0.5,
        NervousSystemState::Spiked | NervousSystemState::Sick => 0.1,
    }
}

/// Weighted geometric mean over the energy sub-scores that were logged.
fn generative_energy(record: &DayRecord, settings: &RewardSettings) -> Option<f64> {
    let floor = settings.floor;
    let mut parts: Vec<(f64, f64)> = Vec::with_capacity(4);

    if let Some(hours) = record.sleep_hours {
        parts.push((floored(ratio(hours, settings.sleep_target_hours), floor), GE_SLEEP_WEIGHT));
    }
    if let Some(types) = &record.training_types {
        let best = types
            .iter()
            .map(|&t| training_score(t))
            .fold(TRAINING_NONE_SCORE, f64::max);
        parts.push((floored(best, floor), GE_TRAINING_WEIGHT));
    }
    if let Some(body) = record.body_felt {
        parts.push((floored(body_score(body), floor), GE_BODY_WEIGHT));
    }
    if let Some(ns) = record.nervous_system_state {
        parts.push((floored(nervous_energy_score(ns), floor), GE_NERVOUS_WEIGHT));
    }

    if parts.is_empty() {
        return None;
    }
    let total_weight: f64 = parts.iter().map(|(_, w)| w).sum();
    let log_mean = parts.iter().map(|(s, w)| w * s.ln()).sum::<f64>() / total_weight;
    Some(floored(log_mean.exp(), floor))
}

fn intelligence_growth(record: &DayRecord, floor: f64) -> Option<f64> {
    if record.problems_detected.is_none() && record.problem_selected.is_none() {
        return None;
    }
    let problem_score = match record.problems_detected.unwrap_or(0) {
        0 => 0.1,
        1 => 0.5,
        2 => 0.8,
        _ => 1.0,
    };
    let selected_bonus = if record.problem_selected == Some(true) { 0.2 } else { 0.0 };
    Some(floored(problem_score + selected_bonus, floor))
}

fn value_creation(record: &DayRecord, settings: &RewardSettings) -> Option<f64> {
    let logged = record.what_shipped.is_some()
        || record.public_iteration.is_some()
        || record.focus_hours_actual.is_some()
        || record.speed_over_perfection.is_some()
        || record.days_since_last_output.is_some();
    if !logged {
        return None;
    }

    let shipped = record
        .what_shipped
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());
    let shipped_base = if shipped { 0.4 } else { 0.05 };
    let public_bonus = if record.public_iteration == Some(true) { 0.2 } else { 0.0 };
    let focus = ratio(
        record.focus_hours_actual.unwrap_or(0.0),
        settings.focus_target_hours,
    );
    let speed_bonus = if record.speed_over_perfection == Some(true) { 0.1 } else { 0.0 };
    let recency = match record.days_since_last_output.unwrap_or(0) {
        0 => 1.0,
        1 => 0.7,
        2 => 0.4,
        _ => 0.1,
    };

    let raw = (shipped_base + public_bonus) * 0.35 + focus * 0.35 + recency * 0.2 + speed_bonus;
    Some(floored(raw, settings.floor))
}

fn capture_ratio(record: &DayRecord, settings: &RewardSettings) -> Option<f64> {
    let logged = record.revenue_asks_count.is_some()
        || record.revenue_this_session.is_some()
        || record.feedback_loop_closed.is_some()
        || record.revenue_stream_type.is_some();
    if !logged {
        return None;
    }

    let asks = ratio(f64::from(record.revenue_asks_count.unwrap_or(0)), settings.ask_quota);
    let revenue_signal = if record.revenue_this_session.unwrap_or(0.0) > 0.0 { 1.0 } else { 0.2 };
    let feedback_bonus = if record.feedback_loop_closed == Some(true) { 0.15 } else { 0.0 };
    let stream_multiplier = match record.revenue_stream_type {
        Some(RevenueStreamType::Recurring) => 1.15,
        Some(RevenueStreamType::Organic) => 0.9,
        Some(RevenueStreamType::OneTime) | None => 1.0,
    };

    let raw = (asks * 0.5 + revenue_signal * 0.35 + feedback_bonus) * stream_multiplier;
    Some(floored(raw, settings.floor))
}

/// Portfolio diversity as `1 − HHI`, plus a bonus for cheap backup options.
fn optionality(active: &[&Project], floor: f64) -> Option<f64> {
    if active.is_empty() {
        return None;
    }
    let total: f64 = active.iter().map(|p| p.time_allocation_percent.max(0.0)).sum();
    if total <= 0.0 {
        return Some(floor);
    }

    let hhi: f64 = active
        .iter()
        .map(|p| {
            let share = p.time_allocation_percent.max(0.0) / total;
            share * share
        })
        .sum();
    let has_backup = active
        .iter()
        .any(|p| matches!(p.status, ProjectStatus::Backup | ProjectStatus::Optionality));
    let backup_bonus = if has_backup { 0.1 } else { 0.0 };

    Some(floored(1.0 - hhi + backup_bonus, floor))
}

/// KL divergence between the day's focus split and the planned allocation.
fn fragmentation(record: &DayRecord, active: &[&Project]) -> Option<f64> {
    let focus = record.focus_hours_actual?;
    if active.is_empty() {
        return None;
    }
    let total: f64 = active.iter().map(|p| p.time_allocation_percent.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    if focus <= 0.0 {
        return Some(0.0);
    }

    let spine = record.spine_project.as_deref().unwrap_or("").trim();
    #[allow(clippy::cast_precision_loss)]
    let rest_share = (1.0 - SPINE_FOCUS_SHARE) / (active.len().saturating_sub(1).max(1)) as f64;
    let actual: Vec<f64> = active
        .iter()
        .map(|p| {
            let is_spine = !spine.is_empty()
                && (p.name.eq_ignore_ascii_case(spine) || p.id == spine);
            if is_spine {
                SPINE_FOCUS_SHARE
            } else {
                rest_share
            }
        })
        .collect();
    let actual_total: f64 = actual.iter().sum();

    let kl: f64 = active
        .iter()
        .zip(&actual)
        .map(|(p, a)| {
            let planned = p.time_allocation_percent.max(0.0) / total;
            let actual = a / actual_total;
            if actual > 0.0 && planned > 0.0 {
                actual * (actual / planned).ln()
            } else {
                0.0
            }
        })
        .sum();

    Some(kl.clamp(0.0, 1.0))
}

/// Distinct thesis pillars touched across the window.
fn coherence(record: &DayRecord, recent: &[DayRecord]) -> Option<f64> {
    let mut reported = false;
    let mut pillars: BTreeSet<&str> = BTreeSet::new();
    for day in recent.iter().chain(std::iter::once(record)) {
        if let Some(touched) = &day.pillars_touched {
            reported = true;
            pillars.extend(touched.iter().map(|p| p.trim()).filter(|p| !p.is_empty()));
        }
    }
    if !reported {
        return None;
    }

    let score = match pillars.len() {
        0 => 0.0,
        1 => 0.33,
        2 => 0.67,
        _ => 1.0,
    };
    Some(score)
}

fn discovery(record: &DayRecord, floor: f64) -> Option<f64> {
    let logged = record.discovery_conversations_count.is_some()
        || record.external_signals_reviewed.is_some()
        || record.insights_extracted.is_some();
    if !logged {
        return None;
    }

    let conversations = ratio(
        f64::from(record.discovery_conversations_count.unwrap_or(0)),
        CONVERSATION_TARGET,
    );
    let signals = ratio(
        f64::from(record.external_signals_reviewed.unwrap_or(0)),
        SIGNAL_REVIEW_TARGET,
    );
    let insights = if record.insights_extracted.unwrap_or(0) > 0 { 1.0 } else { 0.1 };

    Some(floored(conversations * 0.5 + signals * 0.3 + insights * 0.2, floor))
}

fn network(record: &DayRecord, floor: f64) -> Option<f64> {
    let logged = record.discovery_conversations_count.is_some()
        || record.warm_intros_made.is_some()
        || record.warm_intros_received.is_some()
        || record.meetings_booked.is_some()
        || record.public_posts_count.is_some();
    if !logged {
        return None;
    }

    let conversations = ratio(
        f64::from(record.discovery_conversations_count.unwrap_or(0)),
        CONVERSATION_TARGET,
    );
    let intros = ratio(
        f64::from(record.warm_intros_made.unwrap_or(0))
            + f64::from(record.warm_intros_received.unwrap_or(0)),
        INTRO_TARGET,
    );
    let meetings = if record.meetings_booked.unwrap_or(0) > 0 { 1.0 } else { 0.2 };
    let public = if record.public_posts_count.unwrap_or(0) > 0 { 0.8 } else { 0.2 };

    Some(floored(
        conversations * 0.35 + intros * 0.25 + meetings * 0.2 + public * 0.2,
        floor,
    ))
}

fn judgment(record: &DayRecord, floor: f64) -> Option<f64> {
    let scores: Vec<f64> = [
        record.psycap_hope,
        record.psycap_efficacy,
        record.psycap_resilience,
        record.psycap_optimism,
    ]
    .into_iter()
    .flatten()
    .filter(|v| v.is_finite() && *v > 0.0)
    .collect();
    if scores.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some(floored(mean / PSYCAP_SCALE, floor))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::date;

    fn full_day() -> DayRecord {
        DayRecord {
            sleep_hours: Some(7.5),
            training_types: Some(vec![TrainingType::Strength]),
            body_felt: Some(BodyFelt::Open),
            nervous_system_state: Some(NervousSystemState::Regulated),
            problems_detected: Some(2),
            problem_selected: Some(true),
            what_shipped: Some("landing page".into()),
            focus_hours_actual: Some(6.0),
            revenue_asks_count: Some(2),
            revenue_this_session: Some(100.0),
            discovery_conversations_count: Some(2),
            insights_extracted: Some(1),
            meetings_booked: Some(1),
            psycap_hope: Some(4.0),
            psycap_efficacy: Some(5.0),
            ..DayRecord::on(date!(2026 - 01 - 05))
        }
    }

    fn score(record: &DayRecord) -> Option<ScoredDay> {
        build_state(record, &RewardContext::default(), &RewardSettings::default())
    }

    #[test]
    fn unlogged_day_is_undefined() {
        let record = DayRecord::on(date!(2026 - 01 - 05));
        assert!(score(&record).is_none());
    }

    #[test]
    fn every_component_is_clamped() {
        let mut record = full_day();
        record.sleep_hours = Some(14.0);
        record.focus_hours_actual = Some(30.0);
        record.revenue_asks_count = Some(40);
        record.revenue_stream_type = Some(RevenueStreamType::Recurring);
        record.feedback_loop_closed = Some(true);

        let day = score(&record).expect("defined");
        for (_, value) in day.state.iter() {
            assert!((0.0..=1.0).contains(&value), "out of range: {value}");
        }
    }

    #[test]
    fn regulated_day_beats_spiked_day() {
        let regulated = full_day();
        let mut spiked = full_day();
        spiked.nervous_system_state = Some(NervousSystemState::Spiked);
        let mut slightly = full_day();
        slightly.nervous_system_state = Some(NervousSystemState::SlightlySpiked);

        let r = score(&regulated).unwrap().reward;
        let s = score(&spiked).unwrap().reward;
        let m = score(&slightly).unwrap().reward;
        assert!(r > m, "{r} <= {m}");
        assert!(m > s, "{m} <= {s}");
    }

    #[test]
    fn gate_alone_is_monotone_for_identical_states() {
        let settings = RewardSettings::default();
        let base = StateVector::new()
            .with(Component::Ge, 0.06)
            .with(Component::Fragmentation, 1.0);
        let regulated = reward_for(&base.with(Component::Gate, 1.0), &settings).unwrap();
        let spiked = reward_for(&base.with(Component::Gate, 0.3), &settings).unwrap();
        assert!(regulated > spiked);
    }

    #[test]
    fn absent_components_are_not_penalized() {
        let settings = RewardSettings::default();
        let partial = StateVector::new().with(Component::Ge, 0.8);
        let with_zero = partial.with(Component::Kappa, 0.0);

        let r_partial = reward_for(&partial, &settings).unwrap();
        let r_zero = reward_for(&with_zero, &settings).unwrap();
        assert!(r_partial > r_zero);
        // A single present component at 0.8 extrapolates to the full aggregate.
        assert!((r_partial - 8.0 * 0.8_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn failing_dimension_dominates() {
        let settings = RewardSettings::default();
        let strong = Component::POSITIVE
            .iter()
            .fold(StateVector::new(), |s, &c| s.with(c, 0.9));
        let ruined = strong.with(Component::Kappa, 0.0);

        let gap = reward_for(&strong, &settings).unwrap() - reward_for(&ruined, &settings).unwrap();
        assert!(gap > 2.5, "collapse too small: {gap}");
        assert!(reward_for(&ruined, &settings).unwrap().is_finite());
    }

    #[test]
    fn missing_energy_subscores_are_renormalized() {
        let settings = RewardSettings::default();
        let sleep_only = DayRecord {
            sleep_hours: Some(7.5),
            ..DayRecord::on(date!(2026 - 01 - 05))
        };
        let state = state_vector(&sleep_only, &RewardContext::default(), &settings);
        assert!((state.get(Component::Ge).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(state.get(Component::Gate), None);
        assert_eq!(state.get(Component::Kappa), None);
    }

    #[test]
    fn portfolio_components_need_projects() {
        let settings = RewardSettings::default();
        let projects = vec![
            Project {
                id: "p1".into(),
                name: "Atlas".into(),
                status: ProjectStatus::Spine,
                time_allocation_percent: 50.0,
            },
            Project {
                id: "p2".into(),
                name: "Beacon".into(),
                status: ProjectStatus::Backup,
                time_allocation_percent: 50.0,
            },
            Project {
                id: "p3".into(),
                name: "Old".into(),
                status: ProjectStatus::Archived,
                time_allocation_percent: 90.0,
            },
        ];
        let mut record = full_day();
        record.spine_project = Some("atlas".into());

        let without = state_vector(&record, &RewardContext::default(), &settings);
        assert_eq!(without.get(Component::Optionality), None);
        assert_eq!(without.get(Component::Fragmentation), None);

        let ctx = RewardContext {
            projects: &projects,
            recent: &[],
        };
        let with = state_vector(&record, &ctx, &settings);
        // 1 − (0.25 + 0.25) + backup bonus
        assert!((with.get(Component::Optionality).unwrap() - 0.6).abs() < 1e-9);
        // KL(0.9/0.1 ‖ 0.5/0.5)
        let expected = 0.9 * (0.9_f64 / 0.5).ln() + 0.1 * (0.1_f64 / 0.5).ln();
        assert!((with.get(Component::Fragmentation).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn huge_intro_counts_saturate_network() {
        let settings = RewardSettings::default();
        let huge = DayRecord {
            warm_intros_made: Some(3_000_000_000),
            warm_intros_received: Some(3_000_000_000),
            ..DayRecord::on(date!(2026 - 01 - 05))
        };
        let two = DayRecord {
            warm_intros_made: Some(1),
            warm_intros_received: Some(1),
            ..DayRecord::on(date!(2026 - 01 - 05))
        };
        let gn = |record: &DayRecord| {
            state_vector(record, &RewardContext::default(), &settings)
                .get(Component::Gn)
                .unwrap()
        };
        assert!((gn(&huge) - gn(&two)).abs() < 1e-12);
        assert!(gn(&huge) <= 1.0);
    }

    #[test]
    fn coherence_counts_pillars_across_window() {
        let settings = RewardSettings::default();
        let earlier = DayRecord {
            pillars_touched: Some(vec!["body".into(), "brain".into()]),
            ..DayRecord::on(date!(2026 - 01 - 03))
        };
        let mut today = full_day();
        today.pillars_touched = Some(vec!["build".into(), "body".into()]);

        let recent = [earlier];
        let ctx = RewardContext {
            projects: &[],
            recent: &recent,
        };
        let state = state_vector(&today, &ctx, &settings);
        assert_eq!(state.get(Component::Theta), Some(1.0));

        let alone = state_vector(&full_day(), &RewardContext::default(), &settings);
        assert_eq!(alone.get(Component::Theta), None);
    }

    #[test]
    fn judgment_ignores_unset_scores() {
        let settings = RewardSettings::default();
        let record = DayRecord {
            psycap_hope: Some(4.0),
            psycap_optimism: Some(0.0),
            ..DayRecord::on(date!(2026 - 01 - 05))
        };
        let state = state_vector(&record, &RewardContext::default(), &settings);
        assert!((state.get(Component::J).unwrap() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn settings_validation() {
        assert!(RewardSettings::default().validate().is_ok());
        let bad = RewardSettings {
            floor: 0.0,
            ..RewardSettings::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(EngineError::InvalidParameter { name: "floor", .. })
        ));
        let negative = RewardSettings {
            ask_quota: -1.0,
            ..RewardSettings::default()
        };
        assert!(negative.validate().is_err());
    }
}
