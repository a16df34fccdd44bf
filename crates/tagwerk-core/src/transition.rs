//! Transition assembler.
//!
//! Orders scored days chronologically. Gaps stay gaps: a missing day is
//! simply absent from the sequence, never interpolated.

use crate::record::{ActionTag, DayRecord, Project};
use crate::reward::{build_state, RewardContext, RewardSettings};
use crate::state::StateVector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use time::{Date, Duration};

/// One scored day in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub date: Date,
    pub state: StateVector,
    pub actions: BTreeSet<ActionTag>,
    pub reward: f64,
    /// Set by the value estimator once a successor and value estimates exist.
    pub td_error: Option<f64>,
}

impl Transition {
    #[must_use]
    pub fn new(
        date: Date,
        state: StateVector,
        actions: impl IntoIterator<Item = ActionTag>,
        reward: f64,
    ) -> Self {
        Self {
            date,
            state,
            actions: actions.into_iter().collect(),
            reward,
            td_error: None,
        }
    }

    #[must_use]
    pub fn took(&self, action: ActionTag) -> bool {
        self.actions.contains(&action)
    }
}

/// Builds the transition sequence from raw records.
///
/// - records without a date are dropped
/// - a date seen twice keeps the later record (last write wins)
/// - undefined days are skipped, never turned into zero-reward entries
///
/// The result is strictly increasing in date. Fewer than two transitions
/// mean value estimation is unavailable; see [`crate::Computed`].
#[must_use]
pub fn assemble_transitions(
    records: &[DayRecord],
    projects: &[Project],
    settings: &RewardSettings,
) -> Vec<Transition> {
    let mut by_date: BTreeMap<Date, &DayRecord> = BTreeMap::new();
    for record in records {
        match record.date {
            Some(date) => {
                if by_date.insert(date, record).is_some() {
                    crate::debug_event!("duplicate record for {date}, keeping the later one");
                }
            }
            None => crate::warn_event!("skipping day record without a date"),
        }
    }

    let dates: Vec<Date> = by_date.keys().copied().collect();
    let days: Vec<DayRecord> = by_date.into_values().cloned().collect();
    let window = i64::from(settings.coherence_window_days.saturating_sub(1));

    let mut transitions = Vec::with_capacity(days.len());
    for (idx, (date, record)) in dates.iter().zip(&days).enumerate() {
        let window_start = date
            .checked_sub(Duration::days(window))
            .unwrap_or(Date::MIN);
        let first = dates[..idx].partition_point(|d| *d < window_start);
        let context = RewardContext {
            projects,
            recent: &days[first..idx],
        };

        match build_state(record, &context, settings) {
            Some(scored) => transitions.push(Transition::new(
                *date,
                scored.state,
                record.action_set(),
                scored.reward,
            )),
            None => crate::debug_event!("{date} has no usable data, skipped"),
        }
    }

    transitions
}
