//! Descriptive statistics over a transition window.

use serde::{Deserialize, Serialize};
use tagwerk_core::{stats, ActionTag, Component, Transition};

/// Mean below which a component is considered stuck at its floor.
const FLOOR_MEAN: f64 = 0.15;
/// Mean above which a component is considered saturated.
const CEILING_MEAN: f64 = 0.85;
/// Population standard deviation above which a component is flagged volatile.
const VOLATILE_STD: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStats {
    pub action: ActionTag,
    pub days_taken: usize,
    /// `None` when the action was never taken.
    pub avg_reward: Option<f64>,
}

/// One entry per [`ActionTag`], in declaration order.
#[must_use]
pub fn action_stats(transitions: &[Transition]) -> Vec<ActionStats> {
    ActionTag::ALL
        .into_iter()
        .map(|action| {
            let rewards: Vec<f64> = transitions
                .iter()
                .filter(|t| t.took(action))
                .map(|t| t.reward)
                .collect();
            ActionStats {
                action,
                days_taken: rewards.len(),
                avg_reward: stats::mean(&rewards),
            }
        })
        .collect()
}

/// Share of days that included [`ActionTag::Explore`].
#[must_use]
pub fn exploration_ratio(transitions: &[Transition]) -> Option<f64> {
    if transitions.is_empty() {
        return None;
    }
    let explored = transitions.iter().filter(|t| t.took(ActionTag::Explore)).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = explored as f64 / transitions.len() as f64;
    Some(ratio)
}

/// Distribution of one state component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentStats {
    pub component: Component,
    /// Days on which the component was present.
    pub samples: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub at_floor: bool,
    pub at_ceiling: bool,
    pub volatile: bool,
}

/// Statistics for every non-gate component that has at least one value.
#[must_use]
pub fn component_stats(transitions: &[Transition]) -> Vec<ComponentStats> {
    Component::REGIME
        .into_iter()
        .filter_map(|component| {
            let values: Vec<f64> = transitions
                .iter()
                .filter_map(|t| t.state.get(component))
                .collect();
            let mean = stats::mean(&values)?;
            let std = stats::population_std(&values)?;
            Some(ComponentStats {
                component,
                samples: values.len(),
                mean,
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                std,
                at_floor: mean < FLOOR_MEAN,
                at_ceiling: mean > CEILING_MEAN,
                volatile: std > VOLATILE_STD,
            })
        })
        .collect()
}
