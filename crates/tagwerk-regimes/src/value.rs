//! Monte-Carlo value estimation per regime and one-step TD errors.
//!
//! Nothing here learns online: every call recomputes from the full
//! transition list.

use crate::table::RegimeTable;
use serde::{Deserialize, Serialize};
use tagwerk_core::{stats, Computed, EngineError, Result, Transition};

/// Horizon, discount and confidence ramp of the estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueParams {
    /// Days summed into a forward return, today included.
    pub horizon: usize,
    /// Discount factor γ.
    pub gamma: f64,
    /// Sample size at which confidence reaches 1.0.
    pub full_confidence_samples: usize,
}

impl Default for ValueParams {
    fn default() -> Self {
        Self {
            horizon: 7,
            gamma: 0.9,
            full_confidence_samples: 10,
        }
    }
}

impl ValueParams {
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(EngineError::InvalidParameter {
                name: "horizon",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(EngineError::InvalidParameter {
                name: "gamma",
                reason: format!("must lie in [0, 1], got {}", self.gamma),
            });
        }
        if self.full_confidence_samples == 0 {
            return Err(EngineError::InvalidParameter {
                name: "full_confidence_samples",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Discounted return from one transition onwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForwardReturn {
    pub value: f64,
    /// Transitions actually summed; below the horizon near the end of history.
    pub steps: usize,
}

impl ForwardReturn {
    #[must_use]
    pub fn is_truncated(&self, params: &ValueParams) -> bool {
        self.steps < params.horizon
    }
}

/// `G_t = Σ_{k<H} γ^k · r_{t+k}` over the transitions that exist.
///
/// Near the end of the history the sum runs over the available prefix; it is
/// never padded with zeros.
#[must_use]
pub fn forward_returns(transitions: &[Transition], params: &ValueParams) -> Vec<ForwardReturn> {
    (0..transitions.len())
        .map(|t| {
            let window = &transitions[t..transitions.len().min(t.saturating_add(params.horizon))];
            let mut discount = 1.0;
            let mut value = 0.0;
            for step in window {
                value += discount * step.reward;
                discount *= params.gamma;
            }
            ForwardReturn {
                value,
                steps: window.len(),
            }
        })
        .collect()
}

/// `min(1, n / full_confidence_samples)`; zero without samples.
#[must_use]
pub fn confidence(sample_size: usize, params: &ValueParams) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let ramp = sample_size as f64 / params.full_confidence_samples.max(1) as f64;
    ramp.min(1.0)
}

/// Estimated value of one observed regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEstimate {
    pub label: String,
    /// Mean forward return of the regime's days.
    pub v: f64,
    pub confidence: f64,
    pub sample_size: usize,
    /// Members whose return was cut short by the end of the history.
    pub truncated_returns: usize,
    /// Mean share of the horizon actually observed, in `(0, 1]`.
    pub horizon_coverage: f64,
}

/// Value per observed regime, ranked by `v` (ties: larger sample first).
///
/// Regimes without members get no estimate. Fewer than two transitions
/// yield [`Computed::InsufficientHistory`].
#[must_use]
pub fn estimate_values(
    transitions: &[Transition],
    table: &RegimeTable,
    params: &ValueParams,
) -> Computed<Vec<ValueEstimate>> {
    Computed::with_history(transitions.len(), || {
        let returns = forward_returns(transitions, params);
        let mut per_regime: Vec<Vec<ForwardReturn>> = vec![Vec::new(); table.len()];
        for (transition, ret) in transitions.iter().zip(returns) {
            per_regime[table.assign(&transition.state)].push(ret);
        }

        let mut estimates: Vec<ValueEstimate> = table
            .regimes()
            .iter()
            .zip(per_regime)
            .filter_map(|(regime, rets)| {
                let values: Vec<f64> = rets.iter().map(|r| r.value).collect();
                let v = stats::mean(&values)?;
                #[allow(clippy::cast_precision_loss)]
                let coverage: Vec<f64> = rets
                    .iter()
                    .map(|r| r.steps as f64 / params.horizon.max(1) as f64)
                    .collect();
                Some(ValueEstimate {
                    label: regime.label.clone(),
                    v,
                    confidence: confidence(rets.len(), params),
                    sample_size: rets.len(),
                    truncated_returns: rets.iter().filter(|r| r.is_truncated(params)).count(),
                    horizon_coverage: stats::mean(&coverage).unwrap_or(0.0),
                })
            })
            .collect();

        estimates.sort_by(|a, b| {
            b.v.total_cmp(&a.v)
                .then_with(|| b.sample_size.cmp(&a.sample_size))
        });
        tagwerk_core::debug_event!("estimated values for {} regimes", estimates.len());
        estimates
    })
}

/// Transition annotated with its regime and TD error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeTransition {
    #[serde(flatten)]
    pub transition: Transition,
    pub regime: String,
}

/// `δ_t = r_t + γ·V(regime(t+1)) − V(regime(t))`.
///
/// The last transition has no successor and keeps `td_error = None`, as does
/// any transition whose regime (or successor's regime) has no estimate.
/// Diagnostic only; nothing is updated from it.
#[must_use]
pub fn td_errors(
    transitions: &[Transition],
    table: &RegimeTable,
    estimates: &[ValueEstimate],
    params: &ValueParams,
) -> Computed<Vec<RegimeTransition>> {
    Computed::with_history(transitions.len(), || {
        let value_of = |label: &str| estimates.iter().find(|e| e.label == label).map(|e| e.v);
        let labels: Vec<&str> = transitions
            .iter()
            .map(|t| table.label(table.assign(&t.state)).unwrap_or_default())
            .collect();

        transitions
            .iter()
            .enumerate()
            .map(|(t, transition)| {
                let td_error = transitions.get(t + 1).and_then(|_| {
                    let current = value_of(labels[t])?;
                    let next = value_of(labels[t + 1])?;
                    Some(transition.reward + params.gamma * next - current)
                });
                RegimeTransition {
                    transition: Transition {
                        td_error,
                        ..transition.clone()
                    },
                    regime: labels[t].to_string(),
                }
            })
            .collect()
    })
}
