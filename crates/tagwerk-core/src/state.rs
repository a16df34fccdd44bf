//! Normalized per-day state representation.
//!
//! A [`StateVector`] holds one optional value in `[0, 1]` per [`Component`].
//! An absent value means "no evidence for that day", which is different from
//! a present value of `0.0`.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Named dimension of the behavioral state, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Generative energy (sleep, training, body, nervous system).
    Ge,
    /// Intelligence growth rate.
    Gi,
    /// Value creation rate.
    Gvc,
    /// Capture ratio.
    Kappa,
    Optionality,
    /// Generative discovery.
    Gd,
    /// Network capital.
    Gn,
    /// Judgment and cognition.
    J,
    Fragmentation,
    /// Thesis coherence.
    Theta,
    /// Regulation multiplier derived from the nervous-system state.
    Gate,
}

impl Component {
    pub const COUNT: usize = 11;

    pub const ALL: [Component; Self::COUNT] = [
        Component::Ge,
        Component::Gi,
        Component::Gvc,
        Component::Kappa,
        Component::Optionality,
        Component::Gd,
        Component::Gn,
        Component::J,
        Component::Fragmentation,
        Component::Theta,
        Component::Gate,
    ];

    /// Components that enter the log-domain aggregate of the reward.
    pub const POSITIVE: [Component; 8] = [
        Component::Ge,
        Component::Gi,
        Component::Gvc,
        Component::Kappa,
        Component::Optionality,
        Component::Gd,
        Component::Gn,
        Component::J,
    ];

    /// Dimensions used for regime distance. The gate is a multiplier, not a regime axis.
    pub const REGIME: [Component; 10] = [
        Component::Ge,
        Component::Gi,
        Component::Gvc,
        Component::Kappa,
        Component::Optionality,
        Component::Gd,
        Component::Gn,
        Component::J,
        Component::Fragmentation,
        Component::Theta,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Component::Ge => "ge",
            Component::Gi => "gi",
            Component::Gvc => "gvc",
            Component::Kappa => "kappa",
            Component::Optionality => "optionality",
            Component::Gd => "gd",
            Component::Gn => "gn",
            Component::J => "j",
            Component::Fragmentation => "fragmentation",
            Component::Theta => "theta",
            Component::Gate => "gate",
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        Self::POSITIVE.contains(&self)
    }

    #[must_use]
    pub fn is_regime_dimension(self) -> bool {
        self != Component::Gate
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Component {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Component::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| EngineError::UnknownComponent(name.to_string()))
    }
}

/// Fixed-order mapping from [`Component`] to a value in `[0, 1]`.
///
/// Serialized as a JSON object containing only the present components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Component, f64>", into = "BTreeMap<Component, f64>")]
pub struct StateVector {
    values: [Option<f64>; Component::COUNT],
}

impl StateVector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, component: Component) -> Option<f64> {
        self.values[component.index()]
    }

    /// Stores `value` clamped to `[0, 1]`. Non-finite input clears the component.
    pub fn set(&mut self, component: Component, value: f64) {
        self.values[component.index()] = value.is_finite().then(|| value.clamp(0.0, 1.0));
    }

    pub fn clear(&mut self, component: Component) {
        self.values[component.index()] = None;
    }

    #[must_use]
    pub fn with(mut self, component: Component, value: f64) -> Self {
        self.set(component, value);
        self
    }

    /// Present components in fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (Component, f64)> + '_ {
        Component::ALL
            .iter()
            .filter_map(|&c| self.get(c).map(|v| (c, v)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// True if at least one positive construct carries evidence.
    #[must_use]
    pub fn has_positive_evidence(&self) -> bool {
        Component::POSITIVE.iter().any(|&c| self.get(c).is_some())
    }
}

impl From<BTreeMap<Component, f64>> for StateVector {
    fn from(map: BTreeMap<Component, f64>) -> Self {
        let mut state = StateVector::new();
        for (component, value) in map {
            state.set(component, value);
        }
        state
    }
}

impl From<StateVector> for BTreeMap<Component, f64> {
    fn from(state: StateVector) -> Self {
        state.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clamps_and_rejects_non_finite() {
        let mut s = StateVector::new();
        s.set(Component::Ge, 1.7);
        s.set(Component::Gi, -0.2);
        s.set(Component::Gvc, f64::NAN);
        assert_eq!(s.get(Component::Ge), Some(1.0));
        assert_eq!(s.get(Component::Gi), Some(0.0));
        assert_eq!(s.get(Component::Gvc), None);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn absent_and_zero_are_distinct() {
        let s = StateVector::new().with(Component::Kappa, 0.0);
        assert_eq!(s.get(Component::Kappa), Some(0.0));
        assert_eq!(s.get(Component::Gd), None);
    }

    #[test]
    fn serializes_only_present_components() {
        let s = StateVector::new()
            .with(Component::Ge, 0.5)
            .with(Component::Gate, 0.7);
        let json = serde_json::to_value(s).expect("serialize");
        assert_eq!(json, serde_json::json!({"ge": 0.5, "gate": 0.7}));

        let back: StateVector = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, s);
    }

    #[test]
    fn component_names_parse() {
        assert_eq!("kappa".parse::<Component>().ok(), Some(Component::Kappa));
        assert_eq!(" ge ".parse::<Component>().ok(), Some(Component::Ge));
        assert!(matches!(
            "sigma".parse::<Component>(),
            Err(EngineError::UnknownComponent(name)) if name == "sigma"
        ));
    }

    #[test]
    fn regime_dimensions_exclude_gate() {
        assert!(!Component::REGIME.contains(&Component::Gate));
        assert!(Component::POSITIVE.iter().all(|c| c.is_regime_dimension()));
        assert!(!Component::Fragmentation.is_positive());
    }
}
