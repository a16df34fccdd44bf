//! Standing regime prototypes.
//!
//! Regimes are not learned per run. Each one is a hand-designed reference
//! [`StateVector`] and days go to the nearest prototype. The table is plain
//! configuration and can be replaced from JSON without code changes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tagwerk_core::{Component, EngineError, Result, StateVector};

/// One canonical behavioral regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRegime")]
pub struct Regime {
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Reference point over every regime dimension (no gate).
    pub prototype: StateVector,
}

/// Configured regime before range checks; [`StateVector`] would clamp.
#[derive(Deserialize)]
struct RawRegime {
    label: String,
    #[serde(default)]
    description: String,
    prototype: BTreeMap<Component, f64>,
}

impl TryFrom<RawRegime> for Regime {
    type Error = EngineError;

    fn try_from(raw: RawRegime) -> Result<Self> {
        if let Some((component, value)) = raw
            .prototype
            .iter()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(EngineError::InvalidRegimeTable(format!(
                "regime '{}': {component} = {value} lies outside [0, 1]",
                raw.label
            )));
        }
        Ok(Self {
            label: raw.label,
            description: raw.description,
            prototype: StateVector::from(raw.prototype),
        })
    }
}

/// Ordered, validated list of regimes. Earlier entries win distance ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Regime>", into = "Vec<Regime>")]
pub struct RegimeTable {
    regimes: Vec<Regime>,
}

impl RegimeTable {
    pub fn new(regimes: Vec<Regime>) -> Result<Self> {
        validate(&regimes)?;
        Ok(Self { regimes })
    }

    /// Parses and validates a JSON array of regimes.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<RawRegime> = serde_json::from_str(json)?;
        let regimes = raw
            .into_iter()
            .map(Regime::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(regimes)
    }

    #[must_use]
    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regimes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regimes.is_empty()
    }

    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.regimes.get(index).map(|r| r.label.as_str())
    }

    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.regimes.iter().position(|r| r.label == label)
    }

    /// Index of the nearest prototype.
    ///
    /// Euclidean distance over the regime dimensions present in `state`.
    /// A state without any regime dimension is equidistant to all
    /// prototypes and lands in the first one.
    #[must_use]
    pub fn assign(&self, state: &StateVector) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (idx, regime) in self.regimes.iter().enumerate() {
            let d = distance(state, &regime.prototype);
            if d < best_distance {
                best = idx;
                best_distance = d;
            }
        }
        best
    }
}

impl TryFrom<Vec<Regime>> for RegimeTable {
    type Error = EngineError;

    fn try_from(regimes: Vec<Regime>) -> Result<Self> {
        Self::new(regimes)
    }
}

impl From<RegimeTable> for Vec<Regime> {
    fn from(table: RegimeTable) -> Self {
        table.regimes
    }
}

fn validate(regimes: &[Regime]) -> Result<()> {
    if regimes.is_empty() {
        return Err(EngineError::InvalidRegimeTable(
            "at least one regime is required".to_string(),
        ));
    }
    let mut seen = BTreeSet::new();
    for regime in regimes {
        if regime.label.trim().is_empty() {
            return Err(EngineError::InvalidRegimeTable(
                "regime label must not be empty".to_string(),
            ));
        }
        if !seen.insert(regime.label.as_str()) {
            return Err(EngineError::InvalidRegimeTable(format!(
                "duplicate regime label '{}'",
                regime.label
            )));
        }
        if regime.prototype.get(Component::Gate).is_some() {
            return Err(EngineError::InvalidRegimeTable(format!(
                "regime '{}' must not define the gate",
                regime.label
            )));
        }
        if let Some(missing) = Component::REGIME
            .iter()
            .find(|&&c| regime.prototype.get(c).is_none())
        {
            return Err(EngineError::InvalidRegimeTable(format!(
                "regime '{}' lacks component '{missing}'",
                regime.label
            )));
        }
    }
    Ok(())
}

fn distance(state: &StateVector, prototype: &StateVector) -> f64 {
    Component::REGIME
        .iter()
        .filter_map(|&c| Some((state.get(c)? - prototype.get(c)?).powi(2)))
        .sum::<f64>()
        .sqrt()
}

fn prototype(values: [f64; 10]) -> StateVector {
    Component::REGIME
        .iter()
        .zip(values)
        .fold(StateVector::new(), |s, (&c, v)| s.with(c, v))
}

fn regime(label: &str, description: &str, values: [f64; 10]) -> Regime {
    Regime {
        label: label.to_string(),
        description: description.to_string(),
        prototype: prototype(values),
    }
}

impl Default for RegimeTable {
    /// Columns: ge, gi, gvc, kappa, optionality, gd, gn, j, fragmentation, theta.
    fn default() -> Self {
        let regimes = vec![
            regime(
                "peak_performance",
                "All systems firing. Rare and valuable state.",
                [0.85, 0.85, 0.85, 0.85, 0.8, 0.85, 0.85, 0.85, 0.1, 0.9],
            ),
            regime(
                "high_energy_shipping",
                "Strong energy and active output.",
                [0.85, 0.5, 0.85, 0.5, 0.5, 0.4, 0.4, 0.7, 0.2, 0.6],
            ),
            regime(
                "intelligence_gathering",
                "Discovery mode. High signal intake and problem detection.",
                [0.6, 0.85, 0.4, 0.3, 0.5, 0.85, 0.6, 0.65, 0.3, 0.6],
            ),
            regime(
                "revenue_hunting",
                "Capture-focused. Active asks and network engagement.",
                [0.6, 0.4, 0.5, 0.85, 0.5, 0.5, 0.75, 0.65, 0.25, 0.5],
            ),
            regime(
                "balanced_steady",
                "All components moderate. Stable but not peaking.",
                [0.55, 0.55, 0.55, 0.55, 0.55, 0.55, 0.55, 0.55, 0.3, 0.5],
            ),
            regime(
                "low_energy_recovery",
                "Energy depleted. Regulate, don't push.",
                [0.25, 0.35, 0.3, 0.3, 0.5, 0.3, 0.3, 0.5, 0.3, 0.4],
            ),
            regime(
                "fragmented_scattered",
                "No dominant signal. Attention spread thin.",
                [0.5, 0.3, 0.25, 0.25, 0.4, 0.3, 0.3, 0.45, 0.8, 0.2],
            ),
            regime(
                "cold_start",
                "Most components near floor.",
                [0.15, 0.1, 0.1, 0.1, 0.3, 0.1, 0.1, 0.2, 0.0, 0.0],
            ),
        ];
        Self { regimes }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        let table = RegimeTable::default();
        assert!(validate(table.regimes()).is_ok());
        assert_eq!(table.len(), 8);
        assert_eq!(table.label(0), Some("peak_performance"));
    }

    #[test]
    fn prototypes_assign_to_themselves() {
        let table = RegimeTable::default();
        for (idx, regime) in table.regimes().iter().enumerate() {
            assert_eq!(table.assign(&regime.prototype), idx, "{}", regime.label);
        }
    }

    #[test]
    fn gate_does_not_move_assignment() {
        let table = RegimeTable::default();
        let state = table.regimes()[1].prototype;
        assert_eq!(table.assign(&state.with(Component::Gate, 0.2)), 1);
    }

    #[test]
    fn partial_state_uses_present_dimensions() {
        let table = RegimeTable::default();
        let depleted = StateVector::new().with(Component::Ge, 0.24);
        assert_eq!(table.label(table.assign(&depleted)), Some("low_energy_recovery"));
    }

    #[test]
    fn roundtrips_through_json_and_validates() {
        let table = RegimeTable::default();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(RegimeTable::from_json(&json).unwrap(), table);

        let duplicate = format!(
            "[{r},{r}]",
            r = serde_json::to_string(&table.regimes()[0]).unwrap()
        );
        assert!(matches!(
            RegimeTable::from_json(&duplicate),
            Err(EngineError::InvalidRegimeTable(_))
        ));

        let incomplete = r#"[{"label": "thin", "prototype": {"ge": 0.5}}]"#;
        assert!(RegimeTable::from_json(incomplete).is_err());
        assert!(serde_json::from_str::<RegimeTable>("[]").is_err());
    }

    #[test]
    fn out_of_range_prototypes_are_rejected() {
        let table = RegimeTable::default();
        let mut regime = serde_json::to_value(&table.regimes()[0]).unwrap();
        for bad in [1.7, -0.2] {
            regime["prototype"]["ge"] = serde_json::json!(bad);
            let json = serde_json::Value::Array(vec![regime.clone()]).to_string();
            let err = RegimeTable::from_json(&json).unwrap_err();
            assert!(matches!(err, EngineError::InvalidRegimeTable(_)), "{err}");
            assert!(serde_json::from_str::<RegimeTable>(&json).is_err());
        }
        regime["prototype"]["ge"] = serde_json::json!(1.0);
        let json = serde_json::Value::Array(vec![regime]).to_string();
        assert!(RegimeTable::from_json(&json).is_ok());
    }
}
