//! Groups transitions into the regimes of a [`RegimeTable`].

use crate::table::RegimeTable;
use crate::value::{forward_returns, ValueParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tagwerk_core::{stats, Component, Computed, StateVector, Transition};
use time::Date;

/// One regime together with the days it currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub label: String,
    /// Prototype the members were matched against.
    pub reference: StateVector,
    /// Per-dimension mean over members that carry the dimension.
    pub centroid: Option<StateVector>,
    pub member_dates: BTreeSet<Date>,
    pub day_count: usize,
    pub avg_forward_return: Option<f64>,
    /// Sample standard deviation; `None` below two members.
    pub std_forward_return: Option<f64>,
    pub avg_immediate_reward: Option<f64>,
}

impl Cluster {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.day_count == 0
    }
}

/// Every regime of the table in table order, members or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCatalogue {
    pub clusters: Vec<Cluster>,
}

impl ClusterCatalogue {
    /// Non-empty clusters by average forward return, best first.
    #[must_use]
    pub fn ranked(&self) -> Vec<&Cluster> {
        let mut ranked: Vec<&Cluster> = self.clusters.iter().filter(|c| !c.is_empty()).collect();
        ranked.sort_by(|a, b| {
            let a_ret = a.avg_forward_return.unwrap_or(f64::NEG_INFINITY);
            let b_ret = b.avg_forward_return.unwrap_or(f64::NEG_INFINITY);
            b_ret
                .total_cmp(&a_ret)
                .then_with(|| b.day_count.cmp(&a.day_count))
        });
        ranked
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.label == label)
    }

    /// Cluster holding `date`, if that day was scored at all.
    #[must_use]
    pub fn cluster_of(&self, date: Date) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.member_dates.contains(&date))
    }

    #[must_use]
    pub fn total_days(&self) -> usize {
        self.clusters.iter().map(|c| c.day_count).sum()
    }
}

/// Regime index per transition, in input order.
#[must_use]
pub fn assign_regimes(transitions: &[Transition], table: &RegimeTable) -> Vec<usize> {
    transitions.iter().map(|t| table.assign(&t.state)).collect()
}

/// Partitions the history into the regimes of `table`.
///
/// Every transition lands in exactly one cluster. The result is a pure
/// function of its inputs; no randomness, no iteration.
#[must_use]
pub fn cluster_states(
    transitions: &[Transition],
    table: &RegimeTable,
    params: &ValueParams,
) -> Computed<ClusterCatalogue> {
    Computed::with_history(transitions.len(), || {
        let returns = forward_returns(transitions, params);
        let assignment = assign_regimes(transitions, table);

        let clusters = table
            .regimes()
            .iter()
            .enumerate()
            .map(|(idx, regime)| {
                let members: Vec<usize> = assignment
                    .iter()
                    .enumerate()
                    .filter(|&(_, &a)| a == idx)
                    .map(|(t, _)| t)
                    .collect();
                let forward: Vec<f64> = members.iter().map(|&t| returns[t].value).collect();
                let immediate: Vec<f64> = members.iter().map(|&t| transitions[t].reward).collect();
                let states: Vec<&StateVector> = members.iter().map(|&t| &transitions[t].state).collect();

                Cluster {
                    label: regime.label.clone(),
                    reference: regime.prototype,
                    centroid: centroid(&states),
                    member_dates: members.iter().map(|&t| transitions[t].date).collect(),
                    day_count: members.len(),
                    avg_forward_return: stats::mean(&forward),
                    std_forward_return: stats::sample_std(&forward),
                    avg_immediate_reward: stats::mean(&immediate),
                }
            })
            .collect();

        let catalogue = ClusterCatalogue { clusters };
        tagwerk_core::debug_event!(
            "clustered {} days into {} regimes",
            catalogue.total_days(),
            catalogue.ranked().len()
        );
        catalogue
    })
}

fn centroid(states: &[&StateVector]) -> Option<StateVector> {
    if states.is_empty() {
        return None;
    }
    let mut out = StateVector::new();
    for c in Component::ALL {
        let values: Vec<f64> = states.iter().filter_map(|s| s.get(c)).collect();
        if let Some(m) = stats::mean(&values) {
            out.set(c, m);
        }
    }
    Some(out)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tagwerk_core::ActionTag;
    use time::{macros::date, Duration};

    fn history(table: &RegimeTable, labels: &[(&str, f64)]) -> Vec<Transition> {
        labels
            .iter()
            .enumerate()
            .map(|(i, (label, reward))| {
                let proto = table.regimes()[table.index_of(label).unwrap()].prototype;
                Transition::new(
                    date!(2026 - 02 - 01) + Duration::days(i as i64),
                    proto,
                    [ActionTag::Explore],
                    *reward,
                )
            })
            .collect()
    }

    #[test]
    fn every_day_lands_in_one_cluster() {
        let table = RegimeTable::default();
        let ts = history(
            &table,
            &[
                ("peak_performance", 1.0),
                ("cold_start", -3.0),
                ("peak_performance", 0.5),
                ("fragmented_scattered", -1.0),
            ],
        );
        let catalogue = cluster_states(&ts, &table, &ValueParams::default())
            .ready()
            .unwrap();

        assert_eq!(catalogue.clusters.len(), table.len());
        assert_eq!(catalogue.total_days(), ts.len());
        for t in &ts {
            let holders = catalogue
                .clusters
                .iter()
                .filter(|c| c.member_dates.contains(&t.date))
                .count();
            assert_eq!(holders, 1);
        }
        assert_eq!(catalogue.ranked().len(), 3);
        assert_eq!(
            catalogue.cluster_of(date!(2026 - 02 - 02)).map(|c| c.label.as_str()),
            Some("cold_start")
        );
        assert!(catalogue.cluster_of(date!(2026 - 03 - 01)).is_none());
    }

    #[test]
    fn singleton_has_no_spread() {
        let table = RegimeTable::default();
        let ts = history(&table, &[("cold_start", -2.0), ("peak_performance", 2.0)]);
        let catalogue = cluster_states(&ts, &table, &ValueParams::default())
            .ready()
            .unwrap();
        let peak = catalogue.get("peak_performance").unwrap();
        assert_eq!(peak.day_count, 1);
        assert!(peak.avg_forward_return.is_some());
        assert_eq!(peak.std_forward_return, None);
        assert_eq!(peak.avg_immediate_reward, Some(2.0));

        let empty = catalogue.get("balanced_steady").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.centroid, None);
        assert_eq!(empty.avg_forward_return, None);
    }

    #[test]
    fn ranked_by_forward_return() {
        let table = RegimeTable::default();
        let ts = history(
            &table,
            &[
                ("cold_start", -2.0),
                ("peak_performance", 3.0),
                ("cold_start", -2.0),
                ("peak_performance", 3.0),
            ],
        );
        let catalogue = cluster_states(&ts, &table, &ValueParams::default())
            .ready()
            .unwrap();
        let ranked: Vec<&str> = catalogue.ranked().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(ranked, vec!["peak_performance", "cold_start"]);
        assert!(catalogue.get("cold_start").unwrap().std_forward_return.is_some());
    }

    #[test]
    fn centroid_ignores_missing_dimensions() {
        let a = StateVector::new().with(Component::Ge, 0.2);
        let b = StateVector::new()
            .with(Component::Ge, 0.4)
            .with(Component::Gi, 0.9);
        let c = centroid(&[&a, &b]).unwrap();
        assert!((c.get(Component::Ge).unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(c.get(Component::Gi), Some(0.9));
        assert_eq!(c.get(Component::Gd), None);
    }

    #[test]
    fn clustering_is_deterministic_and_needs_history() {
        let table = RegimeTable::default();
        let ts = history(&table, &[("revenue_hunting", 0.4), ("balanced_steady", 0.1)]);
        let params = ValueParams::default();
        assert_eq!(
            cluster_states(&ts, &table, &params),
            cluster_states(&ts, &table, &params)
        );
        assert!(!cluster_states(&ts[..1], &table, &params).is_ready());
    }
}
