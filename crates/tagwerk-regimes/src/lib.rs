#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Regime-Zuordnung und Wertschätzung.
//!
//! Jeder Tag wird dem nächstgelegenen Prototyp einer festen
//! [`RegimeTable`] zugeordnet. Pro Regime schätzt [`estimate_values`] den
//! mittleren diskontierten Ertrag der folgenden Tage; [`td_errors`] zeigt,
//! wo die Schätzung von der beobachteten Folge abweicht.

pub mod cluster;
pub mod table;
pub mod value;

pub use cluster::{assign_regimes, cluster_states, Cluster, ClusterCatalogue};
pub use table::{Regime, RegimeTable};
pub use value::{
    confidence, estimate_values, forward_returns, td_errors, ForwardReturn, RegimeTransition,
    ValueEstimate, ValueParams,
};
