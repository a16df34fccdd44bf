#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Kerntypen von tagwerk.
//!
//! Aus Tagesprotokollen ([`DayRecord`]) entstehen normalisierte Zustände
//! ([`StateVector`]), ein skalarer Reward und daraus eine chronologische
//! Folge von [`Transition`]s. Alle Funktionen sind rein: gleiche Eingaben
//! liefern gleiche Ausgaben, es gibt weder I/O noch eine implizite Uhrzeit.

pub mod error;
pub mod record;
pub mod reward;
pub mod state;
pub mod stats;
pub mod transition;

pub use error::{EngineError, Result};
pub use record::{ActionTag, DayRecord, NervousSystemState, Project, ProjectStatus};
pub use reward::{build_state, reward_for, RewardContext, RewardSettings, ScoredDay};
pub use state::{Component, StateVector};
pub use transition::{assemble_transitions, Transition};

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

/// Mindestlänge der Historie für Wertschätzung, TD-Fehler und Streuung.
pub const MIN_HISTORY: usize = 2;

#[cfg(feature = "telemetry")]
#[doc(hidden)]
pub use tracing as __tracing;

/// Warnung über `tracing` (Feature `telemetry`) oder `eprintln!`.
#[cfg(feature = "telemetry")]
#[macro_export]
macro_rules! warn_event {
    ($($arg:tt)*) => { $crate::__tracing::warn!($($arg)*) };
}

/// Warnung über `tracing` (Feature `telemetry`) oder `eprintln!`.
#[cfg(not(feature = "telemetry"))]
#[macro_export]
macro_rules! warn_event {
    ($($arg:tt)*) => { eprintln!("warning: {}", format_args!($($arg)*)) };
}

/// Debug-Ereignis; ohne `telemetry` entfällt es vollständig.
#[cfg(feature = "telemetry")]
#[macro_export]
macro_rules! debug_event {
    ($($arg:tt)*) => { $crate::__tracing::debug!($($arg)*) };
}

/// Debug-Ereignis; ohne `telemetry` entfällt es vollständig.
#[cfg(not(feature = "telemetry"))]
#[macro_export]
macro_rules! debug_event {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::std::format!($($arg)*);
        }
    }};
}

/// Ergebnis einer Berechnung, die eine Mindesthistorie braucht.
///
/// `InsufficientHistory` ist kein Fehler, sondern der erwartete Zustand einer
/// jungen oder lückenhaften Historie. Aufrufer zeigen dann einen neutralen
/// „noch nicht genug Daten“-Zustand an.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Computed<T> {
    Ready(T),
    InsufficientHistory { available: usize, required: usize },
}

impl<T> Computed<T> {
    /// `Ready(f())`, falls mindestens [`MIN_HISTORY`] Einträge vorliegen.
    pub fn with_history(available: usize, f: impl FnOnce() -> T) -> Self {
        if available < MIN_HISTORY {
            Computed::InsufficientHistory {
                available,
                required: MIN_HISTORY,
            }
        } else {
            Computed::Ready(f())
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Computed::Ready(_))
    }

    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Computed::Ready(value) => Some(value),
            Computed::InsufficientHistory { .. } => None,
        }
    }

    #[must_use]
    pub fn as_ref(&self) -> Computed<&T> {
        match self {
            Computed::Ready(value) => Computed::Ready(value),
            Computed::InsufficientHistory {
                available,
                required,
            } => Computed::InsufficientHistory {
                available: *available,
                required: *required,
            },
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Computed<U> {
        match self {
            Computed::Ready(value) => Computed::Ready(f(value)),
            Computed::InsufficientHistory {
                available,
                required,
            } => Computed::InsufficientHistory {
                available,
                required,
            },
        }
    }
}

/// Rückblickfenster `[today - days + 1, today]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookback {
    pub today: Date,
    pub days: u32,
}

impl Lookback {
    pub const DEFAULT_DAYS: u32 = 90;

    #[must_use]
    pub fn new(today: Date, days: u32) -> Self {
        Self { today, days }
    }

    /// Erster Tag im Fenster.
    #[must_use]
    pub fn start(&self) -> Date {
        self.today
            .checked_sub(Duration::days(i64::from(self.days.saturating_sub(1))))
            .unwrap_or(Date::MIN)
    }

    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.days > 0 && date >= self.start() && date <= self.today
    }
}

/// Liefert die Tagesprotokolle genau einer Person.
///
/// Die Engine filtert nie nach Person; das ist Aufgabe der Quelle.
pub trait RecordSource {
    fn records(&self, window: &Lookback) -> Result<Vec<DayRecord>>;
}
