//! Rohdaten eines Tages, wie sie vom externen Speicher geliefert werden.
//!
//! Jedes Verhaltensfeld ist optional. Ein fehlendes Feld bedeutet „nicht
//! erfasst“ und ist damit klar von einem erfassten Wert `0` unterscheidbar.
//! Das Modul definiert außerdem die Aktions-Tags und das Projektportfolio,
//! aus dem Optionalität und Fragmentierung berechnet werden.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use time::Date;

/// Handlungstyp, den ein Tag für sich beansprucht.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTag {
    Ship,
    Ask,
    Signal,
    Regulate,
    Explore,
    Compound,
}

impl ActionTag {
    pub const ALL: [ActionTag; 6] = [
        ActionTag::Ship,
        ActionTag::Ask,
        ActionTag::Signal,
        ActionTag::Regulate,
        ActionTag::Explore,
        ActionTag::Compound,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionTag::Ship => "ship",
            ActionTag::Ask => "ask",
            ActionTag::Signal => "signal",
            ActionTag::Regulate => "regulate",
            ActionTag::Explore => "explore",
            ActionTag::Compound => "compound",
        }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zustand des Nervensystems; steuert den Gate-Multiplikator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NervousSystemState {
    Regulated,
    SlightlySpiked,
    Spiked,
    Sick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingType {
    Strength,
    Yoga,
    Vo2,
    Zone2,
    Rest,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyFelt {
    Open,
    Neutral,
    Tense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueStreamType {
    Recurring,
    OneTime,
    Organic,
}

/// Ein Tagesprotokoll. Genau ein Datensatz pro Kalendertag und Person.
///
/// Die Struktur entspricht dem Export des Dashboards (JSON, ein Objekt pro
/// Zeile). Unbekannte Felder werden beim Einlesen ignoriert.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DayRecord {
    /// Kalendertag im Format `YYYY-MM-DD`.
    pub date: Option<Date>,

    // Energie
    pub sleep_hours: Option<f64>,
    pub training_types: Option<Vec<TrainingType>>,
    pub body_felt: Option<BodyFelt>,
    pub nervous_system_state: Option<NervousSystemState>,

    // Erkenntnis
    /// Anzahl der heute notierten Probleme.
    pub problems_detected: Option<u32>,
    /// Ob eines davon zum Testen ausgewählt wurde.
    pub problem_selected: Option<bool>,

    // Wertschöpfung
    pub what_shipped: Option<String>,
    pub public_iteration: Option<bool>,
    pub focus_hours_actual: Option<f64>,
    pub speed_over_perfection: Option<bool>,
    pub days_since_last_output: Option<u32>,

    // Umsatz
    pub revenue_asks_count: Option<u32>,
    pub revenue_this_session: Option<f64>,
    pub revenue_stream_type: Option<RevenueStreamType>,
    pub feedback_loop_closed: Option<bool>,

    // Entdeckung und Netzwerk
    pub discovery_conversations_count: Option<u32>,
    pub external_signals_reviewed: Option<u32>,
    pub insights_extracted: Option<u32>,
    pub warm_intros_made: Option<u32>,
    pub warm_intros_received: Option<u32>,
    pub meetings_booked: Option<u32>,
    pub public_posts_count: Option<u32>,

    // Urteilsvermögen (PsyCap, Skala 1–5)
    pub psycap_hope: Option<f64>,
    pub psycap_efficacy: Option<f64>,
    pub psycap_resilience: Option<f64>,
    pub psycap_optimism: Option<f64>,

    // Fokus und These
    pub spine_project: Option<String>,
    pub pillars_touched: Option<Vec<String>>,

    /// Am Tag gewählte Aktionen.
    pub actions: Option<BTreeSet<ActionTag>>,
}

impl DayRecord {
    /// Leerer Datensatz für `date`.
    #[must_use]
    pub fn on(date: Date) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    /// `true`, wenn kein einziges Verhaltensfeld erfasst wurde.
    ///
    /// Aktionen allein zählen nicht als Protokoll: ohne Messwerte gibt es
    /// keinen Zustand, dem sie zugeordnet werden könnten.
    #[must_use]
    pub fn is_unlogged(&self) -> bool {
        let numbers = [
            self.sleep_hours,
            self.focus_hours_actual,
            self.revenue_this_session,
            self.psycap_hope,
            self.psycap_efficacy,
            self.psycap_resilience,
            self.psycap_optimism,
        ];
        let counts = [
            self.problems_detected,
            self.days_since_last_output,
            self.revenue_asks_count,
            self.discovery_conversations_count,
            self.external_signals_reviewed,
            self.insights_extracted,
            self.warm_intros_made,
            self.warm_intros_received,
            self.meetings_booked,
            self.public_posts_count,
        ];
        let flags = [
            self.problem_selected,
            self.public_iteration,
            self.speed_over_perfection,
            self.feedback_loop_closed,
        ];

        numbers.iter().all(Option::is_none)
            && counts.iter().all(Option::is_none)
            && flags.iter().all(Option::is_none)
            && self.training_types.is_none()
            && self.body_felt.is_none()
            && self.nervous_system_state.is_none()
            && self.what_shipped.is_none()
            && self.revenue_stream_type.is_none()
            && self.spine_project.is_none()
            && self.pillars_touched.is_none()
    }

    /// Gewählte Aktionen; leer, wenn keine erfasst wurden.
    #[must_use]
    pub fn action_set(&self) -> BTreeSet<ActionTag> {
        self.actions.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Spine,
    PreLaunch,
    Backup,
    Optionality,
    Archived,
}

/// Projekt im Portfolio mit seinem geplanten Zeitanteil (Prozent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
    pub time_allocation_percent: f64,
}

impl Project {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != ProjectStatus::Archived
    }
}
