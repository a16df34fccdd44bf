//! File-backed collaborators: day records as JSONL, rules and projects as
//! JSON arrays.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tagwerk_core::{DayRecord, EngineError, Lookback, Project, RecordSource, Result};
use tagwerk_policy::{PolicyRule, RuleSource};

/// One JSON object per line, as exported by the dashboard.
pub struct JsonlRecords {
    path: PathBuf,
}

impl JsonlRecords {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonlRecords {
    /// Records inside the window. Undated records are passed through so the
    /// assembler can report them.
    fn records(&self, window: &Lookback) -> Result<Vec<DayRecord>> {
        let file = File::open(&self.path).map_err(|e| {
            EngineError::Source(format!("failed to open {}: {e}", self.path.display()))
        })?;
        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                EngineError::Source(format!("{}:{}: {e}", self.path.display(), idx + 1))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: DayRecord = serde_json::from_str(&line).map_err(|e| {
                EngineError::Source(format!("{}:{}: {e}", self.path.display(), idx + 1))
            })?;
            if record.date.map_or(true, |date| window.contains(date)) {
                records.push(record);
            }
        }
        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "read day records"
        );
        Ok(records)
    }
}

/// Rules from a JSON array; no file means no rules.
pub struct JsonRules {
    path: Option<PathBuf>,
}

impl JsonRules {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl RuleSource for JsonRules {
    fn rules(&self) -> Result<Vec<PolicyRule>> {
        match &self.path {
            Some(path) => read_json_array(path),
            None => Ok(Vec::new()),
        }
    }
}

pub fn load_projects(path: Option<&Path>) -> Result<Vec<Project>> {
    path.map_or_else(|| Ok(Vec::new()), read_json_array)
}

fn read_json_array<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)
        .map_err(|e| EngineError::Source(format!("failed to open {}: {e}", path.display())))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
