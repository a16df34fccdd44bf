use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tagwerk_core::{Lookback, RewardSettings};
use tagwerk_policy::PolicyParams;
use tagwerk_regimes::{RegimeTable, ValueParams};

/// Every tunable of the pipeline. Missing sections fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub reward: RewardSettings,
    pub regimes: RegimeTable,
    pub value: ValueParams,
    pub policy: PolicyParams,
    /// Days of history read per run, today included.
    pub lookback_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reward: RewardSettings::default(),
            regimes: RegimeTable::default(),
            value: ValueParams::default(),
            policy: PolicyParams::default(),
            lookback_days: Lookback::DEFAULT_DAYS,
        }
    }
}

impl EngineConfig {
    /// Reads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open config {}", path.display()))?;
                serde_json::from_reader(file)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.reward.validate().context("Invalid reward settings")?;
        self.value.validate().context("Invalid value parameters")?;
        if self.lookback_days == 0 {
            anyhow::bail!("lookback_days must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, content).expect("write temp config");
        path
    }

    #[test]
    fn defaults_without_file() {
        let config = EngineConfig::load(None).expect("defaults are valid");
        assert_eq!(config.lookback_days, 90);
        assert_eq!(config.value.horizon, 7);
        assert_eq!(config.regimes.len(), 8);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let path = write_temp(
            "tagwerk_test_partial_config.json",
            r#"{"value": {"gamma": 0.8}, "lookback_days": 30}"#,
        );
        let config = EngineConfig::load(Some(&path)).expect("valid config");
        assert_eq!(config.lookback_days, 30);
        assert!((config.value.gamma - 0.8).abs() < 1e-12);
        assert_eq!(config.value.horizon, 7);
        assert_eq!(config.policy, PolicyParams::default());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let path = write_temp(
            "tagwerk_test_invalid_config.json",
            r#"{"value": {"horizon": 0}}"#,
        );
        assert!(EngineConfig::load(Some(&path)).is_err());
        let _ = std::fs::remove_file(path);

        let path = write_temp("tagwerk_test_empty_regimes.json", r#"{"regimes": []}"#);
        assert!(EngineConfig::load(Some(&path)).is_err());
        let _ = std::fs::remove_file(path);
    }
}
