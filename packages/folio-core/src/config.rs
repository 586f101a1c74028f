//! Engine configuration and persistence.

use crate::allocation::{AllocationConfig, UnallocatedPolicy};
use crate::forecast::ForecastConfig;
use crate::metrics::RISK_FREE_RATE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_FILE_ENV: &str = "FOLIO_CONFIG_FILE";

/// Tunable parameters shared by the metrics, forecast and allocation stages.
///
/// Every field has a default, so a partial JSON file is valid:
///
/// ```json
/// { "risk_free_rate": 4.0, "forecast": { "simulations": 5000 } }
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FolioConfig {
    /// Annual risk-free rate in percent
    pub risk_free_rate: f64,
    pub forecast: ForecastConfig,
    /// Handling of categories left without a viable instrument
    pub unallocated: UnallocatedPolicy,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: RISK_FREE_RATE,
            forecast: ForecastConfig::default(),
            unallocated: UnallocatedPolicy::default(),
        }
    }
}

impl FolioConfig {
    /// Load from the default path.
    ///
    /// Default path: `~/.folio/config.json`
    /// Can be overridden with `FOLIO_CONFIG_FILE` environment variable.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_FILE_ENV) {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".folio/config.json"))
            .unwrap_or_else(|| PathBuf::from("folio.json"))
    }

    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(Error::InvalidInput(format!(
                "Risk-free rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        self.forecast.validate()
    }

    /// Parameters for the allocation optimizer.
    pub fn allocation(&self) -> AllocationConfig {
        AllocationConfig {
            risk_free_rate: self.risk_free_rate,
            unallocated: self.unallocated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FolioConfig::default();
        assert_eq!(config.risk_free_rate, 4.5);
        assert_eq!(config.forecast.simulations, 1000);
        assert_eq!(config.forecast.horizon_days, 90);
        assert_eq!(config.unallocated, UnallocatedPolicy::Drop);
        assert_eq!(config.allocation(), AllocationConfig::default());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FolioConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, FolioConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");

        let mut config = FolioConfig::default();
        config.risk_free_rate = 3.25;
        config.forecast.seed = Some(42);
        config.unallocated = UnallocatedPolicy::Redistribute;
        config.save_to_path(&path).unwrap();

        let loaded = FolioConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.allocation().risk_free_rate, 3.25);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"forecast": {"simulations": 200, "parallel": false}}"#).unwrap();

        let config = FolioConfig::load_from_path(&path).unwrap();
        assert_eq!(config.forecast.simulations, 200);
        assert!(!config.forecast.parallel);
        assert_eq!(config.forecast.horizon_days, 90);
        assert_eq!(config.risk_free_rate, 4.5);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"forecast": {"horizon_days": 0}}"#).unwrap();

        assert!(matches!(
            FolioConfig::load_from_path(&path),
            Err(Error::InvalidInput(_))
        ));
    }
}
