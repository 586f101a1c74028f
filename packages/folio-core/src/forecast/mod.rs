//! Monte Carlo price forecasting.
//!
//! Paths are driven by the historical log-return mean and volatility, nudged
//! by an EMA trend and RSI adjustment, and summarized into a mean path with
//! 50/80/90% confidence bands.

mod engine;

pub use engine::{simulation_inputs, ForecastEngine};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of simulated paths.
pub const NUM_SIMULATIONS: usize = 1000;

/// Default forecast horizon in trading days.
pub const FORECAST_DAYS: usize = 90;

/// Weight of the EMA trend strength in the adjusted drift.
pub const TREND_WEIGHT: f64 = 0.1;

/// Weight of the RSI adjustment in the adjusted drift.
pub const RSI_WEIGHT: f64 = 0.05;

/// Short EMA window for trend strength.
pub const SHORT_EMA_PERIOD: usize = 12;

/// Long EMA window for trend strength.
pub const LONG_EMA_PERIOD: usize = 26;

/// Simulation parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of independent paths
    pub simulations: usize,
    /// Days simulated past the last known price
    pub horizon_days: usize,
    /// Spread paths across the rayon thread pool
    pub parallel: bool,
    /// Seed used by [`ForecastEngine::run_seeded`]; `None` draws from OS entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            simulations: NUM_SIMULATIONS,
            horizon_days: FORECAST_DAYS,
            parallel: true,
            seed: None,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.simulations == 0 {
            return Err(Error::InvalidInput(
                "Forecast needs at least one simulation".to_string(),
            ));
        }
        if self.horizon_days == 0 {
            return Err(Error::InvalidInput(
                "Forecast horizon must be at least one day".to_string(),
            ));
        }
        Ok(())
    }
}
