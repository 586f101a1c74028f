//! Technical indicators for price analysis.
//!
//! - **SMA**: Simple Moving Average
//! - **EMA**: Exponential Moving Average
//! - **RSI**: Relative Strength Index
//!
//! Every window function fails with [`Error::InsufficientData`] when the
//! series is shorter than its window; none of them pads its output.

mod rsi;
mod sma;

pub use rsi::{latest_rsi, rsi, DEFAULT_RSI_PERIOD};
pub use sma::{ema, moving_average};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Window lengths for [`compute_indicators`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_period: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_period: 50,
            ema_period: 12,
            rsi_period: DEFAULT_RSI_PERIOD,
        }
    }
}

/// Indicator series computed from one price history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Indicators {
    pub sma: Vec<f64>,
    pub ema: Vec<f64>,
    pub rsi: Vec<f64>,
}

/// Compute SMA, EMA and RSI in one pass over the parameters.
pub fn compute_indicators(prices: &[f64], params: &IndicatorParams) -> Result<Indicators> {
    Ok(Indicators {
        sma: moving_average(prices, params.sma_period)?,
        ema: ema(prices, params.ema_period)?,
        rsi: rsi(prices, params.rsi_period)?,
    })
}

pub(crate) fn check_period(period: usize) -> Result<()> {
    if period == 0 {
        return Err(Error::InvalidInput(
            "Indicator period must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_window(len: usize, required: usize, what: &str) -> Result<()> {
    if len < required {
        return Err(Error::InsufficientData(format!(
            "{} needs at least {} prices, got {}",
            what, required, len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn test_compute_indicators_lengths() {
        let prices = wave(80);
        let indicators = compute_indicators(&prices, &IndicatorParams::default()).unwrap();

        assert_eq!(indicators.sma.len(), 80 - 50 + 1);
        assert_eq!(indicators.ema.len(), 80);
        assert_eq!(indicators.rsi.len(), 80 - 14);
    }

    #[test]
    fn test_compute_indicators_short_series() {
        // Two points cannot feed any 14+ window
        let prices = vec![100.0, 101.0];
        let params = IndicatorParams {
            sma_period: 14,
            ema_period: 12,
            rsi_period: 14,
        };

        assert!(matches!(
            compute_indicators(&prices, &params),
            Err(Error::InsufficientData(_))
        ));
        assert!(matches!(rsi(&prices, 14), Err(Error::InsufficientData(_))));
        assert!(matches!(
            moving_average(&prices, 14),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_params_default_from_partial_json() {
        let params: IndicatorParams = serde_json::from_str(r#"{"sma_period": 20}"#).unwrap();
        assert_eq!(params.sma_period, 20);
        assert_eq!(params.ema_period, 12);
        assert_eq!(params.rsi_period, 14);
    }
}
