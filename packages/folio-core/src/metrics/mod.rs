//! Asset risk/return metrics.
//!
//! Converts closing-price histories into annualized expected return,
//! volatility and Sharpe ratio, and ranks instruments of a category by
//! risk-adjusted return.

mod provider;

pub use provider::{InMemoryProvider, InstrumentHistory, MetricsProvider};

use crate::types::{AssetCategory, AssetMetrics, ExcludedInstrument};
use crate::{Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Annual risk-free rate in percent (10-year Treasury yield).
pub const RISK_FREE_RATE: f64 = 4.5;

/// Trading days per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Reject series that cannot produce returns.
pub(crate) fn validate_prices(prices: &[f64]) -> Result<()> {
    if prices.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "Need at least 2 prices, got {}",
            prices.len()
        )));
    }
    if let Some((idx, price)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
        return Err(Error::InvalidInput(format!(
            "Price at index {} must be positive and finite, got {}",
            idx, price
        )));
    }
    Ok(())
}

/// Simple period returns: `p[i+1] / p[i] - 1`.
pub fn simple_returns(prices: &[f64]) -> Result<Vec<f64>> {
    validate_prices(prices)?;
    Ok(prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect())
}

/// Logarithmic period returns: `ln(p[i+1] / p[i])`.
pub fn log_returns(prices: &[f64]) -> Result<Vec<f64>> {
    validate_prices(prices)?;
    Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Population mean and standard deviation.
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Compute annualized metrics for one instrument.
///
/// # Arguments
///
/// * `symbol` - Ticker symbol
/// * `name` - Display name; `None` or blank falls back to the symbol
/// * `prices` - Daily closes, oldest first (a year of history recommended)
/// * `risk_free_rate` - Annual risk-free rate in percent
///
/// # Errors
///
/// [`Error::DegenerateStatistics`] when the returns have zero volatility,
/// since the Sharpe ratio is then undefined.
///
/// # Example
///
/// ```rust
/// use folio_core::metrics::{compute_asset_metrics, RISK_FREE_RATE};
///
/// let prices = vec![100.0, 101.0, 100.5, 102.0, 103.0, 102.5];
/// let metrics = compute_asset_metrics("TEST", None, &prices, RISK_FREE_RATE).unwrap();
///
/// assert_eq!(metrics.name, "TEST");
/// assert!(metrics.volatility > 0.0);
/// ```
pub fn compute_asset_metrics(
    symbol: &str,
    name: Option<&str>,
    prices: &[f64],
    risk_free_rate: f64,
) -> Result<AssetMetrics> {
    let returns = simple_returns(prices)?;
    let n = returns.len() as f64;

    let expected_return = returns.iter().sum::<f64>() / n * TRADING_DAYS * 100.0;

    // Deviation centre is the per-period equivalent of the annualized mean
    let center = expected_return / TRADING_DAYS / 100.0;
    let variance = returns.iter().map(|r| (r - center).powi(2)).sum::<f64>() / n;
    let volatility = variance.sqrt() * TRADING_DAYS.sqrt() * 100.0;

    if volatility <= 0.0 {
        return Err(Error::DegenerateStatistics(format!(
            "{} has zero volatility; Sharpe ratio undefined",
            symbol
        )));
    }

    let sharpe_ratio = (expected_return - risk_free_rate) / volatility;
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(symbol)
        .to_string();

    debug!(
        symbol,
        expected_return, volatility, sharpe_ratio, "computed asset metrics"
    );

    Ok(AssetMetrics {
        symbol: symbol.to_string(),
        name,
        expected_return,
        volatility,
        sharpe_ratio,
    })
}

/// Instruments of one category ranked by descending Sharpe ratio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCategory {
    pub category: AssetCategory,
    pub ranked: Vec<AssetMetrics>,
    /// Instruments whose metrics could not be computed
    pub excluded: Vec<ExcludedInstrument>,
}

/// Ranked categories keyed by category.
pub type RankedUniverse = BTreeMap<AssetCategory, RankedCategory>;

/// Sort metrics by descending Sharpe ratio (stable for ties).
pub fn rank_by_sharpe(metrics: &mut [AssetMetrics]) {
    metrics.sort_by(|a, b| b.sharpe_ratio.total_cmp(&a.sharpe_ratio));
}

/// Computes metrics through a [`MetricsProvider`].
#[derive(Debug, Clone)]
pub struct MetricsCalculator<P> {
    provider: P,
    risk_free_rate: f64,
}

impl<P: MetricsProvider> MetricsCalculator<P> {
    /// Create a calculator using [`RISK_FREE_RATE`].
    pub fn new(provider: P) -> Self {
        Self::with_risk_free_rate(provider, RISK_FREE_RATE)
    }

    pub fn with_risk_free_rate(provider: P, risk_free_rate: f64) -> Self {
        Self {
            provider,
            risk_free_rate,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Fetch a history and compute its metrics.
    pub fn metrics_for(&self, symbol: &str) -> Result<AssetMetrics> {
        let prices = self.provider.price_history(symbol)?;
        let name = self.provider.display_name(symbol);
        compute_asset_metrics(symbol, name.as_deref(), &prices, self.risk_free_rate)
    }

    /// Compute every instrument of a category concurrently and rank them.
    ///
    /// A failing instrument is excluded with a warning; it never aborts the
    /// ranking of the others.
    pub fn rank_category<S: AsRef<str> + Sync>(
        &self,
        category: AssetCategory,
        symbols: &[S],
    ) -> RankedCategory {
        let results: Vec<(String, Result<AssetMetrics>)> = symbols
            .par_iter()
            .map(|s| {
                let symbol = s.as_ref();
                (symbol.to_string(), self.metrics_for(symbol))
            })
            .collect();

        let mut ranked = Vec::with_capacity(results.len());
        let mut excluded = Vec::new();

        for (symbol, result) in results {
            match result {
                Ok(metrics) => ranked.push(metrics),
                Err(e) => {
                    warn!(%category, symbol = %symbol, error = %e, "excluding instrument from ranking");
                    excluded.push(ExcludedInstrument {
                        symbol,
                        reason: e.to_string(),
                    });
                }
            }
        }

        rank_by_sharpe(&mut ranked);

        RankedCategory {
            category,
            ranked,
            excluded,
        }
    }

    /// Rank the selected categories of a universe.
    pub fn rank_universe(
        &self,
        selected: &[AssetCategory],
        universe: &BTreeMap<AssetCategory, Vec<String>>,
    ) -> RankedUniverse {
        selected
            .iter()
            .filter_map(|&category| {
                universe
                    .get(&category)
                    .map(|symbols| (category, self.rank_category(category, symbols.as_slice())))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn trending(start: f64, drift: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| start * (1.0 + drift).powi(i as i32) * (1.0 + 0.01 * (i as f64).sin()))
            .collect()
    }

    #[test]
    fn test_simple_and_log_returns() {
        let prices = vec![100.0, 110.0, 99.0];
        let simple = simple_returns(&prices).unwrap();
        let log = log_returns(&prices).unwrap();

        assert_relative_eq!(simple[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(simple[1], -0.10, epsilon = 1e-12);
        assert_relative_eq!(log[0], 1.1f64.ln(), epsilon = 1e-12);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_returns_reject_bad_prices() {
        assert!(matches!(
            simple_returns(&[100.0]),
            Err(Error::InsufficientData(_))
        ));
        assert!(matches!(
            log_returns(&[100.0, 0.0, 101.0]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            simple_returns(&[100.0, f64::NAN]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_compute_asset_metrics_formulas() {
        let prices = vec![100.0, 102.0, 101.0, 103.0];
        let metrics = compute_asset_metrics("ABC", Some("Abc Corp"), &prices, 4.5).unwrap();

        let returns = [0.02, -1.0 / 102.0, 2.0 / 101.0];
        let mean = returns.iter().sum::<f64>() / 3.0;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 3.0;

        assert_relative_eq!(metrics.expected_return, mean * 252.0 * 100.0, epsilon = 1e-9);
        assert_relative_eq!(
            metrics.volatility,
            var.sqrt() * 252f64.sqrt() * 100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            metrics.sharpe_ratio,
            (metrics.expected_return - 4.5) / metrics.volatility,
            epsilon = 1e-12
        );
        assert_eq!(metrics.name, "Abc Corp");
    }

    #[test]
    fn test_compute_asset_metrics_name_fallback() {
        let prices = vec![10.0, 11.0, 10.5];
        let blank = compute_asset_metrics("XYZ", Some("  "), &prices, 4.5).unwrap();
        let missing = compute_asset_metrics("XYZ", None, &prices, 4.5).unwrap();

        assert_eq!(blank.name, "XYZ");
        assert_eq!(missing.name, "XYZ");
    }

    #[test]
    fn test_compute_asset_metrics_idempotent() {
        let prices = trending(50.0, 0.001, 252);
        let first = compute_asset_metrics("IDEM", None, &prices, RISK_FREE_RATE).unwrap();
        let second = compute_asset_metrics("IDEM", None, &prices, RISK_FREE_RATE).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_compute_asset_metrics_zero_volatility() {
        let prices = vec![100.0; 30];
        assert!(matches!(
            compute_asset_metrics("FLAT", None, &prices, RISK_FREE_RATE),
            Err(Error::DegenerateStatistics(_))
        ));
    }

    #[test]
    fn test_rank_category_isolates_failures() {
        let provider = InMemoryProvider::new()
            .with("GOOD", Some("Good Co"), trending(100.0, 0.002, 120))
            .with("OK", None, trending(100.0, 0.0005, 120))
            .with("FLAT", None, vec![100.0; 120])
            .with("SHORT", None, vec![100.0]);
        let calculator = MetricsCalculator::new(provider);

        let ranked = calculator.rank_category(
            AssetCategory::Stocks,
            &["OK", "GOOD", "FLAT", "SHORT", "MISSING"],
        );

        let symbols: Vec<&str> = ranked.ranked.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["GOOD", "OK"]);
        assert_eq!(ranked.excluded.len(), 3);
        assert!(ranked
            .excluded
            .iter()
            .any(|e| e.symbol == "MISSING" && e.reason.contains("no price history")));
    }

    #[test]
    fn test_rank_universe_only_selected() {
        let provider = InMemoryProvider::new()
            .with("SPY", None, trending(400.0, 0.001, 60))
            .with("BND", None, trending(70.0, 0.0001, 60));
        let calculator = MetricsCalculator::new(provider);

        let mut universe = BTreeMap::new();
        universe.insert(AssetCategory::Etfs, vec!["SPY".to_string()]);
        universe.insert(AssetCategory::Bonds, vec!["BND".to_string()]);

        let ranked = calculator.rank_universe(&[AssetCategory::Etfs], &universe);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[&AssetCategory::Etfs].ranked[0].symbol, "SPY");
    }
}
