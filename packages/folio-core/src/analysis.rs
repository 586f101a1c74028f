//! Single-asset report: price summary, forecast and recommendation.

use crate::forecast::ForecastEngine;
use crate::recommendation::recommend;
use crate::types::{ForecastResult, PriceBar, Recommendation};
use crate::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Closing prices of `bars` in order, skipping missing or non-finite closes.
pub fn clean_closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .filter_map(|bar| bar.close)
        .filter(|close| close.is_finite())
        .collect()
}

/// True for queries that already look like a plain ticker (1-5 uppercase letters).
///
/// ```rust
/// use folio_core::analysis::is_ticker_symbol;
///
/// assert!(is_ticker_symbol("AAPL"));
/// assert!(!is_ticker_symbol("apple"));
/// assert!(!is_ticker_symbol("BRK-B"));
/// ```
pub fn is_ticker_symbol(query: &str) -> bool {
    (1..=5).contains(&query.len()) && query.bytes().all(|b| b.is_ascii_uppercase())
}

/// Rebase a series so its first value is 100.
pub fn rebase_to_100(values: &[f64]) -> Result<Vec<f64>> {
    let base = *values
        .first()
        .ok_or_else(|| Error::InvalidInput("cannot rebase an empty series".to_string()))?;
    if !base.is_finite() || base <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Rebase value must be positive, got {}",
            base
        )));
    }
    Ok(values.iter().map(|v| v / base * 100.0).collect())
}

/// Latest price and its change against the previous close.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceSummary {
    pub current_price: f64,
    pub previous_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
}

impl PriceSummary {
    pub fn from_prices(prices: &[f64]) -> Result<Self> {
        let [.., previous_price, current_price] = prices else {
            return Err(Error::InsufficientData(format!(
                "price summary needs at least 2 prices, got {}",
                prices.len()
            )));
        };
        let (previous_price, current_price) = (*previous_price, *current_price);
        if previous_price <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Previous price must be positive, got {}",
                previous_price
            )));
        }

        let price_change = current_price - previous_price;
        Ok(Self {
            current_price,
            previous_price,
            price_change,
            price_change_percent: price_change / previous_price * 100.0,
        })
    }
}

/// Everything produced for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetReport {
    pub symbol: String,
    pub name: String,
    #[serde(flatten)]
    pub summary: PriceSummary,
    pub prices: Vec<f64>,
    pub forecast: ForecastResult,
    pub recommendation: Recommendation,
}

/// Summarize, forecast and recommend for one instrument.
pub fn analyze_asset<R: Rng + ?Sized>(
    symbol: &str,
    name: Option<&str>,
    prices: &[f64],
    engine: &ForecastEngine,
    rng: &mut R,
) -> Result<AssetReport> {
    let summary = PriceSummary::from_prices(prices)?;
    let forecast = engine.run(prices, rng)?;
    let recommendation = recommend(prices, &forecast.mean)?;

    let symbol = symbol.to_uppercase();
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| symbol.clone(), str::to_string);

    info!(
        symbol = %symbol,
        action = %recommendation.action,
        confidence = recommendation.confidence,
        "asset analyzed"
    );

    Ok(AssetReport {
        symbol,
        name,
        summary,
        prices: prices.to_vec(),
        forecast,
        recommendation,
    })
}
