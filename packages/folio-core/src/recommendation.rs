//! Buy / Sell / Hold signal from a forecast and the latest RSI.

use crate::indicators::{latest_rsi, moving_average, DEFAULT_RSI_PERIOD};
use crate::types::{Action, Recommendation};
use crate::{Error, Result};

/// Projected move (percent) beyond which the forecast is considered directional.
pub const PRICE_CHANGE_THRESHOLD: f64 = 5.0;

/// RSI level above which an asset is treated as overbought.
pub const OVERBOUGHT_RSI: f64 = 70.0;

/// Confidence cap for directional signals.
pub const MAX_CONFIDENCE: f64 = 85.0;

/// Base confidence for directional signals before adding the projected move.
pub const BASE_CONFIDENCE: f64 = 60.0;

/// Confidence reported for Hold.
pub const HOLD_CONFIDENCE: f64 = 70.0;

const CONTEXT_SMA_PERIOD: usize = 50;

/// Map a forecast onto a trade recommendation.
///
/// Decision table, first match wins:
///
/// | condition                         | action | confidence                |
/// |-----------------------------------|--------|---------------------------|
/// | change > 5% and RSI < 70          | Buy    | min(85, 60 + \|change\|)  |
/// | change < -5% or RSI > 70          | Sell   | min(85, 60 + \|change\|)  |
/// | otherwise                         | Hold   | 70                        |
///
/// # Arguments
///
/// * `historical` - Closing prices, oldest first (at least 15 for the RSI)
/// * `forecast_mean` - Mean forecast path; its last value is the target price
pub fn recommend(historical: &[f64], forecast_mean: &[f64]) -> Result<Recommendation> {
    let last_price = *historical
        .last()
        .ok_or_else(|| Error::InsufficientData("empty price history".to_string()))?;
    let future_price = *forecast_mean
        .last()
        .ok_or_else(|| Error::InsufficientData("empty forecast".to_string()))?;
    if last_price <= 0.0 || !last_price.is_finite() {
        return Err(Error::InvalidInput(format!(
            "Last price must be positive and finite, got {}",
            last_price
        )));
    }

    let price_change = (future_price - last_price) / last_price * 100.0;

    // Context only; not part of the decision
    let sma50 = moving_average(historical, CONTEXT_SMA_PERIOD)
        .ok()
        .and_then(|sma| sma.last().copied());
    let rsi = latest_rsi(historical, DEFAULT_RSI_PERIOD)?;

    let directional_confidence = MAX_CONFIDENCE.min(BASE_CONFIDENCE + price_change.abs());

    let (action, confidence, reasoning) =
        if price_change > PRICE_CHANGE_THRESHOLD && rsi < OVERBOUGHT_RSI {
            (
                Action::Buy,
                directional_confidence,
                format!(
                    "Strong upward trend with {:.1}% projected growth and favorable RSI.",
                    price_change
                ),
            )
        } else if price_change < -PRICE_CHANGE_THRESHOLD || rsi > OVERBOUGHT_RSI {
            (
                Action::Sell,
                directional_confidence,
                format!(
                    "Bearish indicators with {:.1}% projected decline and overbought conditions.",
                    price_change.abs()
                ),
            )
        } else {
            (
                Action::Hold,
                HOLD_CONFIDENCE,
                "Market conditions suggest maintaining current position.".to_string(),
            )
        };

    Ok(Recommendation {
        action,
        confidence,
        reasoning,
        price_change_percent: price_change,
        rsi,
        sma50,
    })
}
