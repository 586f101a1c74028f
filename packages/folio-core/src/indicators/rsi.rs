//! Relative Strength Index (RSI) indicator.

use super::{check_period, check_window};
use crate::{Error, Result};

/// Default RSI lookback.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Calculate RSI value from average gain and average loss.
/// Saturates instead of dividing by zero: no losses (RSI=100), no change (RSI=50).
#[inline]
fn calculate_rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        if avg_gain <= 0.0 {
            50.0 // No change
        } else {
            100.0 // All gains, no losses
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

/// Calculate Relative Strength Index.
///
/// Formula:
/// 1. Split consecutive price changes into gains and losses
/// 2. Seed average gain/loss with the simple mean of the first `period` changes
/// 3. Smooth subsequent steps with Wilder's rule:
///    `avg = (prev_avg * (period - 1) + current) / period`
/// 4. RSI = 100 - (100 / (1 + avg_gain / avg_loss))
///
/// # Arguments
///
/// * `prices` - Price series (typically closing prices)
/// * `period` - Lookback period (typically 14)
///
/// # Returns
///
/// `prices.len() - period` values in [0, 100]; the first one corresponds to
/// `prices[period]`. Fails with [`Error::InsufficientData`] when fewer than
/// `period + 1` prices are supplied.
///
/// # Example
///
/// ```rust
/// use folio_core::indicators::rsi;
///
/// let prices = vec![44.0, 44.25, 44.5, 43.75, 44.5, 44.25, 44.5, 44.0, 43.5, 44.0,
///                   44.25, 44.0, 43.5, 44.0, 44.5, 44.25, 44.0];
/// let rsi_values = rsi(&prices, 14).unwrap();
///
/// assert_eq!(rsi_values.len(), 3);
/// for &value in &rsi_values {
///     assert!(value >= 0.0 && value <= 100.0);
/// }
/// ```
pub fn rsi(prices: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(period)?;
    check_window(prices.len(), period + 1, "RSI")?;

    let n = prices.len();
    let mut gains = Vec::with_capacity(n - 1);
    let mut losses = Vec::with_capacity(n - 1);

    for w in prices.windows(2) {
        let change = w[1] - w[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change); // Store as positive value
        }
    }

    let p = period as f64;
    let mut avg_gain: f64 = gains[..period].iter().sum::<f64>() / p;
    let mut avg_loss: f64 = losses[..period].iter().sum::<f64>() / p;

    let mut result = Vec::with_capacity(n - period);
    result.push(calculate_rsi_value(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
        result.push(calculate_rsi_value(avg_gain, avg_loss));
    }

    Ok(result)
}

/// Most recent RSI value.
pub fn latest_rsi(prices: &[f64], period: usize) -> Result<f64> {
    rsi(prices, period)?
        .last()
        .copied()
        .ok_or_else(|| Error::InsufficientData("RSI produced no values".to_string()))
}
