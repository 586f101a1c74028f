//! Simple Moving Average (SMA) and Exponential Moving Average (EMA) indicators.

use super::{check_period, check_window};
use crate::{Error, Result};

/// Calculate the Simple Moving Average over a trailing window.
///
/// # Arguments
///
/// * `data` - Price series
/// * `period` - Window length
///
/// # Returns
///
/// `data.len() - period + 1` values; element `i` is the mean of
/// `data[i..i + period]`. Fails with [`Error::InsufficientData`] when the
/// series is shorter than the window.
///
/// # Example
///
/// ```rust
/// use folio_core::indicators::moving_average;
///
/// let prices = vec![100.0, 102.0, 101.0, 105.0, 103.0, 107.0, 108.0, 110.0];
/// let sma = moving_average(&prices, 3).unwrap();
///
/// assert_eq!(sma.len(), 6);
/// assert!((sma[0] - 101.0).abs() < 1e-12);
/// ```
pub fn moving_average(data: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(period)?;
    check_window(data.len(), period, "moving average")?;

    let n = data.len();
    let mut result = Vec::with_capacity(n - period + 1);

    let mut sum: f64 = data[..period].iter().sum();
    result.push(sum / period as f64);

    // Rolling window
    for i in period..n {
        sum = sum - data[i - period] + data[i];
        result.push(sum / period as f64);
    }

    Ok(result)
}

/// Calculate the Exponential Moving Average.
///
/// Uses `EMA[i] = k * price[i] + (1 - k) * EMA[i-1]` with `k = 2 / (period + 1)`,
/// seeded with the first price.
///
/// # Returns
///
/// One value per input price.
pub fn ema(data: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(period)?;
    if data.is_empty() {
        return Err(Error::InsufficientData(
            "EMA requires at least one price".to_string(),
        ));
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for &price in &data[1..] {
        let prev = result[result.len() - 1];
        result.push(k * price + (1.0 - k) * prev);
    }

    Ok(result)
}
