//! Monte Carlo simulation and confidence-band extraction.

use super::{ForecastConfig, LONG_EMA_PERIOD, RSI_WEIGHT, SHORT_EMA_PERIOD, TREND_WEIGHT};
use crate::indicators::{ema, latest_rsi, DEFAULT_RSI_PERIOD};
use crate::metrics::{log_returns, mean_std};
use crate::types::{ForecastResult, SimulationInputs};
use crate::{Error, Result};
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

/// Order-statistic percentiles, lowest first:
/// lower90, lower80, lower50, upper50, upper80, upper90.
const BAND_PERCENTILES: [usize; 6] = [5, 10, 25, 75, 90, 95];

/// Derive the drift and volatility that drive the simulated paths.
///
/// Requires enough history for a 14-period RSI (15 prices).
pub fn simulation_inputs(prices: &[f64]) -> Result<SimulationInputs> {
    let returns = log_returns(prices)?;
    let (avg_return, volatility) = mean_std(&returns);

    let rsi_last = latest_rsi(prices, DEFAULT_RSI_PERIOD)?;
    let short_last = last(&ema(prices, SHORT_EMA_PERIOD)?)?;
    let long_last = last(&ema(prices, LONG_EMA_PERIOD)?)?;

    let trend_strength = (short_last - long_last) / long_last;
    let rsi_adjustment = (rsi_last - 50.0) / 100.0;
    let adjusted_return = avg_return + TREND_WEIGHT * trend_strength - RSI_WEIGHT * rsi_adjustment;

    Ok(SimulationInputs {
        avg_return,
        volatility,
        trend_strength,
        rsi_adjustment,
        adjusted_return,
    })
}

fn last(values: &[f64]) -> Result<f64> {
    values
        .last()
        .copied()
        .ok_or_else(|| Error::InsufficientData("empty indicator series".to_string()))
}

/// Monte Carlo forecast engine.
///
/// Randomness is injected: [`run`](Self::run) draws one sub-seed per path
/// from the caller's generator and simulates each path on its own `StdRng`,
/// so the result for a given seed does not depend on `parallel`.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: ForecastConfig,
}

impl ForecastEngine {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Simulate forward from the last price of `prices`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use folio_core::forecast::{ForecastConfig, ForecastEngine};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let prices: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64 * 0.4).sin()).collect();
    /// let engine = ForecastEngine::new(ForecastConfig {
    ///     simulations: 200,
    ///     horizon_days: 30,
    ///     ..Default::default()
    /// });
    ///
    /// let a = engine.run(&prices, &mut StdRng::seed_from_u64(1)).unwrap();
    /// let b = engine.run(&prices, &mut StdRng::seed_from_u64(1)).unwrap();
    /// assert_eq!(a, b);
    /// assert!(a.is_nested());
    /// ```
    pub fn run<R: Rng + ?Sized>(&self, prices: &[f64], rng: &mut R) -> Result<ForecastResult> {
        self.config.validate()?;
        let inputs = simulation_inputs(prices)?;
        let last_price = last(prices)?;
        let horizon = self.config.horizon_days;

        debug!(
            avg_return = inputs.avg_return,
            volatility = inputs.volatility,
            trend_strength = inputs.trend_strength,
            rsi_adjustment = inputs.rsi_adjustment,
            adjusted_return = inputs.adjusted_return,
            "simulation inputs"
        );

        let seeds: Vec<u64> = (0..self.config.simulations)
            .map(|_| rng.next_u64())
            .collect();

        let paths: Vec<Vec<f64>> = if self.config.parallel {
            seeds
                .par_iter()
                .map(|&seed| simulate_path(last_price, &inputs, horizon, seed))
                .collect()
        } else {
            seeds
                .iter()
                .map(|&seed| simulate_path(last_price, &inputs, horizon, seed))
                .collect()
        };

        let result = summarize(&paths, horizon, inputs);

        info!(
            simulations = self.config.simulations,
            horizon,
            last_price,
            final_mean = result.final_mean().unwrap_or(last_price),
            "forecast complete"
        );

        Ok(result)
    }

    /// Run with `config.seed`, or OS entropy when no seed is configured.
    pub fn run_seeded(&self, prices: &[f64]) -> Result<ForecastResult> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run(prices, &mut rng)
    }
}

/// One price path of `horizon + 1` points starting at `start`.
fn simulate_path(start: f64, inputs: &SimulationInputs, horizon: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let draw = Uniform::new_inclusive(-1.0, 1.0);

    let mut path = Vec::with_capacity(horizon + 1);
    let mut price = start;
    path.push(price);

    for day in 1..=horizon {
        let shock: f64 = rng.sample(draw);
        let daily_return = inputs.adjusted_return + inputs.volatility * shock;
        // Linearly shrinks the step as the horizon lengthens
        let damping = (1.0 - day as f64 / (2.0 * horizon as f64)).max(0.0);
        price *= (daily_return * damping).exp();
        path.push(price);
    }

    path
}

/// Cross-path mean and floor-index order statistics for every day.
fn summarize(paths: &[Vec<f64>], horizon: usize, inputs: SimulationInputs) -> ForecastResult {
    let n = paths.len();
    let mut bands: [Vec<f64>; 6] = Default::default();
    for band in bands.iter_mut() {
        band.reserve(horizon + 1);
    }
    let mut mean = Vec::with_capacity(horizon + 1);

    let mut column = Vec::with_capacity(n);
    for day in 0..=horizon {
        column.clear();
        column.extend(paths.iter().map(|p| p[day]));
        column.sort_by(f64::total_cmp);

        for (band, pct) in bands.iter_mut().zip(BAND_PERCENTILES) {
            let idx = (n * pct / 100).min(n - 1);
            band.push(column[idx]);
        }

        // Summation error can push the mean a few ULPs past a degenerate band
        let avg = column.iter().sum::<f64>() / n as f64;
        mean.push(avg.clamp(bands[2][day], bands[3][day]));
    }

    let [lower_ci90, lower_ci80, lower_ci50, upper_ci50, upper_ci80, upper_ci90] = bands;

    ForecastResult {
        mean,
        upper_ci90,
        upper_ci80,
        upper_ci50,
        lower_ci50,
        lower_ci80,
        lower_ci90,
        inputs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn history(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                100.0 + t * 0.15 + (t * 0.35).sin() * 4.0 + (t * 1.7).cos() * 1.5
            })
            .collect()
    }

    fn small_config(parallel: bool) -> ForecastConfig {
        ForecastConfig {
            simulations: 300,
            horizon_days: 40,
            parallel,
            seed: None,
        }
    }

    #[test]
    fn test_default_config() {
        let config = ForecastConfig::default();
        assert_eq!(config.simulations, 1000);
        assert_eq!(config.horizon_days, 90);
    }

    #[test]
    fn test_forecast_shape_and_anchor() {
        let prices = history(120);
        let engine = ForecastEngine::default();
        let result = engine.run(&prices, &mut StdRng::seed_from_u64(11)).unwrap();

        let last_price = *prices.last().unwrap();
        for series in [
            &result.mean,
            &result.upper_ci90,
            &result.upper_ci80,
            &result.upper_ci50,
            &result.lower_ci50,
            &result.lower_ci80,
            &result.lower_ci90,
        ] {
            assert_eq!(series.len(), 91);
            assert_eq!(series[0], last_price);
        }
        assert_eq!(result.horizon(), 90);
    }

    #[test]
    fn test_forecast_bands_nested_every_day() {
        let engine = ForecastEngine::default();
        for seed in [1, 2, 3] {
            let result = engine.run(&history(150), &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(result.is_nested());
        }

        // Choppy history with large daily moves
        let choppy: Vec<f64> = (0..80)
            .map(|i| if i % 2 == 0 { 100.0 } else { 112.0 } + i as f64 * 0.1)
            .collect();
        let result = engine.run(&choppy, &mut StdRng::seed_from_u64(9)).unwrap();
        assert!(result.is_nested());
    }

    #[test]
    fn test_forecast_reproducible_with_seed() {
        let prices = history(100);
        let engine = ForecastEngine::new(small_config(true));

        let a = engine.run(&prices, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = engine.run(&prices, &mut StdRng::seed_from_u64(42)).unwrap();
        let c = engine.run(&prices, &mut StdRng::seed_from_u64(43)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a.mean, c.mean);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let prices = history(100);
        let parallel = ForecastEngine::new(small_config(true))
            .run(&prices, &mut StdRng::seed_from_u64(5))
            .unwrap();
        let sequential = ForecastEngine::new(small_config(false))
            .run(&prices, &mut StdRng::seed_from_u64(5))
            .unwrap();

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_run_seeded_uses_config_seed() {
        let prices = history(90);
        let engine = ForecastEngine::new(ForecastConfig {
            seed: Some(77),
            ..small_config(true)
        });

        let a = engine.run_seeded(&prices).unwrap();
        let b = engine.run_seeded(&prices).unwrap();
        let direct = engine.run(&prices, &mut StdRng::seed_from_u64(77)).unwrap();

        assert_eq!(a, b);
        assert_eq!(a, direct);
    }

    #[test]
    fn test_simulation_inputs_blend() {
        let prices = history(120);
        let inputs = simulation_inputs(&prices).unwrap();

        let expected =
            inputs.avg_return + 0.1 * inputs.trend_strength - 0.05 * inputs.rsi_adjustment;
        assert_relative_eq!(inputs.adjusted_return, expected, epsilon = 1e-15);
        assert!(inputs.volatility > 0.0);
        assert!(inputs.rsi_adjustment >= -0.5 && inputs.rsi_adjustment <= 0.5);
    }

    #[test]
    fn test_zero_volatility_paths_are_deterministic() {
        // Constant growth: every log return is ln(1.01), RSI saturates at 100
        let prices: Vec<f64> = (0..40).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let horizon = 10;
        let engine = ForecastEngine::new(ForecastConfig {
            simulations: 20,
            horizon_days: horizon,
            parallel: false,
            seed: None,
        });

        let result = engine.run(&prices, &mut StdRng::seed_from_u64(3)).unwrap();
        let inputs = result.inputs;
        assert_relative_eq!(inputs.rsi_adjustment, 0.5);
        assert!(inputs.volatility < 1e-12);

        let mut expected = *prices.last().unwrap();
        for day in 1..=horizon {
            let damping = 1.0 - day as f64 / (2.0 * horizon as f64);
            expected *= (inputs.adjusted_return * damping).exp();
            assert_relative_eq!(result.mean[day], expected, max_relative = 1e-9);
            assert_relative_eq!(result.upper_ci90[day], expected, max_relative = 1e-9);
            assert_relative_eq!(result.lower_ci90[day], expected, max_relative = 1e-9);
        }
        assert!(result.is_nested());
    }

    #[test]
    fn test_forecast_insufficient_history() {
        let engine = ForecastEngine::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            engine.run(&[100.0, 101.0], &mut rng),
            Err(Error::InsufficientData(_))
        ));
        assert!(matches!(
            engine.run(&history(14), &mut rng),
            Err(Error::InsufficientData(_))
        ));
        assert!(engine.run(&history(15), &mut rng).is_ok());
    }

    #[test]
    fn test_forecast_invalid_config() {
        let engine = ForecastEngine::new(ForecastConfig {
            simulations: 0,
            ..Default::default()
        });
        assert!(matches!(
            engine.run(&history(50), &mut StdRng::seed_from_u64(0)),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_single_simulation() {
        let engine = ForecastEngine::new(ForecastConfig {
            simulations: 1,
            horizon_days: 5,
            parallel: false,
            seed: None,
        });
        let result = engine.run(&history(40), &mut StdRng::seed_from_u64(8)).unwrap();

        // Every band collapses onto the only path
        for day in 0..=5 {
            assert_eq!(result.lower_ci90[day], result.upper_ci90[day]);
            assert_eq!(result.mean[day], result.upper_ci50[day]);
        }
    }
}
