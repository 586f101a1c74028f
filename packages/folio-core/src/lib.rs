//! Folio Core - Risk metrics, price forecasting and portfolio allocation.
//!
//! This crate turns daily closing-price histories into:
//!
//! - **Technical indicators**: SMA, EMA, RSI
//! - **Asset metrics**: annualized expected return, volatility, Sharpe ratio
//! - **Price forecasts**: Monte Carlo paths with nested confidence bands
//! - **Recommendations**: Buy / Sell / Hold signals derived from a forecast
//! - **Allocations**: risk-tolerance driven category and instrument weights
//!
//! Fetching prices is left to the caller; see [`metrics::MetricsProvider`].
//!
//! # Example
//!
//! ```rust
//! use folio_core::forecast::{ForecastConfig, ForecastEngine};
//! use folio_core::recommendation::recommend;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let prices: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.2).sin() * 3.0 + i as f64 * 0.1).collect();
//!
//! let engine = ForecastEngine::new(ForecastConfig::default());
//! let mut rng = StdRng::seed_from_u64(7);
//! let forecast = engine.run(&prices, &mut rng).unwrap();
//! assert_eq!(forecast.mean.len(), 91);
//!
//! let recommendation = recommend(&prices, &forecast.mean).unwrap();
//! println!("{:?} ({:.0}%)", recommendation.action, recommendation.confidence);
//! ```

pub mod allocation;
pub mod analysis;
pub mod config;
pub mod forecast;
pub mod indicators;
pub mod metrics;
pub mod recommendation;
pub mod types;
pub mod universe;

// Re-export commonly used types
pub use types::{
    Action, ApiResponse, AssetAllocation, AssetCategory, AssetMetrics, CategoryAllocation,
    ExcludedInstrument, ForecastResult, PortfolioAllocation, PortfolioMetrics, PriceBar,
    Recommendation, RiskAllocation, SimulationInputs,
};

// Re-export main functionality
pub use allocation::{optimize_allocation, optimize_portfolio, risk_score, AllocationConfig};
pub use analysis::{analyze_asset, AssetReport, PriceSummary};
pub use config::FolioConfig;
pub use forecast::{ForecastConfig, ForecastEngine};
pub use indicators::{compute_indicators, ema, moving_average, rsi, IndicatorParams, Indicators};
pub use metrics::{
    compute_asset_metrics, InMemoryProvider, MetricsCalculator, MetricsProvider, RISK_FREE_RATE,
    TRADING_DAYS,
};
pub use recommendation::recommend;
pub use universe::default_universe;

/// Error types for folio-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Degenerate statistics: {0}")]
    DegenerateStatistics(String),

    #[error("No viable assets: {0}")]
    NoViableAssets(String),

    #[error("Failed to fetch {symbol}: {reason}")]
    UpstreamFetch { symbol: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for folio-core operations.
pub type Result<T> = std::result::Result<T, Error>;
