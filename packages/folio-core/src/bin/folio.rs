//! Folio CLI - indicators, forecasts and allocations as JSON.
//!
//! Every command prints an `ApiResponse` envelope on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::{
    allocation::{optimize_portfolio, UnallocatedPolicy},
    analysis::{analyze_asset, clean_closes},
    compute_asset_metrics, compute_indicators, default_universe, ApiResponse, AssetCategory,
    FolioConfig, ForecastEngine, InMemoryProvider, IndicatorParams, PriceBar,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - risk metrics, forecasts and portfolio allocation")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $FOLIO_CONFIG_FILE or ~/.folio/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute SMA, EMA and RSI series
    Indicators {
        /// JSON file with closing prices or price bars
        #[arg(short, long)]
        prices: PathBuf,
        #[arg(long, default_value = "50")]
        sma_period: usize,
        #[arg(long, default_value = "12")]
        ema_period: usize,
        #[arg(long, default_value = "14")]
        rsi_period: usize,
    },
    /// Annualized return, volatility and Sharpe ratio
    Metrics {
        #[arg(short, long)]
        prices: PathBuf,
        /// Ticker symbol
        #[arg(short, long)]
        symbol: String,
        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Monte Carlo price forecast
    Forecast {
        #[arg(short, long)]
        prices: PathBuf,
        /// Number of simulated paths
        #[arg(long)]
        simulations: Option<usize>,
        /// Forecast horizon in trading days
        #[arg(long)]
        days: Option<usize>,
        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Price summary, forecast and recommendation for one asset
    Analyze {
        #[arg(short, long)]
        prices: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Allocate capital across asset categories
    Allocate {
        /// JSON file mapping symbols to `{ name, closes }`
        #[arg(long)]
        provider: PathBuf,
        /// Risk tolerance, 0-100
        #[arg(short, long)]
        risk: f64,
        /// Amount to invest
        #[arg(short, long)]
        amount: f64,
        /// Categories (comma-separated); all when omitted
        #[arg(short, long, value_delimiter = ',')]
        categories: Vec<String>,
        /// JSON file mapping categories to symbols; built-in list when omitted
        #[arg(short, long)]
        universe: Option<PathBuf>,
        /// Spread capital of categories without viable instruments over the rest
        #[arg(long)]
        redistribute: bool,
    },
    /// Print the built-in instrument universe
    Universe,
}

/// Prices may be given as plain closes or as dated bars.
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceInput {
    Closes(Vec<f64>),
    Bars(Vec<PriceBar>),
}

fn read_prices(path: &Path) -> Result<Vec<f64>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read prices from {}", path.display()))?;
    let input: PriceInput = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse prices in {}", path.display()))?;

    Ok(match input {
        PriceInput::Closes(closes) => closes,
        PriceInput::Bars(bars) => clean_closes(&bars),
    })
}

fn read_universe(path: Option<&Path>) -> Result<BTreeMap<AssetCategory, Vec<String>>> {
    let Some(path) = path else {
        return Ok(default_universe());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read universe from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse universe in {}", path.display()))
}

fn parse_categories(names: &[String]) -> Result<Vec<AssetCategory>> {
    if names.is_empty() {
        return Ok(AssetCategory::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| name.parse::<AssetCategory>().map_err(anyhow::Error::from))
        .collect()
}

fn load_config(path: Option<&Path>) -> Result<FolioConfig> {
    let config = match path {
        Some(path) => FolioConfig::load_from_path(path)?,
        None => FolioConfig::load()?,
    };
    Ok(config)
}

fn run(cli: Cli) -> Result<Value> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Indicators {
            prices,
            sma_period,
            ema_period,
            rsi_period,
        } => {
            let prices = read_prices(&prices)?;
            let params = IndicatorParams {
                sma_period,
                ema_period,
                rsi_period,
            };
            let indicators = compute_indicators(&prices, &params)?;
            Ok(json!({
                "params": params,
                "sma": indicators.sma,
                "ema": indicators.ema,
                "rsi": indicators.rsi,
            }))
        }
        Commands::Metrics {
            prices,
            symbol,
            name,
        } => {
            let prices = read_prices(&prices)?;
            let metrics =
                compute_asset_metrics(&symbol, name.as_deref(), &prices, config.risk_free_rate)?;
            Ok(serde_json::to_value(metrics)?)
        }
        Commands::Forecast {
            prices,
            simulations,
            days,
            seed,
        } => {
            let prices = read_prices(&prices)?;
            if let Some(simulations) = simulations {
                config.forecast.simulations = simulations;
            }
            if let Some(days) = days {
                config.forecast.horizon_days = days;
            }
            if seed.is_some() {
                config.forecast.seed = seed;
            }
            let forecast = ForecastEngine::new(config.forecast).run_seeded(&prices)?;
            Ok(serde_json::to_value(forecast)?)
        }
        Commands::Analyze {
            prices,
            symbol,
            name,
            seed,
        } => {
            let prices = read_prices(&prices)?;
            let engine = ForecastEngine::new(config.forecast);
            let mut rng = match seed.or(config.forecast.seed) {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let report = analyze_asset(&symbol, name.as_deref(), &prices, &engine, &mut rng)?;
            Ok(serde_json::to_value(report)?)
        }
        Commands::Allocate {
            provider,
            risk,
            amount,
            categories,
            universe,
            redistribute,
        } => {
            let provider = InMemoryProvider::from_json_file(&provider)
                .with_context(|| format!("Failed to load provider file {}", provider.display()))?;
            let universe = read_universe(universe.as_deref())?;
            let selected = parse_categories(&categories)?;
            if redistribute {
                config.unallocated = UnallocatedPolicy::Redistribute;
            }

            let allocation =
                optimize_portfolio(&provider, risk, amount, &selected, &universe, &config)?;
            Ok(serde_json::to_value(allocation)?)
        }
        Commands::Universe => Ok(serde_json::to_value(default_universe())?),
    }
}

fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (output, failed) = match run(cli) {
        Ok(data) => (serde_json::to_string_pretty(&ApiResponse::ok(data))?, false),
        Err(e) => (
            serde_json::to_string_pretty(&ApiResponse::<()>::err(format!("{:#}", e)))?,
            true,
        ),
    };

    println!("{}", output);
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
