//! Core data types for the folio engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A single daily bar as delivered by a market-data source.
///
/// Sources occasionally report a missing or non-numeric close; those bars are
/// dropped by [`crate::analysis::clean_closes`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    /// Trading day
    pub date: NaiveDate,
    /// Closing price, if the source reported one
    #[serde(default)]
    pub close: Option<f64>,
}

/// Annualized risk/return statistics for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetMetrics {
    /// Ticker symbol
    pub symbol: String,
    /// Display name (falls back to the symbol)
    pub name: String,
    /// Annualized expected return in percent
    pub expected_return: f64,
    /// Annualized volatility in percent
    pub volatility: f64,
    /// (expected_return - risk_free_rate) / volatility
    pub sharpe_ratio: f64,
}

/// Statistics the Monte Carlo paths were driven by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimulationInputs {
    /// Mean daily log return of the history
    pub avg_return: f64,
    /// Population standard deviation of daily log returns
    pub volatility: f64,
    /// Relative gap between the 12- and 26-period EMA
    pub trend_strength: f64,
    /// (RSI - 50) / 100
    pub rsi_adjustment: f64,
    /// Drift actually applied to each simulated day
    pub adjusted_return: f64,
}

/// Mean path and nested confidence bands of a price forecast.
///
/// All sequences have `horizon + 1` entries; index 0 is the last known price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastResult {
    pub mean: Vec<f64>,
    pub upper_ci90: Vec<f64>,
    pub upper_ci80: Vec<f64>,
    pub upper_ci50: Vec<f64>,
    pub lower_ci50: Vec<f64>,
    pub lower_ci80: Vec<f64>,
    pub lower_ci90: Vec<f64>,
    pub inputs: SimulationInputs,
}

impl ForecastResult {
    /// Number of forecast days (excluding day 0).
    pub fn horizon(&self) -> usize {
        self.mean.len().saturating_sub(1)
    }

    /// Mean price at the end of the horizon.
    pub fn final_mean(&self) -> Option<f64> {
        self.mean.last().copied()
    }

    /// Check `lower90 <= lower80 <= lower50 <= mean <= upper50 <= upper80 <= upper90`
    /// for every day.
    pub fn is_nested(&self) -> bool {
        (0..self.mean.len()).all(|d| {
            let chain = [
                self.lower_ci90[d],
                self.lower_ci80[d],
                self.lower_ci50[d],
                self.mean[d],
                self.upper_ci50[d],
                self.upper_ci80[d],
                self.upper_ci90[d],
            ];
            chain.windows(2).all(|w| w[0] <= w[1])
        })
    }
}

/// Discrete trade signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Buy => "Buy",
            Action::Sell => "Sell",
            Action::Hold => "Hold",
        };
        f.write_str(s)
    }
}

/// Trade recommendation derived from a forecast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub action: Action,
    /// Confidence score in [0, 100]
    pub confidence: f64,
    /// Human-readable rationale
    pub reasoning: String,
    /// Projected change from the last close to the end of the forecast, in percent
    pub price_change_percent: f64,
    /// Latest 14-period RSI
    pub rsi: f64,
    /// Latest 50-period SMA, when the history is long enough
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma50: Option<f64>,
}

/// Asset categories the allocator distributes capital across.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Stocks,
    Bonds,
    Crypto,
    MutualFunds,
    EmergingMarkets,
    Etfs,
}

impl AssetCategory {
    /// Every category, in table order.
    pub const ALL: [AssetCategory; 6] = [
        AssetCategory::Stocks,
        AssetCategory::Bonds,
        AssetCategory::Crypto,
        AssetCategory::MutualFunds,
        AssetCategory::EmergingMarkets,
        AssetCategory::Etfs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Stocks => "stocks",
            AssetCategory::Bonds => "bonds",
            AssetCategory::Crypto => "crypto",
            AssetCategory::MutualFunds => "mutual_funds",
            AssetCategory::EmergingMarkets => "emerging_markets",
            AssetCategory::Etfs => "etfs",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(&['-', ' '][..], "_");
        AssetCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown asset category: {}", s)))
    }
}

/// Target percentage per category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct RiskAllocation {
    pub stocks: f64,
    pub bonds: f64,
    pub crypto: f64,
    pub mutual_funds: f64,
    pub emerging_markets: f64,
    pub etfs: f64,
}

impl RiskAllocation {
    /// Build a table from percentages in [`AssetCategory::ALL`] order.
    pub const fn from_array(p: [f64; 6]) -> Self {
        Self {
            stocks: p[0],
            bonds: p[1],
            crypto: p[2],
            mutual_funds: p[3],
            emerging_markets: p[4],
            etfs: p[5],
        }
    }

    /// Percentage assigned to a category.
    pub fn get(&self, category: AssetCategory) -> f64 {
        match category {
            AssetCategory::Stocks => self.stocks,
            AssetCategory::Bonds => self.bonds,
            AssetCategory::Crypto => self.crypto,
            AssetCategory::MutualFunds => self.mutual_funds,
            AssetCategory::EmergingMarkets => self.emerging_markets,
            AssetCategory::Etfs => self.etfs,
        }
    }

    /// Mutable access to a category's percentage.
    pub fn get_mut(&mut self, category: AssetCategory) -> &mut f64 {
        match category {
            AssetCategory::Stocks => &mut self.stocks,
            AssetCategory::Bonds => &mut self.bonds,
            AssetCategory::Crypto => &mut self.crypto,
            AssetCategory::MutualFunds => &mut self.mutual_funds,
            AssetCategory::EmergingMarkets => &mut self.emerging_markets,
            AssetCategory::Etfs => &mut self.etfs,
        }
    }

    /// Sum over all categories.
    pub fn total(&self) -> f64 {
        AssetCategory::ALL.iter().map(|&c| self.get(c)).sum()
    }

    /// Keep only `categories` and rescale them to sum to 100.
    ///
    /// Returns `None` when the kept categories carry no weight.
    pub fn restricted_to(&self, categories: &[AssetCategory]) -> Option<Self> {
        let mut restricted = Self::default();
        for &category in categories {
            *restricted.get_mut(category) = self.get(category);
        }

        let total = restricted.total();
        if total <= 0.0 {
            return None;
        }

        for category in AssetCategory::ALL {
            let value = restricted.get_mut(category);
            *value = *value * 100.0 / total;
        }
        Some(restricted)
    }
}

/// Capital assigned to one instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetAllocation {
    pub symbol: String,
    pub name: String,
    /// Amount in currency units
    pub amount: f64,
    /// Share of the total investable amount, in percent
    pub percentage: f64,
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

/// Capital assigned to one category and its instruments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryAllocation {
    pub amount: f64,
    /// Share of the total investable amount, in percent
    pub percentage: f64,
    /// Mean expected return of the selected instruments
    pub expected_return: f64,
    /// Root-mean-square volatility of the selected instruments
    pub volatility: f64,
    /// Instruments in descending Sharpe order
    pub assets: Vec<AssetAllocation>,
}

/// Allocation-weighted portfolio statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PortfolioMetrics {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

/// An instrument left out of a ranking, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExcludedInstrument {
    pub symbol: String,
    pub reason: String,
}

/// Complete allocation result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioAllocation {
    /// Discretized risk score (1-5)
    pub risk_score: u8,
    /// Normalized target percentages for the selected categories
    pub target: RiskAllocation,
    pub categories: BTreeMap<AssetCategory, CategoryAllocation>,
    pub metrics: PortfolioMetrics,
    /// Capital of categories that had no viable instrument
    pub unallocated_amount: f64,
    pub dropped_categories: Vec<AssetCategory>,
    /// Instruments whose metrics could not be computed upstream
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_instruments: Vec<ExcludedInstrument>,
}

impl PortfolioAllocation {
    /// Sum of all category amounts.
    pub fn allocated_amount(&self) -> f64 {
        self.categories.values().map(|c| c.amount).sum()
    }
}

/// API response wrapper for success cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
