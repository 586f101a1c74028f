//! Risk-tolerance driven portfolio allocation.
//!
//! A 0-100 risk tolerance selects a category target table, the targets are
//! restricted to the selected categories, and each category's capital is
//! spread across its best Sharpe-ranked instruments.

mod optimizer;
mod tables;

pub use optimizer::{instrument_count, optimize_allocation, MIN_SHARPE_WEIGHT};
pub use tables::{base_allocation, risk_score};

use crate::config::FolioConfig;
use crate::metrics::{MetricsCalculator, MetricsProvider, RISK_FREE_RATE};
use crate::types::{AssetCategory, AssetMetrics, PortfolioAllocation};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// What happens to the target capital of a category with no viable instrument.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnallocatedPolicy {
    /// Leave it uninvested and report it as `unallocated_amount`
    #[default]
    Drop,
    /// Rescale the remaining categories to absorb it
    Redistribute,
}

/// Allocation parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AllocationConfig {
    /// Annual risk-free rate in percent; also the return floor for instruments
    pub risk_free_rate: f64,
    pub unallocated: UnallocatedPolicy,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: RISK_FREE_RATE,
            unallocated: UnallocatedPolicy::default(),
        }
    }
}

/// Rank a universe through `provider` and allocate across it.
///
/// Instruments whose history cannot be fetched or evaluated are skipped and
/// listed in `excluded_instruments`; only the categories in `selected` are
/// fetched.
pub fn optimize_portfolio<P: MetricsProvider>(
    provider: P,
    risk_tolerance: f64,
    amount: f64,
    selected: &[AssetCategory],
    universe: &BTreeMap<AssetCategory, Vec<String>>,
    config: &FolioConfig,
) -> Result<PortfolioAllocation> {
    let allocation_config = config.allocation();
    let calculator =
        MetricsCalculator::with_risk_free_rate(provider, allocation_config.risk_free_rate);

    let ranked_universe = calculator.rank_universe(selected, universe);

    let mut ranked: BTreeMap<AssetCategory, Vec<AssetMetrics>> = BTreeMap::new();
    let mut excluded = Vec::new();
    for (category, ranked_category) in ranked_universe {
        info!(
            %category,
            ranked = ranked_category.ranked.len(),
            excluded = ranked_category.excluded.len(),
            "category ranked"
        );
        excluded.extend(ranked_category.excluded);
        ranked.insert(category, ranked_category.ranked);
    }

    let mut allocation =
        optimize_allocation(risk_tolerance, amount, selected, &ranked, &allocation_config)?;
    allocation.excluded_instruments = excluded;
    Ok(allocation)
}
