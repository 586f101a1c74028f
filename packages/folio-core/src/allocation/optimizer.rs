//! Category and instrument level capital allocation.

use super::tables::{base_allocation, risk_score};
use super::{AllocationConfig, UnallocatedPolicy};
use crate::metrics::rank_by_sharpe;
use crate::types::{
    AssetAllocation, AssetCategory, AssetMetrics, CategoryAllocation, PortfolioAllocation,
    PortfolioMetrics,
};
use crate::{Error, Result};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Minimum Sharpe weight, so weak instruments still receive some capital.
pub const MIN_SHARPE_WEIGHT: f64 = 0.1;

/// How many top-ranked instruments a category may hold at a risk score.
pub fn instrument_count(category: AssetCategory, score: u8) -> usize {
    let score = usize::from(score);
    match category {
        AssetCategory::Stocks => score + 2,
        AssetCategory::Crypto => (score / 2).max(1),
        _ => 2,
    }
}

/// True when bonds were ranked and every bond loses money.
fn all_bonds_negative(
    selected: &[AssetCategory],
    ranked: &BTreeMap<AssetCategory, Vec<AssetMetrics>>,
) -> bool {
    if !selected.contains(&AssetCategory::Bonds) {
        return false;
    }
    ranked
        .get(&AssetCategory::Bonds)
        .filter(|bonds| !bonds.is_empty())
        .map_or(false, |bonds| bonds.iter().all(|b| b.expected_return < 0.0))
}

/// Split a category's capital across its instruments by floored Sharpe ratio.
fn allocate_category(
    viable: &[AssetMetrics],
    category_amount: f64,
    percentage: f64,
    total_amount: f64,
) -> CategoryAllocation {
    let total_weight: f64 = viable
        .iter()
        .map(|a| a.sharpe_ratio.max(MIN_SHARPE_WEIGHT))
        .sum();

    let assets = viable
        .iter()
        .map(|asset| {
            let weight = asset.sharpe_ratio.max(MIN_SHARPE_WEIGHT) / total_weight;
            let amount = category_amount * weight;
            AssetAllocation {
                symbol: asset.symbol.clone(),
                name: asset.name.clone(),
                amount,
                percentage: amount / total_amount * 100.0,
                expected_return: asset.expected_return,
                volatility: asset.volatility,
                sharpe_ratio: asset.sharpe_ratio,
            }
        })
        .collect();

    let n = viable.len() as f64;
    let expected_return = viable.iter().map(|a| a.expected_return).sum::<f64>() / n;
    // Independence assumption: RMS of instrument volatilities, no covariance
    let volatility = (viable.iter().map(|a| a.volatility.powi(2)).sum::<f64>() / n).sqrt();

    CategoryAllocation {
        amount: category_amount,
        percentage,
        expected_return,
        volatility,
        assets,
    }
}

/// Percentage-weighted return and quadratic-sum volatility over categories.
fn portfolio_metrics(
    categories: &BTreeMap<AssetCategory, CategoryAllocation>,
    risk_free_rate: f64,
) -> Result<PortfolioMetrics> {
    let expected_return = categories
        .values()
        .map(|c| c.expected_return * c.percentage / 100.0)
        .sum::<f64>();
    let volatility = categories
        .values()
        .map(|c| (c.volatility * c.percentage / 100.0).powi(2))
        .sum::<f64>()
        .sqrt();

    if volatility <= 0.0 {
        return Err(Error::DegenerateStatistics(
            "Portfolio volatility is zero; Sharpe ratio undefined".to_string(),
        ));
    }

    Ok(PortfolioMetrics {
        expected_return,
        volatility,
        sharpe_ratio: (expected_return - risk_free_rate) / volatility,
    })
}

/// Allocate `amount` across the selected categories for a risk tolerance.
///
/// # Arguments
///
/// * `risk_tolerance` - 0-100, discretized into a 1-5 risk score
/// * `amount` - Total investable amount
/// * `selected` - Categories the investor wants exposure to
/// * `ranked` - Candidate metrics per category (re-ranked by Sharpe here)
/// * `config` - Risk-free rate and the policy for categories left without
///   viable instruments
///
/// # Errors
///
/// * [`Error::InvalidInput`] for an empty selection, a non-positive amount,
///   an out-of-range tolerance or a selection with zero target weight
/// * [`Error::NoViableAssets`] when no weighted category keeps an instrument
pub fn optimize_allocation(
    risk_tolerance: f64,
    amount: f64,
    selected: &[AssetCategory],
    ranked: &BTreeMap<AssetCategory, Vec<AssetMetrics>>,
    config: &AllocationConfig,
) -> Result<PortfolioAllocation> {
    let score = risk_score(risk_tolerance)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Investment amount must be positive, got {}",
            amount
        )));
    }

    // Table order, duplicates removed
    let selected: Vec<AssetCategory> = AssetCategory::ALL
        .into_iter()
        .filter(|c| selected.contains(c))
        .collect();
    if selected.is_empty() {
        return Err(Error::InvalidInput(
            "Select at least one asset category".to_string(),
        ));
    }

    let bonds_negative = all_bonds_negative(&selected, ranked);
    let table = base_allocation(score, bonds_negative);
    let target = table.restricted_to(&selected).ok_or_else(|| {
        Error::InvalidInput(format!(
            "Selected categories carry no target weight at risk score {}",
            score
        ))
    })?;

    let rf = config.risk_free_rate;
    let mut viable_by_category: Vec<(AssetCategory, f64, Vec<AssetMetrics>)> = Vec::new();
    let mut dropped_categories = Vec::new();
    let mut dropped_percentage = 0.0;

    for &category in &selected {
        let percentage = target.get(category);
        let mut candidates = ranked.get(&category).cloned().unwrap_or_default();
        rank_by_sharpe(&mut candidates);

        let count = instrument_count(category, score).min(candidates.len());
        let viable: Vec<AssetMetrics> = candidates
            .into_iter()
            .filter(|a| a.expected_return > -rf)
            .take(count)
            .collect();

        if viable.is_empty() {
            warn!(%category, percentage, "no viable instruments; category dropped");
            dropped_categories.push(category);
            dropped_percentage += percentage;
        } else {
            viable_by_category.push((category, percentage, viable));
        }
    }

    let kept_percentage: f64 = viable_by_category.iter().map(|(_, p, _)| p).sum();
    if viable_by_category.is_empty() || kept_percentage <= 0.0 {
        return Err(Error::NoViableAssets(
            "No selected category with a target weight has a viable instrument".to_string(),
        ));
    }

    let (scale, unallocated_amount) = match config.unallocated {
        UnallocatedPolicy::Drop => (1.0, amount * dropped_percentage / 100.0),
        UnallocatedPolicy::Redistribute => (100.0 / kept_percentage, 0.0),
    };

    let categories: BTreeMap<AssetCategory, CategoryAllocation> = viable_by_category
        .into_iter()
        .map(|(category, percentage, viable)| {
            let percentage = percentage * scale;
            let category_amount = amount * percentage / 100.0;
            (
                category,
                allocate_category(&viable, category_amount, percentage, amount),
            )
        })
        .collect();

    let metrics = portfolio_metrics(&categories, rf)?;

    info!(
        risk_score = score,
        amount,
        categories = categories.len(),
        dropped = dropped_categories.len(),
        expected_return = metrics.expected_return,
        volatility = metrics.volatility,
        "allocation complete"
    );

    Ok(PortfolioAllocation {
        risk_score: score,
        target,
        categories,
        metrics,
        unallocated_amount,
        dropped_categories,
        excluded_instruments: Vec::new(),
    })
}
