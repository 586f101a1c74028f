//! Risk score discretization and category target tables.

use crate::types::RiskAllocation;
use crate::{Error, Result};

/// Tables indexed by risk score 1-5, in
/// stocks / bonds / crypto / mutual_funds / emerging_markets / etfs order.
const BASE_ALLOCATIONS: [RiskAllocation; 5] = [
    RiskAllocation::from_array([20.0, 50.0, 0.0, 15.0, 5.0, 10.0]),
    RiskAllocation::from_array([30.0, 40.0, 0.0, 15.0, 5.0, 10.0]),
    RiskAllocation::from_array([40.0, 25.0, 5.0, 15.0, 5.0, 10.0]),
    RiskAllocation::from_array([50.0, 15.0, 10.0, 10.0, 5.0, 10.0]),
    RiskAllocation::from_array([60.0, 5.0, 15.0, 5.0, 5.0, 10.0]),
];

/// Used instead of [`BASE_ALLOCATIONS`] when every bond has a negative
/// expected return; the bond share moves to the other categories.
const NO_BOND_ALLOCATIONS: [RiskAllocation; 5] = [
    RiskAllocation::from_array([35.0, 0.0, 0.0, 40.0, 10.0, 15.0]),
    RiskAllocation::from_array([45.0, 0.0, 0.0, 35.0, 10.0, 10.0]),
    RiskAllocation::from_array([50.0, 0.0, 10.0, 25.0, 5.0, 10.0]),
    RiskAllocation::from_array([55.0, 0.0, 15.0, 15.0, 5.0, 10.0]),
    RiskAllocation::from_array([65.0, 0.0, 15.0, 10.0, 5.0, 5.0]),
];

/// Discretize a 0-100 risk tolerance into a score of 1-5.
///
/// Breakpoints are inclusive upper bounds: 20, 40, 60, 80.
pub fn risk_score(risk_tolerance: f64) -> Result<u8> {
    if !risk_tolerance.is_finite() || !(0.0..=100.0).contains(&risk_tolerance) {
        return Err(Error::InvalidInput(format!(
            "Risk tolerance must be within 0-100, got {}",
            risk_tolerance
        )));
    }

    let score = if risk_tolerance <= 20.0 {
        1
    } else if risk_tolerance <= 40.0 {
        2
    } else if risk_tolerance <= 60.0 {
        3
    } else if risk_tolerance <= 80.0 {
        4
    } else {
        5
    };
    Ok(score)
}

/// Category targets for a risk score.
///
/// Scores outside 1-5 are clamped.
pub fn base_allocation(score: u8, all_bonds_negative: bool) -> RiskAllocation {
    let idx = usize::from(score.clamp(1, 5) - 1);
    if all_bonds_negative {
        NO_BOND_ALLOCATIONS[idx]
    } else {
        BASE_ALLOCATIONS[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_score_breakpoints() {
        let cases = [
            (0.0, 1),
            (10.0, 1),
            (20.0, 1),
            (20.5, 2),
            (40.0, 2),
            (41.0, 3),
            (60.0, 3),
            (79.9, 4),
            (80.0, 4),
            (90.0, 5),
            (100.0, 5),
        ];
        for (tolerance, expected) in cases {
            assert_eq!(risk_score(tolerance).unwrap(), expected, "tolerance {}", tolerance);
        }
    }

    #[test]
    fn test_risk_score_out_of_range() {
        assert!(matches!(risk_score(-1.0), Err(Error::InvalidInput(_))));
        assert!(matches!(risk_score(100.5), Err(Error::InvalidInput(_))));
        assert!(matches!(risk_score(f64::NAN), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_every_table_sums_to_100() {
        for score in 1..=5 {
            assert_eq!(base_allocation(score, false).total(), 100.0);
            assert_eq!(base_allocation(score, true).total(), 100.0);
            assert_eq!(base_allocation(score, true).bonds, 0.0);
        }
    }

    #[test]
    fn test_conservative_table() {
        let table = base_allocation(1, false);
        assert_eq!(
            table,
            RiskAllocation {
                stocks: 20.0,
                bonds: 50.0,
                crypto: 0.0,
                mutual_funds: 15.0,
                emerging_markets: 5.0,
                etfs: 10.0,
            }
        );
    }

    #[test]
    fn test_aggressive_no_bond_table() {
        let table = base_allocation(5, true);
        assert_eq!(
            table,
            RiskAllocation {
                stocks: 65.0,
                bonds: 0.0,
                crypto: 15.0,
                mutual_funds: 10.0,
                emerging_markets: 5.0,
                etfs: 5.0,
            }
        );
    }
}
