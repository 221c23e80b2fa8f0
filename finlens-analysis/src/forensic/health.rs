//! Composite health score (0-100).
//!
//! Six independent checks, each worth a named weight:
//!
//! | Check                         | Weight | Passes when                       |
//! |-------------------------------|--------|-----------------------------------|
//! | Cash-flow quality             | 20     | OperatingCashFlow ≥ NetIncome     |
//! | Interest coverage             | 15     | coverage > 3.0                    |
//! | Return on equity              | 20     | ROE > 15%                         |
//! | Z-Score band                  | 20     | safe (grey zone earns half)       |
//! | Net margin                    | 15     | margin > 10%                      |
//! | Leverage                      | 10     | D/E < 1.0 with positive equity    |
//!
//! [`HealthChecks::evaluate`] decides the checks; [`aggregate`] weighs them.

use serde::{Deserialize, Serialize};

use super::altman::ZScoreBand;
use super::earnings::EarningsQuality;
use crate::ratios::YearRatios;

pub const CASH_FLOW_QUALITY_WEIGHT: f64 = 20.0;
pub const INTEREST_COVERAGE_WEIGHT: f64 = 15.0;
pub const ROE_WEIGHT: f64 = 20.0;
pub const Z_SCORE_WEIGHT: f64 = 20.0;
pub const NET_MARGIN_WEIGHT: f64 = 15.0;
pub const LEVERAGE_WEIGHT: f64 = 10.0;

/// Share of the Z-Score weight earned in the grey zone.
pub const GREY_ZONE_CREDIT: f64 = 0.5;

pub const INTEREST_COVERAGE_THRESHOLD: f64 = 3.0;
pub const ROE_THRESHOLD: f64 = 0.15;
pub const NET_MARGIN_THRESHOLD: f64 = 0.10;
pub const DEBT_TO_EQUITY_THRESHOLD: f64 = 1.0;

/// Weight per check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthWeights {
    pub cash_flow_quality: f64,
    pub interest_coverage: f64,
    pub roe: f64,
    pub z_score: f64,
    pub net_margin: f64,
    pub leverage: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            cash_flow_quality: CASH_FLOW_QUALITY_WEIGHT,
            interest_coverage: INTEREST_COVERAGE_WEIGHT,
            roe: ROE_WEIGHT,
            z_score: Z_SCORE_WEIGHT,
            net_margin: NET_MARGIN_WEIGHT,
            leverage: LEVERAGE_WEIGHT,
        }
    }
}

impl HealthWeights {
    pub fn total(&self) -> f64 {
        self.cash_flow_quality
            + self.interest_coverage
            + self.roe
            + self.z_score
            + self.net_margin
            + self.leverage
    }
}

/// Outcome of each health check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthChecks {
    pub cash_flow_quality: bool,
    pub interest_coverage: bool,
    pub roe: bool,
    pub z_score_band: ZScoreBand,
    pub net_margin: bool,
    pub leverage: bool,
}

impl HealthChecks {
    /// Evaluate every check for one year.
    ///
    /// Leverage passes only when debt was reported and equity is positive;
    /// an unknown debt figure leaves DebtToEquity degenerate.
    pub fn evaluate(
        ratios: &YearRatios,
        z_score_band: ZScoreBand,
        earnings: &EarningsQuality,
        equity_positive: bool,
        debt_known: bool,
    ) -> Self {
        Self {
            cash_flow_quality: earnings.cash_backed(),
            interest_coverage: ratios.solvency.interest_coverage > INTEREST_COVERAGE_THRESHOLD,
            roe: ratios.management.roe > ROE_THRESHOLD,
            z_score_band,
            net_margin: ratios.profitability.net_margin > NET_MARGIN_THRESHOLD,
            leverage: debt_known
                && equity_positive
                && ratios.solvency.debt_to_equity < DEBT_TO_EQUITY_THRESHOLD,
        }
    }
}

/// Weighted sum of passed checks, clamped to [0, 100].
pub fn aggregate(checks: &HealthChecks, weights: &HealthWeights) -> f64 {
    let earned = |passed: bool, weight: f64| if passed { weight } else { 0.0 };

    let z_credit = match checks.z_score_band {
        ZScoreBand::Safe => weights.z_score,
        ZScoreBand::Grey => weights.z_score * GREY_ZONE_CREDIT,
        ZScoreBand::Distress => 0.0,
    };

    let score = earned(checks.cash_flow_quality, weights.cash_flow_quality)
        + earned(checks.interest_coverage, weights.interest_coverage)
        + earned(checks.roe, weights.roe)
        + z_credit
        + earned(checks.net_margin, weights.net_margin)
        + earned(checks.leverage, weights.leverage);

    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::CanonicalField;
    use crate::ratios::RatioEngine;
    use crate::record::CanonicalFinancialRecord;

    fn make_checks(passed: bool, band: ZScoreBand) -> HealthChecks {
        HealthChecks {
            cash_flow_quality: passed,
            interest_coverage: passed,
            roe: passed,
            z_score_band: band,
            net_margin: passed,
            leverage: passed,
        }
    }

    #[test]
    fn test_default_weights_sum_to_100() {
        assert!((HealthWeights::default().total() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_read_named_constants() {
        let weights = HealthWeights::default();
        assert_eq!(weights.cash_flow_quality, CASH_FLOW_QUALITY_WEIGHT);
        assert_eq!(weights.leverage, LEVERAGE_WEIGHT);
    }

    #[test]
    fn test_aggregate_extremes() {
        let weights = HealthWeights::default();
        assert_eq!(aggregate(&make_checks(true, ZScoreBand::Safe), &weights), 100.0);
        assert_eq!(aggregate(&make_checks(false, ZScoreBand::Distress), &weights), 0.0);
    }

    #[test]
    fn test_grey_zone_earns_half() {
        let weights = HealthWeights::default();
        let score = aggregate(&make_checks(false, ZScoreBand::Grey), &weights);
        assert_eq!(score, Z_SCORE_WEIGHT * GREY_ZONE_CREDIT);
    }

    #[test]
    fn test_single_check_isolated() {
        let mut checks = make_checks(false, ZScoreBand::Distress);
        checks.roe = true;
        assert_eq!(aggregate(&checks, &HealthWeights::default()), ROE_WEIGHT);
    }

    #[test]
    fn test_aggregate_clamps_custom_weights() {
        let weights = HealthWeights {
            cash_flow_quality: 90.0,
            interest_coverage: 90.0,
            ..HealthWeights::default()
        };
        assert_eq!(aggregate(&make_checks(true, ZScoreBand::Safe), &weights), 100.0);

        let negative = HealthWeights {
            roe: -40.0,
            ..HealthWeights::default()
        };
        let mut checks = make_checks(false, ZScoreBand::Distress);
        checks.roe = true;
        assert_eq!(aggregate(&checks, &negative), 0.0);
    }

    #[test]
    fn test_leverage_requires_known_debt() {
        let record = CanonicalFinancialRecord::new(2023)
            .with(CanonicalField::TotalEquity, 100.0)
            .with(CanonicalField::TotalDebt, 50.0);
        let ratios = RatioEngine::new().compute_year(&record, None);
        let earnings = EarningsQuality::evaluate(&record);

        let known = HealthChecks::evaluate(&ratios, ZScoreBand::Distress, &earnings, true, true);
        assert!(known.leverage);

        let unknown =
            HealthChecks::evaluate(&ratios, ZScoreBand::Distress, &earnings, true, false);
        assert!(!unknown.leverage);
    }
}
