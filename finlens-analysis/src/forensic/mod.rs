//! Forensic scoring: bankruptcy risk, manipulation risk, earnings quality
//! and a composite health score.
//!
//! # Usage
//!
//! ```ignore
//! use finlens_analysis::forensic::ForensicAnalyzer;
//!
//! let analyzer = ForensicAnalyzer::new();
//! let (scores, approximations) = analyzer.score(latest, prior, &latest_ratios);
//! if scores.m_score.likely_manipulation() { /* ... */ }
//! ```

pub mod altman;
pub mod beneish;
pub mod earnings;
pub mod health;

use serde::{Deserialize, Serialize};

use crate::fallback::{Approximation, ApproximationKind};
use crate::fields::CanonicalField;
use crate::ratios::YearRatios;
use crate::record::CanonicalFinancialRecord;

pub use altman::{altman_z, ZScore, ZScoreBand, ZScoreComponents};
pub use beneish::{
    beneish_m, BeneishIndices, MScore, MScoreStatus, M_SCORE_MANIPULATION_THRESHOLD,
    M_SCORE_SAFE_PLACEHOLDER, NEUTRAL_INDEX,
};
pub use earnings::EarningsQuality;
pub use health::{aggregate, HealthChecks, HealthWeights};

/// Forensic results for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForensicScoreSet {
    pub year: i32,
    pub z_score: ZScore,
    pub m_score: MScore,
    /// 0-100
    pub health_score: f64,
    pub health_checks: HealthChecks,
    pub earnings_quality: EarningsQuality,
}

impl ForensicScoreSet {
    pub fn is_paper_profits(&self) -> bool {
        self.earnings_quality.is_paper_profits
    }

    pub fn earnings_gap(&self) -> f64 {
        self.earnings_quality.earnings_gap
    }
}

/// Configuration for forensic scoring.
#[derive(Debug, Clone, Copy)]
pub struct ForensicConfig {
    /// M-Score reported when the prior year is unusable
    pub m_score_placeholder: f64,
    pub health_weights: HealthWeights,
}

impl Default for ForensicConfig {
    fn default() -> Self {
        Self {
            m_score_placeholder: M_SCORE_SAFE_PLACEHOLDER,
            health_weights: HealthWeights::default(),
        }
    }
}

/// Runs every forensic score for a year.
#[derive(Debug, Clone, Default)]
pub struct ForensicAnalyzer {
    config: ForensicConfig,
}

impl ForensicAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForensicConfig) -> Self {
        Self { config }
    }

    /// Score `current` using `prior` for the trend-based M-Score.
    ///
    /// Never fails: degraded inputs come back as approximations.
    pub fn score(
        &self,
        current: &CanonicalFinancialRecord,
        prior: Option<&CanonicalFinancialRecord>,
        ratios: &YearRatios,
    ) -> (ForensicScoreSet, Vec<Approximation>) {
        let year = Some(current.year);
        let mut approximations = Vec::new();

        let z_score = altman_z(current);
        if !z_score.missing_inputs.is_empty() {
            approximations.push(Approximation::new(
                year,
                "ZScore",
                ApproximationKind::MissingInput,
                format!("unknown inputs scored as 0: {}", join_fields(&z_score.missing_inputs)),
            ));
        }

        let m_score = beneish_m(current, prior, self.config.m_score_placeholder);
        match &m_score.status {
            MScoreStatus::Computed => {}
            MScoreStatus::Approximated { indices } => {
                approximations.push(Approximation::new(
                    year,
                    "MScore",
                    ApproximationKind::MissingInput,
                    format!("neutral {NEUTRAL_INDEX} used for {}", indices.join(", ")),
                ));
            }
            MScoreStatus::Placeholder { reason } => {
                tracing::warn!(year = current.year, %reason, "M-Score replaced by placeholder");
                approximations.push(Approximation::new(
                    year,
                    "MScore",
                    ApproximationKind::Placeholder,
                    format!("{reason}; reported {}", m_score.value),
                ));
            }
        }

        let earnings_quality = EarningsQuality::evaluate(current);
        if !earnings_quality.assessed {
            approximations.push(Approximation::new(
                year,
                "EarningsQuality",
                ApproximationKind::MissingInput,
                "NetIncome or OperatingCashFlow unknown; not flagged",
            ));
        }

        let equity_positive = current
            .get(CanonicalField::TotalEquity)
            .is_some_and(|equity| equity > 0.0);
        let debt_known = current.has(CanonicalField::TotalDebt);
        let health_checks = HealthChecks::evaluate(
            ratios,
            z_score.band,
            &earnings_quality,
            equity_positive,
            debt_known,
        );
        let health_score = aggregate(&health_checks, &self.config.health_weights);

        tracing::debug!(
            year = current.year,
            z = z_score.value,
            m = m_score.value,
            health = health_score,
            "Computed forensic scores"
        );

        let scores = ForensicScoreSet {
            year: current.year,
            z_score,
            m_score,
            health_score,
            health_checks,
            earnings_quality,
        };
        (scores, approximations)
    }
}

fn join_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(CanonicalField::name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratios::RatioEngine;

    fn make_healthy(year: i32) -> CanonicalFinancialRecord {
        CanonicalFinancialRecord::new(year)
            .with(CanonicalField::Revenue, 1000.0)
            .with(CanonicalField::CostOfGoodsSold, 500.0)
            .with(CanonicalField::OperatingIncome, 300.0)
            .with(CanonicalField::NetIncome, 200.0)
            .with(CanonicalField::InterestExpense, 20.0)
            .with(CanonicalField::OperatingCashFlow, 260.0)
            .with(CanonicalField::TotalAssets, 1000.0)
            .with(CanonicalField::CurrentAssets, 500.0)
            .with(CanonicalField::CurrentLiabilities, 200.0)
            .with(CanonicalField::TotalLiabilities, 400.0)
            .with(CanonicalField::TotalEquity, 600.0)
            .with(CanonicalField::TotalDebt, 200.0)
            .with(CanonicalField::RetainedEarnings, 400.0)
            .with(CanonicalField::MarketCapitalization, 2000.0)
            .with(CanonicalField::Receivables, 100.0)
            .with(CanonicalField::NetPpe, 300.0)
    }

    fn score(
        current: &CanonicalFinancialRecord,
        prior: Option<&CanonicalFinancialRecord>,
    ) -> (ForensicScoreSet, Vec<Approximation>) {
        let ratios = RatioEngine::new().compute_year(current, prior);
        ForensicAnalyzer::new().score(current, prior, &ratios)
    }

    #[test]
    fn test_healthy_company_scores_full_marks() {
        let (scores, approximations) = score(&make_healthy(2023), Some(&make_healthy(2022)));

        assert_eq!(scores.z_score.band, ZScoreBand::Safe);
        assert_eq!(scores.m_score.status, MScoreStatus::Computed);
        assert!(!scores.is_paper_profits());
        assert_eq!(scores.health_score, 100.0);
        assert!(approximations.is_empty());
    }

    #[test]
    fn test_missing_prior_uses_placeholder_and_completes() {
        let (scores, approximations) = score(&make_healthy(2023), None);

        assert!(scores.m_score.is_placeholder());
        assert_eq!(scores.m_score.value, M_SCORE_SAFE_PLACEHOLDER);
        assert!(approximations
            .iter()
            .any(|a| a.field == "MScore" && a.kind == ApproximationKind::Placeholder));
        assert_eq!(scores.health_score, 100.0);
    }

    #[test]
    fn test_custom_placeholder() {
        let analyzer = ForensicAnalyzer::with_config(ForensicConfig {
            m_score_placeholder: -3.0,
            ..ForensicConfig::default()
        });
        let record = make_healthy(2023);
        let ratios = RatioEngine::new().compute_year(&record, None);
        let (scores, _) = analyzer.score(&record, None, &ratios);
        assert_eq!(scores.m_score.value, -3.0);
    }

    #[test]
    fn test_scenario_b_paper_profits() {
        let record = CanonicalFinancialRecord::new(2023)
            .with(CanonicalField::NetIncome, 100_000.0)
            .with(CanonicalField::OperatingCashFlow, 20_000.0);
        let (scores, _) = score(&record, None);

        assert!(scores.is_paper_profits());
        assert_eq!(scores.earnings_gap(), 80_000.0);
        assert!(!scores.health_checks.cash_flow_quality);
    }

    #[test]
    fn test_negative_equity_fails_leverage() {
        let record = make_healthy(2023).with(CanonicalField::TotalEquity, -50.0);
        let (scores, _) = score(&record, None);
        assert!(!scores.health_checks.leverage);
    }

    #[test]
    fn test_unknown_debt_fails_leverage() {
        let record = CanonicalFinancialRecord::new(2023).with(CanonicalField::TotalEquity, 100.0);
        let (scores, _) = score(&record, None);

        assert!(!scores.health_checks.leverage);
        assert_eq!(scores.health_score, 0.0);
    }

    #[test]
    fn test_empty_record_degrades_without_panicking() {
        let (scores, approximations) = score(&CanonicalFinancialRecord::new(2023), None);
        assert_eq!(scores.z_score.value, 0.0);
        assert_eq!(scores.health_score, 0.0);
        assert_eq!(approximations.len(), 3);
    }
}
