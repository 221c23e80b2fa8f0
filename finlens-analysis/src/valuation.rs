//! Valuation snapshot: NOPAT, invested capital and EVA.
//!
//! ```text
//! InvestedCapital = TotalEquity + TotalDebt − Cash
//! NOPAT           = OperatingIncome × (1 − taxRate)
//! EVA(wacc)       = NOPAT − InvestedCapital × wacc
//! ```
//!
//! The snapshot is computed once; [`ValuationSnapshot::eva`] can then be
//! re-evaluated for any cost of capital.

use finlens_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::fallback::{Approximation, ApproximationKind};
use crate::fields::CanonicalField;
use crate::ratios::{effective_tax_rate, invested_capital, nopat, TaxRate, TaxRateSource};
use crate::record::CanonicalFinancialRecord;

/// Cost of capital used when the caller supplies none.
pub const DEFAULT_WACC: f64 = 0.10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSnapshot {
    pub year: i32,
    pub invested_capital: f64,
    pub nopat: f64,
    pub tax_rate: TaxRate,
}

impl ValuationSnapshot {
    /// Compute the snapshot for one year.
    ///
    /// Unknown components count as zero and are returned as approximations.
    pub fn compute(
        record: &CanonicalFinancialRecord,
        default_tax_rate: f64,
    ) -> (Self, Vec<Approximation>) {
        let year = Some(record.year);
        let tax_rate = effective_tax_rate(record, default_tax_rate);
        let (invested, missing) = invested_capital(record);

        let mut approximations: Vec<Approximation> = missing
            .iter()
            .map(|field| {
                Approximation::new(
                    year,
                    field.name(),
                    ApproximationKind::MissingInput,
                    "counted as 0 in invested capital",
                )
            })
            .collect();

        let nopat = nopat(record, tax_rate.rate).unwrap_or_else(|| {
            approximations.push(Approximation::new(
                year,
                CanonicalField::OperatingIncome.name(),
                ApproximationKind::MissingInput,
                "counted as 0 in NOPAT",
            ));
            0.0
        });

        if tax_rate.source == TaxRateSource::Default {
            approximations.push(Approximation::new(
                year,
                "TaxRate",
                ApproximationKind::DefaultAssumption,
                format!("effective rate unavailable; {:.1}% assumed", tax_rate.rate * 100.0),
            ));
        }

        let snapshot = Self {
            year: record.year,
            invested_capital: invested,
            nopat,
            tax_rate,
        };
        (snapshot, approximations)
    }

    /// Economic value added at the given cost of capital.
    ///
    /// Fails with [`Error::InvalidInput`] for a negative or non-finite rate.
    pub fn eva(&self, wacc: f64) -> Result<f64> {
        validate_wacc(wacc)?;
        Ok(self.nopat - self.invested_capital * wacc)
    }
}

/// A cost of capital must be finite and non-negative.
pub fn validate_wacc(wacc: f64) -> Result<()> {
    if wacc.is_finite() && wacc >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "WACC must be a finite, non-negative rate (got {wacc})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> CanonicalFinancialRecord {
        CanonicalFinancialRecord::new(2023)
            .with(CanonicalField::OperatingIncome, 200.0)
            .with(CanonicalField::TotalEquity, 800.0)
            .with(CanonicalField::TotalDebt, 400.0)
            .with(CanonicalField::Cash, 200.0)
    }

    #[test]
    fn test_snapshot_with_default_tax() {
        let (snapshot, approximations) = ValuationSnapshot::compute(&make_record(), 0.25);

        assert_eq!(snapshot.invested_capital, 1000.0);
        assert_eq!(snapshot.nopat, 150.0);
        assert_eq!(snapshot.tax_rate.source, TaxRateSource::Default);
        assert_eq!(approximations.len(), 1);
        assert_eq!(approximations[0].kind, ApproximationKind::DefaultAssumption);
    }

    #[test]
    fn test_eva_is_reevaluable() {
        let (snapshot, _) = ValuationSnapshot::compute(&make_record(), 0.25);

        assert!((snapshot.eva(DEFAULT_WACC).unwrap() - 50.0).abs() < 1e-9);
        assert!((snapshot.eva(0.15).unwrap() - 0.0).abs() < 1e-9);
        assert!((snapshot.eva(0.0).unwrap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_eva_rejects_invalid_wacc() {
        let (snapshot, _) = ValuationSnapshot::compute(&make_record(), 0.25);
        assert!(snapshot.eva(-0.01).unwrap_err().is_invalid_input());
        assert!(snapshot.eva(f64::NAN).is_err());
        assert!(snapshot.eva(f64::INFINITY).is_err());
    }

    #[test]
    fn test_missing_components_are_zero_and_noted() {
        let record = CanonicalFinancialRecord::new(2023).with(CanonicalField::TotalEquity, 500.0);
        let (snapshot, approximations) = ValuationSnapshot::compute(&record, 0.25);

        assert_eq!(snapshot.invested_capital, 500.0);
        assert_eq!(snapshot.nopat, 0.0);
        let fields: Vec<&str> = approximations.iter().map(|a| a.field.as_str()).collect();
        assert!(fields.contains(&"TotalDebt"));
        assert!(fields.contains(&"Cash"));
        assert!(fields.contains(&"OperatingIncome"));
    }

    #[test]
    fn test_effective_tax_rate_is_used() {
        let record = make_record()
            .with(CanonicalField::PretaxIncome, 180.0)
            .with(CanonicalField::IncomeTaxExpense, 36.0);
        let (snapshot, approximations) = ValuationSnapshot::compute(&record, 0.25);

        assert_eq!(snapshot.tax_rate.source, TaxRateSource::Effective);
        assert!((snapshot.nopat - 160.0).abs() < 1e-9);
        assert!(approximations.is_empty());
    }
}
