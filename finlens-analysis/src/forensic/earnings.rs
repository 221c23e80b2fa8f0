//! Earnings-quality flag: are reported profits backed by operating cash?

use serde::{Deserialize, Serialize};

use crate::fields::CanonicalField;
use crate::record::CanonicalFinancialRecord;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarningsQuality {
    /// Operating cash flow below net income
    pub is_paper_profits: bool,
    /// NetIncome − OperatingCashFlow
    pub earnings_gap: f64,
    /// False when either input was unknown and the flag defaulted
    pub assessed: bool,
}

impl EarningsQuality {
    /// Compare operating cash flow with net income for one year.
    ///
    /// With either figure unknown the result is "not paper profits" with a
    /// zero gap and `assessed == false`.
    pub fn evaluate(record: &CanonicalFinancialRecord) -> Self {
        match (
            record.get(CanonicalField::NetIncome),
            record.get(CanonicalField::OperatingCashFlow),
        ) {
            (Some(net_income), Some(operating_cash)) => Self {
                is_paper_profits: operating_cash < net_income,
                earnings_gap: net_income - operating_cash,
                assessed: true,
            },
            _ => Self {
                is_paper_profits: false,
                earnings_gap: 0.0,
                assessed: false,
            },
        }
    }

    /// Operating cash flow at least matches net income.
    pub fn cash_backed(&self) -> bool {
        self.assessed && !self.is_paper_profits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_profits() {
        let record = CanonicalFinancialRecord::new(2023)
            .with(CanonicalField::NetIncome, 100_000.0)
            .with(CanonicalField::OperatingCashFlow, 20_000.0);
        let quality = EarningsQuality::evaluate(&record);

        assert!(quality.is_paper_profits);
        assert_eq!(quality.earnings_gap, 80_000.0);
        assert!(!quality.cash_backed());
    }

    #[test]
    fn test_cash_backed_earnings() {
        let record = CanonicalFinancialRecord::new(2023)
            .with(CanonicalField::NetIncome, 100.0)
            .with(CanonicalField::OperatingCashFlow, 100.0);
        let quality = EarningsQuality::evaluate(&record);

        assert!(!quality.is_paper_profits);
        assert!(quality.cash_backed());
    }

    #[test]
    fn test_missing_inputs() {
        let record = CanonicalFinancialRecord::new(2023).with(CanonicalField::NetIncome, 100.0);
        let quality = EarningsQuality::evaluate(&record);

        assert!(!quality.is_paper_profits);
        assert_eq!(quality.earnings_gap, 0.0);
        assert!(!quality.assessed);
        assert!(!quality.cash_backed());
    }
}
