//! Industry-specific ratio extensions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::formulas::safe_divide;
use crate::fields::CanonicalField;
use crate::record::CanonicalFinancialRecord;

/// Industry family inferred from a free-form industry label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorProfile {
    Banking,
    Technology,
    Automotive,
    General,
}

impl SectorProfile {
    /// Match an industry label (case-insensitive substring).
    pub fn from_industry(label: Option<&str>) -> Self {
        let Some(label) = label.map(str::to_lowercase) else {
            return Self::General;
        };

        if label.contains("bank") || label.contains("financial") {
            Self::Banking
        } else if label.contains("technology") || label.contains("software") {
            Self::Technology
        } else if label.contains("auto") || label.contains("vehicle") {
            Self::Automotive
        } else {
            Self::General
        }
    }

    /// Sector ratios for one year, keyed by ratio name.
    pub fn compute(&self, record: &CanonicalFinancialRecord) -> BTreeMap<&'static str, f64> {
        let get = |field| record.get(field);
        let mut ratios = BTreeMap::new();

        match self {
            SectorProfile::Banking => {
                ratios.insert(
                    "LoanToDeposit",
                    safe_divide(get(CanonicalField::Loans), get(CanonicalField::Deposits)),
                );
                ratios.insert(
                    "NetInterestMargin",
                    safe_divide(
                        get(CanonicalField::NetInterestIncome),
                        get(CanonicalField::EarningAssets),
                    ),
                );
            }
            SectorProfile::Technology => {
                ratios.insert(
                    "RnDToSales",
                    safe_divide(
                        get(CanonicalField::ResearchAndDevelopment),
                        get(CanonicalField::Revenue),
                    ),
                );
            }
            SectorProfile::Automotive => {
                ratios.insert(
                    "InventoryToSales",
                    safe_divide(get(CanonicalField::Inventory), get(CanonicalField::Revenue)),
                );
            }
            SectorProfile::General => {}
        }

        ratios
    }
}

impl std::fmt::Display for SectorProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectorProfile::Banking => write!(f, "Banking"),
            SectorProfile::Technology => write!(f, "Technology"),
            SectorProfile::Automotive => write!(f, "Automotive"),
            SectorProfile::General => write!(f, "General"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_industry() {
        assert_eq!(SectorProfile::from_industry(Some("Regional Banks")), SectorProfile::Banking);
        assert_eq!(SectorProfile::from_industry(Some("Financial Services")), SectorProfile::Banking);
        assert_eq!(SectorProfile::from_industry(Some("Software—Infrastructure")), SectorProfile::Technology);
        assert_eq!(SectorProfile::from_industry(Some("Auto Manufacturers")), SectorProfile::Automotive);
        assert_eq!(SectorProfile::from_industry(Some("Utilities")), SectorProfile::General);
        assert_eq!(SectorProfile::from_industry(None), SectorProfile::General);
    }

    #[test]
    fn test_banking_ratios() {
        let record = CanonicalFinancialRecord::new(2023)
            .with(CanonicalField::Loans, 800.0)
            .with(CanonicalField::Deposits, 1000.0)
            .with(CanonicalField::NetInterestIncome, 30.0);

        let ratios = SectorProfile::Banking.compute(&record);
        assert!((ratios["LoanToDeposit"] - 0.8).abs() < 1e-12);
        assert_eq!(ratios["NetInterestMargin"], 0.0);
    }

    #[test]
    fn test_general_has_no_ratios() {
        let record = CanonicalFinancialRecord::new(2023).with(CanonicalField::Revenue, 1.0);
        assert!(SectorProfile::General.compute(&record).is_empty());
    }
}
