//! Altman Z-Score.
//!
//! ```text
//! Z = 1.2A + 1.4B + 3.3C + 0.6D + 1.0E
//!   A = (CurrentAssets − CurrentLiabilities) / TotalAssets
//!   B = RetainedEarnings / TotalAssets
//!   C = OperatingIncome / TotalAssets
//!   D = MarketCapitalization / TotalLiabilities
//!   E = Revenue / TotalAssets
//! ```

use serde::{Deserialize, Serialize};

use crate::fields::CanonicalField;
use crate::ratios::safe_divide;
use crate::record::CanonicalFinancialRecord;

/// Above this the company is in the safe zone.
pub const Z_SAFE_THRESHOLD: f64 = 2.99;

/// At or below this the company is in the distress zone.
pub const Z_DISTRESS_THRESHOLD: f64 = 1.8;

const WEIGHT_A: f64 = 1.2;
const WEIGHT_B: f64 = 1.4;
const WEIGHT_C: f64 = 3.3;
const WEIGHT_D: f64 = 0.6;
const WEIGHT_E: f64 = 1.0;

const REQUIRED: [CanonicalField; 8] = [
    CanonicalField::CurrentAssets,
    CanonicalField::CurrentLiabilities,
    CanonicalField::TotalAssets,
    CanonicalField::RetainedEarnings,
    CanonicalField::OperatingIncome,
    CanonicalField::MarketCapitalization,
    CanonicalField::TotalLiabilities,
    CanonicalField::Revenue,
];

/// Bankruptcy-risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZScoreBand {
    Safe,
    Grey,
    Distress,
}

impl ZScoreBand {
    /// Band for a Z value: > 2.99 safe, (1.8, 2.99] grey, ≤ 1.8 distress.
    pub fn from_value(z: f64) -> Self {
        if z > Z_SAFE_THRESHOLD {
            Self::Safe
        } else if z > Z_DISTRESS_THRESHOLD {
            Self::Grey
        } else {
            Self::Distress
        }
    }
}

impl std::fmt::Display for ZScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZScoreBand::Safe => write!(f, "Safe"),
            ZScoreBand::Grey => write!(f, "Grey Zone"),
            ZScoreBand::Distress => write!(f, "Distress"),
        }
    }
}

/// The five Z-Score ratios before weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZScoreComponents {
    pub working_capital_to_assets: f64,
    pub retained_earnings_to_assets: f64,
    pub operating_income_to_assets: f64,
    pub market_cap_to_liabilities: f64,
    pub revenue_to_assets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScore {
    pub value: f64,
    pub band: ZScoreBand,
    pub components: ZScoreComponents,
    /// Inputs that were unknown and contributed the degenerate value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_inputs: Vec<CanonicalField>,
}

/// Compute the Z-Score for one year.
pub fn altman_z(record: &CanonicalFinancialRecord) -> ZScore {
    let get = |field| record.get(field);
    let total_assets = get(CanonicalField::TotalAssets);
    let working_capital = get(CanonicalField::CurrentAssets)
        .zip(get(CanonicalField::CurrentLiabilities))
        .map(|(ca, cl)| ca - cl);

    let components = ZScoreComponents {
        working_capital_to_assets: safe_divide(working_capital, total_assets),
        retained_earnings_to_assets: safe_divide(get(CanonicalField::RetainedEarnings), total_assets),
        operating_income_to_assets: safe_divide(get(CanonicalField::OperatingIncome), total_assets),
        market_cap_to_liabilities: safe_divide(
            get(CanonicalField::MarketCapitalization),
            get(CanonicalField::TotalLiabilities),
        ),
        revenue_to_assets: safe_divide(get(CanonicalField::Revenue), total_assets),
    };

    let value = WEIGHT_A * components.working_capital_to_assets
        + WEIGHT_B * components.retained_earnings_to_assets
        + WEIGHT_C * components.operating_income_to_assets
        + WEIGHT_D * components.market_cap_to_liabilities
        + WEIGHT_E * components.revenue_to_assets;

    ZScore {
        value,
        band: ZScoreBand::from_value(value),
        components,
        missing_inputs: REQUIRED.into_iter().filter(|f| !record.has(*f)).collect(),
    }
}
