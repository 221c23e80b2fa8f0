//! Shared formula primitives and constants.
//!
//! Every division in the crate goes through [`checked_divide`], usually via
//! [`safe_divide`]. Bump [`FORMULA_VERSION`] whenever a formula or constant
//! here changes.

use serde::{Deserialize, Serialize};

use crate::fields::CanonicalField;
use crate::record::CanonicalFinancialRecord;

/// Version stamp carried by every ratio report.
pub const FORMULA_VERSION: &str = "1.2.0";

/// Value reported for a ratio whose denominator is zero or unknown.
pub const DEGENERATE: f64 = 0.0;

/// Day count used by DSO, DSI and DPO.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Tax rate assumed when no effective rate can be derived.
pub const DEFAULT_TAX_RATE: f64 = 0.25;

/// Divide, or `None` when either side is unknown, the denominator is zero
/// (of either sign) or non-finite, or the quotient is not finite.
pub fn checked_divide(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = numerator.zip(denominator)?;
    if d == 0.0 || !d.is_finite() || !n.is_finite() {
        return None;
    }
    Some(n / d).filter(|q| q.is_finite())
}

/// [`checked_divide`] with a fixed fallback for the degenerate cases.
pub fn safe_divide_or(numerator: Option<f64>, denominator: Option<f64>, default: f64) -> f64 {
    checked_divide(numerator, denominator).unwrap_or(default)
}

/// [`safe_divide_or`] with the crate-wide [`DEGENERATE`] value.
pub fn safe_divide(numerator: Option<f64>, denominator: Option<f64>) -> f64 {
    safe_divide_or(numerator, denominator, DEGENERATE)
}

/// Where the tax rate behind a NOPAT figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRateSource {
    /// IncomeTaxExpense / PretaxIncome
    Effective,
    /// The configured default
    Default,
}

/// Tax rate applied to operating income.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxRate {
    pub rate: f64,
    pub source: TaxRateSource,
}

/// Effective tax rate when derivable and plausible, otherwise `default`.
pub fn effective_tax_rate(record: &CanonicalFinancialRecord, default: f64) -> TaxRate {
    let tax = record.get(CanonicalField::IncomeTaxExpense);
    let pretax = record.get(CanonicalField::PretaxIncome);

    let effective = match (tax, pretax) {
        (Some(tax), Some(pretax)) if pretax > 0.0 => Some(tax / pretax),
        _ => None,
    };

    match effective.filter(|rate| (0.0..=1.0).contains(rate)) {
        Some(rate) => TaxRate {
            rate,
            source: TaxRateSource::Effective,
        },
        None => TaxRate {
            rate: default,
            source: TaxRateSource::Default,
        },
    }
}

/// Net operating profit after tax, if operating income is known.
pub fn nopat(record: &CanonicalFinancialRecord, tax_rate: f64) -> Option<f64> {
    record
        .get(CanonicalField::OperatingIncome)
        .map(|oi| oi * (1.0 - tax_rate))
}

/// TotalEquity + TotalDebt − Cash, with unknown components counted as zero.
///
/// Returns the total and the components that were missing.
pub fn invested_capital(record: &CanonicalFinancialRecord) -> (f64, Vec<CanonicalField>) {
    let mut missing = Vec::new();
    let mut component = |field: CanonicalField| {
        record.get(field).unwrap_or_else(|| {
            missing.push(field);
            0.0
        })
    };

    let equity = component(CanonicalField::TotalEquity);
    let debt = component(CanonicalField::TotalDebt);
    let cash = component(CanonicalField::Cash);
    (equity + debt - cash, missing)
}
