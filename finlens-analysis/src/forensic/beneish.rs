//! Beneish M-Score, five-variable form.
//!
//! ```text
//! M = −6.065 + 0.823·DSRI + 0.906·GMI + 0.593·AQI + 0.717·SGI + 0.107·LVGI
//! ```
//!
//! The score needs the prior year. Without a usable prior year (missing, or
//! with zero/unknown Revenue or TotalAssets) the score is
//! [`M_SCORE_SAFE_PLACEHOLDER`], flagged as a placeholder. An individual
//! index that cannot be computed is set to [`NEUTRAL_INDEX`].

use serde::{Deserialize, Serialize};

use crate::fields::CanonicalField;
use crate::ratios::checked_divide;
use crate::record::CanonicalFinancialRecord;

/// Score reported when the prior year is unusable.
pub const M_SCORE_SAFE_PLACEHOLDER: f64 = -2.50;

/// Scores above this suggest likely earnings manipulation.
pub const M_SCORE_MANIPULATION_THRESHOLD: f64 = -1.78;

/// Stand-in for an index that cannot be computed (no year-over-year change).
pub const NEUTRAL_INDEX: f64 = 1.0;

const INTERCEPT: f64 = -6.065;
const DSRI_WEIGHT: f64 = 0.823;
const GMI_WEIGHT: f64 = 0.906;
const AQI_WEIGHT: f64 = 0.593;
const SGI_WEIGHT: f64 = 0.717;
const LVGI_WEIGHT: f64 = 0.107;

/// How the M-Score value was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MScoreStatus {
    Computed,
    /// Some indices were replaced by the neutral value
    Approximated { indices: Vec<String> },
    /// The whole score is the documented placeholder
    Placeholder { reason: String },
}

/// Year-over-year indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeneishIndices {
    /// Days sales in receivables index
    pub dsri: f64,
    /// Gross margin index (prior over current)
    pub gmi: f64,
    /// Asset quality index
    pub aqi: f64,
    /// Sales growth index
    pub sgi: f64,
    /// Leverage index
    pub lvgi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MScore {
    pub value: f64,
    pub status: MScoreStatus,
    pub indices: Option<BeneishIndices>,
}

impl MScore {
    /// Above the −1.78 threshold. Always false for a placeholder.
    pub fn likely_manipulation(&self) -> bool {
        !self.is_placeholder() && self.value > M_SCORE_MANIPULATION_THRESHOLD
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.status, MScoreStatus::Placeholder { .. })
    }

    fn placeholder(value: f64, reason: impl Into<String>) -> Self {
        Self {
            value,
            status: MScoreStatus::Placeholder {
                reason: reason.into(),
            },
            indices: None,
        }
    }
}

/// Compute the M-Score for `current` against `prior`.
///
/// `placeholder` is the value reported when the prior year is unusable,
/// normally [`M_SCORE_SAFE_PLACEHOLDER`].
pub fn beneish_m(
    current: &CanonicalFinancialRecord,
    prior: Option<&CanonicalFinancialRecord>,
    placeholder: f64,
) -> MScore {
    let Some(prior) = prior else {
        return MScore::placeholder(placeholder, "no prior-year record");
    };
    for field in [CanonicalField::Revenue, CanonicalField::TotalAssets] {
        if prior.get(field).map_or(true, |v| v == 0.0) {
            return MScore::placeholder(
                placeholder,
                format!("prior-year {field} is zero or missing"),
            );
        }
    }

    let raw = [
        ("DSRI", dsri(current, prior)),
        ("GMI", gmi(current, prior)),
        ("AQI", aqi(current, prior)),
        ("SGI", sgi(current, prior)),
        ("LVGI", lvgi(current, prior)),
    ];
    let neutralized: Vec<String> = raw
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| (*name).to_string())
        .collect();
    let [dsri, gmi, aqi, sgi, lvgi] = raw.map(|(_, value)| value.unwrap_or(NEUTRAL_INDEX));

    let indices = BeneishIndices {
        dsri,
        gmi,
        aqi,
        sgi,
        lvgi,
    };
    let value = INTERCEPT
        + DSRI_WEIGHT * dsri
        + GMI_WEIGHT * gmi
        + AQI_WEIGHT * aqi
        + SGI_WEIGHT * sgi
        + LVGI_WEIGHT * lvgi;

    let status = if neutralized.is_empty() {
        MScoreStatus::Computed
    } else {
        MScoreStatus::Approximated {
            indices: neutralized,
        }
    };

    MScore {
        value,
        status,
        indices: Some(indices),
    }
}

fn share_of(
    record: &CanonicalFinancialRecord,
    numerator: CanonicalField,
    denominator: CanonicalField,
) -> Option<f64> {
    checked_divide(record.get(numerator), record.get(denominator))
}

fn gross_margin(record: &CanonicalFinancialRecord) -> Option<f64> {
    let revenue = record.get(CanonicalField::Revenue);
    let gross_profit = record.get(CanonicalField::GrossProfit).or_else(|| {
        revenue
            .zip(record.get(CanonicalField::CostOfGoodsSold))
            .map(|(rev, cogs)| rev - cogs)
    });
    checked_divide(gross_profit, revenue)
}

/// 1 − (CurrentAssets + NetPPE) / TotalAssets
fn soft_asset_share(record: &CanonicalFinancialRecord) -> Option<f64> {
    let hard = record
        .get(CanonicalField::CurrentAssets)?
        + record.get(CanonicalField::NetPpe)?;
    checked_divide(Some(hard), record.get(CanonicalField::TotalAssets)).map(|share| 1.0 - share)
}

fn dsri(current: &CanonicalFinancialRecord, prior: &CanonicalFinancialRecord) -> Option<f64> {
    checked_divide(
        share_of(current, CanonicalField::Receivables, CanonicalField::Revenue),
        share_of(prior, CanonicalField::Receivables, CanonicalField::Revenue),
    )
}

fn gmi(current: &CanonicalFinancialRecord, prior: &CanonicalFinancialRecord) -> Option<f64> {
    checked_divide(gross_margin(prior), gross_margin(current))
}

fn aqi(current: &CanonicalFinancialRecord, prior: &CanonicalFinancialRecord) -> Option<f64> {
    checked_divide(soft_asset_share(current), soft_asset_share(prior))
}

fn sgi(current: &CanonicalFinancialRecord, prior: &CanonicalFinancialRecord) -> Option<f64> {
    checked_divide(
        current.get(CanonicalField::Revenue),
        prior.get(CanonicalField::Revenue),
    )
}

fn lvgi(current: &CanonicalFinancialRecord, prior: &CanonicalFinancialRecord) -> Option<f64> {
    checked_divide(
        share_of(current, CanonicalField::TotalLiabilities, CanonicalField::TotalAssets),
        share_of(prior, CanonicalField::TotalLiabilities, CanonicalField::TotalAssets),
    )
}
