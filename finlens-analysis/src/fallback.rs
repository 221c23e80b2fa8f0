//! Documented proxy substitutions for absent fields.
//!
//! A substitution only happens when the primary field is unknown in every
//! year of the set; a present value is never overridden. All substitutions
//! read the original set, so one fallback never feeds another.
//!
//! | Target           | Source                            |
//! |------------------|-----------------------------------|
//! | TotalLiabilities | TotalDebt                         |
//! | TotalDebt        | TotalLiabilities                  |
//! | GrossProfit      | Revenue − CostOfGoodsSold         |
//! | Receivables      | 20% × CurrentAssets               |
//! | Payables         | 20% × CurrentAssets               |

use finlens_common::validation::check_unit_interval;
use finlens_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::fields::CanonicalField;
use crate::record::{CanonicalFinancialRecord, RecordSet};

/// Share of current assets assumed to be receivables when none are reported.
pub const DEFAULT_RECEIVABLES_PROXY_SHARE: f64 = 0.20;

/// Share of current assets assumed to be payables when none are reported.
pub const DEFAULT_PAYABLES_PROXY_SHARE: f64 = 0.20;

/// What kind of estimate replaced real data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApproximationKind {
    /// Another reported field stands in for the missing one
    Substitution,
    /// A fixed share of another field
    Proxy,
    /// A configured default replaced a derivable figure
    DefaultAssumption,
    /// A missing input was treated as zero or neutral
    MissingInput,
    /// A whole score was replaced by a documented placeholder
    Placeholder,
}

impl std::fmt::Display for ApproximationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApproximationKind::Substitution => write!(f, "substitution"),
            ApproximationKind::Proxy => write!(f, "proxy"),
            ApproximationKind::DefaultAssumption => write!(f, "default assumption"),
            ApproximationKind::MissingInput => write!(f, "missing input"),
            ApproximationKind::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Audit entry for a fallback or degraded computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approximation {
    pub year: Option<i32>,
    /// Field or metric that was approximated
    pub field: String,
    pub kind: ApproximationKind,
    pub detail: String,
}

impl Approximation {
    pub fn new(
        year: Option<i32>,
        field: impl Into<String>,
        kind: ApproximationKind,
        detail: impl Into<String>,
    ) -> Self {
        let approximation = Self {
            year,
            field: field.into(),
            kind,
            detail: detail.into(),
        };
        tracing::debug!(
            year = ?approximation.year,
            field = %approximation.field,
            kind = %approximation.kind,
            detail = %approximation.detail,
            "Approximation recorded"
        );
        approximation
    }
}

/// Fallback rules with their tunable proxy shares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPolicy {
    receivables_share: f64,
    payables_share: f64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            receivables_share: DEFAULT_RECEIVABLES_PROXY_SHARE,
            payables_share: DEFAULT_PAYABLES_PROXY_SHARE,
        }
    }
}

impl FallbackPolicy {
    /// Create a policy with custom proxy shares, each within [0, 1].
    pub fn new(receivables_share: f64, payables_share: f64) -> Result<Self> {
        for (field, value) in [
            ("receivables proxy share", receivables_share),
            ("payables proxy share", payables_share),
        ] {
            check_unit_interval(field, value).map_err(|e| Error::invalid_input(e.to_string()))?;
        }
        Ok(Self {
            receivables_share,
            payables_share,
        })
    }

    pub fn receivables_share(&self) -> f64 {
        self.receivables_share
    }

    pub fn payables_share(&self) -> f64 {
        self.payables_share
    }

    /// Apply every rule, returning the completed set and its audit trail.
    pub fn apply(&self, records: &RecordSet) -> (RecordSet, Vec<Approximation>) {
        let mut completed = records.clone();
        let mut approximations = Vec::new();

        let rules: [(CanonicalField, Rule); 5] = [
            (
                CanonicalField::TotalLiabilities,
                Rule::Substitute(CanonicalField::TotalDebt),
            ),
            (
                CanonicalField::TotalDebt,
                Rule::Substitute(CanonicalField::TotalLiabilities),
            ),
            (CanonicalField::GrossProfit, Rule::RevenueLessCogs),
            (
                CanonicalField::Receivables,
                Rule::ShareOfCurrentAssets(self.receivables_share),
            ),
            (
                CanonicalField::Payables,
                Rule::ShareOfCurrentAssets(self.payables_share),
            ),
        ];

        for (target, rule) in rules {
            if records.has_field(target) {
                continue;
            }
            for original in records.iter() {
                let Some(value) = rule.evaluate(original) else {
                    continue;
                };
                if let Some(record) = completed.get_mut(original.year) {
                    record.set(target, value);
                }
                approximations.push(Approximation::new(
                    Some(original.year),
                    target.name(),
                    rule.kind(),
                    rule.describe(),
                ));
            }
        }

        (completed, approximations)
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Substitute(CanonicalField),
    RevenueLessCogs,
    ShareOfCurrentAssets(f64),
}

impl Rule {
    fn evaluate(&self, record: &CanonicalFinancialRecord) -> Option<f64> {
        match self {
            Rule::Substitute(source) => record.get(*source),
            Rule::RevenueLessCogs => Some(
                record.get(CanonicalField::Revenue)?
                    - record.get(CanonicalField::CostOfGoodsSold)?,
            ),
            Rule::ShareOfCurrentAssets(share) => {
                record.get(CanonicalField::CurrentAssets).map(|ca| ca * share)
            }
        }
    }

    fn kind(&self) -> ApproximationKind {
        match self {
            Rule::Substitute(_) | Rule::RevenueLessCogs => ApproximationKind::Substitution,
            Rule::ShareOfCurrentAssets(_) => ApproximationKind::Proxy,
        }
    }

    fn describe(&self) -> String {
        match self {
            Rule::Substitute(source) => format!("taken from {source}"),
            Rule::RevenueLessCogs => "Revenue − CostOfGoodsSold".to_string(),
            Rule::ShareOfCurrentAssets(share) => {
                format!("{:.0}% of CurrentAssets", share * 100.0)
            }
        }
    }
}
