//! Statement normalizer.
//!
//! Turns heterogeneous raw tables into one canonical [`RecordSet`].
//!
//! # Pipeline
//!
//! ```text
//! feed tables ──────────────► feed::normalize ───┐
//!                                                ├──► merge (first non-null wins)
//! document fragments ─► classify ─► pivot ───────┘
//! ```
//!
//! | Stage    | Input                     | Output                                 |
//! |----------|---------------------------|----------------------------------------|
//! | classify | title hint + label text   | [`StatementKind`]                      |
//! | pivot    | line items × periods      | one record per extractable year        |
//! | feed     | periods × line items      | one record per row with a year         |
//! | merge    | ordered fragment results  | outer join on year                     |
//!
//! A fragment that cannot be normalized yields a [`NormalizationFailure`];
//! the remaining fragments still merge.

pub mod clean;
pub mod feed;
pub mod merge;
pub mod pivot;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::RecordSet;
use crate::synonyms::SynonymTable;
use crate::table::{RawStatementTable, StatementKind, TableOrientation};

pub use clean::clean_value;

/// Why a single table could not be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationFailure {
    #[error("table has no data")]
    EmptyTable,

    #[error("no usable label column")]
    NoLabelColumn,

    #[error("no extractable year")]
    NoExtractableYear,

    #[error("no recognized fields")]
    NoRecognizedFields,
}

/// A failed fragment, reported alongside the merged result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentFailure {
    /// Position of the table in the caller's input
    pub index: usize,
    pub orientation: TableOrientation,
    pub kind: StatementKind,
    pub title: Option<String>,
    pub failure: NormalizationFailure,
}

/// Merged records plus every fragment that did not make it.
#[derive(Debug, Clone, Default)]
pub struct NormalizationOutcome {
    pub records: RecordSet,
    pub failures: Vec<FragmentFailure>,
}

/// Normalizes raw tables against a synonym table.
#[derive(Debug, Clone)]
pub struct Normalizer {
    synonyms: Arc<SynonymTable>,
}

impl Normalizer {
    /// Create a normalizer backed by the default synonym table.
    pub fn new() -> Self {
        Self {
            synonyms: SynonymTable::default_table(),
        }
    }

    /// Create a normalizer with an injected synonym table.
    pub fn with_synonyms(synonyms: Arc<SynonymTable>) -> Self {
        Self { synonyms }
    }

    /// The synonym table in use.
    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Normalize a single table according to its orientation.
    pub fn normalize_table(
        &self,
        table: &RawStatementTable,
    ) -> Result<RecordSet, NormalizationFailure> {
        match table.orientation {
            TableOrientation::Feed => feed::normalize(table, &self.synonyms),
            TableOrientation::Document => pivot::normalize(table, &self.synonyms),
        }
    }

    /// Normalize every table and merge the results on year.
    ///
    /// Feed tables merge first, then document fragments in
    /// income → balance → cash flow → unclassified order.
    pub fn normalize(&self, tables: &[RawStatementTable]) -> NormalizationOutcome {
        let mut outcome = NormalizationOutcome::default();
        let mut fragments = Vec::new();

        for fragment in merge::plan(tables) {
            match self.normalize_table(fragment.table) {
                Ok(records) => {
                    tracing::debug!(
                        index = fragment.index,
                        kind = %fragment.kind,
                        years = records.len(),
                        "Normalized fragment"
                    );
                    fragments.push(records);
                }
                Err(failure) => {
                    tracing::warn!(
                        index = fragment.index,
                        kind = %fragment.kind,
                        table = fragment.table.title.as_deref().unwrap_or(""),
                        %failure,
                        "Fragment could not be normalized"
                    );
                    outcome.failures.push(FragmentFailure {
                        index: fragment.index,
                        orientation: fragment.table.orientation,
                        kind: fragment.kind,
                        title: fragment.table.title.clone(),
                        failure,
                    });
                }
            }
        }

        outcome.records = merge::merge_all(fragments);
        outcome
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Shared header helpers
// ============================================================================

static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])((?:19|20)\d{2})(?:[^0-9]|$)").unwrap());

static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:unnamed|column|col|field)[\s_:.\-]*\d*$").unwrap());

/// Extract the first standalone 4-digit year (1900-2099) from text.
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether a header is a generic placeholder rather than a real label.
///
/// Period headers (anything carrying a year) count as placeholders too.
pub fn is_placeholder_header(header: &str) -> bool {
    let normalized = header.trim().to_lowercase();
    normalized.is_empty()
        || matches!(normalized.as_str(), "index" | "nan" | "none" | "null")
        || PLACEHOLDER_PATTERN.is_match(&normalized)
        || extract_year(&normalized).is_some()
}
