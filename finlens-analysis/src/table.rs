//! Raw statement tables as they arrive from upstream extractors.

use serde::{Deserialize, Deserializer, Serialize};

/// Layout of a raw table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOrientation {
    /// Periods as rows, line items as columns (market-data feeds, spreadsheets)
    Feed,
    /// Line items as rows, periods as columns (document extracts)
    Document,
}

/// An arbitrary table: one header row plus string cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatementTable {
    pub headers: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub rows: Vec<Vec<String>>,
    pub orientation: TableOrientation,
    /// Title hint from the extractor, e.g. "Consolidated Balance Sheet"
    #[serde(default)]
    pub title: Option<String>,
}

impl RawStatementTable {
    /// Create a periods-as-rows table.
    pub fn feed(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows,
            orientation: TableOrientation::Feed,
            title: None,
        }
    }

    /// Create a line-items-as-rows table.
    pub fn document(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows,
            orientation: TableOrientation::Document,
            title: None,
        }
    }

    /// Attach a title hint.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Cell at (row, column); short rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }

    /// Whether the table carries no data at all.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
            || self.rows.is_empty()
            || self.rows.iter().all(|r| r.iter().all(|c| c.trim().is_empty()))
    }
}

/// Accept strings, numbers and nulls as cells so JSON feeds can be passed as-is.
fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Vec<serde_json::Value>> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    serde_json::Value::Null => String::new(),
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect()
        })
        .collect())
}

// ============================================================================
// Statement classification
// ============================================================================

const INCOME_KEYWORDS: &[&str] = &[
    "income statement",
    "statement of operations",
    "results of operations",
    "profit or loss",
    "revenue",
    "net income",
    "κατάσταση αποτελεσμάτων",
    "κατασταση αποτελεσματων",
    "έσοδα",
    "κέρδη",
];

const BALANCE_KEYWORDS: &[&str] = &[
    "balance sheet",
    "financial position",
    "total assets",
    "total liabilities",
    "ισολογισμ",
    "ενεργητικό",
    "υποχρεώσεις",
];

const CASH_FLOW_KEYWORDS: &[&str] = &[
    "cash flow",
    "operating activities",
    "investing activities",
    "financing activities",
    "ταμειακ",
];

/// Which financial statement a document fragment belongs to.
///
/// Variants are ordered by merge priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Income,
    Balance,
    CashFlow,
    Unclassified,
}

impl StatementKind {
    /// Classify a fragment by keyword.
    ///
    /// The title hint is consulted first; the first column's text is only
    /// searched when the title is absent or says nothing.
    pub fn classify(table: &RawStatementTable) -> Self {
        if let Some(kind) = table
            .title
            .as_deref()
            .and_then(|title| Self::match_keywords(&title.to_lowercase()))
        {
            return kind;
        }

        let first_column: String = table
            .rows
            .iter()
            .filter_map(|row| row.first())
            .map(|cell| cell.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        Self::match_keywords(&first_column).unwrap_or(Self::Unclassified)
    }

    fn match_keywords(corpus: &str) -> Option<Self> {
        [
            (Self::Income, INCOME_KEYWORDS),
            (Self::Balance, BALANCE_KEYWORDS),
            (Self::CashFlow, CASH_FLOW_KEYWORDS),
        ]
        .into_iter()
        .find(|(_, keywords)| keywords.iter().any(|k| corpus.contains(k)))
        .map(|(kind, _)| kind)
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementKind::Income => write!(f, "Income Statement"),
            StatementKind::Balance => write!(f, "Balance Sheet"),
            StatementKind::CashFlow => write!(f, "Cash Flow Statement"),
            StatementKind::Unclassified => write!(f, "Unclassified"),
        }
    }
}
