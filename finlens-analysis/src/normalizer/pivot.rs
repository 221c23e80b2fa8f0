//! Line-items-as-rows tables (document extracts).
//!
//! The label column becomes the field axis and each period column becomes a
//! record, keyed by the year found in its header.

use std::collections::{HashMap, HashSet};

use super::{clean_value, extract_year, is_placeholder_header, NormalizationFailure};
use crate::fields::CanonicalField;
use crate::record::{CanonicalFinancialRecord, RecordSet};
use crate::synonyms::SynonymTable;
use crate::table::RawStatementTable;

/// Pivot a document table into canonical records.
pub fn normalize(
    table: &RawStatementTable,
    synonyms: &SynonymTable,
) -> Result<RecordSet, NormalizationFailure> {
    if table.is_empty() {
        return Err(NormalizationFailure::EmptyTable);
    }

    let label_column = find_label_column(&table.headers).ok_or(NormalizationFailure::NoLabelColumn)?;

    let periods: Vec<(usize, i32)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != label_column)
        .filter_map(|(i, header)| extract_year(header).map(|year| (i, year)))
        .collect();
    if periods.is_empty() {
        return Err(NormalizationFailure::NoExtractableYear);
    }

    let labels = disambiguate_labels(table, label_column);

    let mut seen = HashSet::new();
    let line_items: Vec<(usize, CanonicalField)> = labels
        .iter()
        .filter_map(|(row, label)| {
            let field = synonyms.resolve(label)?;
            if seen.insert(field) {
                Some((*row, field))
            } else {
                tracing::debug!(label = %label, %field, "Ignoring duplicate line item");
                None
            }
        })
        .collect();
    if line_items.is_empty() {
        return Err(NormalizationFailure::NoRecognizedFields);
    }

    let mut records = RecordSet::new();
    for (column, year) in periods {
        let mut record = CanonicalFinancialRecord::new(year);
        for (row, field) in &line_items {
            if let Some(value) = clean_value(table.cell(*row, column)) {
                record.set(*field, value);
            }
        }
        records.insert(record);
    }

    Ok(records)
}

/// The first column whose header is a real label rather than a placeholder.
fn find_label_column(headers: &[String]) -> Option<usize> {
    headers.iter().position(|h| !is_placeholder_header(h))
}

/// Row labels with repeats suffixed `_2`, `_3`, ... in order of appearance.
///
/// Rows with an empty label are skipped.
fn disambiguate_labels(table: &RawStatementTable, label_column: usize) -> Vec<(usize, String)> {
    let mut occurrences: HashMap<String, usize> = HashMap::new();

    (0..table.rows.len())
        .filter_map(|row| {
            let label = table.cell(row, label_column).trim();
            if label.is_empty() {
                return None;
            }
            let count = occurrences.entry(label.to_string()).or_insert(0);
            *count += 1;
            let label = if *count == 1 {
                label.to_string()
            } else {
                format!("{label}_{count}")
            };
            Some((row, label))
        })
        .collect()
}
