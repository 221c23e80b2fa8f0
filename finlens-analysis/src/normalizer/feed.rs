//! Periods-as-rows tables (market-data feeds, spreadsheet uploads).

use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use super::{clean_value, extract_year, NormalizationFailure};
use crate::fields::CanonicalField;
use crate::record::{CanonicalFinancialRecord, RecordSet};
use crate::synonyms::{normalize_label, SynonymTable};
use crate::table::RawStatementTable;

const YEAR_HEADERS: &[&str] = &["year", "fiscal year", "fiscalyear", "fy"];

const DATE_HEADERS: &[&str] = &[
    "date",
    "period",
    "period ending",
    "as of date",
    "asofdate",
    "fiscaldateending",
    "fiscal date ending",
    "end date",
];

/// Where a row's year comes from.
#[derive(Debug, Clone, Copy)]
enum YearSource {
    Year(usize),
    Date(usize),
}

/// Normalize a feed table: resolve headers, clean cells, key rows by year.
pub fn normalize(
    table: &RawStatementTable,
    synonyms: &SynonymTable,
) -> Result<RecordSet, NormalizationFailure> {
    if table.is_empty() {
        return Err(NormalizationFailure::EmptyTable);
    }

    let year_source = find_year_source(&table.headers).ok_or(NormalizationFailure::NoExtractableYear)?;
    let source_column = match year_source {
        YearSource::Year(i) | YearSource::Date(i) => i,
    };

    let columns = resolve_columns(&table.headers, synonyms, source_column);
    if columns.is_empty() {
        return Err(NormalizationFailure::NoRecognizedFields);
    }

    let mut records = RecordSet::new();
    for (row_index, row) in table.rows.iter().enumerate() {
        let Some(year) = row_year(table, row_index, year_source) else {
            tracing::debug!(row = row_index, "Discarding feed row without a year");
            continue;
        };

        let mut record = CanonicalFinancialRecord::new(year);
        for (column, field) in &columns {
            if let Some(value) = row.get(*column).and_then(|cell| clean_value(cell)) {
                record.set(*field, value);
            }
        }
        records.insert(record);
    }

    if records.is_empty() {
        return Err(NormalizationFailure::NoExtractableYear);
    }
    Ok(records)
}

/// A `Year` column wins over a `Date` column.
fn find_year_source(headers: &[String]) -> Option<YearSource> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_label(h)).collect();

    normalized
        .iter()
        .position(|h| YEAR_HEADERS.contains(&h.as_str()))
        .map(YearSource::Year)
        .or_else(|| {
            normalized
                .iter()
                .position(|h| DATE_HEADERS.contains(&h.as_str()))
                .map(YearSource::Date)
        })
}

/// Map column indices to fields; the first column claiming a field wins.
fn resolve_columns(
    headers: &[String],
    synonyms: &SynonymTable,
    skip: usize,
) -> Vec<(usize, CanonicalField)> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .filter_map(|(i, header)| {
            let field = synonyms.resolve(header)?;
            if seen.insert(field) {
                Some((i, field))
            } else {
                tracing::debug!(header = %header, %field, "Ignoring duplicate column");
                None
            }
        })
        .collect()
}

fn row_year(table: &RawStatementTable, row: usize, source: YearSource) -> Option<i32> {
    match source {
        YearSource::Year(column) => parse_year_cell(table.cell(row, column)),
        YearSource::Date(column) => parse_date_year(table.cell(row, column)),
    }
}

/// Parse an integer year cell such as `2023` or `2023.0`.
fn parse_year_cell(cell: &str) -> Option<i32> {
    let trimmed = cell.trim();
    let year = trimmed
        .parse::<i32>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && v.is_finite())
                .map(|v| v as i32)
        })
        .or_else(|| extract_year(trimmed))?;

    (1900..=2099).contains(&year).then_some(year)
}

/// Parse an ISO date or datetime, falling back to the year pattern.
fn parse_date_year(cell: &str) -> Option<i32> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.year());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.year());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.year());
        }
    }

    extract_year(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(cells: &[&[&str]]) -> Vec<Vec<String>> {
        cells
            .iter()
            .map(|r| r.iter().map(|c| (*c).to_string()).collect())
            .collect()
    }

    fn table() -> SynonymTable {
        SynonymTable::default()
    }

    #[test]
    fn test_year_column() {
        let raw = RawStatementTable::feed(
            &["Year", "Total Revenue", "Net Income"],
            rows(&[&["2023", "1,000", "(50)"], &["2022.0", "900", ""]]),
        );

        let records = normalize(&raw, &table()).unwrap();

        let latest = records.get(2023).unwrap();
        assert_eq!(latest.get(CanonicalField::Revenue), Some(1000.0));
        assert_eq!(latest.get(CanonicalField::NetIncome), Some(-50.0));
        assert_eq!(records.get(2022).unwrap().get(CanonicalField::NetIncome), None);
    }

    #[test]
    fn test_date_column() {
        let raw = RawStatementTable::feed(
            &["Date", "Total Assets"],
            rows(&[
                &["2023-12-31", "10"],
                &["2022-12-31 00:00:00", "9"],
                &["FY2021", "8"],
                &["unknown", "7"],
            ]),
        );

        let records = normalize(&raw, &table()).unwrap();
        assert_eq!(records.years(), vec![2021, 2022, 2023]);
    }

    #[test]
    fn test_year_column_wins_over_date() {
        let raw = RawStatementTable::feed(
            &["Date", "Year", "Cash"],
            rows(&[&["2024-01-15", "2023", "1"]]),
        );
        let records = normalize(&raw, &table()).unwrap();
        assert_eq!(records.years(), vec![2023]);
    }

    #[test]
    fn test_first_duplicate_column_wins() {
        let raw = RawStatementTable::feed(
            &["Year", "Stockholders Equity", "Total Equity Gross Minority Interest"],
            rows(&[&["2023", "100", "120"]]),
        );
        let records = normalize(&raw, &table()).unwrap();
        assert_eq!(
            records.latest().unwrap().get(CanonicalField::TotalEquity),
            Some(100.0)
        );
    }

    #[test]
    fn test_failures() {
        let no_year = RawStatementTable::feed(&["Total Revenue"], rows(&[&["1"]]));
        assert_eq!(
            normalize(&no_year, &table()),
            Err(NormalizationFailure::NoExtractableYear)
        );

        let no_fields = RawStatementTable::feed(&["Year", "Employees"], rows(&[&["2023", "1"]]));
        assert_eq!(
            normalize(&no_fields, &table()),
            Err(NormalizationFailure::NoRecognizedFields)
        );

        let bad_years = RawStatementTable::feed(&["Year", "Cash"], rows(&[&["n/a", "1"]]));
        assert_eq!(
            normalize(&bad_years, &table()),
            Err(NormalizationFailure::NoExtractableYear)
        );

        let empty = RawStatementTable::feed(&["Year", "Cash"], Vec::new());
        assert_eq!(normalize(&empty, &table()), Err(NormalizationFailure::EmptyTable));
    }
}
