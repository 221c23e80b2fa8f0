//! Fragment ordering and the outer join on year.

use crate::record::RecordSet;
use crate::table::{RawStatementTable, StatementKind, TableOrientation};

/// A table scheduled for normalization.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    pub index: usize,
    pub kind: StatementKind,
    pub table: &'a RawStatementTable,
}

/// Classify and order tables for merging.
///
/// Feed tables keep their input order and come first; document fragments
/// follow sorted by statement kind, ties broken by input order.
pub fn plan(tables: &[RawStatementTable]) -> Vec<Fragment<'_>> {
    let mut fragments: Vec<Fragment<'_>> = tables
        .iter()
        .enumerate()
        .map(|(index, table)| Fragment {
            index,
            kind: StatementKind::classify(table),
            table,
        })
        .collect();

    fragments.sort_by_key(|f| {
        let document = f.table.orientation == TableOrientation::Document;
        let kind = if document { f.kind } else { StatementKind::Income };
        (document, kind, f.index)
    });
    fragments
}

/// Outer-join record sets on year; earlier sets win on conflicting values.
pub fn merge_all(fragments: impl IntoIterator<Item = RecordSet>) -> RecordSet {
    fragments
        .into_iter()
        .fold(RecordSet::new(), |mut merged, fragment| {
            merged.merge(fragment);
            merged
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::CanonicalField;
    use crate::record::CanonicalFinancialRecord;

    fn doc(title: &str) -> RawStatementTable {
        RawStatementTable::document(&["Item", "2023"], Vec::new()).with_title(title)
    }

    #[test]
    fn test_plan_orders_by_kind() {
        let tables = vec![
            doc("Notes"),
            doc("Cash Flow Statement"),
            doc("Balance Sheet"),
            RawStatementTable::feed(&["Year"], Vec::new()),
            doc("Income Statement"),
        ];

        let order: Vec<usize> = plan(&tables).iter().map(|f| f.index).collect();
        assert_eq!(order, vec![3, 4, 2, 1, 0]);
    }

    #[test]
    fn test_merge_all_outer_join() {
        let income = RecordSet::from_records([
            CanonicalFinancialRecord::new(2023).with(CanonicalField::Revenue, 10.0),
            CanonicalFinancialRecord::new(2022).with(CanonicalField::Revenue, 9.0),
        ]);
        let balance = RecordSet::from_records([
            CanonicalFinancialRecord::new(2023)
                .with(CanonicalField::TotalAssets, 50.0)
                .with(CanonicalField::Revenue, 99.0),
            CanonicalFinancialRecord::new(2021).with(CanonicalField::TotalAssets, 40.0),
        ]);

        let merged = merge_all([income, balance]);

        assert_eq!(merged.years(), vec![2021, 2022, 2023]);
        let latest = merged.get(2023).unwrap();
        assert_eq!(latest.get(CanonicalField::Revenue), Some(10.0));
        assert_eq!(latest.get(CanonicalField::TotalAssets), Some(50.0));
    }
}
