//! Canonical financial record store.
//!
//! An in-memory, year-indexed table of canonical fields. Years are unique;
//! iteration is ascending, [`RecordSet::latest`] gives the newest year.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::fields::CanonicalField;
use crate::table::{RawStatementTable, TableOrientation};

/// One fiscal year of canonical values.
///
/// An absent field means "unknown", which is distinct from a stored zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFinancialRecord {
    pub year: i32,
    #[serde(default)]
    pub values: BTreeMap<CanonicalField, f64>,
}

impl CanonicalFinancialRecord {
    /// Create an empty record for a year.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter used mostly by tests and fixtures.
    pub fn with(mut self, field: CanonicalField, value: f64) -> Self {
        self.set(field, value);
        self
    }

    /// Value of a field, if known.
    pub fn get(&self, field: CanonicalField) -> Option<f64> {
        self.values.get(&field).copied()
    }

    /// Whether the field holds a value.
    pub fn has(&self, field: CanonicalField) -> bool {
        self.values.contains_key(&field)
    }

    /// Store a value, replacing any previous one. Non-finite values are dropped.
    pub fn set(&mut self, field: CanonicalField, value: f64) {
        if value.is_finite() {
            self.values.insert(field, value);
        }
    }

    /// Store a value only when the field is still unknown.
    ///
    /// Returns `true` when the value was taken.
    pub fn fill(&mut self, field: CanonicalField, value: f64) -> bool {
        if self.has(field) || !value.is_finite() {
            return false;
        }
        self.values.insert(field, value);
        true
    }

    /// Merge another record for the same year, keeping existing values.
    pub fn absorb(&mut self, other: &CanonicalFinancialRecord) {
        for (field, value) in &other.values {
            self.fill(*field, *value);
        }
    }

    /// Number of known fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field is known.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Year-indexed collection of canonical records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: BTreeMap<i32, CanonicalFinancialRecord>,
}

impl RecordSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from records; same-year records merge, first value wins.
    pub fn from_records(records: impl IntoIterator<Item = CanonicalFinancialRecord>) -> Self {
        let mut set = Self::new();
        for record in records {
            set.insert(record);
        }
        set
    }

    /// Insert a record, merging into an existing year with first-non-null-wins.
    pub fn insert(&mut self, record: CanonicalFinancialRecord) {
        match self.records.get_mut(&record.year) {
            Some(existing) => existing.absorb(&record),
            None => {
                self.records.insert(record.year, record);
            }
        }
    }

    /// Outer-join another set on year; values already present win.
    pub fn merge(&mut self, other: RecordSet) {
        for (_, record) in other.records {
            self.insert(record);
        }
    }

    /// Record for a specific year.
    pub fn get(&self, year: i32) -> Option<&CanonicalFinancialRecord> {
        self.records.get(&year)
    }

    /// Mutable record for a specific year.
    pub fn get_mut(&mut self, year: i32) -> Option<&mut CanonicalFinancialRecord> {
        self.records.get_mut(&year)
    }

    /// Newest record.
    pub fn latest(&self) -> Option<&CanonicalFinancialRecord> {
        self.records.values().next_back()
    }

    /// The closest year strictly before `year` present in the set.
    pub fn prior_to(&self, year: i32) -> Option<&CanonicalFinancialRecord> {
        self.records.range(..year).next_back().map(|(_, r)| r)
    }

    /// Records in ascending year order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CanonicalFinancialRecord> {
        self.records.values()
    }

    /// Mutable records in ascending year order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CanonicalFinancialRecord> {
        self.records.values_mut()
    }

    /// Years in ascending order.
    pub fn years(&self) -> Vec<i32> {
        self.records.keys().copied().collect()
    }

    /// Every field known in at least one year.
    pub fn fields(&self) -> BTreeSet<CanonicalField> {
        self.records
            .values()
            .flat_map(|r| r.values.keys().copied())
            .collect()
    }

    /// Whether any year holds a value for the field.
    pub fn has_field(&self, field: CanonicalField) -> bool {
        self.records.values().any(|r| r.has(field))
    }

    /// Keep only years inside the inclusive range.
    pub fn filter_years(mut self, range: RangeInclusive<i32>) -> Self {
        self.records.retain(|year, _| range.contains(year));
        self
    }

    /// Copy a market capitalization into every record lacking one.
    pub fn apply_market_cap(&mut self, market_cap: f64) {
        for record in self.records.values_mut() {
            record.fill(CanonicalField::MarketCapitalization, market_cap);
        }
    }

    /// Number of years.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no years.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render as a canonical periods-as-rows table: `Year` plus canonical names.
    ///
    /// Unknown values render as empty cells; years are listed newest first.
    pub fn to_feed_table(&self) -> RawStatementTable {
        let fields: Vec<CanonicalField> = self.fields().into_iter().collect();

        let mut headers = Vec::with_capacity(fields.len() + 1);
        headers.push("Year".to_string());
        headers.extend(fields.iter().map(|f| f.name().to_string()));

        let rows = self
            .records
            .values()
            .rev()
            .map(|record| {
                let mut row = Vec::with_capacity(headers.len());
                row.push(record.year.to_string());
                row.extend(
                    fields
                        .iter()
                        .map(|f| record.get(*f).map(|v| v.to_string()).unwrap_or_default()),
                );
                row
            })
            .collect();

        RawStatementTable {
            headers,
            rows,
            orientation: TableOrientation::Feed,
            title: None,
        }
    }
}
