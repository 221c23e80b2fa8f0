//! Field synonym resolver.
//!
//! Maps raw column/row labels from any source onto [`CanonicalField`]s.
//! Lookup is an exact match on the normalized label, so "cash" never
//! matches "cash flow". A synonym belongs to exactly one field.

use std::collections::HashMap;
use std::sync::Arc;

use finlens_common::{Error, Result};
use once_cell::sync::Lazy;

use crate::fields::CanonicalField;

/// Synonyms shipped with the default table, grouped by field.
///
/// The lowercase canonical name of every field is added automatically.
pub const DEFAULT_SYNONYM_ENTRIES: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Revenue,
        &[
            "revenue",
            "revenues",
            "total revenue",
            "total revenues",
            "totalrevenue",
            "sales",
            "net sales",
            "turnover",
            "operating revenue",
            "έσοδα",
            "κύκλος εργασιών",
            "πωλήσεις",
        ],
    ),
    (
        CanonicalField::CostOfGoodsSold,
        &[
            "cost of revenue",
            "costofrevenue",
            "cost of goods sold",
            "costofgoodsandservicessold",
            "cost of sales",
            "cogs",
            "reconciled cost of revenue",
            "κόστος πωληθέντων",
        ],
    ),
    (
        CanonicalField::GrossProfit,
        &["gross profit", "μικτό κέρδος", "μικτά κέρδη"],
    ),
    (
        CanonicalField::OperatingIncome,
        &[
            "operating income",
            "operating profit",
            "ebit",
            "income from operations",
            "operating result",
            "λειτουργικά κέρδη",
        ],
    ),
    (
        CanonicalField::NetIncome,
        &[
            "net income",
            "net profit",
            "net earnings",
            "profit for the year",
            "net income common stockholders",
            "net income from continuing operations",
            "καθαρά κέρδη",
        ],
    ),
    (
        CanonicalField::InterestExpense,
        &[
            "interest expense",
            "interest expense non operating",
            "finance costs",
            "χρηματοοικονομικά έξοδα",
        ],
    ),
    (CanonicalField::Ebitda, &["normalized ebitda"]),
    (
        CanonicalField::PretaxIncome,
        &[
            "pretax income",
            "income before tax",
            "incomebeforetax",
            "profit before tax",
            "κέρδη προ φόρων",
        ],
    ),
    (
        CanonicalField::IncomeTaxExpense,
        &["tax provision", "income tax expense", "income tax", "φόρος εισοδήματος"],
    ),
    (
        CanonicalField::ResearchAndDevelopment,
        &["research and development", "r&d", "research & development"],
    ),
    (
        CanonicalField::BasicEps,
        &["basic eps", "eps basic", "earnings per share basic", "reportedeps"],
    ),
    (
        CanonicalField::TotalAssets,
        &["total assets", "σύνολο ενεργητικού"],
    ),
    (
        CanonicalField::CurrentAssets,
        &[
            "current assets",
            "total current assets",
            "totalcurrentassets",
            "κυκλοφορούν ενεργητικό",
        ],
    ),
    (
        CanonicalField::TotalLiabilities,
        &[
            "total liabilities",
            "total liabilities net minority interest",
            "σύνολο υποχρεώσεων",
        ],
    ),
    (
        CanonicalField::CurrentLiabilities,
        &[
            "current liabilities",
            "total current liabilities",
            "totalcurrentliabilities",
            "βραχυπρόθεσμες υποχρεώσεις",
        ],
    ),
    (
        CanonicalField::TotalEquity,
        &[
            "total equity",
            "stockholders equity",
            "shareholders equity",
            "total stockholders equity",
            "total shareholders equity",
            "totalshareholderequity",
            "total equity gross minority interest",
            "σύνολο ιδίων κεφαλαίων",
            "ίδια κεφάλαια",
        ],
    ),
    (
        CanonicalField::TotalDebt,
        &[
            "total debt",
            "shortlongtermdebttotal",
            "total borrowings",
            "δανεισμός",
        ],
    ),
    (
        CanonicalField::Cash,
        &[
            "cash",
            "cash and cash equivalents",
            "cashandcashequivalentsatcarryingvalue",
            "cash & cash equivalents",
            "ταμειακά διαθέσιμα",
        ],
    ),
    (
        CanonicalField::Inventory,
        &["inventory", "inventories", "αποθέματα"],
    ),
    (
        CanonicalField::Receivables,
        &[
            "receivables",
            "accounts receivable",
            "net receivables",
            "trade receivables",
            "currentnetreceivables",
            "πελάτες",
        ],
    ),
    (
        CanonicalField::Payables,
        &[
            "payables",
            "accounts payable",
            "trade payables",
            "currentaccountspayable",
            "προμηθευτές",
        ],
    ),
    (
        CanonicalField::NetPpe,
        &[
            "net ppe",
            "property plant equipment",
            "property, plant and equipment",
            "net property plant and equipment",
            "propertyplantequipment",
            "ενσώματα πάγια",
        ],
    ),
    (
        CanonicalField::RetainedEarnings,
        &["retained earnings", "αποτελέσματα εις νέον"],
    ),
    (
        CanonicalField::ShareIssued,
        &[
            "share issued",
            "shares issued",
            "shares outstanding",
            "sharesoutstanding",
            "ordinary shares number",
            "commonstocksharesoutstanding",
        ],
    ),
    (
        CanonicalField::OperatingCashFlow,
        &[
            "operating cash flow",
            "cash flow from operating activities",
            "cash flow from continuing operating activities",
            "net cash from operating activities",
            "total cash from operating activities",
            "ταμειακές ροές από λειτουργικές δραστηριότητες",
        ],
    ),
    (
        CanonicalField::InvestingCashFlow,
        &[
            "investing cash flow",
            "cash flow from investing activities",
            "net cash used in investing activities",
            "cashflowfrominvestment",
        ],
    ),
    (
        CanonicalField::FinancingCashFlow,
        &[
            "financing cash flow",
            "cash flow from financing activities",
            "net cash used in financing activities",
            "cashflowfromfinancing",
        ],
    ),
    (
        CanonicalField::CapitalExpenditures,
        &[
            "capital expenditure",
            "capital expenditures",
            "capex",
            "purchase of ppe",
            "purchases of property and equipment",
        ],
    ),
    (
        CanonicalField::CashDividendsPaid,
        &[
            "cash dividends paid",
            "dividends paid",
            "common stock dividend paid",
            "dividendpayout",
        ],
    ),
    (
        CanonicalField::MarketCapitalization,
        &["market cap", "market capitalization", "marketcap", "κεφαλαιοποίηση"],
    ),
    (CanonicalField::Loans, &["net loans", "loans and advances"]),
    (CanonicalField::Deposits, &["total deposits", "customer deposits"]),
    (CanonicalField::NetInterestIncome, &["net interest income"]),
    (
        CanonicalField::EarningAssets,
        &["average earning assets", "interest earning assets"],
    ),
];

/// The process-wide default table, built on first use.
static DEFAULT_TABLE: Lazy<Arc<SynonymTable>> =
    Lazy::new(|| Arc::new(SynonymTable::build_lenient(DEFAULT_SYNONYM_ENTRIES)));

/// Normalize a raw label: lowercase, collapse repeated whitespace, trim.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Immutable many-synonyms-to-one-field mapping.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    lookup: HashMap<String, CanonicalField>,
}

impl SynonymTable {
    /// Shared handle to the default table.
    pub fn default_table() -> Arc<SynonymTable> {
        Arc::clone(&DEFAULT_TABLE)
    }

    /// Build a table from `(field, synonyms)` groups.
    ///
    /// Fails when two different fields claim the same normalized synonym.
    pub fn from_entries(entries: &[(CanonicalField, &[&str])]) -> Result<Self> {
        let mut lookup = HashMap::new();
        for (field, synonym) in Self::flatten(entries) {
            match lookup.get(&synonym) {
                Some(existing) if *existing != field => {
                    return Err(Error::invalid_input(format!(
                        "synonym '{synonym}' claimed by both {existing} and {field}"
                    )));
                }
                Some(_) => {}
                None => {
                    lookup.insert(synonym, field);
                }
            }
        }
        Ok(Self { lookup })
    }

    /// Like [`from_entries`](Self::from_entries) but keeps the first claim.
    fn build_lenient(entries: &[(CanonicalField, &[&str])]) -> Self {
        let mut lookup = HashMap::new();
        for (field, synonym) in Self::flatten(entries) {
            lookup.entry(synonym).or_insert(field);
        }
        Self { lookup }
    }

    fn flatten(entries: &[(CanonicalField, &[&str])]) -> Vec<(CanonicalField, String)> {
        let canonical = CanonicalField::ALL
            .iter()
            .map(|field| (*field, field.name().to_lowercase()));
        let listed = entries.iter().flat_map(|(field, synonyms)| {
            synonyms
                .iter()
                .map(move |synonym| (*field, normalize_label(synonym)))
        });
        canonical.chain(listed).collect()
    }

    /// Resolve a raw label to its canonical field.
    pub fn resolve(&self, raw_label: &str) -> Option<CanonicalField> {
        self.lookup.get(&normalize_label(raw_label)).copied()
    }

    /// Number of distinct synonyms.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Whether the table has no synonyms at all.
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        DEFAULT_TABLE.as_ref().clone()
    }
}

/// Resolve a label against the default table.
pub fn resolve(raw_label: &str) -> Option<CanonicalField> {
    DEFAULT_TABLE.resolve(raw_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entries_have_no_conflicts() {
        let table = SynonymTable::from_entries(DEFAULT_SYNONYM_ENTRIES).unwrap();
        assert_eq!(table.len(), SynonymTable::default_table().len());
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Total   Revenue \t"), "total revenue");
        assert_eq!(normalize_label("NET\nIncome"), "net income");
    }

    #[test]
    fn test_resolve_feed_labels() {
        assert_eq!(resolve("Total Revenue"), Some(CanonicalField::Revenue));
        assert_eq!(resolve("Cost Of Revenue"), Some(CanonicalField::CostOfGoodsSold));
        assert_eq!(resolve("Stockholders Equity"), Some(CanonicalField::TotalEquity));
        assert_eq!(resolve("Net PPE"), Some(CanonicalField::NetPpe));
        assert_eq!(resolve("Basic EPS"), Some(CanonicalField::BasicEps));
    }

    #[test]
    fn test_canonical_names_resolve_to_themselves() {
        for field in CanonicalField::ALL {
            assert_eq!(resolve(field.name()), Some(field), "{field}");
        }
    }

    #[test]
    fn test_exact_match_only() {
        assert_eq!(resolve("cash"), Some(CanonicalField::Cash));
        assert_eq!(resolve("cash flow"), None);
        assert_eq!(resolve("total revenue growth"), None);
    }

    #[test]
    fn test_partial_measures_are_not_aliased() {
        assert_eq!(resolve("Gross Margin"), None);
        assert_eq!(resolve("Long Term Debt"), None);
        assert_eq!(resolve("Gross Profit"), Some(CanonicalField::GrossProfit));
        assert_eq!(resolve("Total Debt"), Some(CanonicalField::TotalDebt));
    }

    #[test]
    fn test_greek_labels() {
        assert_eq!(resolve("Σύνολο Ενεργητικού"), Some(CanonicalField::TotalAssets));
        assert_eq!(resolve("Κύκλος εργασιών"), Some(CanonicalField::Revenue));
    }

    #[test]
    fn test_conflicting_injected_table_is_rejected() {
        let entries: &[(CanonicalField, &[&str])] = &[
            (CanonicalField::Cash, &["liquid funds"]),
            (CanonicalField::TotalDebt, &["Liquid  Funds"]),
        ];
        let err = SynonymTable::from_entries(entries).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_injected_table_resolves_custom_labels() {
        let entries: &[(CanonicalField, &[&str])] = &[(CanonicalField::Revenue, &["umsatz"])];
        let table = SynonymTable::from_entries(entries).unwrap();
        assert_eq!(table.resolve("Umsatz"), Some(CanonicalField::Revenue));
        assert_eq!(table.resolve("Total Revenue"), None);
    }
}
