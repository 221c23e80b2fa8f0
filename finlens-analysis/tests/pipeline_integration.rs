//! End-to-end tests for the analysis pipeline.
//!
//! Raw tables → Normalizer → Fallbacks → Ratios → Forensics → Valuation

use finlens_analysis::forensic::M_SCORE_SAFE_PLACEHOLDER;
use finlens_analysis::{
    AnalysisRequest, ApproximationKind, CanonicalField, CompanyMetadata, FinancialAnalyzer,
    NormalizationFailure, Normalizer, PeerBenchmark, PeerGroup, RatioCategory, RawStatementTable,
    SectorProfile, StatementKind, ZScoreBand,
};

// ============================================================================
// Test Data Generators
// ============================================================================

fn rows(cells: &[&[&str]]) -> Vec<Vec<String>> {
    cells
        .iter()
        .map(|r| r.iter().map(|c| (*c).to_string()).collect())
        .collect()
}

/// Feed table with two fiscal years of a mid-sized industrial.
fn make_feed_table() -> RawStatementTable {
    RawStatementTable::feed(
        &[
            "Date",
            "Total Revenue",
            "Cost Of Revenue",
            "Operating Income",
            "Net Income",
            "Interest Expense",
            "Current Assets",
            "Current Liabilities",
            "Total Assets",
            "Total Liabilities Net Minority Interest",
            "Stockholders Equity",
            "Total Debt",
            "Retained Earnings",
            "Operating Cash Flow",
            "Capital Expenditure",
        ],
        rows(&[
            &[
                "2023-12-31", "1,000,000", "600,000", "250,000", "150,000", "20,000", "500,000",
                "300,000", "2,000,000", "900,000", "1,100,000", "400,000", "700,000", "180,000",
                "(50,000)",
            ],
            &[
                "2022-12-31", "900,000", "560,000", "200,000", "120,000", "20,000", "450,000",
                "280,000", "1,800,000", "850,000", "950,000", "420,000", "600,000", "150,000",
                "(40,000)",
            ],
        ]),
    )
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_a_liquidity_and_margins() {
    let table = RawStatementTable::feed(
        &[
            "Year",
            "Revenue",
            "CostOfGoodsSold",
            "OperatingIncome",
            "NetIncome",
            "CurrentAssets",
            "CurrentLiabilities",
        ],
        rows(&[&["2023", "1000000", "600000", "250000", "150000", "500000", "300000"]]),
    );
    let bundle = FinancialAnalyzer::new()
        .analyze(&AnalysisRequest::new("Scenario A", vec![table]))
        .unwrap();

    let latest = bundle.ratios.latest().unwrap();
    assert!((latest.liquidity.current_ratio - 1.6667).abs() < 1e-3);
    assert!((latest.profitability.gross_margin - 0.40).abs() < 1e-12);
    assert!((latest.profitability.net_margin - 0.15).abs() < 1e-12);

    let display = &bundle.display_ratios;
    assert_eq!(display[&RatioCategory::Liquidity][&2023]["CurrentRatio"], 1.67);
    assert_eq!(display[&RatioCategory::Profitability][&2023]["GrossMargin"], 40.0);
    assert_eq!(display[&RatioCategory::Profitability][&2023]["NetMargin"], 15.0);
}

#[test]
fn scenario_b_paper_profits() {
    let table = RawStatementTable::feed(
        &["Year", "Net Income", "Operating Cash Flow"],
        rows(&[&["2023", "100000", "20000"]]),
    );
    let bundle = FinancialAnalyzer::new()
        .analyze(&AnalysisRequest::new("Scenario B", vec![table]))
        .unwrap();

    let forensics = bundle.forensics.unwrap();
    assert!(forensics.is_paper_profits());
    assert_eq!(forensics.earnings_gap(), 80_000.0);
}

#[test]
fn scenario_c_document_pivot() {
    let table = RawStatementTable::document(
        &["Item", "FY2023", "FY2022"],
        rows(&[&["Revenue", "1,200", "1,000"], &["CostOfGoodsSold", "700", "650"]]),
    );
    let records = Normalizer::new().normalize_table(&table).unwrap();

    assert_eq!(records.years(), vec![2022, 2023]);
    for record in records.iter() {
        assert!(record.has(CanonicalField::Revenue));
        assert!(record.has(CanonicalField::CostOfGoodsSold));
        assert_eq!(record.len(), 2);
    }
    assert_eq!(records.get(2023).unwrap().get(CanonicalField::Revenue), Some(1200.0));
    assert_eq!(records.get(2022).unwrap().get(CanonicalField::CostOfGoodsSold), Some(650.0));
}

#[test]
fn scenario_d_fragment_merge() {
    let income = RawStatementTable::document(
        &["Item", "2023"],
        rows(&[&["Total revenue", "5,000"], &["Net income", "400"]]),
    )
    .with_title("Consolidated Income Statement");
    let balance = RawStatementTable::document(
        &["Item", "2023"],
        rows(&[&["Total assets", "9,000"], &["Total equity", "4,000"]]),
    )
    .with_title("Balance Sheet");

    assert_eq!(StatementKind::classify(&income), StatementKind::Income);
    assert_eq!(StatementKind::classify(&balance), StatementKind::Balance);

    let outcome = Normalizer::new().normalize(&[balance, income]);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.records.len(), 1);

    let record = outcome.records.get(2023).unwrap();
    assert_eq!(record.get(CanonicalField::Revenue), Some(5000.0));
    assert_eq!(record.get(CanonicalField::NetIncome), Some(400.0));
    assert_eq!(record.get(CanonicalField::TotalAssets), Some(9000.0));
    assert_eq!(record.get(CanonicalField::TotalEquity), Some(4000.0));
}

// ============================================================================
// Pipeline behavior
// ============================================================================

#[test]
fn test_full_pipeline_feed() {
    let request = AnalysisRequest::new("ACME", vec![make_feed_table()]).with_metadata(
        CompanyMetadata {
            market_cap: Some(3_000_000.0),
            industry: Some("Industrial Machinery".into()),
        },
    );
    let bundle = FinancialAnalyzer::new().analyze(&request).unwrap();

    assert_eq!(bundle.records.years(), vec![2022, 2023]);
    assert_eq!(bundle.ratios.sector, SectorProfile::General);
    assert_eq!(bundle.ratios.years.len(), 2);
    assert_eq!(bundle.ratios.latest().unwrap().prior_year, Some(2022));

    let forensics = bundle.forensics.as_ref().unwrap();
    assert_eq!(forensics.year, 2023);
    assert_eq!(forensics.z_score.band, ZScoreBand::Safe);
    assert!(!forensics.m_score.is_placeholder());
    assert!((0.0..=100.0).contains(&forensics.health_score));

    let valuation = bundle.valuation.as_ref().unwrap();
    // 1,100,000 + 400,000 − 0 cash
    assert_eq!(valuation.invested_capital, 1_500_000.0);
    assert!((valuation.nopat - 187_500.0).abs() < 1e-6);
    let eva = bundle.eva_at_default_wacc.unwrap();
    assert!((eva - (187_500.0 - 150_000.0)).abs() < 1e-6);
    assert!((valuation.eva(0.05).unwrap() - 112_500.0).abs() < 1e-6);

    // Receivables and payables were proxied from current assets
    assert!(bundle
        .approximations
        .iter()
        .any(|a| a.field == "Receivables" && a.kind == ApproximationKind::Proxy));
    assert_eq!(
        bundle.records.get(2023).unwrap().get(CanonicalField::Receivables),
        Some(100_000.0)
    );
}

#[test]
fn test_single_year_uses_m_score_placeholder() {
    let request = AnalysisRequest::new("ACME", vec![make_feed_table()]).with_year_range(2023, 2023);
    let bundle = FinancialAnalyzer::new().analyze(&request).unwrap();

    let forensics = bundle.forensics.unwrap();
    assert!(forensics.m_score.is_placeholder());
    assert_eq!(forensics.m_score.value, M_SCORE_SAFE_PLACEHOLDER);
    assert!(!forensics.m_score.likely_manipulation());
    assert!(bundle
        .approximations
        .iter()
        .any(|a| a.kind == ApproximationKind::Placeholder));
}

#[test]
fn test_failed_fragment_does_not_block_merge() {
    let good = RawStatementTable::document(&["Item", "2023"], rows(&[&["Revenue", "100"]]))
        .with_title("Income statement");
    let no_year = RawStatementTable::document(&["Item", "Notes"], rows(&[&["Revenue", "100"]]));
    let unknown = RawStatementTable::document(&["Item", "2023"], rows(&[&["Headcount", "12"]]));

    let outcome = Normalizer::new().normalize(&[no_year, good, unknown]);

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.failures.len(), 2);
    let failures: Vec<(usize, NormalizationFailure)> = outcome
        .failures
        .iter()
        .map(|f| (f.index, f.failure))
        .collect();
    assert!(failures.contains(&(0, NormalizationFailure::NoExtractableYear)));
    assert!(failures.contains(&(2, NormalizationFailure::NoRecognizedFields)));
}

#[test]
fn test_greek_document() {
    let table = RawStatementTable::document(
        &["Κονδύλι", "31/12/2023", "31/12/2022"],
        rows(&[
            &["Κύκλος εργασιών", "1.500.000,00", "1.200.000,00"],
            &["Καθαρά κέρδη", "120.000,00", "(15.000,00)"],
        ]),
    );
    let records = Normalizer::new().normalize_table(&table).unwrap();

    assert_eq!(records.years(), vec![2022, 2023]);
    assert_eq!(records.get(2023).unwrap().get(CanonicalField::Revenue), Some(1_500_000.0));
    assert_eq!(records.get(2022).unwrap().get(CanonicalField::NetIncome), Some(-15_000.0));
}

#[test]
fn test_banking_sector_ratios() {
    let table = RawStatementTable::feed(
        &["Year", "Revenue", "Loans", "Deposits"],
        rows(&[&["2023", "500", "800", "1000"]]),
    );
    let request = AnalysisRequest::new("BANK", vec![table]).with_metadata(CompanyMetadata {
        market_cap: None,
        industry: Some("Regional Banks".into()),
    });
    let bundle = FinancialAnalyzer::new().analyze(&request).unwrap();

    assert_eq!(bundle.ratios.sector, SectorProfile::Banking);
    let sector = &bundle.ratios.latest().unwrap().sector;
    assert!((sector["LoanToDeposit"] - 0.8).abs() < 1e-12);
    // No interest data: degenerate in every year, so not reported
    assert!(!sector.contains_key("NetInterestMargin"));
}

#[test]
fn test_bundle_serializes_to_json() {
    let bundle = FinancialAnalyzer::new()
        .analyze(&AnalysisRequest::new("ACME", vec![make_feed_table()]))
        .unwrap();

    let json = serde_json::to_string(&bundle).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["label"], "ACME");
    assert!(parsed["records"]["2023"].is_object());
    assert!(parsed["forensics"]["m_score"]["status"]["kind"].is_string());
}

#[test]
fn test_peer_group_benchmark() {
    let scaled = |label: &str, factor: f64| {
        let ca = (500.0 * factor).to_string();
        let table = RawStatementTable::feed(
            &["Year", "Current Assets", "Current Liabilities"],
            vec![vec!["2023".to_string(), ca, "250".to_string()]],
        );
        AnalysisRequest::new(label, vec![table])
    };

    let group = PeerGroup::default();
    let results = group.analyze(&[scaled("P", 1.0), scaled("X", 0.5), scaled("Y", 1.5)]);
    let bundles: Vec<_> = results.into_iter().map(Result::unwrap).collect();

    let benchmark = PeerBenchmark::from_bundles(&bundles[0], &bundles[1..]);
    assert_eq!(benchmark.peer_count, 2);
    assert_eq!(benchmark.mean(RatioCategory::Liquidity, "CurrentRatio"), Some(2.0));
    assert_eq!(
        benchmark.difference(RatioCategory::Liquidity, "CurrentRatio"),
        Some(0.0)
    );
}
