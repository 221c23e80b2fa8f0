//! End-to-end analysis: one request in, one result bundle out.
//!
//! ```text
//! tables ──► Normalizer ──► year filter ──► market cap ──► FallbackPolicy
//!                                                               │
//!            AnalysisBundle ◄── Valuation ◄── Forensics ◄── RatioEngine
//! ```
//!
//! Bad or missing data never fails an analysis: it shows up as
//! normalization failures, approximations, or degenerate ratio values.
//! Only an invalid request does.
//!
//! # Usage
//!
//! ```ignore
//! use finlens_analysis::{AnalysisRequest, FinancialAnalyzer};
//!
//! let analyzer = FinancialAnalyzer::new();
//! let bundle = analyzer.analyze(&AnalysisRequest::new("ACME", tables))?;
//! println!("{}", bundle.ratios.latest().map_or(0.0, |r| r.liquidity.current_ratio));
//! ```

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use finlens_common::logging::generate_run_id;
use finlens_common::validation::check_unit_interval;
use finlens_common::{analysis_span, AnalysisSettings, Error, Result, ResultExt};
use serde::{Deserialize, Serialize};

use crate::fallback::{Approximation, FallbackPolicy};
use crate::forensic::{ForensicAnalyzer, ForensicConfig, ForensicScoreSet, M_SCORE_SAFE_PLACEHOLDER};
use crate::normalizer::{FragmentFailure, Normalizer};
use crate::ratios::{FlatRatios, RatioEngine, RatioReport, SectorProfile, DEFAULT_TAX_RATE};
use crate::record::RecordSet;
use crate::synonyms::SynonymTable;
use crate::table::RawStatementTable;
use crate::valuation::{validate_wacc, ValuationSnapshot, DEFAULT_WACC};

// ============================================================================
// Request
// ============================================================================

/// Facts about the company that do not come from its statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetadata {
    /// Copied into every record lacking MarketCapitalization
    #[serde(default)]
    pub market_cap: Option<f64>,

    /// Free-form industry label, e.g. "Regional Banks"
    #[serde(default)]
    pub industry: Option<String>,
}

/// Input to [`FinancialAnalyzer::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Company label (ticker or name), must be non-empty
    pub label: String,

    #[serde(default)]
    pub tables: Vec<RawStatementTable>,

    #[serde(default)]
    pub metadata: CompanyMetadata,

    /// Inclusive `(first, last)` fiscal years to keep
    #[serde(default)]
    pub year_range: Option<(i32, i32)>,
}

impl AnalysisRequest {
    pub fn new(label: impl Into<String>, tables: Vec<RawStatementTable>) -> Self {
        Self {
            label: label.into(),
            tables,
            metadata: CompanyMetadata::default(),
            year_range: None,
        }
    }

    /// Parse a request from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing analysis request")
    }

    /// Read and parse a JSON request file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .context(format!("reading request file {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn with_metadata(mut self, metadata: CompanyMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_year_range(mut self, first: i32, last: i32) -> Self {
        self.year_range = Some((first, last));
        self
    }

    /// Reject requests that cannot be analyzed at all.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::invalid_input("analysis label must not be empty"));
        }
        if let Some((first, last)) = self.year_range {
            if first > last {
                return Err(Error::invalid_input(format!(
                    "year range start {first} is after its end {last}"
                )));
            }
        }
        if let Some(market_cap) = self.metadata.market_cap {
            if !market_cap.is_finite() {
                return Err(Error::invalid_input("market cap must be a finite number"));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Tunable pipeline parameters.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisConfig {
    /// Tax rate for NOPAT when no effective rate is derivable
    pub default_tax_rate: f64,
    /// Cost of capital for the bundled EVA figure
    pub default_wacc: f64,
    pub fallback: FallbackPolicy,
    pub forensic: ForensicConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_tax_rate: DEFAULT_TAX_RATE,
            default_wacc: DEFAULT_WACC,
            fallback: FallbackPolicy::default(),
            forensic: ForensicConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Build from the config file section, filling gaps with defaults.
    pub fn from_settings(settings: &AnalysisSettings) -> Result<Self> {
        let defaults = FallbackPolicy::default();
        let fallback = FallbackPolicy::new(
            settings
                .receivables_proxy_share
                .unwrap_or(defaults.receivables_share()),
            settings
                .payables_proxy_share
                .unwrap_or(defaults.payables_share()),
        )?;

        let default_tax_rate = settings.default_tax_rate.unwrap_or(DEFAULT_TAX_RATE);
        check_unit_interval("default tax rate", default_tax_rate)
            .map_err(|e| Error::invalid_input(e.to_string()))?;

        let default_wacc = settings.default_wacc.unwrap_or(DEFAULT_WACC);
        validate_wacc(default_wacc)?;

        let m_score_placeholder = settings.m_score_placeholder.unwrap_or(M_SCORE_SAFE_PLACEHOLDER);
        if !m_score_placeholder.is_finite() {
            return Err(Error::invalid_input("M-Score placeholder must be finite"));
        }

        Ok(Self {
            default_tax_rate,
            default_wacc,
            fallback,
            forensic: ForensicConfig {
                m_score_placeholder,
                ..ForensicConfig::default()
            },
        })
    }
}

// ============================================================================
// Result
// ============================================================================

/// Everything one analysis produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub label: String,
    pub run_id: String,
    pub analyzed_at: DateTime<Utc>,
    /// Normalized records after fallbacks, ascending by year
    pub records: RecordSet,
    pub failures: Vec<FragmentFailure>,
    pub approximations: Vec<Approximation>,
    pub ratios: RatioReport,
    /// Rounded presentation view of `ratios`
    pub display_ratios: FlatRatios,
    /// Latest year only; absent when no records survived
    pub forensics: Option<ForensicScoreSet>,
    /// Latest year only; absent when no records survived
    pub valuation: Option<ValuationSnapshot>,
    pub eva_at_default_wacc: Option<f64>,
}

impl AnalysisBundle {
    /// No usable data was found in the request's tables.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.records.latest().map(|r| r.year)
    }
}

// ============================================================================
// Analyzer
// ============================================================================

/// Runs the full pipeline for a single company.
#[derive(Debug, Clone)]
pub struct FinancialAnalyzer {
    config: AnalysisConfig,
    normalizer: Normalizer,
    forensic: ForensicAnalyzer,
}

impl Default for FinancialAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl FinancialAnalyzer {
    /// Create an analyzer with default parameters and synonyms.
    pub fn new() -> Self {
        Self::build(AnalysisConfig::default(), SynonymTable::default_table())
    }

    /// Create an analyzer with custom parameters.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self::build(config, SynonymTable::default_table())
    }

    /// Create an analyzer with custom parameters and an injected synonym table.
    pub fn with_synonyms(config: AnalysisConfig, synonyms: Arc<SynonymTable>) -> Self {
        Self::build(config, synonyms)
    }

    fn build(config: AnalysisConfig, synonyms: Arc<SynonymTable>) -> Self {
        Self {
            normalizer: Normalizer::with_synonyms(synonyms),
            forensic: ForensicAnalyzer::with_config(config.forensic),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one company.
    ///
    /// Fails only for an invalid request or out-of-range rates in the
    /// configuration; data problems are reported inside the bundle.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisBundle> {
        request.validate()?;
        validate_wacc(self.config.default_wacc)?;
        let ratio_engine = RatioEngine::with_default_tax_rate(self.config.default_tax_rate)?;

        let run_id = generate_run_id();
        let span = analysis_span!(request.label, run_id, tables = request.tables.len());
        let _enter = span.enter();

        let outcome = self.normalizer.normalize(&request.tables);
        let mut records = outcome.records;

        if let Some((first, last)) = request.year_range {
            let before = records.len();
            records = records.filter_years(first..=last);
            tracing::debug!(
                first,
                last,
                dropped = before - records.len(),
                "Applied year range"
            );
        }
        if let Some(market_cap) = request.metadata.market_cap {
            records.apply_market_cap(market_cap);
        }

        let (records, mut approximations) = self.config.fallback.apply(&records);

        let sector = SectorProfile::from_industry(request.metadata.industry.as_deref());
        let ratios = ratio_engine.compute(&records, sector);
        let display_ratios = ratios.for_display();

        let mut forensics = None;
        let mut valuation = None;
        let mut eva_at_default_wacc = None;

        if let (Some(latest), Some(latest_ratios)) = (records.latest(), ratios.latest()) {
            let prior = records.prior_to(latest.year);

            let (scores, forensic_notes) = self.forensic.score(latest, prior, latest_ratios);
            approximations.extend(forensic_notes);
            forensics = Some(scores);

            let (snapshot, valuation_notes) =
                ValuationSnapshot::compute(latest, ratio_engine.default_tax_rate());
            approximations.extend(valuation_notes);
            eva_at_default_wacc = Some(snapshot.eva(self.config.default_wacc)?);
            valuation = Some(snapshot);
        } else {
            tracing::warn!(
                failures = outcome.failures.len(),
                "No usable records; forensics and valuation skipped"
            );
        }

        tracing::info!(
            years = records.len(),
            failures = outcome.failures.len(),
            approximations = approximations.len(),
            sector = %sector,
            "Analysis complete"
        );

        Ok(AnalysisBundle {
            label: request.label.clone(),
            run_id,
            analyzed_at: Utc::now(),
            records,
            failures: outcome.failures,
            approximations,
            ratios,
            display_ratios,
            forensics,
            valuation,
            eva_at_default_wacc,
        })
    }
}
