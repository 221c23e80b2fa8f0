//! FinLens Analysis Library
//!
//! Turns heterogeneous financial statement tables into canonical yearly
//! records, then derives ratios, forensic scores and a valuation snapshot.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       finlens-analysis                              │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌────────────┐  │
//! │  │  Synonyms   │─►│ Normalizer  │─►│  Fallback   │─►│   Ratio    │  │
//! │  │  Resolver   │  │ feed/pivot  │  │  Policy     │  │   Engine   │  │
//! │  └─────────────┘  └─────────────┘  └─────────────┘  └─────┬──────┘  │
//! │                                                           │         │
//! │                   ┌─────────────┐  ┌─────────────┐        │         │
//! │                   │  Valuation  │◄─│  Forensic   │◄───────┘         │
//! │                   │  NOPAT/EVA  │  │  Z/M/Health │                  │
//! │                   └─────────────┘  └─────────────┘                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Canonical records
//! - One record per fiscal year, keyed by [`CanonicalField`]
//! - An absent field means "unknown", which is distinct from zero
//!
//! ## Table orientations
//! - **Feed**: periods as rows, line items as columns (market-data APIs)
//! - **Document**: line items as rows, periods as columns (filings, PDFs)
//!
//! ## Degraded data
//! - Divisions by zero or unknown resolve to a fixed degenerate value
//! - Proxies and placeholders are recorded as [`Approximation`]s

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analyzer;
pub mod fallback;
pub mod fields;
pub mod forensic;
pub mod normalizer;
pub mod peer;
pub mod ratios;
pub mod record;
pub mod synonyms;
pub mod table;
pub mod valuation;

pub use analyzer::{
    AnalysisBundle, AnalysisConfig, AnalysisRequest, CompanyMetadata, FinancialAnalyzer,
};
pub use fallback::{Approximation, ApproximationKind, FallbackPolicy};
pub use fields::CanonicalField;
pub use forensic::{ForensicAnalyzer, ForensicScoreSet, MScore, MScoreStatus, ZScore, ZScoreBand};
pub use normalizer::{FragmentFailure, NormalizationFailure, NormalizationOutcome, Normalizer};
pub use peer::{PeerBenchmark, PeerGroup};
pub use ratios::{RatioCategory, RatioEngine, RatioReport, SectorProfile, YearRatios};
pub use record::{CanonicalFinancialRecord, RecordSet};
pub use synonyms::{resolve, SynonymTable};
pub use table::{RawStatementTable, StatementKind, TableOrientation};
pub use valuation::ValuationSnapshot;
