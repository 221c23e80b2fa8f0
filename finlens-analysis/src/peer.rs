//! Peer-group comparison.
//!
//! Each peer runs through the full pipeline on its own rayon worker; the
//! analyzers share nothing but the read-only synonym table. Results are
//! then reduced into arithmetic-mean benchmarks over each peer's latest year.

use std::collections::BTreeMap;

use finlens_common::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisBundle, AnalysisRequest, FinancialAnalyzer};
use crate::ratios::{inputs_known, RatioCategory};

/// Category → ratio name → value.
pub type RatioSnapshot = BTreeMap<RatioCategory, BTreeMap<String, f64>>;

/// Runs one analysis per company in parallel.
#[derive(Debug, Clone, Default)]
pub struct PeerGroup {
    analyzer: FinancialAnalyzer,
}

impl PeerGroup {
    pub fn new(analyzer: FinancialAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Analyze every request; results come back in request order.
    ///
    /// A failed request does not affect the others.
    pub fn analyze(&self, requests: &[AnalysisRequest]) -> Vec<Result<AnalysisBundle>> {
        tracing::info!(peers = requests.len(), "Analyzing peer group");

        requests
            .par_iter()
            .map(|request| {
                self.analyzer.analyze(request).map_err(|e| {
                    tracing::warn!(label = %request.label, error = %e, "Peer analysis failed");
                    e
                })
            })
            .collect()
    }
}

/// Latest-year ratios of one bundle, full precision.
///
/// Ratios whose inputs were not reported are left out, so a missing figure
/// never enters a benchmark as zero.
pub fn latest_ratios(bundle: &AnalysisBundle) -> RatioSnapshot {
    let Some(current) = bundle.records.latest() else {
        return RatioSnapshot::new();
    };
    let prior = bundle.records.prior_to(current.year);

    bundle
        .ratios
        .flatten()
        .into_iter()
        .filter_map(|(category, mut per_year)| {
            let known: BTreeMap<String, f64> = per_year
                .remove(&current.year)?
                .into_iter()
                .filter(|(name, _)| inputs_known(name, current, prior))
                .collect();
            (!known.is_empty()).then_some((category, known))
        })
        .collect()
}

/// Benchmark means and the primary company's distance from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerBenchmark {
    /// Peers that contributed at least one ratio
    pub peer_count: usize,
    /// Mean across the peers reporting each ratio
    pub means: RatioSnapshot,
    /// Primary minus benchmark, for ratios present on both sides
    pub differences: RatioSnapshot,
}

impl PeerBenchmark {
    /// Reduce peer bundles into benchmark means.
    ///
    /// Peers with no records, or with no ratio whose inputs are known, are
    /// skipped.
    pub fn from_bundles(primary: &AnalysisBundle, peers: &[AnalysisBundle]) -> Self {
        let snapshots: Vec<RatioSnapshot> = peers
            .iter()
            .map(latest_ratios)
            .filter(|snapshot| !snapshot.is_empty())
            .collect();

        let mut sums: BTreeMap<RatioCategory, BTreeMap<String, (f64, usize)>> = BTreeMap::new();
        for snapshot in &snapshots {
            for (category, values) in snapshot {
                let slot = sums.entry(*category).or_default();
                for (name, value) in values {
                    let (sum, count) = slot.entry(name.clone()).or_insert((0.0, 0));
                    *sum += value;
                    *count += 1;
                }
            }
        }

        let means: RatioSnapshot = sums
            .into_iter()
            .map(|(category, values)| {
                let averaged = values
                    .into_iter()
                    .map(|(name, (sum, count))| (name, sum / count as f64))
                    .collect();
                (category, averaged)
            })
            .collect();

        let primary_ratios = latest_ratios(primary);
        let mut differences = RatioSnapshot::new();
        for (category, values) in &primary_ratios {
            let Some(benchmarks) = means.get(category) else {
                continue;
            };
            let diffs: BTreeMap<String, f64> = values
                .iter()
                .filter_map(|(name, value)| {
                    benchmarks.get(name).map(|mean| (name.clone(), value - mean))
                })
                .collect();
            if !diffs.is_empty() {
                differences.insert(*category, diffs);
            }
        }

        tracing::debug!(
            label = %primary.label,
            peers = snapshots.len(),
            "Computed peer benchmark"
        );

        Self {
            peer_count: snapshots.len(),
            means,
            differences,
        }
    }

    /// Mean of one ratio across peers.
    pub fn mean(&self, category: RatioCategory, name: &str) -> Option<f64> {
        self.means.get(&category)?.get(name).copied()
    }

    /// Primary minus benchmark for one ratio.
    pub fn difference(&self, category: RatioCategory, name: &str) -> Option<f64> {
        self.differences.get(&category)?.get(name).copied()
    }
}
