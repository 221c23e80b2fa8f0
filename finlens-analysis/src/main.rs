//! FinLens - analyze a company's financial statements from the command line.
//!
//! Reads an `AnalysisRequest` as JSON from the path given as the first
//! argument (or stdin when absent or `-`) and prints the bundle as JSON.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use finlens_analysis::{AnalysisConfig, AnalysisRequest, FinancialAnalyzer};
use finlens_common::config::Config;
use finlens_common::logging::init_logging_with_exclusions;
use finlens_common::Validate;

fn main() -> Result<()> {
    // Load configuration
    let config = Config::load_with_env()?;
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    tracing::info!("FinLens v{}", env!("CARGO_PKG_VERSION"));

    let request = match std::env::args().nth(1) {
        Some(path) if path != "-" => AnalysisRequest::from_path(Path::new(&path))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            AnalysisRequest::from_json(&buf)?
        }
    };

    let analysis_config = AnalysisConfig::from_settings(&config.analysis)?;
    let bundle = FinancialAnalyzer::with_config(analysis_config).analyze(&request)?;

    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}
