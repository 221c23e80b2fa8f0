//! Logging utilities for FinLens.
//!
//! Provides structured logging (JSON or pretty) with per-analysis run IDs.
//!
//! # Filtering
//!
//! `RUST_LOG` always wins over the configured level. Extra targets can be
//! pushed down to `warn` to keep per-field normalization chatter out of the
//! business logs.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Modules that log at high volume while normalizing large tables.
pub const NOISY_MODULES: &[&str] = &["finlens_analysis::normalizer::clean", "rayon_core"];

/// Build the EnvFilter for the given base level and extra quiet targets.
fn build_filter(log_level: &str, excluded_targets: &[String]) -> EnvFilter {
    // Try environment variable first (allows override)
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = String::from(log_level);

    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }

    for target in excluded_targets {
        directives.push_str(&format!(",{}=warn", target));
    }

    EnvFilter::new(&directives)
}

/// Initialize logging with the given configuration.
///
/// # Arguments
///
/// * `log_level` - Base log level (trace, debug, info, warn, error)
/// * `log_format` - Output format: "json" for structured JSON, "pretty" for human-readable
///
/// Logs go to stderr so the CLI can keep stdout for the result bundle.
pub fn init_logging(log_level: &str, log_format: &str) {
    init_logging_with_exclusions(log_level, log_format, &[]);
}

/// Initialize logging with custom excluded targets.
///
/// Like `init_logging`, but allows specifying additional modules to quiet.
pub fn init_logging_with_exclusions(
    log_level: &str,
    log_format: &str,
    excluded_targets: &[String],
) {
    let filter = build_filter(log_level, excluded_targets);

    let subscriber = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
            .with_file(false)
            .with_line_number(false);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::info!(
        log_level = %log_level,
        log_format = %log_format,
        noise_filtered = NOISY_MODULES.len() + excluded_targets.len(),
        "Logging initialized"
    );
}

/// Generate a new run ID for one pipeline invocation.
pub fn generate_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Create a tracing span for one analysis run.
///
/// # Example
///
/// ```ignore
/// let span = analysis_span!(label, run_id, tables = request.tables.len());
/// let _enter = span.enter();
/// ```
#[macro_export]
macro_rules! analysis_span {
    ($label:expr, $run_id:expr) => {
        tracing::info_span!("analyze", label = %$label, run_id = %$run_id)
    };
    ($label:expr, $run_id:expr, $($field:tt)*) => {
        tracing::info_span!("analyze", label = %$label, run_id = %$run_id, $($field)*)
    };
}
