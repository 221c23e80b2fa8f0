//! Error types for FinLens.
//!
//! Bad or missing *data* never surfaces here: the analysis pipeline degrades
//! field by field instead. These variants cover invalid *calls* and reading
//! requests from disk or JSON.

use thiserror::Error;

/// Result type alias using the FinLens error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for FinLens crates.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed call into the pipeline (caller bug, not a data-quality issue)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this error signals a caller bug.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Self::InvalidInput(_) => true,
            Self::WithContext { source, .. } => source.is_invalid_input(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_detection() {
        assert!(Error::invalid_input("bad wacc").is_invalid_input());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(!Error::from(io).is_invalid_input());
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::invalid_input("year range reversed");
        let with_ctx = err.with_context("analyzing ACME");
        assert!(matches!(with_ctx, Error::WithContext { .. }));
        assert!(with_ctx.is_invalid_input());
        assert_eq!(
            with_ctx.to_string(),
            "analyzing ACME: Invalid input: year range reversed"
        );
    }

    #[test]
    fn test_result_ext_wraps_json_error() {
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err = parsed.context("parsing request").unwrap_err();
        assert!(err.to_string().starts_with("parsing request: JSON error"));
    }
}
