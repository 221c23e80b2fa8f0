//! Configuration validation.
//!
//! Ensures configured values are within valid ranges before the pipeline
//! starts.

use thiserror::Error;

use crate::config::{AnalysisSettings, Config, ObservabilityConfig};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }
        if let Err(e) = self.analysis.validate() {
            errors.push(e);
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}

impl Validate for AnalysisSettings {
    fn validate(&self) -> ValidationResult<()> {
        let unit_fields = [
            ("analysis.default_tax_rate", self.default_tax_rate),
            ("analysis.default_wacc", self.default_wacc),
            ("analysis.receivables_proxy_share", self.receivables_proxy_share),
            ("analysis.payables_proxy_share", self.payables_proxy_share),
        ];

        let mut errors: Vec<ValidationError> = unit_fields
            .iter()
            .filter_map(|(field, value)| {
                value.and_then(|v| check_unit_interval(field, v).err())
            })
            .collect();

        if let Some(placeholder) = self.m_score_placeholder {
            if !placeholder.is_finite() {
                errors.push(ValidationError::InvalidValue {
                    field: "analysis.m_score_placeholder".into(),
                    reason: "must be a finite number".into(),
                });
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

/// Check that a rate lies within [0, 1].
pub fn check_unit_interval(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.observability.log_format = "xml".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("observability.log_format"));
    }

    #[test]
    fn test_rejects_out_of_range_rates() {
        let settings = AnalysisSettings {
            default_tax_rate: Some(1.5),
            default_wacc: Some(-0.1),
            ..Default::default()
        };
        match settings.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected two errors, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_nan_placeholder() {
        let settings = AnalysisSettings {
            m_score_placeholder: Some(f64::NAN),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
