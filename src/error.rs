//! Error types for the onboarding wizard.

use serde::Serialize;

use crate::onboarding::model::Field;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Which schema rule a field value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    TooShort,
    TooLong,
    InvalidUrl,
    InvalidEmail,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort => write!(f, "too_short"),
            Self::TooLong => write!(f, "too_long"),
            Self::InvalidUrl => write!(f, "invalid_url"),
            Self::InvalidEmail => write!(f, "invalid_email"),
        }
    }
}

/// One rule violation on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: Field,
    pub rule: ViolationKind,
    /// Human-readable message shown next to the form input.
    pub message: String,
}

/// Every violation found while validating one step's submission.
///
/// Never empty: a validator that finds nothing wrong returns the values instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) failed validation: {}", .violations.len(), summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// All violations recorded against `field`, in rule order.
    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &FieldViolation> {
        self.violations.iter().filter(move |v| v.field == field)
    }

    /// The message a form shows for `field`: the first violation, if any.
    pub fn first_message(&self, field: Field) -> Option<&str> {
        self.for_field(field).next().map(|v| v.message.as_str())
    }
}

/// HTML rendering errors.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template registration failed: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_lists_every_violation() {
        let err = ValidationError {
            violations: vec![
                FieldViolation {
                    field: Field::Website,
                    rule: ViolationKind::InvalidUrl,
                    message: "Invalid url".into(),
                },
                FieldViolation {
                    field: Field::Website,
                    rule: ViolationKind::TooShort,
                    message: "Website is required".into(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.starts_with("2 field(s) failed validation"));
        assert!(text.contains("website: Invalid url"));
        assert!(text.contains("website: Website is required"));
    }

    #[test]
    fn first_message_picks_earliest_rule() {
        let err = ValidationError {
            violations: vec![
                FieldViolation {
                    field: Field::Website,
                    rule: ViolationKind::InvalidUrl,
                    message: "Invalid url".into(),
                },
                FieldViolation {
                    field: Field::Website,
                    rule: ViolationKind::TooShort,
                    message: "Website is required".into(),
                },
            ],
        };
        assert_eq!(err.first_message(Field::Website), Some("Invalid url"));
        assert_eq!(err.first_message(Field::CompanyName), None);
        assert_eq!(err.for_field(Field::Website).count(), 2);
    }

    #[test]
    fn violation_kind_serde_matches_display() {
        for kind in [
            ViolationKind::TooShort,
            ViolationKind::TooLong,
            ViolationKind::InvalidUrl,
            ViolationKind::InvalidEmail,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
