//! Field schema: the single source of truth for onboarding field rules.
//!
//! Each field carries an ordered list of [`Rule`]s. A [`FieldSchema`] is a
//! projection of the full schema onto a subset of fields; validating input
//! against it checks every rule of every picked field and reports all
//! violations together.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use super::model::Field;
use crate::error::{FieldViolation, ValidationError, ViolationKind};

/// Validated values for a picked set of fields.
pub type FieldValues = BTreeMap<Field, String>;

/// Email shape: no leading dot, no consecutive dots, a dotted domain ending
/// in an alphabetic label of two or more characters. The dot checks are done
/// outside the regex since the `regex` crate has no lookahead.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$").unwrap()
});

/// A single validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    MinLength {
        min: usize,
        message: Option<&'static str>,
    },
    MaxLength {
        max: usize,
        message: Option<&'static str>,
    },
    Url,
    Email {
        message: &'static str,
    },
}

impl Rule {
    /// Check `value` against this rule. Lengths count chars, untrimmed.
    pub fn check(&self, value: &str) -> Option<(ViolationKind, String)> {
        match *self {
            Rule::MinLength { min, message } => (value.chars().count() < min).then(|| {
                let message = message.map(str::to_string).unwrap_or_else(|| {
                    format!("String must contain at least {} character(s)", min)
                });
                (ViolationKind::TooShort, message)
            }),
            Rule::MaxLength { max, message } => (value.chars().count() > max).then(|| {
                let message = message.map(str::to_string).unwrap_or_else(|| {
                    format!("String must contain at most {} character(s)", max)
                });
                (ViolationKind::TooLong, message)
            }),
            Rule::Url => url::Url::parse(value)
                .is_err()
                .then(|| (ViolationKind::InvalidUrl, "Invalid url".to_string())),
            Rule::Email { message } => {
                (!is_email(value)).then(|| (ViolationKind::InvalidEmail, message.to_string()))
            }
        }
    }
}

fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL_RE.is_match(value)
}

/// The rules a field's value must satisfy, in evaluation order.
///
/// An empty slice means any string is accepted.
pub fn rules(field: Field) -> &'static [Rule] {
    const TITLE: &[Rule] = &[
        Rule::MinLength {
            min: 2,
            message: Some("Title must be at least 2 characters"),
        },
        Rule::MaxLength {
            max: 50,
            message: None,
        },
    ];
    const KEY: &[Rule] = &[
        Rule::MinLength {
            min: 2,
            message: Some("Key must be at least 2 characters"),
        },
        Rule::MaxLength {
            max: 50,
            message: None,
        },
    ];

    match field {
        Field::CompanyName => &[
            Rule::MinLength {
                min: 3,
                message: None,
            },
            Rule::MaxLength {
                max: 20,
                message: None,
            },
        ],
        Field::Website => &[
            Rule::Url,
            Rule::MinLength {
                min: 1,
                message: Some("Website is required"),
            },
        ],
        Field::Industry | Field::Prompt | Field::Keywords => &[],
        Field::PersonasTitle | Field::AuthorityTitle => TITLE,
        Field::PersonasKey | Field::AuthorityKey => KEY,
        Field::InviteUsers => &[Rule::Email {
            message: "Invalid email",
        }],
    }
}

/// A projection of the onboarding schema onto a subset of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<Field>,
}

impl FieldSchema {
    /// Project the schema onto `fields`. Order and duplicates are normalized.
    pub fn pick(fields: &[Field]) -> Self {
        let mut fields = fields.to_vec();
        fields.sort();
        fields.dedup();
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Validate raw input keyed by wire name.
    ///
    /// Keys outside the picked set are dropped. A picked field missing from
    /// `input` is checked as the empty string.
    pub fn validate(&self, input: &HashMap<String, String>) -> Result<FieldValues, ValidationError> {
        let mut values = FieldValues::new();
        let mut violations = Vec::new();

        for &field in &self.fields {
            let value = input.get(field.name()).cloned().unwrap_or_default();
            for rule in rules(field) {
                if let Some((kind, message)) = rule.check(&value) {
                    violations.push(FieldViolation {
                        field,
                        rule: kind,
                        message,
                    });
                }
            }
            values.insert(field, value);
        }

        if violations.is_empty() {
            Ok(values)
        } else {
            Err(ValidationError { violations })
        }
    }
}
