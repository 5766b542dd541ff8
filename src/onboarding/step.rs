//! Wizard steps and the linear position state machine.
//!
//! Progresses strictly: CompanyProfile → Personas → AuthorityLevels →
//! InviteUsers → Completed. A position only advances on a successful,
//! validated submission of the current step.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::Field;
use super::schema::{FieldSchema, FieldValues};
use crate::error::ValidationError;

/// One page of the onboarding sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    CompanyProfile,
    Personas,
    AuthorityLevels,
    InviteUsers,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::CompanyProfile,
        Step::Personas,
        Step::AuthorityLevels,
        Step::InviteUsers,
    ];

    /// URL segment under `/onboarding/`.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::CompanyProfile => "company-profile",
            Self::Personas => "personas",
            Self::AuthorityLevels => "authority-levels",
            Self::InviteUsers => "invite-users",
        }
    }

    /// Navigation label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CompanyProfile => "Company profile",
            Self::Personas => "Personas",
            Self::AuthorityLevels => "Authority levels",
            Self::InviteUsers => "Invite users",
        }
    }

    pub fn path(&self) -> String {
        format!("/onboarding/{}", self.slug())
    }

    /// 1-based position in the sequence.
    pub fn number(&self) -> usize {
        match self {
            Self::CompanyProfile => 1,
            Self::Personas => 2,
            Self::AuthorityLevels => 3,
            Self::InviteUsers => 4,
        }
    }

    /// Fields this step's form collects and validates.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Self::CompanyProfile => &[
                Field::CompanyName,
                Field::Website,
                Field::Industry,
                Field::Prompt,
                Field::Keywords,
            ],
            Self::Personas => &[Field::PersonasTitle, Field::PersonasKey],
            Self::AuthorityLevels => &[Field::AuthorityTitle, Field::AuthorityKey],
            Self::InviteUsers => &[Field::InviteUsers],
        }
    }

    /// Fields that must be filled for the step to count as completed.
    ///
    /// The company profile only requires the company name; every other step
    /// requires all of its fields.
    pub fn completion_fields(&self) -> &'static [Field] {
        match self {
            Self::CompanyProfile => &[Field::CompanyName],
            other => other.fields(),
        }
    }

    /// Steps that must be completed before this one is enabled.
    pub fn prerequisites(&self) -> &'static [Step] {
        match self {
            Self::CompanyProfile => &[],
            Self::Personas => &[Self::CompanyProfile],
            Self::AuthorityLevels => &[Self::CompanyProfile, Self::Personas],
            Self::InviteUsers => &[Self::CompanyProfile, Self::Personas, Self::AuthorityLevels],
        }
    }

    /// Where a successful submission of this step leads.
    pub fn next(&self) -> Position {
        match self {
            Self::CompanyProfile => Position::At(Self::Personas),
            Self::Personas => Position::At(Self::AuthorityLevels),
            Self::AuthorityLevels => Position::At(Self::InviteUsers),
            Self::InviteUsers => Position::Completed,
        }
    }

    /// Validator for exactly this step's field set.
    pub fn validator(&self) -> StepValidator {
        StepValidator {
            step: *self,
            schema: FieldSchema::pick(self.fields()),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for Step {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::ALL
            .into_iter()
            .find(|step| step.slug() == s)
            .ok_or_else(|| format!("Unknown step: {}", s))
    }
}

/// Where the user is in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "step")]
pub enum Position {
    At(Step),
    Completed,
}

impl Position {
    /// Initial position of a fresh session.
    pub const START: Position = Position::At(Step::CompanyProfile);

    pub fn path(&self) -> String {
        match self {
            Self::At(step) => step.path(),
            Self::Completed => "/completed".to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Check if moving from `self` to `target` is a single forward step.
    pub fn can_transition_to(&self, target: Position) -> bool {
        match self {
            Self::At(step) => step.next() == target,
            Self::Completed => false,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::At(step) => write!(f, "{step}"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// The schema projection for one step.
#[derive(Debug, Clone)]
pub struct StepValidator {
    step: Step,
    schema: FieldSchema,
}

impl StepValidator {
    pub fn step(&self) -> Step {
        self.step
    }

    /// Validate a submission, reporting every violation for this step at once.
    pub fn validate(&self, input: &HashMap<String, String>) -> Result<FieldValues, ValidationError> {
        self.schema.validate(input)
    }
}
