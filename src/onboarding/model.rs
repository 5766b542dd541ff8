//! Onboarding record and field identifiers.

use serde::{Deserialize, Serialize};

/// Every field the wizard collects, across all steps.
///
/// Serialized as the camelCase name used in forms and JSON bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    CompanyName,
    Website,
    Industry,
    Prompt,
    Keywords,
    PersonasTitle,
    PersonasKey,
    AuthorityTitle,
    AuthorityKey,
    InviteUsers,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::CompanyName,
        Field::Website,
        Field::Industry,
        Field::Prompt,
        Field::Keywords,
        Field::PersonasTitle,
        Field::PersonasKey,
        Field::AuthorityTitle,
        Field::AuthorityKey,
        Field::InviteUsers,
    ];

    /// Wire name, as used in form inputs and JSON keys.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CompanyName => "companyName",
            Self::Website => "website",
            Self::Industry => "industry",
            Self::Prompt => "prompt",
            Self::Keywords => "keywords",
            Self::PersonasTitle => "personasTitle",
            Self::PersonasKey => "personasKey",
            Self::AuthorityTitle => "authorityTitle",
            Self::AuthorityKey => "authorityKey",
            Self::InviteUsers => "inviteUsers",
        }
    }

    /// Form label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CompanyName => "Company name",
            Self::Website => "Website",
            Self::Industry => "Industry",
            Self::Prompt => "Prompt",
            Self::Keywords => "Keywords",
            Self::PersonasTitle => "Personas Title",
            Self::PersonasKey => "Personas Key",
            Self::AuthorityTitle => "Authority Level Title",
            Self::AuthorityKey => "Authority Level Key",
            Self::InviteUsers => "Invite users",
        }
    }

    /// Form input placeholder.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::CompanyName => "Pursuit",
            Self::Website => "https://pursuit.com",
            Self::Industry => "Software",
            Self::Prompt => "",
            Self::Keywords => "",
            Self::PersonasTitle => "Personas",
            Self::PersonasKey => "personas",
            Self::AuthorityTitle => "Manager",
            Self::AuthorityKey => "manager",
            Self::InviteUsers => "teammate@pursuit.com",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Field {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

/// The accumulated, possibly partial, onboarding answers for one session.
///
/// Also used as the patch type for [`OnboardingRecord::merge`]: `Some`
/// fields overwrite, `None` fields leave the target untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personas_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personas_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_users: Option<String>,
}

impl OnboardingRecord {
    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::CompanyName => &self.company_name,
            Field::Website => &self.website,
            Field::Industry => &self.industry,
            Field::Prompt => &self.prompt,
            Field::Keywords => &self.keywords,
            Field::PersonasTitle => &self.personas_title,
            Field::PersonasKey => &self.personas_key,
            Field::AuthorityTitle => &self.authority_title,
            Field::AuthorityKey => &self.authority_key,
            Field::InviteUsers => &self.invite_users,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::CompanyName => &mut self.company_name,
            Field::Website => &mut self.website,
            Field::Industry => &mut self.industry,
            Field::Prompt => &mut self.prompt,
            Field::Keywords => &mut self.keywords,
            Field::PersonasTitle => &mut self.personas_title,
            Field::PersonasKey => &mut self.personas_key,
            Field::AuthorityTitle => &mut self.authority_title,
            Field::AuthorityKey => &mut self.authority_key,
            Field::InviteUsers => &mut self.invite_users,
        }
    }

    /// The stored value for `field`, if any.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    /// Whether `field` holds a non-empty value.
    pub fn is_filled(&self, field: Field) -> bool {
        self.get(field).is_some_and(|v| !v.is_empty())
    }

    /// Shallow merge: every `Some` field of `patch` overwrites this record.
    pub fn merge(&mut self, mut patch: OnboardingRecord) {
        for field in Field::ALL {
            if let Some(value) = patch.slot_mut(field).take() {
                *self.slot_mut(field) = Some(value);
            }
        }
    }

    /// Fields that currently hold a value.
    pub fn present_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.slot(*f).is_some())
            .collect()
    }
}
