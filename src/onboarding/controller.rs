//! Step controller: one step's load/validate/store/advance round trip.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use super::model::{Field, OnboardingRecord};
use super::schema::FieldValues;
use super::step::{Position, Step, StepValidator};
use super::store::OnboardingStore;
use crate::error::ValidationError;

/// What a form shows: current values plus the first error per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub step: Step,
    pub values: FieldValues,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<Field, String>,
}

impl FormState {
    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }
}

/// Result of submitting a step.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Values were stored; navigate to `next`.
    Advanced { next: Position, stored: FieldValues },
    /// Nothing was stored; re-show `form` with its errors.
    Rejected {
        form: FormState,
        error: ValidationError,
    },
}

/// Drives a single step against an injected store.
#[derive(Debug, Clone)]
pub struct StepController {
    validator: StepValidator,
}

impl StepController {
    pub fn new(step: Step) -> Self {
        Self {
            validator: step.validator(),
        }
    }

    pub fn step(&self) -> Step {
        self.validator.step()
    }

    /// Build the form for this step from the store, defaulting absent
    /// fields to the empty string. Safe to call any number of times.
    pub fn load<S: OnboardingStore + ?Sized>(&self, store: &S) -> FormState {
        let record = store.get_all();
        let values = self
            .step()
            .fields()
            .iter()
            .map(|f| (*f, record.get(*f).unwrap_or_default().to_string()))
            .collect();
        FormState {
            step: self.step(),
            values,
            errors: BTreeMap::new(),
        }
    }

    /// Validate `input`; on success merge it into the store and report the
    /// next position, on failure leave the store untouched.
    pub fn submit<S: OnboardingStore + ?Sized>(
        &self,
        store: &mut S,
        input: &HashMap<String, String>,
    ) -> SubmitOutcome {
        let step = self.step();
        match self.validator.validate(input) {
            Ok(values) => {
                let mut patch = OnboardingRecord::default();
                for (field, value) in &values {
                    patch.set(*field, value.clone());
                }
                store.update(patch);

                let next = step.next();
                debug_assert!(Position::At(step).can_transition_to(next));
                info!(step = %step, next = %next, "Onboarding step submitted");
                SubmitOutcome::Advanced {
                    next,
                    stored: values,
                }
            }
            Err(error) => {
                debug!(step = %step, error = %error, "Onboarding step rejected");
                let values = step
                    .fields()
                    .iter()
                    .map(|f| (*f, input.get(f.name()).cloned().unwrap_or_default()))
                    .collect();
                let errors = step
                    .fields()
                    .iter()
                    .filter_map(|f| error.first_message(*f).map(|m| (*f, m.to_string())))
                    .collect();
                SubmitOutcome::Rejected {
                    form: FormState {
                        step,
                        values,
                        errors,
                    },
                    error,
                }
            }
        }
    }
}
