//! Progress tracker: derives per-step completed/enabled flags from a record.
//!
//! Pure and pull-based: nothing is cached, callers recompute from the current
//! snapshot whenever they need the flags.

use serde::Serialize;

use super::model::OnboardingRecord;
use super::step::{Position, Step};

/// Flags for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    pub step: Step,
    /// All of the step's completion fields are filled.
    pub completed: bool,
    /// Every earlier step is completed, so navigation to this step is offered.
    pub enabled: bool,
}

/// Flags for every step, in sequence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Progress {
    steps: [StepStatus; 4],
}

/// Whether `step`'s completion fields are all filled in `record`.
pub fn is_completed(record: &OnboardingRecord, step: Step) -> bool {
    step.completion_fields().iter().all(|f| record.is_filled(*f))
}

/// Compute progress for `record`.
pub fn progress(record: &OnboardingRecord) -> Progress {
    let steps = Step::ALL.map(|step| StepStatus {
        step,
        completed: is_completed(record, step),
        enabled: step.prerequisites().iter().all(|p| is_completed(record, *p)),
    });
    Progress { steps }
}

impl Progress {
    pub fn steps(&self) -> &[StepStatus] {
        &self.steps
    }

    pub fn status(&self, step: Step) -> StepStatus {
        self.steps[step.number() - 1]
    }

    pub fn is_enabled(&self, step: Step) -> bool {
        self.status(step).enabled
    }

    pub fn all_completed(&self) -> bool {
        self.steps.iter().all(|s| s.completed)
    }

    /// The first step that is not completed, or `Completed` when none remain.
    ///
    /// This is where a guarded navigation sends a user who asked for a step
    /// that is not enabled yet.
    pub fn resume_position(&self) -> Position {
        self.steps
            .iter()
            .find(|s| !s.completed)
            .map(|s| Position::At(s.step))
            .unwrap_or(Position::Completed)
    }
}
