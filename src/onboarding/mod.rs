//! Onboarding wizard: a linear sequence of form steps.
//!
//! Each step validates a subset of the onboarding schema and merges the
//! accepted values into a per-session store. Progress (which steps are
//! completed, which are reachable) is derived from the stored record on
//! demand and drives the navigation chrome.

pub mod controller;
pub mod model;
pub mod progress;
pub mod render;
pub mod routes;
pub mod schema;
pub mod session;
pub mod step;
pub mod store;

pub use controller::{FormState, StepController, SubmitOutcome};
pub use model::{Field, OnboardingRecord};
pub use progress::{Progress, StepStatus, progress};
pub use routes::{WizardState, wizard_routes};
pub use schema::{FieldSchema, FieldValues};
pub use session::{SessionId, SessionRegistry};
pub use step::{Position, Step, StepValidator};
pub use store::{MemoryStore, OnboardingStore};
