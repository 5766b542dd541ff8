//! Onboarding state store: holds one session's record.
//!
//! Writes are trusted: callers validate before calling [`OnboardingStore::update`].

use tracing::debug;

use super::model::OnboardingRecord;

/// Read/merge access to an onboarding record.
pub trait OnboardingStore: Send + Sync {
    /// Snapshot of the whole record.
    fn get_all(&self) -> OnboardingRecord;

    /// Shallow-merge `patch` into the record. Supplied fields overwrite,
    /// omitted fields are preserved.
    fn update(&mut self, patch: OnboardingRecord);
}

/// In-memory store, one per browser session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: OnboardingRecord,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the record without cloning.
    pub fn record(&self) -> &OnboardingRecord {
        &self.record
    }
}

impl OnboardingStore for MemoryStore {
    fn get_all(&self) -> OnboardingRecord {
        self.record.clone()
    }

    fn update(&mut self, patch: OnboardingRecord) {
        debug!(fields = ?patch.present_fields(), "Merging onboarding fields");
        self.record.merge(patch);
    }
}
