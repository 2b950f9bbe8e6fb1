//! Shared store of discovered step implementations.
//!
//! Entries are grouped by canonical signature ([`StepValue::step_text`]) in
//! first-insertion order. The registry is safe to share between concurrent
//! scans: every operation takes the interior lock for its whole duration, so
//! each observes a consistent map.

use crate::step::{StepRegistryEntry, StepValue};
use indexmap::IndexMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Sink for entries produced by a scan.
pub trait StepRegistrar {
    /// Record `entry` under the canonical signature `value`.
    fn add_step(&self, value: StepValue, entry: StepRegistryEntry);
}

/// Thread-safe registry keyed by canonical step signature.
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: Mutex<IndexMap<String, Vec<StepRegistryEntry>>>,
}

impl StepRegistrar for StepRegistry {
    fn add_step(&self, value: StepValue, entry: StepRegistryEntry) {
        debug!(
            step = %value.step_text,
            file = %entry.file_name,
            "registering step"
        );
        self.lock().entry(value.step_text).or_default().push(entry);
    }
}

impl StepRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<String, Vec<StepRegistryEntry>>> {
        // Each operation leaves the map consistent, so a panic elsewhere does
        // not invalidate it.
        self.steps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether any implementation matches `step_text`.
    ///
    /// Placeholders are canonicalised first, so `"Say <a>"` finds an entry
    /// registered as `"Say <name>"`.
    #[must_use]
    pub fn contains(&self, step_text: &str) -> bool {
        self.lock().contains_key(&StepValue::new(step_text).step_text)
    }

    /// First implementation registered for `step_text`.
    #[must_use]
    pub fn get(&self, step_text: &str) -> Option<StepRegistryEntry> {
        self.lock()
            .get(&StepValue::new(step_text).step_text)
            .and_then(|entries| entries.first().cloned())
    }

    /// Every implementation registered for `step_text`, in insertion order.
    #[must_use]
    pub fn get_all(&self, step_text: &str) -> Vec<StepRegistryEntry> {
        self.lock()
            .get(&StepValue::new(step_text).step_text)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `step_text` is implemented at more than one source location.
    ///
    /// Re-registering the same function does not count as a second
    /// implementation.
    #[must_use]
    pub fn has_multiple_implementations(&self, step_text: &str) -> bool {
        self.lock()
            .get(&StepValue::new(step_text).step_text)
            .and_then(|entries| entries.split_first())
            .is_some_and(|(first, rest)| {
                rest.iter().any(|entry| {
                    entry.file_name != first.file_name || entry.span != first.span
                })
            })
    }

    /// Drop every entry declared in `file`. Signatures left without entries
    /// are removed.
    pub fn remove_steps(&self, file: &str) {
        let mut steps = self.lock();
        for entries in steps.values_mut() {
            entries.retain(|entry| entry.file_name != file);
        }
        steps.retain(|_, entries| !entries.is_empty());
        debug!(file, remaining = steps.len(), "removed steps for file");
    }

    /// Whether any entry was declared in `file`.
    #[must_use]
    pub fn is_file_cached(&self, file: &str) -> bool {
        self.lock()
            .values()
            .flatten()
            .any(|entry| entry.file_name == file)
    }

    /// Canonical signatures in first-insertion order.
    #[must_use]
    pub fn step_texts(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Snapshot of every entry, grouped by signature.
    #[must_use]
    pub fn entries(&self) -> Vec<StepRegistryEntry> {
        self.lock().values().flatten().cloned().collect()
    }

    /// Number of distinct signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry holds no signatures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
