//! Test utilities for step scanning.
//!
//! Provides a registrar that records every submission in order, Kotlin
//! source fixtures, and helpers for writing sources to temporary files.

pub mod fixtures;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use std::sync::{Mutex, PoisonError};
use stepscan::registry::StepRegistrar;
use stepscan::step::{StepRegistryEntry, StepValue};
use tempfile::TempDir;

/// Registrar that keeps every submitted entry in submission order.
#[derive(Debug, Default)]
pub struct RecordingRegistrar {
    submitted: Mutex<Vec<(StepValue, StepRegistryEntry)>>,
}

impl RecordingRegistrar {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the submissions so far.
    #[must_use]
    pub fn submissions(&self) -> Vec<(StepValue, StepRegistryEntry)> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Submitted entries, without their keys.
    #[must_use]
    pub fn entries(&self) -> Vec<StepRegistryEntry> {
        self.submissions()
            .into_iter()
            .map(|(_, entry)| entry)
            .collect()
    }
}

impl StepRegistrar for RecordingRegistrar {
    fn add_step(&self, value: StepValue, entry: StepRegistryEntry) {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((value, entry));
    }
}

/// Write `contents` to `name` inside a fresh temporary directory.
///
/// Returns the directory guard alongside the UTF-8 path of the new file.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created, or the path
/// is not valid UTF-8.
pub fn write_source(name: &str, contents: &str) -> Result<(TempDir, Utf8PathBuf)> {
    let dir = TempDir::new().context("create temp dir")?;
    let path = Utf8PathBuf::from_path_buf(dir.path().join(name))
        .map_err(|path| anyhow::anyhow!("non UTF-8 temp path: {}", path.display()))?;
    fs::write(&path, contents).with_context(|| format!("write {path}"))?;
    Ok((dir, path))
}

/// Absolute path of a file under the workspace `tests/data` directory.
#[must_use]
pub fn data_file(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join("data")
        .join(name)
}
