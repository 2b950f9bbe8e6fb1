//! Per-file step discovery.
//!
//! [`scan_source`] runs the whole pipeline for one file: parse, walk the
//! declarations, decode each step annotation, and submit the resulting
//! entries. [`StaticScanner`] wraps it with a shared [`StepRegistry`] and the
//! file bookkeeping an editor integration needs: reloading a changed file,
//! forgetting a deleted one, and asking whether a file has been seen.

// Module-level suppression for version-dependent lint false positives from
// miette/thiserror derive macros. The unused_assignments lint fires in some
// Rust versions but not others. Since `#[expect]` fails when the lint doesn't
// fire, and `unfulfilled_lint_expectations` cannot be expected, we must use
// `#[allow]` here. FIXME: remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::annotations::{functions, step_annotations};
use crate::builder::add_steps;
use crate::config::ScanConfig;
use crate::parser::{ParseError, parse_file};
use crate::registry::{StepRegistrar, StepRegistry};
use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Failures while scanning a source file.
#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    /// The source is not valid Kotlin.
    #[error(transparent)]
    #[diagnostic(code(stepscan::parse))]
    Parse(Box<ParseError>),
    /// The file extension is not one the scanner handles.
    #[error("unsupported source file: {file}")]
    #[diagnostic(
        code(stepscan::unsupported_file),
        help("only files with a configured Kotlin extension are scanned")
    )]
    UnsupportedFile {
        /// Offending path.
        file: String,
    },
    /// The file could not be read as UTF-8 text.
    #[error("failed to read {path}")]
    #[diagnostic(code(stepscan::read))]
    Read {
        /// Path that failed to read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl From<ParseError> for ScanError {
    fn from(err: ParseError) -> Self {
        Self::Parse(Box::new(err))
    }
}

/// Scan `source`, declared in `file`, and submit an entry to `registrar` for
/// every text of every `marker` annotation. Returns the number of entries
/// submitted.
///
/// # Errors
///
/// Returns [`ScanError::Parse`] when `source` cannot be parsed; nothing is
/// submitted in that case.
///
/// ```rust
/// use stepscan::registry::StepRegistry;
/// use stepscan::scanner::scan_source;
///
/// let registry = StepRegistry::new();
/// let src = "class Steps {\n    @Step(\"Say <hi>\", \"Greet <hi>\")\n    fun hi(hi: String) {}\n}\n";
/// let added = scan_source(&registry, "Steps.kt", src, "Step").expect("scan");
/// assert_eq!(added, 2);
/// assert!(registry.contains("Greet <someone>"));
/// ```
pub fn scan_source(
    registrar: &dyn StepRegistrar,
    file: &str,
    source: &str,
    marker: &str,
) -> Result<usize, ScanError> {
    let parsed = parse_file(source, file)?;
    let mut added = 0;
    for func in functions(&parsed) {
        for args in step_annotations(func, marker) {
            added += add_steps(registrar, func, args, file);
        }
    }
    debug!(file, added, "scanned source");
    Ok(added)
}

/// Scanner feeding a shared registry.
#[derive(Debug, Clone, Default)]
pub struct StaticScanner {
    registry: Arc<StepRegistry>,
    config: ScanConfig,
}

impl StaticScanner {
    /// Create a scanner with its own empty registry.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self::with_registry(Arc::new(StepRegistry::new()), config)
    }

    /// Create a scanner feeding an existing registry.
    #[must_use]
    pub const fn with_registry(registry: Arc<StepRegistry>, config: ScanConfig) -> Self {
        Self { registry, config }
    }

    /// Registry receiving this scanner's entries.
    #[must_use]
    pub const fn registry(&self) -> &Arc<StepRegistry> {
        &self.registry
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan `contents` as the source of `file`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::UnsupportedFile`] when `file` lacks a configured
    /// extension, or [`ScanError::Parse`] when the contents do not parse.
    pub fn add_steps_from_file_contents(&self, file: &str, contents: &str) -> Result<usize, ScanError> {
        if !self.config.accepts(file) {
            return Err(ScanError::UnsupportedFile {
                file: file.to_owned(),
            });
        }
        scan_source(self.registry.as_ref(), file, contents, &self.config.marker)
    }

    /// Read `path` and scan it.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Read`] when the file cannot be read, otherwise as
    /// [`Self::add_steps_from_file_contents`].
    pub fn add_steps_from_path(&self, path: &Utf8Path) -> Result<usize, ScanError> {
        if !self.config.accepts(path.as_str()) {
            return Err(ScanError::UnsupportedFile {
                file: path.to_string(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_owned(),
            source,
        })?;
        self.add_steps_from_file_contents(path.as_str(), &contents)
    }

    /// Replace the entries of `file` with those found in `contents`.
    ///
    /// The old entries are removed before parsing, so a file that no longer
    /// parses ends up with no entries.
    ///
    /// # Errors
    ///
    /// As [`Self::add_steps_from_file_contents`].
    pub fn reload_steps(&self, file: &str, contents: &str) -> Result<usize, ScanError> {
        self.remove_steps(file);
        self.add_steps_from_file_contents(file, contents)
    }

    /// Forget every entry declared in `file`.
    pub fn remove_steps(&self, file: &str) {
        self.registry.remove_steps(file);
    }

    /// Whether any entry from `file` is registered.
    #[must_use]
    pub fn is_file_cached(&self, file: &str) -> bool {
        self.registry.is_file_cached(file)
    }
}
