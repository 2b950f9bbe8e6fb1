//! CLI execution logic.
//!
//! This module keeps `main` minimal: it resolves the scan configuration,
//! scans every requested file into one registry, and writes the result to
//! standard output.

use crate::cli::{Cli, OutputFormat};
use crate::config::ScanConfig;
use crate::registry::StepRegistry;
use crate::scanner::{ScanError, StaticScanner};
use crate::step::StepRegistryEntry;
use anyhow::{Context, Result, bail};
use std::io::{self, Write};
use tracing::{debug, warn};

/// Execute the parsed [`Cli`].
///
/// Files that cannot be read, parsed, or are not Kotlin sources are logged
/// and skipped.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, if no requested file
/// could be scanned, or if writing the report fails.
pub fn run(cli: &Cli) -> Result<()> {
    let config = ScanConfig::load(cli.marker.as_deref()).context("resolve scan configuration")?;
    debug!(marker = %config.marker, extensions = ?config.extensions, "scan configuration");
    let scanner = StaticScanner::new(config);
    let mut scanned = 0usize;
    for path in &cli.files {
        match scanner.add_steps_from_path(path) {
            Ok(added) => {
                debug!(file = %path, added, "scanned file");
                scanned += 1;
            }
            Err(ScanError::Parse(err)) => {
                warn!(file = %path, "skipping unparseable file");
                eprint_report(miette::Report::new(*err));
            }
            Err(err) => warn!(file = %path, error = %err, "skipping file"),
        }
    }
    if scanned == 0 {
        bail!("none of the {} requested files could be scanned", cli.files.len());
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, scanner.registry(), cli.format)?;
    out.flush().context("flush stdout")
}

fn eprint_report(report: miette::Report) {
    let mut err = io::stderr().lock();
    if writeln!(err, "{report:?}").is_err() {
        warn!("failed to write diagnostic to stderr");
    }
}

/// Write the contents of `registry` to `out` in `format`.
///
/// # Errors
///
/// Returns an error if serialisation or writing fails.
pub fn write_report(out: &mut dyn Write, registry: &StepRegistry, format: OutputFormat) -> Result<()> {
    let entries = registry.entries();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &entries).context("serialise steps")?;
            writeln!(out).context("write report")?;
        }
        OutputFormat::Text => {
            for entry in &entries {
                writeln!(out, "{}", text_line(entry)).context("write report")?;
            }
        }
    }
    Ok(())
}

fn text_line(entry: &StepRegistryEntry) -> String {
    let mut line = format!(
        "{}:{}\t{}",
        entry.file_name, entry.span.start, entry.step_text
    );
    if entry.has_alias {
        line.push_str(" (aliases: ");
        line.push_str(&entry.aliases.join(", "));
        line.push(')');
    }
    line
}
