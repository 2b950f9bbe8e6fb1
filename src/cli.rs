//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure accepted by the `stepscan`
//! binary.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Report the step implementations declared in Kotlin source files.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Annotation name marking step implementations.
    ///
    /// Overrides `STEPSCAN_MARKER`; defaults to `Step`.
    #[arg(short, long, value_name = "NAME")]
    pub marker: Option<String>,

    /// Output format for the discovered steps.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Kotlin source files to scan.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<Utf8PathBuf>,
}

/// How discovered steps are written to standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per step implementation.
    Text,
    /// Pretty-printed JSON array of registry entries.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["stepscan", "a.kt"], false, None, OutputFormat::Text)]
    #[case(&["stepscan", "-v", "--marker", "Given", "a.kt"], true, Some("Given"), OutputFormat::Text)]
    #[case(&["stepscan", "--format", "json", "a.kt", "b.kts"], false, None, OutputFormat::Json)]
    fn parses_flags(
        #[case] argv: &[&str],
        #[case] verbose: bool,
        #[case] marker: Option<&str>,
        #[case] format: OutputFormat,
    ) {
        let cli = Cli::try_parse_from(argv).expect("valid arguments");
        assert_eq!(cli.verbose, verbose);
        assert_eq!(cli.marker.as_deref(), marker);
        assert_eq!(cli.format, format);
        assert!(!cli.files.is_empty());
    }

    #[test]
    fn requires_at_least_one_file() {
        assert!(Cli::try_parse_from(["stepscan", "-v"]).is_err());
    }
}
