//! Parse failure types.
//!
//! [`ParseError`] is a [`miette`] diagnostic carrying the source text and a
//! labelled span, so callers can render the failure in context. The
//! programmatic cause lives in [`ParseErrorKind`].

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

use crate::position::{PositionError, SourcePosition, position_at};
use miette::{Diagnostic, NamedSource, SourceSpan as LabelSpan};
use std::ops::Range;
use thiserror::Error;

/// Reasons a Kotlin source could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A token other than the expected one was found.
    #[error("expected {expected}, found {found}")]
    Unexpected {
        /// Description of the expected token.
        expected: &'static str,
        /// Text of the token that was found.
        found: String,
    },
    /// The input ended while a construct was still open.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// Description of the expected token.
        expected: &'static str,
    },
    /// A string literal was not closed before the end of its line or file.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// A character literal was not closed.
    #[error("unterminated character literal")]
    UnterminatedChar,
    /// A block comment was not closed.
    #[error("unterminated block comment")]
    UnterminatedComment,
    /// A backtick-quoted identifier was not closed.
    #[error("unterminated backtick identifier")]
    UnterminatedIdentifier,
    /// A bracket was opened and never closed.
    #[error("unclosed `{open}`")]
    Unclosed {
        /// The opening delimiter.
        open: &'static str,
    },
    /// A node's recorded offsets could not be mapped onto the source.
    #[error("invalid node offsets: {0}")]
    Position(#[from] PositionError),
}

/// A Kotlin parse failure with its location.
#[derive(Debug, Error, Diagnostic)]
#[error("{file}: {kind}")]
#[diagnostic(code(stepscan::parse))]
pub struct ParseError {
    file: String,
    kind: ParseErrorKind,
    position: Option<SourcePosition>,
    #[source_code]
    src: NamedSource<String>,
    #[label("parse error here")]
    span: LabelSpan,
}

impl ParseError {
    /// Build an error at character offset `offset`, labelling `bytes`.
    pub(crate) fn new(
        kind: ParseErrorKind,
        file: &str,
        source: &str,
        offset: usize,
        bytes: Range<usize>,
    ) -> Self {
        let len = bytes.end.saturating_sub(bytes.start);
        Self {
            file: file.to_owned(),
            kind,
            position: position_at(source, offset).ok(),
            src: NamedSource::new(file, source.to_owned()),
            span: (bytes.start, len).into(),
        }
    }

    /// The cause of the failure.
    #[must_use]
    pub const fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Name of the file being parsed.
    #[must_use]
    pub const fn file(&self) -> &str {
        self.file.as_str()
    }

    /// Line and column of the failure, when the offset maps onto the source.
    #[must_use]
    pub const fn position(&self) -> Option<SourcePosition> {
        self.position
    }
}
