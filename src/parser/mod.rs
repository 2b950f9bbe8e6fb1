//! Declaration-level Kotlin parser.
//!
//! The parser understands enough of Kotlin to enumerate classes, objects,
//! functions, and the annotations attached to them. Function bodies, property
//! initialisers, and class headers are skipped as balanced token trees, so
//! arbitrary statement syntax inside them never needs to be understood.
//!
//! Function and parameter spans are resolved while each node is built via a
//! [`SpanResolver`]. [`parse_file`] uses a [`LineIndex`]; callers with their
//! own coordinate scheme can supply a resolver through [`parse_file_with`].

mod decl;
mod error;
mod expr;
mod lexer;

pub use error::{ParseError, ParseErrorKind};

use crate::ast::KotlinFile;
use crate::position::{LineIndex, PositionError, SourceSpan};
use itertools::Itertools;
use lexer::{Lexer, Token, TokenKind};

/// Maps character offsets recorded during parsing onto source spans.
pub trait SpanResolver {
    /// Resolve the half-open character range `start..end`.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] when the offsets do not describe a range of
    /// the parsed source.
    fn resolve(&self, start: usize, end: usize) -> Result<SourceSpan, PositionError>;
}

impl SpanResolver for LineIndex {
    fn resolve(&self, start: usize, end: usize) -> Result<SourceSpan, PositionError> {
        self.span(start, end)
    }
}

/// Parse Kotlin `source`, naming it `file` in diagnostics.
///
/// # Errors
///
/// Returns [`ParseError`] when the source is not syntactically valid at the
/// declaration level.
pub fn parse_file(source: &str, file: &str) -> Result<KotlinFile, ParseError> {
    let index = LineIndex::new(source);
    parse_file_with(source, file, &index)
}

/// Parse Kotlin `source`, resolving node spans through `spans`.
///
/// # Errors
///
/// Returns [`ParseError`] when the source cannot be parsed or `spans` rejects
/// a node's offsets.
pub fn parse_file_with(
    source: &str,
    file: &str,
    spans: &dyn SpanResolver,
) -> Result<KotlinFile, ParseError> {
    let tokens = Lexer::new(source, file).tokenize()?;
    Parser {
        tokens,
        pos: 0,
        source,
        file,
        spans,
    }
    .file()
}

/// Token cursor shared by the declaration and expression parsers.
struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
    file: &'a str,
    spans: &'a dyn SpanResolver,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead)
    }

    fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|idx| self.tokens.get(idx))
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at_symbol(&self, symbol: &str) -> bool {
        self.peek().is_some_and(|token| token.is_symbol(symbol))
    }

    fn at_identifier(&self, name: &str) -> bool {
        self.peek().is_some_and(|token| token.is_identifier(name))
    }

    fn peek_identifier(&self) -> Option<String> {
        self.peek().and_then(Token::identifier).map(str::to_owned)
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        let found = self.at_symbol(symbol);
        if found {
            self.bump();
        }
        found
    }

    fn eat_identifier(&mut self, name: &str) -> bool {
        let found = self.at_identifier(name);
        if found {
            self.bump();
        }
        found
    }

    fn expect_symbol(&mut self, symbol: &'static str) -> Result<(), ParseError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.unexpected(symbol))
        }
    }

    fn expect_identifier(&mut self, expected: &'static str) -> Result<String, ParseError> {
        let name = self.peek_identifier().ok_or_else(|| self.unexpected(expected))?;
        self.bump();
        Ok(name)
    }

    /// Error describing the current token, or end of input.
    fn unexpected(&self, expected: &'static str) -> ParseError {
        let kind = self.peek().map_or(
            ParseErrorKind::UnexpectedEof { expected },
            |token| ParseErrorKind::Unexpected {
                expected,
                found: token.describe(),
            },
        );
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, index: usize, kind: ParseErrorKind) -> ParseError {
        match self.tokens.get(index) {
            Some(token) => ParseError::new(
                kind,
                self.file,
                self.source,
                token.start,
                token.bytes.clone(),
            ),
            None => {
                let end = self.source.len();
                ParseError::new(
                    kind,
                    self.file,
                    self.source,
                    self.source.chars().count(),
                    end..end,
                )
            }
        }
    }

    /// Skip a bracketed token tree starting at the current `open` token.
    fn skip_balanced(&mut self, open: &'static str, close: &'static str) -> Result<(), ParseError> {
        let opening = self.pos;
        if !self.at_symbol(open) {
            return Err(self.unexpected(open));
        }
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if token.is_symbol(open) {
                depth += 1;
            } else if close == ">" && token.is_symbol(">=") {
                self.split_closing_angle();
                continue;
            } else if token.is_symbol(close) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.bump();
                    return Ok(());
                }
            }
            self.bump();
        }
        Err(self.error_at(opening, ParseErrorKind::Unclosed { open }))
    }

    /// Split the `>=` at the cursor into `>` followed by `=`, as when it ends
    /// a type argument list in `x: List<Int>= emptyList()`.
    fn split_closing_angle(&mut self) {
        let Some(token) = self.peek().cloned() else {
            return;
        };
        let angle = Token {
            kind: TokenKind::Symbol(">"),
            end: token.start + 1,
            bytes: token.bytes.start..token.bytes.start + 1,
            ..token.clone()
        };
        let assign = Token {
            kind: TokenKind::Symbol("="),
            start: token.start + 1,
            bytes: token.bytes.start + 1..token.bytes.end,
            line_start: false,
            ..token
        };
        self.tokens.splice(self.pos..=self.pos, [angle, assign]);
    }

    /// Skip one token, or a whole bracketed group when one starts here.
    fn skip_token_tree(&mut self) -> Result<(), ParseError> {
        if self.at_symbol("(") {
            self.skip_balanced("(", ")")
        } else if self.at_symbol("[") {
            self.skip_balanced("[", "]")
        } else if self.at_symbol("{") {
            self.skip_balanced("{", "}")
        } else {
            self.bump();
            Ok(())
        }
    }

    /// Resolve the span from token `first` to the last consumed token.
    fn span_from(&self, first: usize) -> Result<SourceSpan, ParseError> {
        let (Some(start), Some(end)) = (self.tokens.get(first), self.previous()) else {
            return Err(self.unexpected("a declaration"));
        };
        self.spans
            .resolve(start.start, end.end)
            .map_err(|err| self.error_at(first, ParseErrorKind::Position(err)))
    }

    /// Whitespace-normalised source text of tokens `first..end`.
    fn source_text(&self, first: usize, end: usize) -> String {
        if end <= first {
            return String::new();
        }
        let (Some(start), Some(last)) = (
            self.tokens.get(first),
            end.checked_sub(1).and_then(|idx| self.tokens.get(idx)),
        ) else {
            return String::new();
        };
        self.source
            .get(start.bytes.start..last.bytes.end)
            .map(|text| text.split_whitespace().join(" "))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Declaration;
    use crate::position::SourcePosition;

    struct FixedSpans;

    impl SpanResolver for FixedSpans {
        fn resolve(&self, start: usize, end: usize) -> Result<SourceSpan, PositionError> {
            Ok(SourceSpan::new(
                SourcePosition::new(0, start),
                SourcePosition::new(0, end),
            ))
        }
    }

    struct RejectingSpans;

    impl SpanResolver for RejectingSpans {
        fn resolve(&self, start: usize, _end: usize) -> Result<SourceSpan, PositionError> {
            Err(PositionError::OutOfRange { offset: start, len: 0 })
        }
    }

    #[test]
    fn spans_come_from_the_supplied_resolver() {
        let file = parse_file_with("fun go() {}", "Go.kt", &FixedSpans).expect("parse");
        let Some(Declaration::Function(func)) = file.declarations.first() else {
            panic!("expected function");
        };
        assert_eq!(func.span.start, SourcePosition::new(0, 0));
        assert_eq!(func.span.end, SourcePosition::new(0, 11));
    }

    #[test]
    fn resolver_failures_abort_the_parse() {
        let err = parse_file_with("fun go() {}", "Go.kt", &RejectingSpans).expect_err("fails");
        assert!(matches!(err.kind(), ParseErrorKind::Position(_)));
    }
}
