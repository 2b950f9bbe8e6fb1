//! Kotlin tokenizer.
//!
//! Produces the token stream consumed by the declaration parser. Comments and
//! whitespace are dropped, but each token remembers whether it opened a new
//! line so the parser can find declaration boundaries after expression bodies.
//! String literals are split into [`TemplateElement`]s here, while the exact
//! source is still at hand.

use super::error::{ParseError, ParseErrorKind};
use crate::ast::{StringTemplate, TemplateElement};
use std::ops::Range;

/// Operator and punctuation tokens, longest first so that greedy matching
/// picks `===` over `==`.
const SYMBOLS: &[&str] = &[
    "===", "!==", "...", "..<", "?:", "::", "->", "=>", "==", "!=", "<=", ">=", "&&", "||", "++",
    "--", "+=", "-=", "*=", "/=", "%=", "?.", "!!", "..", "(", ")", "{", "}", "[", "]", "<", ">",
    ",", ".", ":", ";", "@", "=", "+", "-", "*", "/", "%", "!", "?", "&", "|", "^", "~", "#",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Identifier(String),
    String(StringTemplate),
    Char(String),
    Number(String),
    Symbol(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    /// Character offset of the first character.
    pub(crate) start: usize,
    /// Exclusive character offset of the end.
    pub(crate) end: usize,
    pub(crate) bytes: Range<usize>,
    /// Whether only whitespace or comments precede the token on its line.
    pub(crate) line_start: bool,
}

impl Token {
    pub(crate) fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self.kind, TokenKind::Symbol(found) if found == symbol)
    }

    pub(crate) fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub(crate) fn is_identifier(&self, name: &str) -> bool {
        self.identifier() == Some(name)
    }

    /// Short human-readable rendering for error messages.
    pub(crate) fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Identifier(name) => format!("`{name}`"),
            TokenKind::String(_) => String::from("a string literal"),
            TokenKind::Char(text) | TokenKind::Number(text) => format!("`{text}`"),
            TokenKind::Symbol(symbol) => format!("`{symbol}`"),
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Accumulates template elements, merging adjacent literal characters.
#[derive(Default)]
struct TemplateBuilder {
    elements: Vec<TemplateElement>,
    text: String,
}

impl TemplateBuilder {
    fn push(&mut self, ch: char) {
        self.text.push(ch);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.elements
                .push(TemplateElement::Regular(std::mem::take(&mut self.text)));
        }
    }

    fn element(&mut self, element: TemplateElement) {
        self.flush();
        self.elements.push(element);
    }

    fn finish(mut self, raw: bool) -> StringTemplate {
        self.flush();
        StringTemplate {
            elements: self.elements,
            raw,
        }
    }
}

pub(crate) struct Lexer<'a> {
    source: &'a str,
    file: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line_start: bool,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str, file: &'a str) -> Self {
        Self {
            source,
            file,
            chars: source.char_indices().collect(),
            pos: 0,
            line_start: true,
        }
    }

    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|&(_, ch)| ch)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(ahead, ch)| self.peek_at(ahead) == Some(ch))
    }

    fn byte_at(&self, pos: usize) -> usize {
        self.chars
            .get(pos)
            .map_or(self.source.len(), |&(byte, _)| byte)
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.chars
            .get(start..end)
            .map(|slice| slice.iter().map(|&(_, ch)| ch).collect())
            .unwrap_or_default()
    }

    fn error(&self, kind: ParseErrorKind, start: usize) -> ParseError {
        let end = self.pos.max(start + 1);
        ParseError::new(
            kind,
            self.file,
            self.source,
            start,
            self.byte_at(start)..self.byte_at(end),
        )
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_trivia()?;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        let start = self.pos;
        let kind = match ch {
            '"' => TokenKind::String(self.string_literal()?),
            '\'' => self.char_literal()?,
            '`' => self.backtick_identifier()?,
            c if is_identifier_start(c) => self.identifier(),
            c if c.is_ascii_digit() => self.number(),
            _ => self.symbol()?,
        };
        let token = Token {
            kind,
            start,
            end: self.pos,
            bytes: self.byte_at(start)..self.byte_at(self.pos),
            line_start: self.line_start,
        };
        self.line_start = false;
        Ok(Some(token))
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some('\n') => {
                    self.line_start = true;
                    self.pos += 1;
                }
                Some(ch) if ch.is_whitespace() => self.pos += 1,
                Some('/') if self.peek_at(1) == Some('/') => self.skip_line(),
                Some('/') if self.peek_at(1) == Some('*') => self.skip_block_comment()?,
                Some('#') if self.pos == 0 && self.peek_at(1) == Some('!') => self.skip_line(),
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        while self.peek().is_some_and(|ch| ch != '\n') {
            self.pos += 1;
        }
    }

    /// Kotlin block comments nest.
    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            if self.starts_with("/*") {
                depth += 1;
                self.pos += 2;
            } else if self.starts_with("*/") {
                depth = depth.saturating_sub(1);
                self.pos += 2;
                if depth == 0 {
                    return Ok(());
                }
            } else if self.bump().is_none() {
                return Err(self.error(ParseErrorKind::UnterminatedComment, start));
            }
        }
    }

    fn identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek().is_some_and(is_identifier_part) {
            self.pos += 1;
        }
        TokenKind::Identifier(self.text(start, self.pos))
    }

    fn backtick_identifier(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let name_start = self.pos;
        loop {
            match self.peek() {
                Some('`') => break,
                Some('\n') | None => {
                    return Err(self.error(ParseErrorKind::UnterminatedIdentifier, start));
                }
                Some(_) => self.pos += 1,
            }
        }
        let name = self.text(name_start, self.pos);
        self.pos += 1;
        Ok(TokenKind::Identifier(name))
    }

    fn number(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            let fraction = ch == '.' && self.peek_at(1).is_some_and(|next| next.is_ascii_digit());
            if ch.is_ascii_alphanumeric() || ch == '_' || fraction {
                self.pos += 1;
            } else {
                break;
            }
        }
        TokenKind::Number(self.text(start, self.pos))
    }

    fn char_literal(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.pos += 1;
        match self.bump() {
            Some('\\') => {
                if self.bump() == Some('u') {
                    self.pos += 4;
                }
            }
            Some('\n' | '\'') | None => {
                return Err(self.error(ParseErrorKind::UnterminatedChar, start));
            }
            Some(_) => {}
        }
        if self.peek() != Some('\'') {
            return Err(self.error(ParseErrorKind::UnterminatedChar, start));
        }
        self.pos += 1;
        Ok(TokenKind::Char(self.text(start, self.pos)))
    }

    fn symbol(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        let Some(symbol) = SYMBOLS.iter().copied().find(|sym| self.starts_with(sym)) else {
            let found = self.peek().map(String::from).unwrap_or_default();
            self.pos += 1;
            return Err(self.error(
                ParseErrorKind::Unexpected {
                    expected: "a token",
                    found,
                },
                start,
            ));
        };
        self.pos += symbol.chars().count();
        Ok(TokenKind::Symbol(symbol))
    }

    fn string_literal(&mut self) -> Result<StringTemplate, ParseError> {
        let start = self.pos;
        if self.starts_with("\"\"\"") {
            self.pos += 3;
            return self.raw_string_body(start);
        }
        self.pos += 1;
        let mut builder = TemplateBuilder::default();
        loop {
            match self.peek() {
                Some('"') => {
                    self.pos += 1;
                    return Ok(builder.finish(false));
                }
                Some('\\') => {
                    let ch = self.escape(start)?;
                    builder.element(TemplateElement::Escape(ch));
                }
                Some('$') => self.template_entry(&mut builder, start)?,
                Some('\n') | None => {
                    return Err(self.error(ParseErrorKind::UnterminatedString, start));
                }
                Some(ch) => {
                    self.pos += 1;
                    builder.push(ch);
                }
            }
        }
    }

    fn raw_string_body(&mut self, start: usize) -> Result<StringTemplate, ParseError> {
        let mut builder = TemplateBuilder::default();
        loop {
            if self.starts_with("\"\"\"") {
                // Quotes beyond the closing three belong to the content.
                while self.peek_at(3) == Some('"') {
                    self.pos += 1;
                    builder.push('"');
                }
                self.pos += 3;
                return Ok(builder.finish(true));
            }
            match self.peek() {
                Some('$') => self.template_entry(&mut builder, start)?,
                Some(ch) => {
                    self.pos += 1;
                    builder.push(ch);
                }
                None => return Err(self.error(ParseErrorKind::UnterminatedString, start)),
            }
        }
    }

    fn escape(&mut self, literal_start: usize) -> Result<char, ParseError> {
        self.pos += 1;
        let Some(ch) = self.bump() else {
            return Err(self.error(ParseErrorKind::UnterminatedString, literal_start));
        };
        Ok(match ch {
            't' => '\t',
            'b' => '\u{8}',
            'n' => '\n',
            'r' => '\r',
            'u' => self.unicode_escape().unwrap_or('u'),
            other => other,
        })
    }

    fn unicode_escape(&mut self) -> Option<char> {
        let digits = self.text(self.pos, self.pos + 4);
        if digits.chars().count() != 4 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        let decoded = u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)?;
        self.pos += 4;
        Some(decoded)
    }

    fn template_entry(
        &mut self,
        builder: &mut TemplateBuilder,
        literal_start: usize,
    ) -> Result<(), ParseError> {
        match self.peek_at(1) {
            Some('{') => {
                self.pos += 2;
                let body_start = self.pos;
                let mut depth = 1usize;
                loop {
                    match self.peek() {
                        Some('{') => {
                            depth += 1;
                            self.pos += 1;
                        }
                        Some('}') => {
                            depth -= 1;
                            if depth == 0 {
                                let body = self.text(body_start, self.pos);
                                self.pos += 1;
                                builder.element(TemplateElement::LongTemplate(
                                    body.trim().to_owned(),
                                ));
                                return Ok(());
                            }
                            self.pos += 1;
                        }
                        Some('"') => {
                            self.string_literal()?;
                        }
                        Some('\'') => {
                            self.char_literal()?;
                        }
                        Some(_) => self.pos += 1,
                        None => {
                            return Err(
                                self.error(ParseErrorKind::UnterminatedString, literal_start)
                            );
                        }
                    }
                }
            }
            Some(next) if is_identifier_start(next) => {
                self.pos += 1;
                let name_start = self.pos;
                while self.peek().is_some_and(is_identifier_part) {
                    self.pos += 1;
                }
                builder.element(TemplateElement::ShortTemplate(
                    self.text(name_start, self.pos),
                ));
                Ok(())
            }
            _ => {
                self.pos += 1;
                builder.push('$');
                Ok(())
            }
        }
    }
}
