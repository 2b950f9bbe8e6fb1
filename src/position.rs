//! Character offset to line/column mapping.
//!
//! The parser records node boundaries as character offsets into the source
//! text. [`LineIndex`] converts those offsets into [`SourcePosition`] values
//! using a single pre-scan of the line separators, so every lookup is a binary
//! search rather than a rescan of the preceding text.
//!
//! Lines are 1-based. The column of an offset is its distance from the nearest
//! separator at or before it, which makes the first character of every line
//! column 1.
//!
//! ```rust
//! use stepscan::position::LineIndex;
//!
//! let index = LineIndex::new("fun a() {}\nfun b() {}");
//! let position = index.position(11).expect("offset in range");
//! assert_eq!((position.line, position.column), (2, 1));
//! ```

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Character separating lines in Kotlin sources.
pub const LINE_SEPARATOR: char = '\n';

/// A line/column coordinate within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourcePosition {
    /// 1-based line number.
    pub line: usize,
    /// Distance from the preceding line separator; the first character of a
    /// line is column 1.
    pub column: usize,
}

impl SourcePosition {
    /// Construct a position from its line and column.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start and end coordinates of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceSpan {
    /// Position of the node's first character.
    pub start: SourcePosition,
    /// Position of the node's exclusive end offset.
    pub end: SourcePosition,
}

impl SourceSpan {
    /// Construct a span from its two endpoints.
    #[must_use]
    pub const fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Offsets that cannot be mapped onto the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// The offset lies past the end of the source.
    #[error("offset {offset} lies beyond the end of the source ({len} characters)")]
    OutOfRange {
        /// Offending character offset.
        offset: usize,
        /// Length of the source in characters.
        len: usize,
    },
    /// A span's end offset precedes its start offset.
    #[error("span end offset {end} precedes start offset {start}")]
    Inverted {
        /// Start character offset.
        start: usize,
        /// End character offset.
        end: usize,
    },
}

/// Sorted index of line separator offsets for one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    separators: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Scan `source` once and record the character offset of every separator.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut len = 0;
        let mut separators = Vec::new();
        for (offset, ch) in source.chars().enumerate() {
            if ch == LINE_SEPARATOR {
                separators.push(offset);
            }
            len = offset + 1;
        }
        Self { separators, len }
    }

    /// Number of characters in the indexed source.
    #[must_use]
    pub const fn char_len(&self) -> usize {
        self.len
    }

    /// Map a character offset onto a [`SourcePosition`].
    ///
    /// The end-of-text offset (equal to [`Self::char_len`]) is valid so that
    /// exclusive span ends can be mapped.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError::OutOfRange`] when `offset` exceeds the source
    /// length.
    pub fn position(&self, offset: usize) -> Result<SourcePosition, PositionError> {
        if offset > self.len {
            return Err(PositionError::OutOfRange {
                offset,
                len: self.len,
            });
        }
        let preceding = self.separators.partition_point(|&sep| sep < offset);
        let at_or_before = self.separators.partition_point(|&sep| sep <= offset);
        let column = at_or_before
            .checked_sub(1)
            .and_then(|idx| self.separators.get(idx))
            .map_or(offset + 1, |&sep| offset - sep);
        Ok(SourcePosition::new(preceding + 1, column))
    }

    /// Map a pair of character offsets onto a [`SourceSpan`].
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] when either offset is out of range or the end
    /// precedes the start.
    pub fn span(&self, start: usize, end: usize) -> Result<SourceSpan, PositionError> {
        if end < start {
            return Err(PositionError::Inverted { start, end });
        }
        Ok(SourceSpan::new(self.position(start)?, self.position(end)?))
    }
}

/// Compute the position of `offset` by scanning `source` directly.
///
/// Equivalent to building a [`LineIndex`] and querying it once; convenient
/// for one-off lookups.
///
/// # Errors
///
/// Returns [`PositionError::OutOfRange`] when `offset` exceeds the number of
/// characters in `source`.
pub fn position_at(source: &str, offset: usize) -> Result<SourcePosition, PositionError> {
    let mut line = 1;
    let mut last_separator = None;
    let mut seen = 0;
    for (idx, ch) in source.chars().enumerate() {
        if idx > offset {
            break;
        }
        seen = idx + 1;
        if ch == LINE_SEPARATOR {
            last_separator = Some(idx);
            if idx < offset {
                line += 1;
            }
        }
    }
    if offset > seen {
        return Err(PositionError::OutOfRange { offset, len: seen });
    }
    let column = last_separator.map_or(offset + 1, |sep| offset - sep);
    Ok(SourcePosition::new(line, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1, 1)]
    #[case(3, 1, 4)]
    #[case(4, 1, 0)]
    #[case(5, 2, 1)]
    #[case(8, 2, 4)]
    #[case(9, 2, 0)]
    #[case(10, 3, 1)]
    fn maps_offsets_to_lines_and_columns(
        #[case] offset: usize,
        #[case] line: usize,
        #[case] column: usize,
    ) {
        let src = "abcd\nefgh\nij";
        let position = LineIndex::new(src).position(offset).expect("in range");
        assert_eq!(position, SourcePosition::new(line, column));
    }

    #[test]
    fn offset_zero_of_single_line_file_is_line_one_column_one() {
        let position = LineIndex::new("fun step() {}")
            .position(0)
            .expect("in range");
        assert_eq!(position, SourcePosition::new(1, 1));
    }

    #[test]
    fn end_of_text_offset_is_accepted() {
        let src = "ab\ncd";
        let position = LineIndex::new(src).position(5).expect("end offset");
        assert_eq!(position, SourcePosition::new(2, 3));
    }

    #[test]
    fn rejects_offsets_past_the_end() {
        let err = LineIndex::new("ab").position(3).expect_err("out of range");
        assert_eq!(err, PositionError::OutOfRange { offset: 3, len: 2 });
    }

    #[test]
    fn rejects_inverted_spans() {
        let err = LineIndex::new("abc").span(2, 1).expect_err("inverted");
        assert_eq!(err, PositionError::Inverted { start: 2, end: 1 });
    }

    #[test]
    fn counts_characters_not_bytes() {
        let src = "µ\n¢x";
        let position = LineIndex::new(src).position(3).expect("in range");
        assert_eq!(position, SourcePosition::new(2, 2));
    }

    #[test]
    fn index_agrees_with_direct_scan() {
        let src = "package a\n\nclass B {\n    @Step(\"x\")\n    fun c() {}\n}\n";
        let index = LineIndex::new(src);
        for offset in 0..=index.char_len() {
            assert_eq!(
                index.position(offset).expect("indexed"),
                position_at(src, offset).expect("scanned"),
                "offset {offset}"
            );
        }
    }
}
