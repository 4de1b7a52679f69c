//! Source location tracking.
//!
//! Every token carries a [`Span`]. AST nodes keep only the start offset;
//! line and column are recovered from the input when a diagnostic is
//! rendered.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A span of source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
    /// 1-based line number where this span starts.
    pub line: u32,
    /// 1-based column number where this span starts.
    pub column: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Returns the length of this span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the text this span covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Maps byte offsets to line and column numbers.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Indexes the line starts of `source`.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// 1-based line and column of `offset`. Columns count characters.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn locate(&self, source: &str, offset: usize) -> (u32, u32) {
        let line = self.line_starts.partition_point(|&s| s <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        let offset = offset.min(source.len());
        let column = source
            .get(line_start..offset)
            .map_or(0, |s| s.chars().count());
        (line as u32, column as u32 + 1)
    }

    /// Builds the span `start..end`.
    #[must_use]
    pub fn span(&self, source: &str, start: usize, end: usize) -> Span {
        let (line, column) = self.locate(source, start);
        Span::new(start, end, line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_and_text() {
        let span = Span::new(5, 10, 1, 6);
        assert_eq!(span.len(), 5);
        assert_eq!(span.text("name = 'x'"), "= 'x");
        assert!(Span::default().is_empty());
    }

    #[test]
    fn locate_first_line() {
        let src = "name = 'x'";
        let index = LineIndex::new(src);
        assert_eq!(index.locate(src, 0), (1, 1));
        assert_eq!(index.locate(src, 7), (1, 8));
    }

    #[test]
    fn locate_later_lines() {
        let src = "a\nbc\n\ndef";
        let index = LineIndex::new(src);
        assert_eq!(index.locate(src, 2), (2, 1));
        assert_eq!(index.locate(src, 3), (2, 2));
        assert_eq!(index.locate(src, 5), (3, 1));
        assert_eq!(index.locate(src, 8), (4, 3));
    }
}
