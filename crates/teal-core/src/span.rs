//! Source positions for tokens, AST nodes and diagnostics.

use std::fmt;

/// A region of source text anchored at its first character.
///
/// Lines and columns are 1-indexed. Columns count bytes, which matches
/// what the lexer tracks and keeps caret rendering cheap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line of the first character.
    pub line: u32,
    /// Column of the first character.
    pub col: u32,
    /// Length in bytes. Zero for synthesized positions such as end of file.
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// A zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether this span starts strictly before `other`.
    #[inline]
    pub fn starts_before(&self, other: Span) -> bool {
        (self.line, self.col) < (other.line, other.col)
    }

    /// Extend this span so it reaches the end of `other`.
    ///
    /// The result is anchored at whichever span starts first. Spans on
    /// different lines keep the anchor and only grow by the length of the
    /// later span, since a single-line length cannot describe a multi-line
    /// region exactly.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        let (first, last) = if other.starts_before(self) {
            (other, self)
        } else {
            (self, other)
        };

        if first.line == last.line {
            let end = (last.col + last.len).max(first.col + first.len);
            Span::new(first.line, first.col, end - first.col)
        } else {
            Span::new(first.line, first.col, first.len + last.len)
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
