//! Error types for the Teal front end.
//!
//! ```text
//! LexError     - tokenization failures, one per malformed lexeme
//! ParseError   - a single syntax diagnostic (kind + span + message)
//! ParseErrors  - the ordered diagnostic list a parse hands back
//! ```
//!
//! Every syntax problem is a hard error; there is no warning level.

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors produced while turning source text into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// A quoted string hit a newline or end of input.
    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    /// A `[[ ... ]]` or `[==[ ... ]==]` string was never closed.
    #[error("unterminated long string at {span}")]
    UnterminatedLongString { span: Span },

    /// A `--[[ ... ]]` comment was never closed.
    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    #[error("malformed number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedLongString { span }
            | LexError::UnterminatedComment { span }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of syntax diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    // Expected-token family
    /// A required token or keyword was missing.
    ExpectedToken,
    /// An operand or value was missing.
    ExpectedExpression,
    /// A type annotation was missing or unparseable.
    ExpectedType,
    /// A name was required.
    ExpectedIdentifier,
    /// A token appeared where nothing can use it.
    UnexpectedToken,

    // Malformed-construct family
    /// A type started correctly but could not be completed.
    InvalidType,
    /// A declaration started correctly but could not be completed.
    InvalidDeclaration,
    /// A `<attrib>` annotation on a variable name was malformed.
    InvalidAttribute,
    /// The `is` list of a record or interface was malformed.
    InvalidInterfaceList,

    /// A prefix expression was neither a call nor an assignment target.
    AmbiguousStatement,

    /// The diagnostic cap was reached and the parse was abandoned.
    TooManyErrors,
    /// The input nested deeper than the configured limit.
    NestingTooDeep,

    /// A tokenization failure surfaced through the parser.
    Lexical,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::InvalidType => "invalid type",
            ParseErrorKind::InvalidDeclaration => "invalid declaration",
            ParseErrorKind::InvalidAttribute => "invalid attribute",
            ParseErrorKind::InvalidInterfaceList => "invalid interface list",
            ParseErrorKind::AmbiguousStatement => "ambiguous statement",
            ParseErrorKind::TooManyErrors => "too many errors",
            ParseErrorKind::NestingTooDeep => "nesting too deep",
            ParseErrorKind::Lexical => "lexical error",
        }
    }

    /// Whether this kind ends the parse instead of being recovered locally.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ParseErrorKind::TooManyErrors | ParseErrorKind::NestingTooDeep
        )
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A syntax diagnostic: what went wrong and where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{span}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Position of the token the parser was looking at.
    pub span: Span,
    /// Human-readable description, e.g. "expected 'then' after condition".
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.span.line
    }

    #[inline]
    pub fn col(&self) -> u32 {
        self.span.col
    }

    /// Render the diagnostic with the offending source line and a caret.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = format!(
            "error[{}] at {}:{}: {}\n",
            self.kind, self.span.line, self.span.col, self.message
        );

        let line_text = (self.span.line as usize)
            .checked_sub(1)
            .and_then(|index| source.lines().nth(index));

        if let Some(line_text) = line_text {
            let indent = " ".repeat((self.span.col as usize).saturating_sub(1));
            let underline = "~".repeat((self.span.len as usize).saturating_sub(1));
            output.push_str("    |\n");
            output.push_str(&format!("{:>3} | {}\n", self.span.line, line_text));
            output.push_str(&format!("    | {indent}^{underline}\n"));
        }

        output
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError::new(ParseErrorKind::Lexical, error.span(), error.to_string())
    }
}

/// Ordered list of diagnostics from one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    pub fn last(&self) -> Option<&ParseError> {
        self.errors.last()
    }

    /// Drop everything after the first `len` diagnostics.
    pub fn truncate(&mut self, len: usize) {
        self.errors.truncate(len);
    }

    pub fn as_slice(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl FromIterator<ParseError> for ParseErrors {
    fn from_iter<I: IntoIterator<Item = ParseError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let error = ParseError::new(
            ParseErrorKind::ExpectedToken,
            Span::new(3, 9, 4),
            "expected 'then' after condition",
        );
        assert_eq!(error.to_string(), "3:9: expected 'then' after condition");
        assert_eq!(error.line(), 3);
        assert_eq!(error.col(), 9);
    }

    #[test]
    fn display_with_source_points_at_column() {
        let source = "local x = 1\nif x 2 then end\n";
        let error = ParseError::new(
            ParseErrorKind::ExpectedToken,
            Span::new(2, 6, 1),
            "expected 'then' after condition",
        );
        let rendered = error.display_with_source(source);
        assert!(rendered.contains("  2 | if x 2 then end"));
        assert!(rendered.contains("    |      ^\n"));
    }

    #[test]
    fn display_with_source_out_of_range_line() {
        let error = ParseError::new(ParseErrorKind::UnexpectedToken, Span::point(0, 0), "oops");
        let rendered = error.display_with_source("x");
        assert_eq!(rendered, "error[unexpected token] at 0:0: oops\n");
    }

    #[test]
    fn lex_error_converts_to_lexical_diagnostic() {
        let lex = LexError::UnterminatedString {
            span: Span::new(1, 5, 6),
        };
        let error: ParseError = lex.into();
        assert_eq!(error.kind, ParseErrorKind::Lexical);
        assert_eq!(error.span, Span::new(1, 5, 6));
        assert_eq!(error.message, "unterminated string at 1:5");
    }

    #[test]
    fn terminal_kinds() {
        assert!(ParseErrorKind::TooManyErrors.is_terminal());
        assert!(ParseErrorKind::NestingTooDeep.is_terminal());
        assert!(!ParseErrorKind::ExpectedToken.is_terminal());
    }

    #[test]
    fn errors_collection() {
        let mut errors = ParseErrors::new();
        assert!(errors.is_empty());
        errors.push(ParseError::new(ParseErrorKind::ExpectedType, Span::point(1, 1), "a"));
        errors.push(ParseError::new(ParseErrorKind::ExpectedType, Span::point(2, 1), "b"));
        errors.push(ParseError::new(ParseErrorKind::ExpectedType, Span::point(3, 1), "c"));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.first().map(|e| e.message.as_str()), Some("a"));
        assert_eq!(errors.to_string(), "1:1: a\n2:1: b\n3:1: c");

        errors.truncate(1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.last().map(|e| e.message.as_str()), Some("a"));
    }
}
