//! Parser infrastructure for Teal.
//!
//! Provides the main [`Parser`] struct with token navigation, the capped
//! diagnostics sink, and panic-mode recovery primitives. The grammar itself
//! lives in the `*_parser` modules, each adding methods to [`Parser`].

use bumpalo::Bump;
use teal_core::{ParseError, ParseErrorKind, ParseErrors, Span};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::ast::expr::Expr;
use crate::ast::stmt::Block;
use crate::ast::types::TypeExpr;
use crate::lexer::{Lexer, Token, TokenKind};

/// Limits applied to a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Diagnostics recorded before the parse is abandoned.
    pub max_errors: usize,
    /// Deepest allowed nesting of blocks, expressions and types.
    pub max_depth: usize,
}

impl ParserConfig {
    pub const DEFAULT_MAX_ERRORS: usize = 10;
    pub const DEFAULT_MAX_DEPTH: usize = 200;

    pub fn new() -> Self {
        Self::default()
    }

    /// Set the diagnostic cap. Values below 1 are raised to 1.
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors.max(1);
        self
    }

    /// Set the nesting limit. Values below 1 are raised to 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_errors: Self::DEFAULT_MAX_ERRORS,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Signal that unwinds the whole parse.
///
/// This is cancellation, not an ordinary error: grammar functions never
/// recover from it, they only forward it with `?` to the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Abort {
    #[error("too many parsing errors")]
    TooManyErrors,
    #[error("maximum nesting depth exceeded")]
    NestingTooDeep,
}

/// Result of every grammar function.
pub type PResult<T> = Result<T, Abort>;

/// What a chunk parse produced.
///
/// `block` is `None` only when the parse was abandoned; `errors` is always
/// the complete diagnostic list.
#[derive(Debug)]
pub struct ParseOutcome<'ast> {
    pub block: Option<&'ast Block<'ast>>,
    pub errors: ParseErrors,
}

impl<'ast> ParseOutcome<'ast> {
    /// A tree was built and no diagnostics were recorded.
    pub fn is_success(&self) -> bool {
        self.block.is_some() && self.errors.is_empty()
    }

    pub fn is_aborted(&self) -> bool {
        self.block.is_none()
    }

    /// The block when the parse was clean, otherwise every diagnostic.
    pub fn into_result(self) -> Result<&'ast Block<'ast>, ParseErrors> {
        match self.block {
            Some(block) if self.errors.is_empty() => Ok(block),
            _ => Err(self.errors),
        }
    }
}

/// The recursive-descent parser for Teal source code.
///
/// The parser works on a fully buffered token sequence that always ends in
/// `Eof`, so lookahead never has to fill a buffer and reads past the end
/// clamp to the `Eof` token.
///
/// The `'ast` lifetime refers to the arena where AST nodes and token
/// lexemes are allocated. A parser is consumed by its entry point; nothing
/// carries over between parses.
pub struct Parser<'ast> {
    /// Buffered tokens, terminated by `Eof`.
    pub(super) buffer: Vec<Token<'ast>>,
    /// Current position in the buffer.
    pub(super) position: usize,
    /// Accumulated diagnostics.
    pub(super) errors: ParseErrors,
    /// Arena allocator for AST nodes.
    pub(super) arena: &'ast Bump,
    pub(super) config: ParserConfig,
    /// Current nesting depth.
    pub(super) depth: usize,
}

impl<'ast> Parser<'ast> {
    /// Create a parser over source text with the default configuration.
    ///
    /// The source is tokenized eagerly. Lexical errors become `Lexical`
    /// diagnostics and count toward the diagnostic cap.
    pub fn new(source: &str, arena: &'ast Bump) -> Self {
        Self::with_config(source, arena, ParserConfig::default())
    }

    pub fn with_config(source: &str, arena: &'ast Bump, config: ParserConfig) -> Self {
        let (tokens, lex_errors) = Lexer::new(source, arena).tokenize();
        let mut parser = Self::from_tokens(tokens, arena, config);
        for error in lex_errors {
            parser.errors.push(ParseError::from(error));
        }
        parser
    }

    /// Create a parser over an existing token sequence.
    ///
    /// A trailing `Eof` is appended when the sequence lacks one.
    pub fn from_tokens(mut tokens: Vec<Token<'ast>>, arena: &'ast Bump, config: ParserConfig) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map_or(Span::point(1, 1), |t| {
                Span::point(t.span.line, t.span.col + t.span.len)
            });
            tokens.push(Token::eof(span));
        }

        Self {
            buffer: tokens,
            position: 0,
            errors: ParseErrors::new(),
            arena,
            config,
            depth: 0,
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Parse source text as a chunk.
    pub fn parse(source: &str, arena: &'ast Bump) -> ParseOutcome<'ast> {
        Self::new(source, arena).parse_chunk()
    }

    pub fn parse_with_config(source: &str, arena: &'ast Bump, config: ParserConfig) -> ParseOutcome<'ast> {
        Self::with_config(source, arena, config).parse_chunk()
    }

    /// Parse an already tokenized chunk.
    pub fn parse_tokens(tokens: Vec<Token<'ast>>, arena: &'ast Bump, config: ParserConfig) -> ParseOutcome<'ast> {
        Self::from_tokens(tokens, arena, config).parse_chunk()
    }

    /// Parse a standalone expression.
    pub fn expression(source: &str, arena: &'ast Bump) -> Result<&'ast Expr<'ast>, ParseErrors> {
        Self::new(source, arena).parse_fragment(|p| p.parse_expression())
    }

    /// Parse a standalone type annotation.
    pub fn type_expr(source: &str, arena: &'ast Bump) -> Result<TypeExpr<'ast>, ParseErrors> {
        Self::new(source, arena).parse_fragment(|p| p.parse_type())
    }

    /// Parse the whole token sequence as one chunk.
    ///
    /// Returns the block and every diagnostic, or no block when the
    /// diagnostic cap or the nesting limit was hit.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_chunk(mut self) -> ParseOutcome<'ast> {
        if self.errors.len() >= self.config.max_errors {
            return self.into_aborted(Abort::TooManyErrors);
        }

        match self.parse_chunk_block() {
            Ok(block) => {
                debug!(
                    statements = block.len(),
                    errors = self.errors.len(),
                    "parsed chunk"
                );
                ParseOutcome {
                    block: Some(block),
                    errors: self.errors,
                }
            }
            Err(abort) => self.into_aborted(abort),
        }
    }

    fn parse_fragment<T>(mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> Result<T, ParseErrors> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        match f(&mut self) {
            Ok(value) => {
                if !self.is_eof() {
                    let token = self.peek();
                    self.errors.push(ParseError::new(
                        ParseErrorKind::UnexpectedToken,
                        token.span,
                        format!("unexpected {token} after end of input"),
                    ));
                }
                if self.errors.is_empty() {
                    Ok(value)
                } else {
                    Err(self.errors)
                }
            }
            Err(abort) => Err(self.into_aborted(abort).errors),
        }
    }

    fn into_aborted(mut self, abort: Abort) -> ParseOutcome<'ast> {
        if abort == Abort::TooManyErrors {
            let cap = self.config.max_errors;
            self.errors.truncate(cap);
            let span = self.peek().span;
            self.errors.push(ParseError::new(
                ParseErrorKind::TooManyErrors,
                span,
                format!("too many parsing errors ({cap})"),
            ));
        }

        warn!(reason = %abort, errors = self.errors.len(), "parse aborted");
        ParseOutcome {
            block: None,
            errors: self.errors,
        }
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &ParseErrors {
        &self.errors
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    /// Peek at the current token without consuming it.
    #[inline]
    pub fn peek(&self) -> Token<'ast> {
        self.peek_nth(0)
    }

    /// Peek ahead `n` tokens. Reads past the end return `Eof`.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Token<'ast> {
        let last = self.buffer.len() - 1;
        self.buffer[(self.position + n).min(last)]
    }

    /// The most recently consumed token.
    #[inline]
    pub fn previous(&self) -> Token<'ast> {
        self.buffer[self.position.saturating_sub(1).min(self.buffer.len() - 1)]
    }

    /// Get the current token and advance. Stays put at `Eof`.
    pub fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    /// Whether the current token is `kind`.
    ///
    /// A soft keyword also satisfies `check(TokenKind::Name)`.
    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.check_nth(0, kind)
    }

    pub fn check_nth(&self, n: usize, kind: TokenKind) -> bool {
        let actual = self.peek_nth(n).kind;
        actual == kind || (kind == TokenKind::Name && actual.is_soft_keyword())
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Consume the current token if it is `kind`.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume the current token if it is any of `kinds`. Never matches at
    /// end of file.
    pub fn eat_any(&mut self, kinds: &[TokenKind]) -> Option<Token<'ast>> {
        if self.is_eof() {
            return None;
        }
        kinds.iter().find_map(|&kind| self.eat(kind))
    }

    /// Consume a required token.
    ///
    /// On a mismatch a diagnostic is recorded at the current token and
    /// `None` is returned without advancing; recovery is up to the caller.
    pub fn consume(&mut self, kind: TokenKind, message: &str) -> PResult<Option<Token<'ast>>> {
        if let Some(token) = self.eat(kind) {
            return Ok(Some(token));
        }
        self.push_error(ParseErrorKind::ExpectedToken, message)?;
        Ok(None)
    }

    /// Consume a name-like token or report `message`.
    pub(super) fn expect_name(&mut self, message: &str) -> PResult<Option<Token<'ast>>> {
        if let Some(token) = self.eat(TokenKind::Name) {
            return Ok(Some(token));
        }
        self.push_error(ParseErrorKind::ExpectedIdentifier, message)?;
        Ok(None)
    }

    /// Whether the current token is the plain name `word`.
    ///
    /// Used for contextual words such as `userdata` and `metamethod` that
    /// the lexer never reserves.
    pub(super) fn check_word(&self, word: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Name && token.lexeme == word
    }

    /// Span from `start` through the last consumed token.
    pub(super) fn span_from(&self, start: Span) -> Span {
        if self.position == 0 {
            return start;
        }
        start.merge(self.previous().span)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Record a diagnostic at the current token.
    ///
    /// Returns `Err(Abort::TooManyErrors)` once the cap is reached.
    pub fn push_error(&mut self, kind: ParseErrorKind, message: impl Into<String>) -> PResult<()> {
        let span = self.peek().span;
        self.push_error_at(kind, span, message)
    }

    pub fn push_error_at(&mut self, kind: ParseErrorKind, span: Span, message: impl Into<String>) -> PResult<()> {
        let error = ParseError::new(kind, span, message);
        debug!(line = span.line, col = span.col, kind = %kind, "{}", error.message);
        self.errors.push(error);

        if self.errors.len() >= self.config.max_errors {
            return Err(Abort::TooManyErrors);
        }
        Ok(())
    }

    /// Discard tokens until a synchronization point or end of file.
    ///
    /// The synchronization token itself is never consumed.
    pub fn skip_to_sync(&mut self) {
        let start = self.position;
        while !self.is_eof() && !is_sync_token(self.peek().kind) {
            self.advance();
        }

        if self.position > start {
            let resume = self.peek();
            trace!(
                skipped = self.position - start,
                line = resume.span.line,
                col = resume.span.col,
                "skipped to synchronization point"
            );
        }
    }

    /// Step one nesting level deeper.
    ///
    /// Exceeding the configured depth records a diagnostic and aborts the
    /// parse. Every successful call is paired with [`Parser::leave`].
    pub(super) fn enter(&mut self) -> PResult<()> {
        if self.depth >= self.config.max_depth {
            return Err(self.nesting_too_deep());
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn leave(&mut self) {
        self.depth -= 1;
    }

    #[cold]
    #[inline(never)]
    fn nesting_too_deep(&mut self) -> Abort {
        let span = self.peek().span;
        let limit = self.config.max_depth;
        self.errors.push(ParseError::new(
            ParseErrorKind::NestingTooDeep,
            span,
            format!("maximum nesting depth ({limit}) exceeded"),
        ));
        Abort::NestingTooDeep
    }
}

/// Tokens that plausibly begin a statement or close a block.
pub(super) fn is_sync_token(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Semicolon
            | TokenKind::Return
            | TokenKind::Break
            | TokenKind::Global
            | TokenKind::Local
            | TokenKind::If
            | TokenKind::While
            | TokenKind::For
            | TokenKind::Function
            | TokenKind::Repeat
            | TokenKind::End
            | TokenKind::Until
            | TokenKind::Else
            | TokenKind::Elseif
            | TokenKind::Eof
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_creation() {
        let arena = bumpalo::Bump::new();
        let parser = Parser::new("local x = 42", &arena);
        assert_eq!(parser.peek().kind, TokenKind::Local);
        assert!(!parser.has_errors());
        assert_eq!(parser.config(), ParserConfig::default());
    }

    #[test]
    fn token_navigation() {
        let arena = bumpalo::Bump::new();
        let mut parser = Parser::new("local x = 42", &arena);

        assert_eq!(parser.peek_nth(1).kind, TokenKind::Name);
        assert_eq!(parser.peek_nth(2).kind, TokenKind::Equal);
        assert_eq!(parser.peek_nth(50).kind, TokenKind::Eof);

        let token = parser.advance();
        assert_eq!(token.kind, TokenKind::Local);
        assert_eq!(parser.previous().kind, TokenKind::Local);
        assert_eq!(parser.peek().lexeme, "x");
    }

    #[test]
    fn advance_stops_at_eof() {
        let arena = bumpalo::Bump::new();
        let mut parser = Parser::new("x", &arena);
        parser.advance();
        assert!(parser.is_eof());
        assert_eq!(parser.advance().kind, TokenKind::Eof);
        assert_eq!(parser.advance().kind, TokenKind::Eof);
        assert!(parser.is_eof());
    }

    #[test]
    fn check_accepts_soft_keywords_as_names() {
        let arena = bumpalo::Bump::new();
        let parser = Parser::new("record", &arena);
        assert!(parser.check(TokenKind::Record));
        assert!(parser.check(TokenKind::Name));
        assert!(!parser.check(TokenKind::Enum));

        let parser = Parser::new("end", &arena);
        assert!(!parser.check(TokenKind::Name));
    }

    #[test]
    fn eat_any_takes_first_match() {
        let arena = bumpalo::Bump::new();
        let mut parser = Parser::new("; x", &arena);
        let token = parser.eat_any(&[TokenKind::Comma, TokenKind::Semicolon]);
        assert_eq!(token.map(|t| t.kind), Some(TokenKind::Semicolon));
        assert!(parser.eat_any(&[TokenKind::Comma]).is_none());

        let mut parser = Parser::new("", &arena);
        assert!(parser.eat_any(&[TokenKind::Eof]).is_none());
    }

    #[test]
    fn consume_failure_does_not_advance() {
        let arena = bumpalo::Bump::new();
        let mut parser = Parser::new("x y", &arena);
        assert_eq!(parser.consume(TokenKind::Equal, "expected '='"), Ok(None));
        assert_eq!(parser.peek().lexeme, "x");
        assert_eq!(parser.errors().len(), 1);
        let error = parser.errors().first().unwrap();
        assert_eq!(error.message, "expected '='");
        assert_eq!((error.line(), error.col()), (1, 1));
    }

    #[test]
    fn push_error_aborts_at_cap() {
        let arena = bumpalo::Bump::new();
        let config = ParserConfig::default().with_max_errors(2);
        let mut parser = Parser::with_config("x", &arena, config);
        assert_eq!(parser.push_error(ParseErrorKind::UnexpectedToken, "one"), Ok(()));
        assert_eq!(
            parser.push_error(ParseErrorKind::UnexpectedToken, "two"),
            Err(Abort::TooManyErrors)
        );
    }

    #[test]
    fn skip_to_sync_stops_before_sync_token() {
        let arena = bumpalo::Bump::new();
        let mut parser = Parser::new(") x + y local z", &arena);
        parser.skip_to_sync();
        assert_eq!(parser.peek().kind, TokenKind::Local);
        parser.skip_to_sync();
        assert_eq!(parser.peek().kind, TokenKind::Local);
    }

    #[test]
    fn from_tokens_appends_eof() {
        let arena = bumpalo::Bump::new();
        let tokens = vec![Token::new(TokenKind::Break, "break", Span::new(1, 1, 5))];
        let parser = Parser::from_tokens(tokens, &arena, ParserConfig::default());
        assert_eq!(parser.peek_nth(1).kind, TokenKind::Eof);
        assert_eq!(parser.peek_nth(1).span, Span::point(1, 6));
    }

    #[test]
    fn enter_stops_at_max_depth() {
        let arena = bumpalo::Bump::new();
        let config = ParserConfig::default().with_max_depth(2);
        let mut parser = Parser::with_config("x", &arena, config);
        assert_eq!(parser.enter(), Ok(()));
        assert_eq!(parser.enter(), Ok(()));
        assert_eq!(parser.enter(), Err(Abort::NestingTooDeep));
        assert_eq!(parser.depth, 2);
        assert_eq!(
            parser.errors().first().map(|e| e.message.as_str()),
            Some("maximum nesting depth (2) exceeded")
        );
    }

    #[test]
    fn depth_returns_to_zero_after_nested_input() {
        let arena = bumpalo::Bump::new();
        let mut parser = Parser::new("x = { (1 + f(a .. b .. c)), function() return {y = 2} end }", &arena);
        let block = parser.parse_chunk_block().unwrap();
        assert_eq!(block.len(), 1);
        assert!(!parser.has_errors(), "unexpected errors: {}", parser.errors());
        assert_eq!(parser.depth, 0);
    }

    #[test]
    fn config_builders_clamp() {
        let config = ParserConfig::new().with_max_errors(0).with_max_depth(0);
        assert_eq!(config.max_errors, 1);
        assert_eq!(config.max_depth, 1);
    }

    #[test]
    fn lexical_errors_become_diagnostics() {
        let arena = bumpalo::Bump::new();
        let parser = Parser::new("local s = \"open", &arena);
        assert_eq!(parser.errors().len(), 1);
        assert_eq!(
            parser.errors().first().map(|e| e.kind),
            Some(ParseErrorKind::Lexical)
        );
    }

    #[test]
    fn outcome_into_result() {
        let arena = bumpalo::Bump::new();
        assert!(Parser::parse("local x = 1", &arena).into_result().is_ok());
        assert!(Parser::parse("local = 1", &arena).into_result().is_err());
    }
}
