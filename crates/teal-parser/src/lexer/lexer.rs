//! Lexer for Teal source text.
//!
//! The [`Lexer`] turns source text into [`Token`]s, dispatching on the first
//! character of each lexeme. Lexemes are copied into the arena so the source
//! can be dropped once tokenization is done.

use bumpalo::Bump;
use teal_core::{LexError, Span};
use tracing::trace;

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for Teal source code.
///
/// The `'src` lifetime is the source being scanned, `'ast` the arena that
/// receives token lexemes.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    errors: Vec<LexError>,
    finished: bool,
}

/// Start position of the lexeme being scanned.
#[derive(Clone, Copy)]
struct Start {
    line: u32,
    col: u32,
    offset: u32,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        let mut lexer = Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
            finished: false,
        };
        lexer.skip_shebang();
        lexer
    }

    /// Take the errors recorded so far.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Scan the whole input.
    ///
    /// The returned tokens always end with `Eof`. Malformed lexemes are left
    /// out of the token list and reported through the error list instead.
    pub fn tokenize(mut self) -> (Vec<Token<'ast>>, Vec<LexError>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            match token.kind {
                TokenKind::Error => continue,
                TokenKind::Eof => {
                    tokens.push(token);
                    break;
                }
                _ => tokens.push(token),
            }
        }
        (tokens, self.errors)
    }

    /// Consume and return the next token. Returns `Eof` forever at the end.
    pub fn next_token(&mut self) -> Token<'ast> {
        if let Some(error) = self.skip_trivia() {
            return self.make_error(error);
        }

        if self.cursor.is_eof() {
            return Token::eof(Span::point(self.cursor.line(), self.cursor.column()));
        }

        let start = self.start();
        match self.cursor.peek() {
            Some('"' | '\'') => self.scan_string(start),
            Some('[') if self.long_bracket_level().is_some() => self.scan_long_string(start),
            Some(c) if c.is_ascii_digit() => self.scan_number(start),
            Some('.') if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start)
            }
            Some(c) if is_ident_start(c) => self.scan_identifier(start),
            _ => self.scan_operator(start),
        }
    }

    // =========================================
    // Token construction
    // =========================================

    fn start(&self) -> Start {
        Start {
            line: self.cursor.line(),
            col: self.cursor.column(),
            offset: self.cursor.offset(),
        }
    }

    fn span_from(&self, start: Start) -> Span {
        Span::new(start.line, start.col, self.cursor.offset() - start.offset)
    }

    fn make_token(&self, kind: TokenKind, start: Start) -> Token<'ast> {
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start.offset));
        Token::new(kind, lexeme, self.span_from(start))
    }

    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        trace!(%error, "lexical error");
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Trivia: whitespace, comments, shebang
    // =========================================

    fn skip_shebang(&mut self) {
        if self.cursor.check_str("\u{FEFF}") {
            self.cursor.advance();
        }
        if self.cursor.check_str("#!") {
            self.cursor.eat_while(|c| c != '\n');
        }
    }

    /// Skip whitespace and comments. Returns an error for an unclosed
    /// long comment.
    fn skip_trivia(&mut self) -> Option<LexError> {
        loop {
            self.cursor.eat_while(|c| c.is_ascii_whitespace());

            if !self.cursor.check_str("--") {
                return None;
            }

            let start = self.start();
            self.cursor.skip(2);

            match self.long_bracket_level() {
                Some(level) => {
                    if !self.scan_long_body(level) {
                        return Some(LexError::UnterminatedComment {
                            span: self.span_from(start),
                        });
                    }
                }
                None => {
                    self.cursor.eat_while(|c| c != '\n');
                }
            }
        }
    }

    // =========================================
    // Strings
    // =========================================

    fn scan_string(&mut self, start: Start) -> Token<'ast> {
        let Some(quote) = self.cursor.advance() else {
            return Token::eof(self.span_from(start));
        };

        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let span = self.span_from(start);
                    return self.make_error(LexError::UnterminatedString { span });
                }
                Some('\\') => {
                    self.cursor.advance();
                    // `\z` skips following whitespace; every other escape is
                    // one character, which is all the lexer needs to know.
                    if self.cursor.eat('z') {
                        self.cursor.eat_while(|c| c.is_ascii_whitespace());
                    } else {
                        self.cursor.advance();
                    }
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    return self.make_token(TokenKind::String, start);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn scan_long_string(&mut self, start: Start) -> Token<'ast> {
        let level = self.long_bracket_level().unwrap_or(0);
        if self.scan_long_body(level) {
            self.make_token(TokenKind::String, start)
        } else {
            let span = self.span_from(start);
            self.make_error(LexError::UnterminatedLongString { span })
        }
    }

    /// If the cursor sits on `[`, `[=`, `[==`, ... followed by `[`, return the
    /// number of `=` signs.
    fn long_bracket_level(&self) -> Option<usize> {
        if self.cursor.peek() != Some('[') {
            return None;
        }
        let mut level = 0;
        loop {
            match self.cursor.peek_nth(level + 1) {
                Some('=') => level += 1,
                Some('[') => return Some(level),
                _ => return None,
            }
        }
    }

    /// Consume an opening long bracket of `level` and everything up to and
    /// including the matching close. Returns false at end of input.
    fn scan_long_body(&mut self, level: usize) -> bool {
        self.cursor.skip(level + 2);
        let close = format!("]{}]", "=".repeat(level));

        while !self.cursor.is_eof() {
            if self.cursor.check_str(&close) {
                self.cursor.skip(close.len());
                return true;
            }
            self.cursor.advance();
        }
        false
    }

    // =========================================
    // Numbers
    // =========================================

    fn scan_number(&mut self, start: Start) -> Token<'ast> {
        let is_hex = self.cursor.check_str("0x") || self.cursor.check_str("0X");

        let result = if is_hex {
            self.cursor.skip(2);
            self.scan_digits(|c| c.is_ascii_hexdigit(), ['p', 'P'], "hexadecimal digits")
        } else {
            self.scan_digits(|c| c.is_ascii_digit(), ['e', 'E'], "digits")
        };

        // Trailing letters glue onto the literal, as in `3abc`.
        let trailing = self.cursor.eat_while(is_ident_continue);

        let detail = match result {
            Err(detail) => Some(detail.to_string()),
            Ok(()) if !trailing.is_empty() => Some(format!("unexpected '{trailing}'")),
            Ok(()) => None,
        };

        match detail {
            Some(detail) => {
                let span = self.span_from(start);
                self.make_error(LexError::InvalidNumber { span, detail })
            }
            None => self.make_token(TokenKind::Number, start),
        }
    }

    /// Integer part, optional fraction and optional exponent.
    fn scan_digits(
        &mut self,
        is_digit: impl Fn(char) -> bool + Copy,
        exponent: [char; 2],
        expected: &'static str,
    ) -> Result<(), &'static str> {
        let integer = self.cursor.eat_while(is_digit);

        let mut fraction = "";
        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1) != Some('.') {
            self.cursor.advance();
            fraction = self.cursor.eat_while(is_digit);
        }

        if integer.is_empty() && fraction.is_empty() {
            return Err(expected);
        }

        if self.cursor.check(|c| exponent.contains(&c)) {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            if self.cursor.eat_while(|c| c.is_ascii_digit()).is_empty() {
                return Err("missing exponent digits");
            }
        }

        Ok(())
    }

    // =========================================
    // Identifiers and keywords
    // =========================================

    fn scan_identifier(&mut self, start: Start) -> Token<'ast> {
        let word = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(word).unwrap_or(TokenKind::Name);
        self.make_token(kind, start)
    }

    // =========================================
    // Operators
    // =========================================

    fn scan_operator(&mut self, start: Start) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return Token::eof(self.span_from(start));
        };
        let next = self.cursor.peek();

        let kind = match (c, next) {
            ('(', _) => TokenKind::LeftParen,
            (')', _) => TokenKind::RightParen,
            ('{', _) => TokenKind::LeftBrace,
            ('}', _) => TokenKind::RightBrace,
            ('[', _) => TokenKind::LeftBracket,
            (']', _) => TokenKind::RightBracket,
            (',', _) => TokenKind::Comma,
            (';', _) => TokenKind::Semicolon,
            ('+', _) => TokenKind::Plus,
            ('-', _) => TokenKind::Minus,
            ('*', _) => TokenKind::Star,
            ('%', _) => TokenKind::Percent,
            ('^', _) => TokenKind::Caret,
            ('&', _) => TokenKind::Amp,
            ('|', _) => TokenKind::Pipe,
            ('#', _) => TokenKind::Hash,
            ('?', _) => TokenKind::Question,

            ('/', Some('/')) => { self.cursor.advance(); TokenKind::SlashSlash }
            ('/', _) => TokenKind::Slash,

            ('=', Some('=')) => { self.cursor.advance(); TokenKind::EqualEqual }
            ('=', _) => TokenKind::Equal,

            ('~', Some('=')) => { self.cursor.advance(); TokenKind::NotEqual }
            ('~', _) => TokenKind::Tilde,

            ('<', Some('=')) => { self.cursor.advance(); TokenKind::LessEqual }
            ('<', Some('<')) => { self.cursor.advance(); TokenKind::LessLess }
            ('<', _) => TokenKind::Less,

            ('>', Some('=')) => { self.cursor.advance(); TokenKind::GreaterEqual }
            ('>', Some('>')) => { self.cursor.advance(); TokenKind::GreaterGreater }
            ('>', _) => TokenKind::Greater,

            (':', Some(':')) => { self.cursor.advance(); TokenKind::ColonColon }
            (':', _) => TokenKind::Colon,

            ('.', Some('.')) => {
                self.cursor.advance();
                if self.cursor.eat('.') {
                    TokenKind::Ellipsis
                } else {
                    TokenKind::DotDot
                }
            }
            ('.', _) => TokenKind::Dot,

            _ => {
                let span = self.span_from(start);
                return self.make_error(LexError::UnexpectedChar { ch: c, span });
            }
        };

        self.make_token(kind, start)
    }
}

/// Streams tokens up to, but not including, `Eof`.
impl<'src, 'ast> Iterator for Lexer<'src, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<(TokenKind, String)> {
        let arena = Bump::new();
        Lexer::new(source, &arena)
            .map(|t| (t.kind, t.lexeme.to_string()))
            .collect()
    }

    fn token_kinds(source: &str) -> Vec<TokenKind> {
        let arena = Bump::new();
        Lexer::new(source, &arena).map(|t| t.kind).collect()
    }

    fn errors(source: &str) -> Vec<LexError> {
        let arena = Bump::new();
        let (_, errors) = Lexer::new(source, &arena).tokenize();
        errors
    }

    // =========================================
    // Basics
    // =========================================

    #[test]
    fn empty_source() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn tokenize_appends_eof() {
        let arena = Bump::new();
        let (tokens, errors) = Lexer::new("x = 1", &arena).tokenize();
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
        assert_eq!(tokens[3].span, Span::point(1, 6));
    }

    #[test]
    fn shebang_is_skipped() {
        assert_eq!(
            tokenize("#!/usr/bin/env tl\nx"),
            vec![(TokenKind::Name, "x".to_string())]
        );
    }

    #[test]
    fn positions_are_tracked() {
        let arena = Bump::new();
        let tokens: Vec<_> = Lexer::new("local x\n  return x", &arena).collect();
        assert_eq!(tokens[0].span, Span::new(1, 1, 5));
        assert_eq!(tokens[1].span, Span::new(1, 7, 1));
        assert_eq!(tokens[2].span, Span::new(2, 3, 6));
        assert_eq!(tokens[3].span, Span::new(2, 10, 1));
    }

    // =========================================
    // Names and keywords
    // =========================================

    #[test]
    fn keywords_and_names() {
        assert_eq!(
            token_kinds("if then elseif else end endx"),
            vec![
                TokenKind::If,
                TokenKind::Then,
                TokenKind::Elseif,
                TokenKind::Else,
                TokenKind::End,
                TokenKind::Name,
            ]
        );
    }

    #[test]
    fn soft_keywords() {
        assert_eq!(
            token_kinds("global record interface enum type where as is userdata"),
            vec![
                TokenKind::Global,
                TokenKind::Record,
                TokenKind::Interface,
                TokenKind::Enum,
                TokenKind::Type,
                TokenKind::Where,
                TokenKind::As,
                TokenKind::Is,
                TokenKind::Name,
            ]
        );
    }

    // =========================================
    // Numbers
    // =========================================

    #[test]
    fn numbers() {
        assert_eq!(
            tokenize("3 3.0 3.1416 314.16e-2 0.31416E1 0xff 0x0.1E 0xA23p-4 .5 1."),
            ["3", "3.0", "3.1416", "314.16e-2", "0.31416E1", "0xff", "0x0.1E", "0xA23p-4", ".5", "1."]
                .iter()
                .map(|s| (TokenKind::Number, s.to_string()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn number_before_concat() {
        assert_eq!(
            token_kinds("1 ..2"),
            vec![TokenKind::Number, TokenKind::DotDot, TokenKind::Number]
        );
    }

    #[test]
    fn malformed_numbers() {
        assert!(matches!(
            errors("3abc").as_slice(),
            [LexError::InvalidNumber { .. }]
        ));
        assert!(matches!(
            errors("1e+").as_slice(),
            [LexError::InvalidNumber { .. }]
        ));
        assert!(matches!(
            errors("0x").as_slice(),
            [LexError::InvalidNumber { .. }]
        ));
    }

    // =========================================
    // Strings
    // =========================================

    #[test]
    fn quoted_strings() {
        assert_eq!(
            tokenize(r#""hi" 'there' "esc\"aped""#),
            vec![
                (TokenKind::String, "\"hi\"".to_string()),
                (TokenKind::String, "'there'".to_string()),
                (TokenKind::String, "\"esc\\\"aped\"".to_string()),
            ]
        );
    }

    #[test]
    fn long_strings() {
        assert_eq!(
            tokenize("[[a\nb]] [==[x]]y]==]"),
            vec![
                (TokenKind::String, "[[a\nb]]".to_string()),
                (TokenKind::String, "[==[x]]y]==]".to_string()),
            ]
        );
    }

    #[test]
    fn index_bracket_is_not_long_string() {
        assert_eq!(
            token_kinds("t[1]"),
            vec![
                TokenKind::Name,
                TokenKind::LeftBracket,
                TokenKind::Number,
                TokenKind::RightBracket,
            ]
        );
    }

    #[test]
    fn unterminated_strings() {
        assert!(matches!(
            errors("x = \"abc\ny").as_slice(),
            [LexError::UnterminatedString { span }] if *span == Span::new(1, 5, 4)
        ));
        assert!(matches!(
            errors("[=[ never closed ]]").as_slice(),
            [LexError::UnterminatedLongString { .. }]
        ));
    }

    // =========================================
    // Comments
    // =========================================

    #[test]
    fn comments() {
        assert_eq!(
            tokenize("a -- line\n--[[ block\n]] b --[==[ x ]==] c"),
            vec![
                (TokenKind::Name, "a".to_string()),
                (TokenKind::Name, "b".to_string()),
                (TokenKind::Name, "c".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_comment() {
        assert!(matches!(
            errors("x --[[ open").as_slice(),
            [LexError::UnterminatedComment { span }] if *span == Span::new(1, 3, 9)
        ));
    }

    // =========================================
    // Operators
    // =========================================

    #[test]
    fn operators() {
        assert_eq!(
            token_kinds("= == ~= < <= > >= .. + - * / // % ^ & | ~ << >> #"),
            vec![
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::DotDot,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::SlashSlash,
                TokenKind::Percent,
                TokenKind::Caret,
                TokenKind::Amp,
                TokenKind::Pipe,
                TokenKind::Tilde,
                TokenKind::LessLess,
                TokenKind::GreaterGreater,
                TokenKind::Hash,
            ]
        );
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            token_kinds("( ) { } [ ] , ; : :: . ... ?"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Colon,
                TokenKind::ColonColon,
                TokenKind::Dot,
                TokenKind::Ellipsis,
                TokenKind::Question,
            ]
        );
    }

    #[test]
    fn unexpected_character() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("a $ b", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Name);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert_eq!(lexer.next_token().kind, TokenKind::Name);
        assert!(lexer.has_errors());
        assert_eq!(
            lexer.take_errors(),
            vec![LexError::UnexpectedChar {
                ch: '$',
                span: Span::new(1, 3, 1)
            }]
        );
    }

    #[test]
    fn function_declaration_tokens() {
        assert_eq!(
            token_kinds("local function f(a: integer, ...): string end"),
            vec![
                TokenKind::Local,
                TokenKind::Function,
                TokenKind::Name,
                TokenKind::LeftParen,
                TokenKind::Name,
                TokenKind::Colon,
                TokenKind::Name,
                TokenKind::Comma,
                TokenKind::Ellipsis,
                TokenKind::RightParen,
                TokenKind::Colon,
                TokenKind::Name,
                TokenKind::End,
            ]
        );
    }
}
