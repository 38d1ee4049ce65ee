//! Token types for the Teal lexer.

use std::fmt;

use teal_core::Span;

/// A token from the source code.
///
/// The lexeme lives in the arena the lexer was given, so tokens outlive the
/// source string they were scanned from.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    /// Raw source text. Empty for `Eof` and `Error` tokens.
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    /// The end-of-file sentinel at a position.
    #[inline]
    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, "", span)
    }

    /// Whether this token can stand where a plain name is expected.
    #[inline]
    pub fn is_name_like(&self) -> bool {
        self.kind == TokenKind::Name || self.kind.is_soft_keyword()
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Name | TokenKind::Number | TokenKind::String => {
                write!(f, "'{}'", self.lexeme)
            }
            kind => write!(f, "{kind}"),
        }
    }
}

/// Every token type the Teal lexer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals and names
    // =========================================
    /// Plain identifier: `foo`, `_bar1`
    Name,
    /// Numeric literal: `42`, `3.5e2`, `0xff`
    Number,
    /// String literal, quoted or long-bracket: `"hi"`, `[[text]]`
    String,

    // =========================================
    // Reserved keywords
    // =========================================
    And,
    Break,
    Do,
    Else,
    Elseif,
    End,
    False,
    For,
    Function,
    Goto,
    If,
    In,
    Local,
    Nil,
    Not,
    Or,
    Repeat,
    Return,
    Then,
    True,
    Until,
    While,

    // =========================================
    // Soft keywords (usable as names)
    // =========================================
    Global,
    Record,
    Interface,
    Enum,
    Type,
    Where,
    As,
    Is,

    // =========================================
    // Operators
    // =========================================
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `~=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `..`
    DotDot,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `//`
    SlashSlash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `~`
    Tilde,
    /// `<<`
    LessLess,
    /// `>>`
    GreaterGreater,
    /// `#`
    Hash,

    // =========================================
    // Punctuation
    // =========================================
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    /// `:`
    Colon,
    /// `::`
    ColonColon,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
    /// `?`
    Question,

    // =========================================
    // Special
    // =========================================
    Eof,
    /// A lexeme the lexer could not make sense of.
    Error,
}

impl TokenKind {
    /// Reserved words that can never be used as names.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            And | Break
                | Do
                | Else
                | Elseif
                | End
                | False
                | For
                | Function
                | Goto
                | If
                | In
                | Local
                | Nil
                | Not
                | Or
                | Repeat
                | Return
                | Then
                | True
                | Until
                | While
        )
    }

    /// Keywords that still work as identifiers wherever a name is expected.
    pub fn is_soft_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Global | Record | Interface | Enum | Type | Where | As | Is
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::String
                | TokenKind::Nil
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// The fixed source text of this kind, if it has one.
    pub fn as_str(self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            And => "and",
            Break => "break",
            Do => "do",
            Else => "else",
            Elseif => "elseif",
            End => "end",
            False => "false",
            For => "for",
            Function => "function",
            Goto => "goto",
            If => "if",
            In => "in",
            Local => "local",
            Nil => "nil",
            Not => "not",
            Or => "or",
            Repeat => "repeat",
            Return => "return",
            Then => "then",
            True => "true",
            Until => "until",
            While => "while",
            Global => "global",
            Record => "record",
            Interface => "interface",
            Enum => "enum",
            Type => "type",
            Where => "where",
            As => "as",
            Is => "is",
            Equal => "=",
            EqualEqual => "==",
            NotEqual => "~=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            DotDot => "..",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            SlashSlash => "//",
            Percent => "%",
            Caret => "^",
            Amp => "&",
            Pipe => "|",
            Tilde => "~",
            LessLess => "<<",
            GreaterGreater => ">>",
            Hash => "#",
            LeftParen => "(",
            RightParen => ")",
            LeftBrace => "{",
            RightBrace => "}",
            LeftBracket => "[",
            RightBracket => "]",
            Comma => ",",
            Semicolon => ";",
            Colon => ":",
            ColonColon => "::",
            Dot => ".",
            Ellipsis => "...",
            Question => "?",
            Name | Number | String | Eof | Error => return None,
        })
    }

    /// Human-readable description used in diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Name => "name",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
            _ => "symbol",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => write!(f, "'{text}'"),
            None => f.write_str(self.description()),
        }
    }
}

/// Map a word to its keyword kind, or `None` for a plain name.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "and" => And,
        "break" => Break,
        "do" => Do,
        "else" => Else,
        "elseif" => Elseif,
        "end" => End,
        "false" => False,
        "for" => For,
        "function" => Function,
        "goto" => Goto,
        "if" => If,
        "in" => In,
        "local" => Local,
        "nil" => Nil,
        "not" => Not,
        "or" => Or,
        "repeat" => Repeat,
        "return" => Return,
        "then" => Then,
        "true" => True,
        "until" => Until,
        "while" => While,

        "global" => Global,
        "record" => Record,
        "interface" => Interface,
        "enum" => Enum,
        "type" => Type,
        "where" => Where,
        "as" => As,
        "is" => Is,

        _ => return None,
    })
}
