//! Small AST building blocks shared by statements, expressions and types.

use std::fmt;

use teal_core::Span;

use crate::lexer::Token;

/// A name with its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident<'ast> {
    /// The name text (allocated in arena).
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }

    /// Build from a name-like token; soft keywords keep their text.
    pub fn from_token(token: Token<'ast>) -> Self {
        Self::new(token.lexeme, token.span)
    }
}

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// How a declaration was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `local ...`
    Local,
    /// `global ...`
    Global,
    /// No qualifier, as in `function a.b() end`.
    Plain,
}

impl Visibility {
    /// The leading keyword, if any.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Local => Some("local"),
            Visibility::Global => Some("global"),
            Visibility::Plain => None,
        }
    }
}
