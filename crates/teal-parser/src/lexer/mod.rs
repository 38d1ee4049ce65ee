//! Lexical analysis for Teal.

mod cursor;
mod lexer;
mod token;

pub use lexer::Lexer;
pub use teal_core::{LexError, Span};
pub use token::{Token, TokenKind, lookup_keyword};
