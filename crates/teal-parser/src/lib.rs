//! Teal parser crate.
//!
//! This crate provides the lexer and parser for Teal, the typed dialect of
//! Lua. It includes:
//! - Lexical analysis (tokenization)
//! - Abstract Syntax Tree (AST) definitions
//! - A recursive-descent parser with panic-mode recovery
//! - A visitor for AST traversal and a pretty printer
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use teal_parser::Parser;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     local function greet(name: string): string
//!         return "hello " .. name
//!     end
//! "#;
//!
//! let outcome = Parser::parse(source, &arena);
//! assert!(outcome.is_success());
//! ```

// Lexer module
pub mod lexer;

// AST module
pub mod ast;

mod stack;

// Re-export commonly used types at crate root
pub use ast::{ParseOutcome, Parser, ParserConfig};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use teal_core::{ParseError, ParseErrorKind, ParseErrors};
