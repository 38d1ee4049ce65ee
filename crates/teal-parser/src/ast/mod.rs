//! Abstract Syntax Tree (AST) for Teal.
//!
//! This module provides:
//! - AST node definitions for statements, expressions and types
//! - The recursive-descent [`Parser`] with error recovery
//! - A [`visitor`] for read-only traversal and a [`printer`] back to source
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use teal_parser::ast;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     local record Player
//!         health: integer
//!     end
//!
//!     function Player:damage(amount: integer)
//!         self.health = self.health - amount
//!     end
//! "#;
//!
//! match ast::parse(source, &arena).into_result() {
//!     Ok(block) => println!("Parsed successfully: {} statements", block.len()),
//!     Err(errors) => eprintln!("Parse errors: {}", errors),
//! }
//! ```

// Core types
pub mod node;
pub mod ops;

mod parser;
mod type_parser;
pub mod types;

pub mod expr;
mod expr_parser;

pub mod stmt;
mod stmt_parser;

pub mod decl;
mod decl_parser;

pub mod printer;
pub mod visitor;

pub use decl::*;
pub use expr::*;
pub use node::*;
pub use ops::*;
pub use parser::{Abort, PResult, ParseOutcome, Parser, ParserConfig};
pub use stmt::*;
pub use types::*;

use bumpalo::Bump;

use crate::lexer::Token;

/// Parse Teal source with the default [`ParserConfig`].
///
/// All nodes are allocated in `arena` and stay valid for its lifetime.
/// The outcome carries the block (absent only when parsing aborted) and
/// every diagnostic in source order.
///
/// # Example
///
/// ```
/// use bumpalo::Bump;
/// use teal_parser::ast::parse;
///
/// let arena = Bump::new();
/// let outcome = parse("local x = 1\nlocal y = )\nlocal z = 2", &arena);
///
/// let block = outcome.block.expect("recovered");
/// assert_eq!(block.len(), 3);
/// assert_eq!(outcome.errors.len(), 1);
/// assert_eq!(outcome.errors.first().unwrap().line(), 2);
/// ```
pub fn parse<'ast>(source: &str, arena: &'ast Bump) -> ParseOutcome<'ast> {
    Parser::parse(source, arena)
}

/// Parse an already tokenized stream.
///
/// An end-of-file token is appended when the stream lacks one.
pub fn parse_tokens<'ast>(tokens: Vec<Token<'ast>>, arena: &'ast Bump, config: ParserConfig) -> ParseOutcome<'ast> {
    Parser::parse_tokens(tokens, arena, config)
}
