//! Syntax analysis for Teal, the typed dialect of Lua.
//!
//! This crate is the facade over the workspace members:
//! - `teal-core` for spans and diagnostics
//! - `teal-parser` for the lexer, AST, parser, visitor and printer
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = "local x: integer = 1\nif x then return x end";
//!
//! let outcome = teal::parse(source, &arena);
//! assert!(outcome.is_success());
//! assert_eq!(outcome.block.unwrap().len(), 2);
//! ```

use bumpalo::Bump;

pub use teal_core::{LexError, ParseError, ParseErrorKind, ParseErrors, Span};
pub use teal_parser::ast::{self, printer, visitor};
pub use teal_parser::lexer::{self, Lexer, Token, TokenKind};
pub use teal_parser::{ParseOutcome, Parser, ParserConfig};

pub mod prelude {
    pub use crate::ast::visitor::Visitor;
    pub use crate::ast::{
        Block, Expr, ParseOutcome, Parser, ParserConfig, Stmt, TypeExpr,
    };
    pub use teal_core::{ParseError, ParseErrorKind, ParseErrors, Span};
}

/// Parse Teal source with the default configuration.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse<'ast>(source: &str, arena: &'ast Bump) -> ParseOutcome<'ast> {
    Parser::parse(source, arena)
}

/// Parse Teal source with explicit limits.
pub fn parse_with_config<'ast>(source: &str, arena: &'ast Bump, config: ParserConfig) -> ParseOutcome<'ast> {
    Parser::parse_with_config(source, arena, config)
}

/// Render every diagnostic against the source it came from, one block
/// per diagnostic with the offending line and a caret.
pub fn render_diagnostics(source: &str, errors: &ParseErrors) -> String {
    errors
        .iter()
        .map(|error| error.display_with_source(source))
        .collect::<Vec<_>>()
        .join("\n")
}
