//! Shared types for the Teal front end.
//!
//! This crate holds the pieces every stage agrees on:
//! - [`Span`] for source positions
//! - [`LexError`] for tokenization failures
//! - [`ParseError`], [`ParseErrorKind`] and [`ParseErrors`] for syntax diagnostics

mod error;
mod span;

pub use error::{LexError, ParseError, ParseErrorKind, ParseErrors};
pub use span::Span;
