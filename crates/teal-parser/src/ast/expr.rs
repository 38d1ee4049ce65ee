//! Expression AST nodes for Teal.
//!
//! Provides nodes for every expression form:
//! - Literals (`nil`, booleans, numbers, strings, `...`)
//! - Names, field access, indexing and calls
//! - Binary and unary operations
//! - Type casts (`as`) and type tests (`is`)
//! - Table constructors and function literals
//!
//! Operator precedence is documented in [`crate::ast::ops`].

use teal_core::Span;

use crate::ast::stmt::Block;
use crate::ast::types::{ReturnTypes, TypeExpr};
use crate::ast::{BinaryOp, Ident, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Variable reference
    Name(Ident<'ast>),
    /// `obj.field`
    Field(&'ast FieldExpr<'ast>),
    /// `obj[key]`
    Index(&'ast IndexExpr<'ast>),
    /// Function or method call
    Call(&'ast CallExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// `expr as T`
    Cast(&'ast CastExpr<'ast>),
    /// `expr is T`
    Is(&'ast IsExpr<'ast>),
    /// Table constructor `{ ... }`
    Table(&'ast TableExpr<'ast>),
    /// Anonymous function
    Function(&'ast FunctionExpr<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
    /// Placeholder for an operand that failed to parse.
    Error(Span),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Name(e) => e.span,
            Self::Field(e) => e.span,
            Self::Index(e) => e.span,
            Self::Call(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Cast(e) => e.span,
            Self::Is(e) => e.span,
            Self::Table(e) => e.span,
            Self::Function(e) => e.span,
            Self::Paren(e) => e.span,
            Self::Error(span) => *span,
        }
    }

    /// Whether this expression can appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Self::Name(_) | Self::Field(_) | Self::Index(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

/// The kind of literal.
///
/// Numbers and strings keep their raw lexeme; decoding belongs to later
/// stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind<'ast> {
    Nil,
    Bool(bool),
    Number(&'ast str),
    /// Raw lexeme, quotes or long brackets included.
    String(&'ast str),
    /// `...`
    Vararg,
}

/// Field access `object.field`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub field: Ident<'ast>,
    pub span: Span,
}

/// Index access `object[key]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub key: &'ast Expr<'ast>,
    pub span: Span,
}

/// Function call `f(args)` or method call `obj:m(args)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub callee: &'ast Expr<'ast>,
    /// Method name for `callee:method(...)` calls.
    pub method: Option<Ident<'ast>>,
    pub args: CallArgs<'ast>,
    pub span: Span,
}

/// The argument forms a call accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallArgs<'ast> {
    /// `(a, b)`
    List(&'ast [&'ast Expr<'ast>]),
    /// `f { ... }`
    Table(&'ast TableExpr<'ast>),
    /// `f "text"`
    String(LiteralExpr<'ast>),
}

impl<'ast> CallArgs<'ast> {
    pub fn len(&self) -> usize {
        match self {
            CallArgs::List(args) => args.len(),
            CallArgs::Table(_) | CallArgs::String(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// `expr as T` or `expr as (T1, T2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    /// One entry for `as T`, several for a parenthesized list.
    pub types: &'ast [TypeExpr<'ast>],
    /// Whether the target list was written in parentheses.
    pub parenthesized: bool,
    pub span: Span,
}

/// `expr is T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

/// Table constructor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableExpr<'ast> {
    pub fields: &'ast [TableField<'ast>],
    pub span: Span,
}

/// One entry of a table constructor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableField<'ast> {
    /// `value`
    Positional(&'ast Expr<'ast>),
    /// `[key] = value`
    Keyed {
        key: &'ast Expr<'ast>,
        value: &'ast Expr<'ast>,
    },
    /// `name = value` or `name: T = value`
    Named {
        name: Ident<'ast>,
        ty: Option<TypeExpr<'ast>>,
        value: &'ast Expr<'ast>,
    },
}

impl<'ast> TableField<'ast> {
    pub fn value(&self) -> &'ast Expr<'ast> {
        match self {
            TableField::Positional(value)
            | TableField::Keyed { value, .. }
            | TableField::Named { value, .. } => value,
        }
    }
}

/// Anonymous function `function(params): returns ... end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionExpr<'ast> {
    pub body: FunctionBody<'ast>,
    pub span: Span,
}

/// Parameters, return types and block shared by function literals and
/// function declarations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionBody<'ast> {
    pub params: &'ast [Param<'ast>],
    pub returns: Option<ReturnTypes<'ast>>,
    pub block: &'ast Block<'ast>,
    pub span: Span,
}

impl<'ast> FunctionBody<'ast> {
    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(|p| p.variadic)
    }
}

/// A function parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    /// Parameter name; `...` for the variadic parameter.
    pub name: Ident<'ast>,
    pub ty: Option<TypeExpr<'ast>>,
    /// `name?: T`
    pub optional: bool,
    pub variadic: bool,
    pub span: Span,
}

/// Parenthesized expression, kept so `(f())` still truncates to one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}
