//! Statement AST nodes for Teal.
//!
//! Declarations (`local`/`global` variables, functions, records, enums and
//! type aliases) live in [`crate::ast::decl`] and are wrapped by the
//! corresponding [`Stmt`] variants.

use teal_core::Span;

use crate::ast::Ident;
use crate::ast::decl::{EnumDecl, FunctionDecl, RecordDecl, TypeAliasDecl, VarDecl};
use crate::ast::expr::{CallExpr, Expr};

/// An ordered sequence of statements forming one scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

impl<'ast> Block<'ast> {
    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stmt<'ast>> {
        self.stmts.iter()
    }
}

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// `a, b.c = 1, 2`
    Assign(&'ast AssignStmt<'ast>),
    /// `f(x)` used as a statement
    Call(&'ast CallExpr<'ast>),
    /// `::name::`
    Label(Ident<'ast>, Span),
    /// `goto name`
    Goto(Ident<'ast>, Span),
    /// `break`
    Break(Span),
    /// `return a, b`
    Return(&'ast ReturnStmt<'ast>),
    /// `do ... end`
    Do(&'ast Block<'ast>, Span),
    If(&'ast IfStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    Repeat(&'ast RepeatStmt<'ast>),
    /// `for i = a, b, c do ... end`
    NumericFor(&'ast NumericForStmt<'ast>),
    /// `for k, v in exprs do ... end`
    GenericFor(&'ast GenericForStmt<'ast>),
    Function(&'ast FunctionDecl<'ast>),
    VarDecl(&'ast VarDecl<'ast>),
    Record(&'ast RecordDecl<'ast>),
    Enum(&'ast EnumDecl<'ast>),
    TypeAlias(&'ast TypeAliasDecl<'ast>),
}

impl<'ast> Stmt<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign(s) => s.span,
            Stmt::Call(c) => c.span,
            Stmt::Label(_, span) | Stmt::Goto(_, span) | Stmt::Break(span) => *span,
            Stmt::Return(s) => s.span,
            Stmt::Do(_, span) => *span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Repeat(s) => s.span,
            Stmt::NumericFor(s) => s.span,
            Stmt::GenericFor(s) => s.span,
            Stmt::Function(d) => d.span,
            Stmt::VarDecl(d) => d.span,
            Stmt::Record(d) => d.span,
            Stmt::Enum(d) => d.span,
            Stmt::TypeAlias(d) => d.span,
        }
    }
}

/// Multiple assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignStmt<'ast> {
    /// Assignment targets; a malformed target is an `Expr::Error`.
    pub targets: &'ast [&'ast Expr<'ast>],
    pub values: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub values: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

/// `if` with its `elseif` arms and optional `else`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    /// The `if` arm first, then every `elseif` arm.
    pub branches: &'ast [IfBranch<'ast>],
    pub else_block: Option<&'ast Block<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfBranch<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub block: &'ast Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub body: &'ast Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatStmt<'ast> {
    pub body: &'ast Block<'ast>,
    pub condition: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericForStmt<'ast> {
    pub var: Ident<'ast>,
    pub start: &'ast Expr<'ast>,
    pub limit: &'ast Expr<'ast>,
    pub step: Option<&'ast Expr<'ast>>,
    pub body: &'ast Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenericForStmt<'ast> {
    pub names: &'ast [Ident<'ast>],
    pub exprs: &'ast [&'ast Expr<'ast>],
    pub body: &'ast Block<'ast>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block() {
        let block = Block {
            stmts: &[],
            span: Span::point(1, 1),
        };
        assert!(block.is_empty());
        assert_eq!(block.len(), 0);
        assert_eq!(block.iter().count(), 0);
    }

    #[test]
    fn leaf_statement_spans() {
        let label = Stmt::Label(Ident::new("top", Span::new(1, 3, 3)), Span::new(1, 1, 8));
        assert_eq!(label.span(), Span::new(1, 1, 8));
        assert_eq!(Stmt::Break(Span::new(4, 2, 5)).span(), Span::new(4, 2, 5));
    }
}
