//! Declaration AST nodes.
//!
//! Every declaration remembers how it was introduced ([`Visibility`]) so
//! later stages can tell `local record R` from `global record R`.

use teal_core::Span;

use crate::ast::expr::{Expr, FunctionBody};
use crate::ast::types::{EnumBody, RecordBody, TypeExpr};
use crate::ast::{Ident, Visibility};

/// `function a.b:c(...) ... end`, `local function f() end`,
/// `global function g() end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    pub visibility: Visibility,
    /// Dotted name path; a single segment for local and global functions.
    pub path: &'ast [Ident<'ast>],
    /// Receiver method name after `:`.
    pub method: Option<Ident<'ast>>,
    pub body: FunctionBody<'ast>,
    pub span: Span,
}

impl<'ast> FunctionDecl<'ast> {
    /// The name the function is finally bound to.
    pub fn name(&self) -> Option<Ident<'ast>> {
        self.method.or_else(|| self.path.last().copied())
    }

    pub fn is_method(&self) -> bool {
        self.method.is_some()
    }
}

/// `local a <const>, b: T1, T2 = e1, e2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    pub visibility: Visibility,
    pub names: &'ast [AttribName<'ast>],
    /// Declared types, matched positionally to `names`.
    pub types: &'ast [TypeExpr<'ast>],
    pub values: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

/// A declared name with its optional `<attrib>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribName<'ast> {
    pub name: Ident<'ast>,
    /// `const`, `close`, `total`, ...
    pub attrib: Option<Ident<'ast>>,
}

/// `local record R ... end` or `global interface I ... end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordDecl<'ast> {
    pub visibility: Visibility,
    pub is_interface: bool,
    pub name: Ident<'ast>,
    pub body: &'ast RecordBody<'ast>,
    pub span: Span,
}

/// `local enum E ... end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumDecl<'ast> {
    pub visibility: Visibility,
    pub name: Ident<'ast>,
    pub body: &'ast EnumBody<'ast>,
    pub span: Span,
}

/// `local type T = ...`, or a `global type T` forward declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeAliasDecl<'ast> {
    pub visibility: Visibility,
    pub name: Ident<'ast>,
    /// Absent only for global forward declarations.
    pub ty: Option<TypeExpr<'ast>>,
    pub span: Span,
}
