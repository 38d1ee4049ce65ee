//! Visitor pattern for traversing the AST.
//!
//! Each `visit_*` method has a default implementation that calls the
//! matching `walk_*` function, so an implementation only overrides the
//! nodes it cares about and calls `walk_*` itself to keep descending.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use teal_parser::ast::{self, Expr, visitor::{self, Visitor}};
//!
//! struct NameCollector<'ast> {
//!     names: Vec<&'ast str>,
//! }
//!
//! impl<'ast> Visitor<'ast> for NameCollector<'ast> {
//!     fn visit_expr(&mut self, expr: &'ast Expr<'ast>) {
//!         if let Expr::Name(ident) = expr {
//!             self.names.push(ident.name);
//!         }
//!         visitor::walk_expr(self, expr);
//!     }
//! }
//!
//! let arena = Bump::new();
//! let outcome = ast::parse("print(a + b)", &arena);
//! let mut collector = NameCollector { names: Vec::new() };
//! collector.visit_block(outcome.block.unwrap());
//! assert_eq!(collector.names, ["print", "a", "b"]);
//! ```

use crate::ast::decl::*;
use crate::ast::expr::*;
use crate::ast::stmt::*;
use crate::ast::types::*;

/// Visitor trait for traversing AST nodes.
///
/// References carry the arena lifetime so visitors may keep pointers into
/// the tree they walk.
pub trait Visitor<'ast>: Sized {
    fn visit_block(&mut self, block: &'ast Block<'ast>) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt<'ast>) {
        walk_stmt(self, stmt);
    }

    fn visit_function_decl(&mut self, decl: &'ast FunctionDecl<'ast>) {
        walk_function_decl(self, decl);
    }

    fn visit_var_decl(&mut self, decl: &'ast VarDecl<'ast>) {
        walk_var_decl(self, decl);
    }

    fn visit_record_decl(&mut self, decl: &'ast RecordDecl<'ast>) {
        walk_record_decl(self, decl);
    }

    fn visit_enum_decl(&mut self, decl: &'ast EnumDecl<'ast>) {
        walk_enum_decl(self, decl);
    }

    fn visit_type_alias_decl(&mut self, decl: &'ast TypeAliasDecl<'ast>) {
        walk_type_alias_decl(self, decl);
    }

    fn visit_expr(&mut self, expr: &'ast Expr<'ast>) {
        walk_expr(self, expr);
    }

    fn visit_call_expr(&mut self, call: &'ast CallExpr<'ast>) {
        walk_call_expr(self, call);
    }

    fn visit_table_expr(&mut self, table: &'ast TableExpr<'ast>) {
        walk_table_expr(self, table);
    }

    /// Visit a function body, shared by declarations and literals.
    fn visit_function_body(&mut self, body: &'ast FunctionBody<'ast>) {
        walk_function_body(self, body);
    }

    fn visit_type(&mut self, ty: &'ast TypeExpr<'ast>) {
        walk_type(self, ty);
    }

    fn visit_record_body(&mut self, body: &'ast RecordBody<'ast>) {
        walk_record_body(self, body);
    }

    /// Enum bodies hold only string literals; nothing to walk.
    fn visit_enum_body(&mut self, _body: &'ast EnumBody<'ast>) {}
}

// === Statements ===

pub fn walk_block<'ast, V: Visitor<'ast>>(visitor: &mut V, block: &'ast Block<'ast>) {
    for stmt in block.stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast Stmt<'ast>) {
    match stmt {
        Stmt::Assign(s) => {
            walk_exprs(visitor, s.targets);
            walk_exprs(visitor, s.values);
        }
        Stmt::Call(call) => visitor.visit_call_expr(call),
        Stmt::Label(..) | Stmt::Goto(..) | Stmt::Break(_) => {}
        Stmt::Return(s) => walk_exprs(visitor, s.values),
        Stmt::Do(block, _) => visitor.visit_block(block),
        Stmt::If(s) => {
            for branch in s.branches {
                visitor.visit_expr(branch.condition);
                visitor.visit_block(branch.block);
            }
            if let Some(block) = s.else_block {
                visitor.visit_block(block);
            }
        }
        Stmt::While(s) => {
            visitor.visit_expr(s.condition);
            visitor.visit_block(s.body);
        }
        Stmt::Repeat(s) => {
            visitor.visit_block(s.body);
            visitor.visit_expr(s.condition);
        }
        Stmt::NumericFor(s) => {
            visitor.visit_expr(s.start);
            visitor.visit_expr(s.limit);
            if let Some(step) = s.step {
                visitor.visit_expr(step);
            }
            visitor.visit_block(s.body);
        }
        Stmt::GenericFor(s) => {
            walk_exprs(visitor, s.exprs);
            visitor.visit_block(s.body);
        }
        Stmt::Function(decl) => visitor.visit_function_decl(decl),
        Stmt::VarDecl(decl) => visitor.visit_var_decl(decl),
        Stmt::Record(decl) => visitor.visit_record_decl(decl),
        Stmt::Enum(decl) => visitor.visit_enum_decl(decl),
        Stmt::TypeAlias(decl) => visitor.visit_type_alias_decl(decl),
    }
}

fn walk_exprs<'ast, V: Visitor<'ast>>(visitor: &mut V, exprs: &'ast [&'ast Expr<'ast>]) {
    for expr in exprs {
        visitor.visit_expr(expr);
    }
}

// === Declarations ===

pub fn walk_function_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, decl: &'ast FunctionDecl<'ast>) {
    visitor.visit_function_body(&decl.body);
}

pub fn walk_var_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, decl: &'ast VarDecl<'ast>) {
    for ty in decl.types {
        visitor.visit_type(ty);
    }
    walk_exprs(visitor, decl.values);
}

pub fn walk_record_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, decl: &'ast RecordDecl<'ast>) {
    visitor.visit_record_body(decl.body);
}

pub fn walk_enum_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, decl: &'ast EnumDecl<'ast>) {
    visitor.visit_enum_body(decl.body);
}

pub fn walk_type_alias_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, decl: &'ast TypeAliasDecl<'ast>) {
    if let Some(ty) = &decl.ty {
        visitor.visit_type(ty);
    }
}

// === Expressions ===

pub fn walk_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast Expr<'ast>) {
    match expr {
        Expr::Literal(_) | Expr::Name(_) | Expr::Error(_) => {}
        Expr::Field(e) => visitor.visit_expr(e.object),
        Expr::Index(e) => {
            visitor.visit_expr(e.object);
            visitor.visit_expr(e.key);
        }
        Expr::Call(call) => visitor.visit_call_expr(call),
        Expr::Binary(e) => {
            visitor.visit_expr(e.left);
            visitor.visit_expr(e.right);
        }
        Expr::Unary(e) => visitor.visit_expr(e.operand),
        Expr::Cast(e) => {
            visitor.visit_expr(e.expr);
            for ty in e.types {
                visitor.visit_type(ty);
            }
        }
        Expr::Is(e) => {
            visitor.visit_expr(e.expr);
            visitor.visit_type(&e.ty);
        }
        Expr::Table(table) => visitor.visit_table_expr(table),
        Expr::Function(e) => visitor.visit_function_body(&e.body),
        Expr::Paren(e) => visitor.visit_expr(e.expr),
    }
}

pub fn walk_call_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, call: &'ast CallExpr<'ast>) {
    visitor.visit_expr(call.callee);
    match &call.args {
        CallArgs::List(args) => walk_exprs(visitor, args),
        CallArgs::Table(table) => visitor.visit_table_expr(table),
        CallArgs::String(_) => {}
    }
}

pub fn walk_table_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, table: &'ast TableExpr<'ast>) {
    for field in table.fields {
        match field {
            TableField::Positional(value) => visitor.visit_expr(value),
            TableField::Keyed { key, value } => {
                visitor.visit_expr(key);
                visitor.visit_expr(value);
            }
            TableField::Named { ty, value, .. } => {
                if let Some(ty) = ty {
                    visitor.visit_type(ty);
                }
                visitor.visit_expr(value);
            }
        }
    }
}

pub fn walk_function_body<'ast, V: Visitor<'ast>>(visitor: &mut V, body: &'ast FunctionBody<'ast>) {
    for param in body.params {
        if let Some(ty) = &param.ty {
            visitor.visit_type(ty);
        }
    }
    if let Some(returns) = &body.returns {
        walk_return_types(visitor, returns);
    }
    visitor.visit_block(body.block);
}

// === Types ===

pub fn walk_type<'ast, V: Visitor<'ast>>(visitor: &mut V, ty: &'ast TypeExpr<'ast>) {
    match ty {
        TypeExpr::Basic(..) | TypeExpr::Nominal(_) | TypeExpr::Unknown(_) => {}
        TypeExpr::Array(t) => visitor.visit_type(&t.element),
        TypeExpr::Map(t) => {
            visitor.visit_type(&t.key);
            visitor.visit_type(&t.value);
        }
        TypeExpr::Tuple(t) => {
            for element in t.elements {
                visitor.visit_type(element);
            }
        }
        TypeExpr::Function(t) => {
            for param in t.params {
                visitor.visit_type(&param.ty);
            }
            if let Some(returns) = &t.returns {
                walk_return_types(visitor, returns);
            }
        }
        TypeExpr::Union(t) => {
            for option in t.options {
                visitor.visit_type(option);
            }
        }
        TypeExpr::Record(body) => visitor.visit_record_body(body),
        TypeExpr::Enum(body) => visitor.visit_enum_body(body),
    }
}

fn walk_return_types<'ast, V: Visitor<'ast>>(visitor: &mut V, returns: &'ast ReturnTypes<'ast>) {
    for ty in returns.types {
        visitor.visit_type(ty);
    }
}

pub fn walk_record_body<'ast, V: Visitor<'ast>>(visitor: &mut V, body: &'ast RecordBody<'ast>) {
    if let Some(element) = &body.array_element {
        visitor.visit_type(element);
    }
    if let Some(condition) = body.where_clause {
        visitor.visit_expr(condition);
    }
    for entry in body.entries {
        match entry {
            RecordEntry::Userdata(_) => {}
            RecordEntry::Field(field) => visitor.visit_type(&field.ty),
            RecordEntry::TypeAlias { ty, .. } => visitor.visit_type(ty),
            RecordEntry::Record { body, .. } => visitor.visit_record_body(body),
            RecordEntry::Enum { body, .. } => visitor.visit_enum_body(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Parser;
    use bumpalo::Bump;

    #[derive(Default)]
    struct Counter {
        stmts: usize,
        exprs: usize,
        types: usize,
        functions: usize,
        records: usize,
    }

    impl<'ast> Visitor<'ast> for Counter {
        fn visit_stmt(&mut self, stmt: &'ast Stmt<'ast>) {
            self.stmts += 1;
            walk_stmt(self, stmt);
        }

        fn visit_expr(&mut self, expr: &'ast Expr<'ast>) {
            self.exprs += 1;
            walk_expr(self, expr);
        }

        fn visit_type(&mut self, ty: &'ast TypeExpr<'ast>) {
            self.types += 1;
            walk_type(self, ty);
        }

        fn visit_function_body(&mut self, body: &'ast FunctionBody<'ast>) {
            self.functions += 1;
            walk_function_body(self, body);
        }

        fn visit_record_body(&mut self, body: &'ast RecordBody<'ast>) {
            self.records += 1;
            walk_record_body(self, body);
        }
    }

    fn count(source: &str) -> Counter {
        let arena = Bump::new();
        let block = Parser::parse(source, &arena)
            .into_result()
            .unwrap_or_else(|errors| panic!("Failed to parse:\n{errors}"));
        let mut counter = Counter::default();
        counter.visit_block(block);
        counter
    }

    #[test]
    fn counts_nested_statements() {
        let counter = count("if a then b() elseif c then d = 1 else while e do break end end");
        // if, call, assignment, while, break
        assert_eq!(counter.stmts, 5);
        // a, b, c, d, 1, e
        assert_eq!(counter.exprs, 6);
    }

    #[test]
    fn descends_into_function_literals() {
        let counter = count("local f = function(x: number): string return tostring(x) end");
        assert_eq!(counter.functions, 1);
        // number, string
        assert_eq!(counter.types, 2);
        // var decl, return
        assert_eq!(counter.stmts, 2);
    }

    #[test]
    fn descends_into_record_bodies() {
        let counter = count(
            "local record Outer
                 record Inner
                     v: {string: integer}
                 end
                 f: function(Inner): Outer
             end",
        );
        assert_eq!(counter.records, 2);
        // map, string, integer, function, Inner, Outer
        assert_eq!(counter.types, 6);
    }

    #[test]
    fn visits_table_and_cast() {
        let counter = count("t = { 1, [k] = v, name: string = s as string }");
        // t, table, 1, k, v, cast, s
        assert_eq!(counter.exprs, 7);
        assert_eq!(counter.types, 2);
    }

    #[test]
    fn override_stops_descent() {
        struct TopLevel(usize);

        impl<'ast> Visitor<'ast> for TopLevel {
            fn visit_stmt(&mut self, _stmt: &'ast Stmt<'ast>) {
                self.0 += 1;
            }
        }

        let arena = Bump::new();
        let block = Parser::parse("do x() end do y() end", &arena).into_result().unwrap();
        let mut visitor = TopLevel(0);
        visitor.visit_block(block);
        assert_eq!(visitor.0, 2);
    }
}
