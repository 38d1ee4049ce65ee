//! Render an AST back to Teal source.
//!
//! The output is normalized rather than faithful: comments and original
//! layout are gone, indentation is four spaces, and only `Paren` nodes
//! produce parentheses in expressions. Reparsing the output yields the
//! same tree modulo spans.

use crate::ast::decl::*;
use crate::ast::expr::*;
use crate::ast::stmt::*;
use crate::ast::types::*;
use crate::ast::{Ident, UnaryOp, Visibility};

const INDENT: &str = "    ";

/// Render a block, one statement per line.
pub fn print_block(block: &Block) -> String {
    let mut printer = Printer::default();
    printer.block(block);
    printer.out
}

/// Render a single expression.
pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.expr(expr);
    printer.out
}

/// Render a single type.
pub fn print_type(ty: &TypeExpr) -> String {
    let mut printer = Printer::default();
    printer.ty(ty);
    printer.out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn line(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn separated<T>(&mut self, items: &[T], sep: &str, mut each: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            each(self, item);
        }
    }

    fn exprs(&mut self, exprs: &[&Expr]) {
        self.separated(exprs, ", ", |p, e| p.expr(e));
    }

    fn types(&mut self, types: &[TypeExpr]) {
        self.separated(types, ", ", |p, t| p.ty(t));
    }

    // === Statements ===

    fn block(&mut self, block: &Block) {
        for (i, stmt) in block.stmts.iter().enumerate() {
            if i > 0 {
                self.line();
            }
            let is_last = i + 1 == block.stmts.len();
            self.stmt(stmt, is_last);
        }
    }

    /// Render an indented body followed by a closing keyword.
    fn body(&mut self, block: &Block, close: &str) {
        self.indent += 1;
        if !block.is_empty() {
            self.line();
            self.block(block);
        }
        self.indent -= 1;
        self.line();
        self.push(close);
    }

    fn stmt(&mut self, stmt: &Stmt, is_last: bool) {
        let start = self.out.len();
        match stmt {
            Stmt::Assign(s) => {
                self.exprs(s.targets);
                self.push(" = ");
                self.exprs(s.values);
            }
            Stmt::Call(call) => self.call(call),
            Stmt::Label(name, _) => {
                self.push("::");
                self.push(name.name);
                self.push("::");
            }
            Stmt::Goto(name, _) => {
                self.push("goto ");
                self.push(name.name);
            }
            Stmt::Break(_) => self.push("break"),
            Stmt::Return(s) => {
                self.push("return");
                if !s.values.is_empty() {
                    self.push(" ");
                    self.exprs(s.values);
                } else if !is_last {
                    self.push(";");
                }
            }
            Stmt::Do(block, _) => {
                self.push("do");
                self.body(block, "end");
            }
            Stmt::If(s) => {
                for (i, branch) in s.branches.iter().enumerate() {
                    self.push(if i == 0 { "if " } else { "elseif " });
                    self.expr(branch.condition);
                    self.push(" then");
                    self.body(branch.block, "");
                }
                if let Some(block) = s.else_block {
                    self.push("else");
                    self.body(block, "");
                }
                self.push("end");
            }
            Stmt::While(s) => {
                self.push("while ");
                self.expr(s.condition);
                self.push(" do");
                self.body(s.body, "end");
            }
            Stmt::Repeat(s) => {
                self.push("repeat");
                self.body(s.body, "until ");
                self.expr(s.condition);
            }
            Stmt::NumericFor(s) => {
                self.push("for ");
                self.push(s.var.name);
                self.push(" = ");
                self.expr(s.start);
                self.push(", ");
                self.expr(s.limit);
                if let Some(step) = s.step {
                    self.push(", ");
                    self.expr(step);
                }
                self.push(" do");
                self.body(s.body, "end");
            }
            Stmt::GenericFor(s) => {
                self.push("for ");
                self.separated(s.names, ", ", |p, n| p.push(n.name));
                self.push(" in ");
                self.exprs(s.exprs);
                self.push(" do");
                self.body(s.body, "end");
            }
            Stmt::Function(decl) => self.function_decl(decl),
            Stmt::VarDecl(decl) => self.var_decl(decl),
            Stmt::Record(decl) => {
                self.visibility(decl.visibility);
                self.push(if decl.is_interface { "interface " } else { "record " });
                self.push(decl.name.name);
                self.record_body(decl.body);
            }
            Stmt::Enum(decl) => {
                self.visibility(decl.visibility);
                self.push("enum ");
                self.push(decl.name.name);
                self.enum_body(decl.body);
            }
            Stmt::TypeAlias(decl) => {
                self.visibility(decl.visibility);
                self.push("type ");
                self.push(decl.name.name);
                if let Some(ty) = &decl.ty {
                    self.push(" = ");
                    self.ty(ty);
                }
            }
        }

        // A leading `(` would otherwise continue the previous statement.
        if self.out[start..].starts_with('(') {
            self.out.insert(start, ';');
        }
    }

    fn visibility(&mut self, visibility: Visibility) {
        if let Some(keyword) = visibility.keyword() {
            self.push(keyword);
            self.push(" ");
        }
    }

    fn function_decl(&mut self, decl: &FunctionDecl) {
        self.visibility(decl.visibility);
        self.push("function ");
        self.separated(decl.path, ".", |p, n: &Ident| p.push(n.name));
        if let Some(method) = decl.method {
            self.push(":");
            self.push(method.name);
        }
        self.function_body(&decl.body);
    }

    fn var_decl(&mut self, decl: &VarDecl) {
        self.visibility(decl.visibility);
        self.separated(decl.names, ", ", |p, n| {
            p.push(n.name.name);
            if let Some(attrib) = n.attrib {
                p.push(" <");
                p.push(attrib.name);
                p.push(">");
            }
        });
        if !decl.types.is_empty() {
            self.push(": ");
            self.types(decl.types);
        }
        if !decl.values.is_empty() {
            self.push(" = ");
            self.exprs(decl.values);
        }
    }

    fn function_body(&mut self, body: &FunctionBody) {
        self.push("(");
        self.separated(body.params, ", ", |p, param| {
            p.push(if param.variadic { "..." } else { param.name.name });
            if param.optional {
                p.push("?");
            }
            if let Some(ty) = &param.ty {
                p.push(": ");
                p.ty(ty);
            }
        });
        self.push(")");
        if let Some(returns) = &body.returns {
            self.push(": ");
            self.return_types(returns);
        }
        self.body(body.block, "end");
    }

    // === Expressions ===

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(literal) => self.literal(literal),
            Expr::Name(ident) => self.push(ident.name),
            Expr::Field(e) => {
                self.expr(e.object);
                self.push(".");
                self.push(e.field.name);
            }
            Expr::Index(e) => {
                self.expr(e.object);
                self.push("[");
                self.expr(e.key);
                self.push("]");
            }
            Expr::Call(call) => self.call(call),
            Expr::Binary(e) => {
                self.expr(e.left);
                self.push(" ");
                self.push(e.op.as_str());
                self.push(" ");
                self.expr(e.right);
            }
            Expr::Unary(e) => {
                self.push(e.op.as_str());
                let needs_space = match e.op {
                    UnaryOp::Not => true,
                    // `--` would start a comment
                    UnaryOp::Neg => matches!(e.operand, Expr::Unary(inner) if inner.op == UnaryOp::Neg),
                    UnaryOp::Len | UnaryOp::BitNot => false,
                };
                if needs_space {
                    self.push(" ");
                }
                self.expr(e.operand);
            }
            Expr::Cast(e) => {
                self.expr(e.expr);
                self.push(" as ");
                if e.parenthesized {
                    self.push("(");
                    self.types(e.types);
                    self.push(")");
                } else {
                    self.types(e.types);
                }
            }
            Expr::Is(e) => {
                self.expr(e.expr);
                self.push(" is ");
                self.ty(&e.ty);
            }
            Expr::Table(table) => self.table(table),
            Expr::Function(e) => {
                self.push("function");
                self.function_body(&e.body);
            }
            Expr::Paren(e) => {
                self.push("(");
                self.expr(e.expr);
                self.push(")");
            }
            Expr::Error(_) => self.push("nil --[[error]]"),
        }
    }

    fn literal(&mut self, literal: &LiteralExpr) {
        match literal.kind {
            LiteralKind::Nil => self.push("nil"),
            LiteralKind::Bool(true) => self.push("true"),
            LiteralKind::Bool(false) => self.push("false"),
            LiteralKind::Number(text) | LiteralKind::String(text) => self.push(text),
            LiteralKind::Vararg => self.push("..."),
        }
    }

    fn call(&mut self, call: &CallExpr) {
        self.expr(call.callee);
        if let Some(method) = call.method {
            self.push(":");
            self.push(method.name);
        }
        match &call.args {
            CallArgs::List(args) => {
                self.push("(");
                self.exprs(args);
                self.push(")");
            }
            CallArgs::Table(table) => {
                self.push(" ");
                self.table(table);
            }
            CallArgs::String(literal) => {
                self.push(" ");
                self.literal(literal);
            }
        }
    }

    fn table(&mut self, table: &TableExpr) {
        if table.fields.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{ ");
        self.separated(table.fields, ", ", |p, field| match field {
            TableField::Positional(value) => p.expr(value),
            TableField::Keyed { key, value } => {
                p.push("[");
                p.expr(key);
                p.push("] = ");
                p.expr(value);
            }
            TableField::Named { name, ty, value } => {
                p.push(name.name);
                if let Some(ty) = ty {
                    p.push(": ");
                    p.ty(ty);
                }
                p.push(" = ");
                p.expr(value);
            }
        });
        self.push(" }");
    }

    // === Types ===

    fn ty(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Basic(primitive, _) => self.push(primitive.as_str()),
            TypeExpr::Nominal(nominal) => self.nominal(nominal),
            TypeExpr::Array(t) => {
                self.push("{");
                self.ty(&t.element);
                self.push("}");
            }
            TypeExpr::Map(t) => {
                self.push("{");
                self.ty(&t.key);
                self.push(" : ");
                self.ty(&t.value);
                self.push("}");
            }
            TypeExpr::Tuple(t) => {
                self.push("{");
                self.types(t.elements);
                self.push("}");
            }
            TypeExpr::Function(t) => self.function_type(t),
            TypeExpr::Union(t) => {
                self.separated(t.options, " | ", |p, option| {
                    if matches!(option, TypeExpr::Function(_)) {
                        p.push("(");
                        p.ty(option);
                        p.push(")");
                    } else {
                        p.ty(option);
                    }
                });
            }
            TypeExpr::Record(body) => {
                self.push("record");
                self.record_body(body);
            }
            TypeExpr::Enum(body) => {
                self.push("enum");
                self.enum_body(body);
            }
            TypeExpr::Unknown(_) => self.push("any"),
        }
    }

    fn nominal(&mut self, nominal: &NominalType) {
        self.separated(nominal.path, ".", |p, n| p.push(n.name));
    }

    fn function_type(&mut self, ty: &FunctionType) {
        self.push("function(");
        self.separated(ty.params, ", ", |p, param| {
            if param.variadic {
                p.push("...: ");
            } else if let Some(name) = param.name {
                p.push(name.name);
                p.push(if param.optional { "?: " } else { ": " });
            } else if param.optional {
                p.push("?");
            }
            p.ty(&param.ty);
        });
        self.push(")");
        if let Some(returns) = &ty.returns {
            self.push(": ");
            self.return_types(returns);
        }
    }

    /// Return lists are always parenthesized so a following `|` or `,`
    /// cannot extend them.
    fn return_types(&mut self, returns: &ReturnTypes) {
        self.push("(");
        self.types(returns.types);
        if returns.variadic {
            self.push("...");
        }
        self.push(")");
    }

    fn record_body(&mut self, body: &RecordBody) {
        if body.array_element.is_some() || !body.interfaces.is_empty() {
            self.push(" is ");
            let mut first = true;
            if let Some(element) = &body.array_element {
                self.push("{");
                self.ty(element);
                self.push("}");
                first = false;
            }
            for interface in body.interfaces {
                if !first {
                    self.push(", ");
                }
                self.nominal(interface);
                first = false;
            }
        }
        if let Some(condition) = body.where_clause {
            self.push(" where ");
            self.expr(condition);
        }

        self.indent += 1;
        for entry in body.entries {
            self.line();
            self.record_entry(entry);
        }
        self.indent -= 1;
        self.line();
        self.push("end");
    }

    fn record_entry(&mut self, entry: &RecordEntry) {
        match entry {
            RecordEntry::Userdata(_) => self.push("userdata"),
            RecordEntry::Field(field) => {
                if field.is_metamethod {
                    self.push("metamethod ");
                }
                match field.key {
                    FieldKey::Name(name) => self.push(name.name),
                    FieldKey::Literal(literal, _) => {
                        self.push("[");
                        self.push(literal);
                        self.push("]");
                    }
                }
                self.push(": ");
                self.ty(&field.ty);
            }
            RecordEntry::TypeAlias { name, ty, .. } => {
                self.push("type ");
                self.push(name.name);
                self.push(" = ");
                self.ty(ty);
            }
            RecordEntry::Record {
                name,
                is_interface,
                body,
                ..
            } => {
                self.push(if *is_interface { "interface " } else { "record " });
                self.push(name.name);
                self.record_body(body);
            }
            RecordEntry::Enum { name, body, .. } => {
                self.push("enum ");
                self.push(name.name);
                self.enum_body(body);
            }
        }
    }

    fn enum_body(&mut self, body: &EnumBody) {
        self.indent += 1;
        for value in body.values {
            self.line();
            self.push(value.literal);
        }
        self.indent -= 1;
        self.line();
        self.push("end");
    }
}
