//! Declaration parsing: functions, variables, records, interfaces, enums
//! and type aliases.

use bumpalo::collections::Vec as BVec;
use teal_core::{ParseErrorKind, Span};

use super::parser::{PResult, Parser};
use crate::ast::decl::*;
use crate::ast::expr::Expr;
use crate::ast::stmt::Stmt;
use crate::ast::types::TypeExpr;
use crate::ast::{Ident, Visibility};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Dispatch after `local` or `global` has been consumed.
    ///
    /// `record`, `interface`, `enum` and `type` only start a declaration
    /// when a name follows; otherwise they are variable names.
    pub(super) fn parse_qualified_declaration(
        &mut self,
        visibility: Visibility,
        start: Span,
    ) -> PResult<Option<Stmt<'ast>>> {
        let kind = self.peek().kind;
        let named = self.check_nth(1, TokenKind::Name);

        match kind {
            TokenKind::Function => self.parse_function_decl(visibility, start),
            TokenKind::Record | TokenKind::Interface if named => {
                self.parse_record_decl(visibility, start)
            }
            TokenKind::Enum if named => self.parse_enum_decl(visibility, start),
            TokenKind::Type if named => self.parse_type_alias_decl(visibility, start),
            _ => self.parse_var_decl(visibility, start),
        }
    }

    /// Parse `function name(...) ... end` starting at `function`.
    ///
    /// Plain declarations accept a dotted path and a `:method` receiver.
    /// A missing name is reported but the body is still consumed.
    pub(super) fn parse_function_decl(
        &mut self,
        visibility: Visibility,
        start: Span,
    ) -> PResult<Option<Stmt<'ast>>> {
        let keyword = self.advance();
        let mut path = BVec::new_in(self.arena);
        let mut method = None;

        if let Some(name) = self.expect_name("expected function name")? {
            path.push(Ident::from_token(name));
            if visibility == Visibility::Plain {
                while self.eat(TokenKind::Dot).is_some() {
                    match self.expect_name("expected name after '.' in function name")? {
                        Some(segment) => path.push(Ident::from_token(segment)),
                        None => break,
                    }
                }
                if self.eat(TokenKind::Colon).is_some() {
                    method = self
                        .expect_name("expected method name after ':'")?
                        .map(Ident::from_token);
                }
            }
        }

        let body = self.parse_function_body(keyword.span)?;
        if path.is_empty() {
            return Ok(None);
        }

        Ok(Some(Stmt::Function(self.arena.alloc(FunctionDecl {
            visibility,
            path: path.into_bump_slice(),
            method,
            body,
            span: self.span_from(start),
        }))))
    }

    /// Parse `a <attrib>, b : T1, T2 = e1, e2`.
    fn parse_var_decl(&mut self, visibility: Visibility, start: Span) -> PResult<Option<Stmt<'ast>>> {
        let mut names = BVec::new_in(self.arena);
        loop {
            let Some(name) = self.expect_name("expected variable name")? else {
                break;
            };
            let attrib = self.parse_attrib()?;
            names.push(AttribName {
                name: Ident::from_token(name),
                attrib,
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let Some(first) = names.first().map(|n| n.name) else {
            return Ok(None);
        };

        let types: &'ast [TypeExpr<'ast>] = if self.eat(TokenKind::Colon).is_some() {
            self.parse_type_list()?
        } else {
            &[]
        };
        let values: &'ast [&'ast Expr<'ast>] = if self.eat(TokenKind::Equal).is_some() {
            self.parse_expr_list()?
        } else {
            &[]
        };

        if visibility == Visibility::Global && types.is_empty() && values.is_empty() {
            self.push_error_at(
                ParseErrorKind::InvalidDeclaration,
                first.span,
                "global variable must have type or initial value",
            )?;
        }

        Ok(Some(Stmt::VarDecl(self.arena.alloc(VarDecl {
            visibility,
            names: names.into_bump_slice(),
            types,
            values,
            span: self.span_from(start),
        }))))
    }

    /// Parse an optional `<name>` attribute.
    fn parse_attrib(&mut self) -> PResult<Option<Ident<'ast>>> {
        if self.eat(TokenKind::Less).is_none() {
            return Ok(None);
        }

        let Some(name) = self.eat(TokenKind::Name) else {
            self.push_error(ParseErrorKind::InvalidAttribute, "expected attribute name after '<'")?;
            return Ok(None);
        };
        if self.eat(TokenKind::Greater).is_none() {
            self.push_error(ParseErrorKind::InvalidAttribute, "expected '>' after attribute name")?;
        }
        Ok(Some(Ident::from_token(name)))
    }

    fn parse_record_decl(&mut self, visibility: Visibility, start: Span) -> PResult<Option<Stmt<'ast>>> {
        let keyword = self.advance();
        let is_interface = keyword.kind == TokenKind::Interface;
        let message = if is_interface {
            "expected interface name"
        } else {
            "expected record name"
        };
        let name = self.expect_name(message)?;
        let body = self.parse_record_body(keyword.span)?;
        let Some(name) = name else {
            return Ok(None);
        };

        Ok(Some(Stmt::Record(self.arena.alloc(RecordDecl {
            visibility,
            is_interface,
            name: Ident::from_token(name),
            body,
            span: self.span_from(start),
        }))))
    }

    fn parse_enum_decl(&mut self, visibility: Visibility, start: Span) -> PResult<Option<Stmt<'ast>>> {
        let keyword = self.advance();
        let name = self.expect_name("expected enum name")?;
        let body = self.parse_enum_body(keyword.span)?;
        let Some(name) = name else {
            return Ok(None);
        };

        Ok(Some(Stmt::Enum(self.arena.alloc(EnumDecl {
            visibility,
            name: Ident::from_token(name),
            body,
            span: self.span_from(start),
        }))))
    }

    /// `local type T = ...` or `global type T [= ...]`.
    fn parse_type_alias_decl(&mut self, visibility: Visibility, start: Span) -> PResult<Option<Stmt<'ast>>> {
        self.advance();
        let Some(name) = self.expect_name("expected type name")? else {
            return Ok(None);
        };

        let ty = if self.eat(TokenKind::Equal).is_some() {
            Some(self.parse_alias_type()?)
        } else {
            if visibility == Visibility::Local {
                self.push_error(ParseErrorKind::ExpectedToken, "expected '=' in local type alias")?;
            }
            None
        };

        Ok(Some(Stmt::TypeAlias(self.arena.alloc(TypeAliasDecl {
            visibility,
            name: Ident::from_token(name),
            ty,
            span: self.span_from(start),
        }))))
    }
}
