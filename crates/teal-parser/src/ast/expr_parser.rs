//! Expression parsing using precedence climbing.
//!
//! [`Parser::parse_expr`] takes a minimum precedence; it parses one unary
//! operand, then keeps folding in binary operators that bind at least that
//! tightly. Right operands are parsed at `precedence + 1`; chains of the
//! right associative `..` and `^` are collected in a loop and folded from
//! the right.

use bumpalo::collections::Vec as BVec;
use teal_core::{ParseErrorKind, Span};

use super::parser::{PResult, Parser};
use crate::ast::expr::*;
use crate::ast::ops::{MIN_PRECEDENCE, TypeOp, UNARY_PRECEDENCE};
use crate::ast::types::TypeExpr;
use crate::ast::{BinaryOp, Ident, UnaryOp};
use crate::lexer::{Token, TokenKind};
use crate::stack::ensure_sufficient_stack;

impl<'ast> Parser<'ast> {
    /// Parse a complete expression.
    pub fn parse_expression(&mut self) -> PResult<&'ast Expr<'ast>> {
        self.parse_expr(MIN_PRECEDENCE)
    }

    /// Parse an expression whose operators bind at least as tightly as
    /// `min_prec`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_expr(&mut self, min_prec: u8) -> PResult<&'ast Expr<'ast>> {
        self.enter()?;
        let result = ensure_sufficient_stack(|| self.parse_expr_inner(min_prec));
        self.leave();
        result
    }

    fn parse_expr_inner(&mut self, min_prec: u8) -> PResult<&'ast Expr<'ast>> {
        let mut lhs = self.parse_unary()?;

        loop {
            let kind = self.peek().kind;

            if let Some(type_op) = TypeOp::from_token(kind) {
                if type_op.precedence() < min_prec {
                    break;
                }
                self.advance();
                lhs = match type_op {
                    TypeOp::Cast => self.parse_cast(lhs)?,
                    TypeOp::Is => self.parse_is(lhs)?,
                };
                continue;
            }

            let Some(op) = BinaryOp::from_token(kind) else {
                break;
            };
            if op.precedence() < min_prec {
                break;
            }

            let op_token = self.advance();
            if op.is_right_associative() {
                lhs = self.parse_right_chain(lhs, op, op_token)?;
                continue;
            }

            let rhs = self.parse_operand(op.right_precedence(), op_token)?;
            lhs = self.binary(lhs, op, rhs);
        }

        Ok(lhs)
    }

    /// Parse `a .. b .. c` (or a `^` chain) after the first operator.
    ///
    /// The operands are collected in a loop and folded from the right, so
    /// a long flat chain costs no nesting depth.
    fn parse_right_chain(
        &mut self,
        first: &'ast Expr<'ast>,
        op: BinaryOp,
        mut op_token: Token<'ast>,
    ) -> PResult<&'ast Expr<'ast>> {
        let mut operands = BVec::new_in(self.arena);
        operands.push(first);
        let mut rhs = self.parse_operand(op.precedence() + 1, op_token)?;
        while BinaryOp::from_token(self.peek().kind) == Some(op) {
            op_token = self.advance();
            operands.push(rhs);
            rhs = self.parse_operand(op.precedence() + 1, op_token)?;
        }

        for lhs in operands.into_iter().rev() {
            rhs = self.binary(lhs, op, rhs);
        }
        Ok(rhs)
    }

    fn binary(&self, left: &'ast Expr<'ast>, op: BinaryOp, right: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let span = left.span().merge(right.span());
        self.arena
            .alloc(Expr::Binary(self.arena.alloc(BinaryExpr { left, op, right, span })))
    }

    /// Parse the operand of `operator`, or report it missing.
    fn parse_operand(&mut self, min_prec: u8, operator: Token<'ast>) -> PResult<&'ast Expr<'ast>> {
        if self.starts_expression() {
            return self.parse_expr(min_prec);
        }
        self.push_error(
            ParseErrorKind::ExpectedExpression,
            format!("expected expression after {operator}"),
        )?;
        Ok(self.error_expr())
    }

    fn parse_unary(&mut self) -> PResult<&'ast Expr<'ast>> {
        let Some(op) = UnaryOp::from_token(self.peek().kind) else {
            return self.parse_primary();
        };

        let op_token = self.advance();
        let operand = self.parse_operand(UNARY_PRECEDENCE, op_token)?;
        let span = op_token.span.merge(operand.span());
        Ok(self
            .arena
            .alloc(Expr::Unary(self.arena.alloc(UnaryExpr { op, operand, span }))))
    }

    fn parse_primary(&mut self) -> PResult<&'ast Expr<'ast>> {
        let token = self.peek();
        let literal = match token.kind {
            TokenKind::Nil => Some(LiteralKind::Nil),
            TokenKind::True => Some(LiteralKind::Bool(true)),
            TokenKind::False => Some(LiteralKind::Bool(false)),
            TokenKind::Number => Some(LiteralKind::Number(token.lexeme)),
            TokenKind::String => Some(LiteralKind::String(token.lexeme)),
            TokenKind::Ellipsis => Some(LiteralKind::Vararg),
            _ => None,
        };
        if let Some(kind) = literal {
            self.advance();
            return Ok(self.arena.alloc(Expr::Literal(LiteralExpr {
                kind,
                span: token.span,
            })));
        }

        match token.kind {
            TokenKind::Function => {
                self.advance();
                let body = self.parse_function_body(token.span)?;
                let span = self.span_from(token.span);
                Ok(self
                    .arena
                    .alloc(Expr::Function(self.arena.alloc(FunctionExpr { body, span }))))
            }
            TokenKind::LeftBrace => {
                let table = self.parse_table()?;
                Ok(self.arena.alloc(Expr::Table(table)))
            }
            _ if token.kind == TokenKind::LeftParen || self.check(TokenKind::Name) => {
                match self.parse_prefix_expression()? {
                    Some(expr) => Ok(expr),
                    None => Ok(self.error_expr()),
                }
            }
            _ => {
                self.push_error(
                    ParseErrorKind::ExpectedExpression,
                    format!("unexpected {token} in expression"),
                )?;
                Ok(self.error_expr())
            }
        }
    }

    /// Whether the current token can begin an expression.
    pub(super) fn starts_expression(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Nil
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::Ellipsis
                | TokenKind::Function
                | TokenKind::LeftBrace
                | TokenKind::LeftParen
                | TokenKind::Not
                | TokenKind::Minus
                | TokenKind::Hash
                | TokenKind::Tilde
        ) || self.check(TokenKind::Name)
    }

    /// Placeholder for an operand that could not be parsed.
    pub(super) fn error_expr(&self) -> &'ast Expr<'ast> {
        self.arena.alloc(Expr::Error(self.peek().span))
    }

    // ========================================================================
    // Prefix expressions
    // ========================================================================

    /// Parse `Name` or `(expr)` followed by any number of suffixes.
    ///
    /// Returns `None`, after reporting, when neither base form is present.
    pub(super) fn parse_prefix_expression(&mut self) -> PResult<Option<&'ast Expr<'ast>>> {
        let token = self.peek();
        let mut expr: &'ast Expr<'ast> = if let Some(open) = self.eat(TokenKind::LeftParen) {
            let inner = self.parse_expression()?;
            self.consume(TokenKind::RightParen, "expected ')' to close parenthesized expression")?;
            let span = self.span_from(open.span);
            self.arena
                .alloc(Expr::Paren(self.arena.alloc(ParenExpr { expr: inner, span })))
        } else if self.check(TokenKind::Name) {
            let name = self.advance();
            self.arena.alloc(Expr::Name(Ident::from_token(name)))
        } else {
            self.push_error(
                ParseErrorKind::ExpectedExpression,
                format!("expected '(' or name, got {token}"),
            )?;
            return Ok(None);
        };

        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let Some(field) = self.expect_name("expected field name after '.'")? else {
                        break;
                    };
                    let span = expr.span().merge(field.span);
                    expr = self.arena.alloc(Expr::Field(self.arena.alloc(FieldExpr {
                        object: expr,
                        field: Ident::from_token(field),
                        span,
                    })));
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let key = self.parse_expression()?;
                    self.consume(TokenKind::RightBracket, "expected ']' after index")?;
                    let span = self.span_from(expr.span());
                    expr = self.arena.alloc(Expr::Index(self.arena.alloc(IndexExpr {
                        object: expr,
                        key,
                        span,
                    })));
                }
                TokenKind::Colon => {
                    self.advance();
                    let Some(method) = self.expect_name("expected method name after ':'")? else {
                        break;
                    };
                    let args = match self.parse_call_args()? {
                        Some(args) => args,
                        None => {
                            self.push_error(
                                ParseErrorKind::ExpectedToken,
                                "expected arguments after method name",
                            )?;
                            CallArgs::List(&[])
                        }
                    };
                    expr = self.make_call(expr, Some(Ident::from_token(method)), args);
                }
                TokenKind::LeftParen | TokenKind::LeftBrace | TokenKind::String => {
                    let Some(args) = self.parse_call_args()? else {
                        break;
                    };
                    expr = self.make_call(expr, None, args);
                }
                _ => break,
            }
        }

        Ok(Some(expr))
    }

    fn make_call(
        &mut self,
        callee: &'ast Expr<'ast>,
        method: Option<Ident<'ast>>,
        args: CallArgs<'ast>,
    ) -> &'ast Expr<'ast> {
        let span = self.span_from(callee.span());
        self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr {
            callee,
            method,
            args,
            span,
        })))
    }

    /// Parse `(list)`, a table constructor, or a string literal argument.
    fn parse_call_args(&mut self) -> PResult<Option<CallArgs<'ast>>> {
        let token = self.peek();
        match token.kind {
            TokenKind::LeftParen => {
                self.advance();
                let args: &'ast [&'ast Expr<'ast>] = if self.check(TokenKind::RightParen) {
                    &[]
                } else {
                    self.parse_expr_list()?
                };
                self.consume(TokenKind::RightParen, "expected ')' to close argument list")?;
                Ok(Some(CallArgs::List(args)))
            }
            TokenKind::LeftBrace => Ok(Some(CallArgs::Table(self.parse_table()?))),
            TokenKind::String => {
                self.advance();
                Ok(Some(CallArgs::String(LiteralExpr {
                    kind: LiteralKind::String(token.lexeme),
                    span: token.span,
                })))
            }
            _ => Ok(None),
        }
    }

    /// Parse `expr {, expr}`.
    pub(super) fn parse_expr_list(&mut self) -> PResult<&'ast [&'ast Expr<'ast>]> {
        let mut exprs = BVec::new_in(self.arena);
        exprs.push(self.parse_expression()?);
        while self.eat(TokenKind::Comma).is_some() {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs.into_bump_slice())
    }

    // ========================================================================
    // Casts and type tests
    // ========================================================================

    /// Parse the target of `as`: one type or a parenthesized type list.
    fn parse_cast(&mut self, expr: &'ast Expr<'ast>) -> PResult<&'ast Expr<'ast>> {
        let (types, parenthesized) = if self.eat(TokenKind::LeftParen).is_some() {
            let types = self.parse_type_list()?;
            self.consume(TokenKind::RightParen, "expected ')' after cast types")?;
            (types, true)
        } else {
            let ty = self.parse_type()?;
            let types: &'ast [TypeExpr<'ast>] = self.arena.alloc_slice_copy(&[ty]);
            (types, false)
        };

        let span = self.span_from(expr.span());
        Ok(self.arena.alloc(Expr::Cast(self.arena.alloc(CastExpr {
            expr,
            types,
            parenthesized,
            span,
        }))))
    }

    fn parse_is(&mut self, expr: &'ast Expr<'ast>) -> PResult<&'ast Expr<'ast>> {
        let ty = self.parse_type()?;
        let span = self.span_from(expr.span());
        Ok(self
            .arena
            .alloc(Expr::Is(self.arena.alloc(IsExpr { expr, ty, span }))))
    }

    // ========================================================================
    // Table constructors
    // ========================================================================

    /// Parse `{ field {sep field} [sep] }`.
    pub(super) fn parse_table(&mut self) -> PResult<&'ast TableExpr<'ast>> {
        let open = self.advance();
        let mut fields = BVec::new_in(self.arena);

        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            fields.push(self.parse_table_field()?);
            if self
                .eat_any(&[TokenKind::Comma, TokenKind::Semicolon])
                .is_none()
            {
                break;
            }
        }

        self.consume(TokenKind::RightBrace, "expected '}' to close table")?;
        let span = self.span_from(open.span);
        Ok(self.arena.alloc(TableExpr {
            fields: fields.into_bump_slice(),
            span,
        }))
    }

    fn parse_table_field(&mut self) -> PResult<TableField<'ast>> {
        if self.eat(TokenKind::LeftBracket).is_some() {
            let key = self.parse_expression()?;
            self.consume(TokenKind::RightBracket, "expected ']' after table key")?;
            self.consume(TokenKind::Equal, "expected '=' after table key")?;
            let value = self.parse_expression()?;
            return Ok(TableField::Keyed { key, value });
        }

        if self.check(TokenKind::Name) {
            let next = self.peek_nth(1).kind;
            if next == TokenKind::Equal {
                let name = Ident::from_token(self.advance());
                self.advance();
                let value = self.parse_expression()?;
                return Ok(TableField::Named { name, ty: None, value });
            }
            if next == TokenKind::Colon && !self.is_method_call_ahead() {
                let name = Ident::from_token(self.advance());
                self.advance();
                let ty = self.parse_type()?;
                self.consume(TokenKind::Equal, "expected '=' after table field type")?;
                let value = self.parse_expression()?;
                return Ok(TableField::Named {
                    name,
                    ty: Some(ty),
                    value,
                });
            }
        }

        Ok(TableField::Positional(self.parse_expression()?))
    }

    /// `obj:method(` / `obj:method "s"` / `obj:method {` inside a table is a
    /// method call, not a typed field.
    fn is_method_call_ahead(&self) -> bool {
        self.check_nth(2, TokenKind::Name)
            && matches!(
                self.peek_nth(3).kind,
                TokenKind::LeftParen | TokenKind::String | TokenKind::LeftBrace
            )
    }

    // ========================================================================
    // Function literals
    // ========================================================================

    /// Parse `(params) [: returns] block end`, shared by function literals
    /// and declarations. `start` is the span of the `function` keyword.
    pub(super) fn parse_function_body(&mut self, start: Span) -> PResult<FunctionBody<'ast>> {
        let params: &'ast [Param<'ast>] = if self
            .consume(TokenKind::LeftParen, "expected '(' to start parameter list")?
            .is_some()
        {
            let params = self.parse_params()?;
            self.consume(TokenKind::RightParen, "expected ')' to close parameter list")?;
            params
        } else {
            &[]
        };

        let returns = if self.eat(TokenKind::Colon).is_some() {
            Some(self.parse_return_types()?)
        } else {
            None
        };

        let block = self.parse_block()?;
        self.consume(TokenKind::End, "expected 'end' to close function")?;

        Ok(FunctionBody {
            params,
            returns,
            block,
            span: self.span_from(start),
        })
    }

    fn parse_params(&mut self) -> PResult<&'ast [Param<'ast>]> {
        let mut params = BVec::new_in(self.arena);
        if self.check(TokenKind::RightParen) {
            return Ok(params.into_bump_slice());
        }

        loop {
            if let Some(dots) = self.eat(TokenKind::Ellipsis) {
                let ty = if self.eat(TokenKind::Colon).is_some() {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                params.push(Param {
                    name: Ident::from_token(dots),
                    ty,
                    optional: false,
                    variadic: true,
                    span: self.span_from(dots.span),
                });
                break;
            }

            let Some(name) = self.expect_name("expected parameter name or '...'")? else {
                break;
            };
            let optional = self.eat(TokenKind::Question).is_some();
            let ty = if self.eat(TokenKind::Colon).is_some() {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(Param {
                name: Ident::from_token(name),
                ty,
                optional,
                variadic: false,
                span: self.span_from(name.span),
            });

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        Ok(params.into_bump_slice())
    }
}
