//! Statement parsing and the panic-mode recovery driver.
//!
//! [`Parser::parse_statement`] dispatches on the current token. The block
//! loop around it owns recovery: when a statement records a diagnostic and
//! leaves the cursor on a token that cannot begin a statement, the loop
//! skips to the next synchronization point, and it always makes progress.

use bumpalo::collections::Vec as BVec;
use teal_core::{ParseErrorKind, Span};
use tracing::debug;

use super::parser::{PResult, Parser, is_sync_token};
use crate::ast::expr::Expr;
use crate::ast::stmt::*;
use crate::ast::{Ident, Visibility};
use crate::lexer::TokenKind;
use crate::stack::ensure_sufficient_stack;

/// Tokens that end a nested block.
fn is_block_end(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::End | TokenKind::Else | TokenKind::Elseif | TokenKind::Until | TokenKind::Eof
    )
}

impl<'ast> Parser<'ast> {
    /// Parse the top-level block, which only ends at end of file.
    pub(super) fn parse_chunk_block(&mut self) -> PResult<&'ast Block<'ast>> {
        self.parse_statements(|kind| kind == TokenKind::Eof)
    }

    /// Parse a nested block up to, not including, its closing keyword.
    pub fn parse_block(&mut self) -> PResult<&'ast Block<'ast>> {
        self.parse_statements(is_block_end)
    }

    fn parse_statements(&mut self, stop: fn(TokenKind) -> bool) -> PResult<&'ast Block<'ast>> {
        self.enter()?;
        let result = ensure_sufficient_stack(|| self.parse_statement_list(stop));
        self.leave();
        result
    }

    fn parse_statement_list(&mut self, stop: fn(TokenKind) -> bool) -> PResult<&'ast Block<'ast>> {
        let start = self.peek().span;
        let first = self.position;
        let mut stmts = BVec::new_in(self.arena);

        while !stop(self.peek().kind) {
            let position = self.position;
            let errors = self.errors.len();

            if let Some(stmt) = self.parse_statement()? {
                stmts.push(stmt);
            }

            if self.errors.len() > errors && !self.at_statement_start() {
                self.abandon_statement();
            }
            if self.position == position {
                self.advance();
            }
        }

        let span = if self.position > first {
            self.span_from(start)
        } else {
            Span::point(start.line, start.col)
        };
        Ok(&*self.arena.alloc(Block {
            stmts: stmts.into_bump_slice(),
            span,
        }))
    }

    /// Skip the rest of a statement that recorded a diagnostic.
    #[cold]
    #[inline(never)]
    fn abandon_statement(&mut self) {
        let token = self.peek();
        debug!(line = token.span.line, col = token.span.col, "abandoning statement");
        self.skip_to_sync();
    }

    /// Whether the current token can begin a statement or close a block.
    fn at_statement_start(&self) -> bool {
        let kind = self.peek().kind;
        is_sync_token(kind)
            || self.check(TokenKind::Name)
            || matches!(
                kind,
                TokenKind::LeftParen | TokenKind::ColonColon | TokenKind::Goto | TokenKind::Do
            )
    }

    /// Parse one statement.
    ///
    /// Returns `None` for empty statements and for statements abandoned
    /// after a diagnostic.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_statement(&mut self) -> PResult<Option<Stmt<'ast>>> {
        let token = self.peek();
        match token.kind {
            TokenKind::Semicolon => {
                self.advance();
                Ok(None)
            }
            TokenKind::If => self.parse_if().map(Some),
            TokenKind::While => self.parse_while().map(Some),
            TokenKind::Repeat => self.parse_repeat().map(Some),
            TokenKind::For => self.parse_for(),
            TokenKind::Do => self.parse_do().map(Some),
            TokenKind::Function => self.parse_function_decl(Visibility::Plain, token.span),
            TokenKind::Local => {
                self.advance();
                self.parse_qualified_declaration(Visibility::Local, token.span)
            }
            TokenKind::Global if self.global_starts_declaration() => {
                self.advance();
                self.parse_qualified_declaration(Visibility::Global, token.span)
            }
            TokenKind::Return => self.parse_return().map(Some),
            TokenKind::Break => {
                self.advance();
                Ok(Some(Stmt::Break(token.span)))
            }
            TokenKind::Goto => self.parse_goto(),
            TokenKind::ColonColon => self.parse_label(),
            TokenKind::End | TokenKind::Else | TokenKind::Elseif | TokenKind::Until => {
                self.push_error(ParseErrorKind::UnexpectedToken, format!("unexpected {token}"))?;
                self.advance();
                Ok(None)
            }
            _ => self.parse_assignment_or_call(),
        }
    }

    /// `global` starts a declaration only when a name or `function`
    /// follows; otherwise it is an ordinary variable.
    fn global_starts_declaration(&self) -> bool {
        self.peek_nth(1).kind == TokenKind::Function || self.check_nth(1, TokenKind::Name)
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn parse_if(&mut self) -> PResult<Stmt<'ast>> {
        let start = self.advance().span;
        let mut branches = BVec::new_in(self.arena);

        branches.push(self.parse_if_branch(start)?);
        let mut else_block = None;
        loop {
            if let Some(elseif) = self.eat(TokenKind::Elseif) {
                branches.push(self.parse_if_branch(elseif.span)?);
            } else if self.eat(TokenKind::Else).is_some() {
                else_block = Some(self.parse_block()?);
                break;
            } else {
                break;
            }
        }
        self.consume(TokenKind::End, "expected 'end' to close 'if'")?;

        Ok(Stmt::If(self.arena.alloc(IfStmt {
            branches: branches.into_bump_slice(),
            else_block,
            span: self.span_from(start),
        })))
    }

    /// Condition, `then`, and block of an `if` or `elseif` arm.
    fn parse_if_branch(&mut self, start: Span) -> PResult<IfBranch<'ast>> {
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Then, "expected 'then' after condition")?;
        let block = self.parse_block()?;
        Ok(IfBranch {
            condition,
            block,
            span: self.span_from(start),
        })
    }

    fn parse_while(&mut self) -> PResult<Stmt<'ast>> {
        let start = self.advance().span;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Do, "expected 'do' after 'while' condition")?;
        let body = self.parse_block()?;
        self.consume(TokenKind::End, "expected 'end' to close 'while'")?;

        Ok(Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_repeat(&mut self) -> PResult<Stmt<'ast>> {
        let start = self.advance().span;
        let body = self.parse_block()?;
        let condition = match self.consume(TokenKind::Until, "expected 'until' after 'repeat' block")? {
            Some(_) => self.parse_expression()?,
            None => self.error_expr(),
        };

        Ok(Stmt::Repeat(self.arena.alloc(RepeatStmt {
            body,
            condition,
            span: self.span_from(start),
        })))
    }

    /// Numeric `for i = a, b[, c]` or generic `for k, v in exprs`.
    fn parse_for(&mut self) -> PResult<Option<Stmt<'ast>>> {
        let start = self.advance().span;
        let Some(first) = self.expect_name("expected variable name after 'for'")? else {
            return Ok(None);
        };
        let first = Ident::from_token(first);

        if self.eat(TokenKind::Equal).is_some() {
            let from = self.parse_expression()?;
            self.consume(TokenKind::Comma, "expected ',' after numeric for start")?;
            let limit = self.parse_expression()?;
            let step = if self.eat(TokenKind::Comma).is_some() {
                Some(self.parse_expression()?)
            } else {
                None
            };
            self.consume(TokenKind::Do, "expected 'do' in numeric for")?;
            let body = self.parse_block()?;
            self.consume(TokenKind::End, "expected 'end' to close 'for'")?;

            return Ok(Some(Stmt::NumericFor(self.arena.alloc(NumericForStmt {
                var: first,
                start: from,
                limit,
                step,
                body,
                span: self.span_from(start),
            }))));
        }

        let mut names = BVec::new_in(self.arena);
        names.push(first);
        while self.eat(TokenKind::Comma).is_some() {
            match self.expect_name("expected variable name in for loop")? {
                Some(name) => names.push(Ident::from_token(name)),
                None => break,
            }
        }
        self.consume(TokenKind::In, "expected 'in' in for loop")?;
        let exprs = self.parse_expr_list()?;
        self.consume(TokenKind::Do, "expected 'do' in for loop")?;
        let body = self.parse_block()?;
        self.consume(TokenKind::End, "expected 'end' to close 'for'")?;

        Ok(Some(Stmt::GenericFor(self.arena.alloc(GenericForStmt {
            names: names.into_bump_slice(),
            exprs,
            body,
            span: self.span_from(start),
        }))))
    }

    fn parse_do(&mut self) -> PResult<Stmt<'ast>> {
        let start = self.advance().span;
        let block = self.parse_block()?;
        self.consume(TokenKind::End, "expected 'end' to close 'do' block")?;
        Ok(Stmt::Do(block, self.span_from(start)))
    }

    fn parse_return(&mut self) -> PResult<Stmt<'ast>> {
        let start = self.advance().span;
        let values: &'ast [&'ast Expr<'ast>] =
            if is_block_end(self.peek().kind) || self.check(TokenKind::Semicolon) {
                &[]
            } else {
                self.parse_expr_list()?
            };
        self.eat(TokenKind::Semicolon);

        Ok(Stmt::Return(self.arena.alloc(ReturnStmt {
            values,
            span: self.span_from(start),
        })))
    }

    fn parse_goto(&mut self) -> PResult<Option<Stmt<'ast>>> {
        let start = self.advance().span;
        let Some(label) = self.expect_name("expected label name after 'goto'")? else {
            return Ok(None);
        };
        Ok(Some(Stmt::Goto(Ident::from_token(label), self.span_from(start))))
    }

    fn parse_label(&mut self) -> PResult<Option<Stmt<'ast>>> {
        let start = self.advance().span;
        let Some(label) = self.expect_name("expected label name after '::'")? else {
            return Ok(None);
        };
        self.consume(TokenKind::ColonColon, "expected '::' after label name")?;
        Ok(Some(Stmt::Label(Ident::from_token(label), self.span_from(start))))
    }

    // ========================================================================
    // Assignment and call statements
    // ========================================================================

    /// A prefix expression followed by `=` or `,` is an assignment; a bare
    /// call is a call statement; anything else is reported.
    fn parse_assignment_or_call(&mut self) -> PResult<Option<Stmt<'ast>>> {
        let Some(first) = self.parse_prefix_expression()? else {
            return Ok(None);
        };

        if self.check(TokenKind::Equal) || self.check(TokenKind::Comma) {
            let mut targets = BVec::new_in(self.arena);
            targets.push(self.assignment_target(first)?);
            while self.eat(TokenKind::Comma).is_some() {
                match self.parse_prefix_expression()? {
                    Some(target) => targets.push(self.assignment_target(target)?),
                    None => return Ok(None),
                }
            }

            if self
                .consume(TokenKind::Equal, "expected '=' in assignment")?
                .is_none()
            {
                return Ok(None);
            }
            let values = self.parse_expr_list()?;

            return Ok(Some(Stmt::Assign(self.arena.alloc(AssignStmt {
                targets: targets.into_bump_slice(),
                values,
                span: self.span_from(first.span()),
            }))));
        }

        if let Expr::Call(call) = first {
            return Ok(Some(Stmt::Call(call)));
        }

        self.push_error_at(
            ParseErrorKind::AmbiguousStatement,
            first.span(),
            "unexpected expression statement",
        )?;
        Ok(None)
    }

    /// Check that `expr` can be assigned to, replacing it with an error
    /// node if not.
    fn assignment_target(&mut self, expr: &'ast Expr<'ast>) -> PResult<&'ast Expr<'ast>> {
        if expr.is_assignable() {
            return Ok(expr);
        }

        let message = match expr {
            Expr::Call(_) => "cannot assign to function call",
            _ => "cannot assign to parenthesized expression",
        };
        self.push_error_at(ParseErrorKind::AmbiguousStatement, expr.span(), message)?;
        Ok(self.arena.alloc(Expr::Error(expr.span())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;
    use crate::ast::expr::CallArgs;
    use bumpalo::Bump;

    fn parse_ok<'ast>(source: &str, arena: &'ast Bump) -> &'ast Block<'ast> {
        let outcome = Parser::parse(source, arena);
        match outcome.into_result() {
            Ok(block) => block,
            Err(errors) => panic!("Failed to parse {source:?}:\n{errors}"),
        }
    }

    #[test]
    fn parse_empty_chunk() {
        let arena = Bump::new();
        let block = parse_ok("", &arena);
        assert!(block.is_empty());

        let block = parse_ok("  -- only a comment\n", &arena);
        assert!(block.is_empty());
    }

    #[test]
    fn parse_empty_statements() {
        let arena = Bump::new();
        let block = parse_ok(";;; x = 1 ;", &arena);
        assert_eq!(block.len(), 1);
    }

    #[test]
    fn parse_if_chain() {
        let arena = Bump::new();
        let block = parse_ok(
            "if a then x = 1 elseif b then x = 2 elseif c then x = 3 else x = 4 end",
            &arena,
        );
        match block.stmts[0] {
            Stmt::If(stmt) => {
                assert_eq!(stmt.branches.len(), 3);
                assert!(stmt.else_block.is_some());
                assert_eq!(stmt.branches[1].block.len(), 1);
            }
            other => panic!("Expected if statement, got {other:?}"),
        }
    }

    #[test]
    fn parse_loops() {
        let arena = Bump::new();
        let block = parse_ok(
            "while x do x = x - 1 end
             repeat x = x + 1 until x > 10
             for i = 1, 10, 2 do print(i) end
             for k, v in pairs(t) do print(k, v) end",
            &arena,
        );
        assert_eq!(block.len(), 4);
        assert!(matches!(block.stmts[0], Stmt::While(_)));
        match block.stmts[1] {
            Stmt::Repeat(stmt) => {
                assert!(matches!(stmt.condition, Expr::Binary(b) if b.op == BinaryOp::Greater));
            }
            other => panic!("Expected repeat, got {other:?}"),
        }
        match block.stmts[2] {
            Stmt::NumericFor(stmt) => {
                assert_eq!(stmt.var.name, "i");
                assert!(stmt.step.is_some());
            }
            other => panic!("Expected numeric for, got {other:?}"),
        }
        match block.stmts[3] {
            Stmt::GenericFor(stmt) => {
                assert_eq!(stmt.names.len(), 2);
                assert_eq!(stmt.exprs.len(), 1);
            }
            other => panic!("Expected generic for, got {other:?}"),
        }
    }

    #[test]
    fn parse_do_goto_label_break() {
        let arena = Bump::new();
        let block = parse_ok(
            "do ::top:: goto top end while true do break end",
            &arena,
        );
        match block.stmts[0] {
            Stmt::Do(inner, _) => {
                assert!(matches!(inner.stmts[0], Stmt::Label(name, _) if name.name == "top"));
                assert!(matches!(inner.stmts[1], Stmt::Goto(name, _) if name.name == "top"));
            }
            other => panic!("Expected do block, got {other:?}"),
        }
        match block.stmts[1] {
            Stmt::While(stmt) => assert!(matches!(stmt.body.stmts[0], Stmt::Break(_))),
            other => panic!("Expected while, got {other:?}"),
        }
    }

    #[test]
    fn parse_return_forms() {
        let arena = Bump::new();
        let block = parse_ok("function f() return end function g() return 1, 2; end", &arena);
        match block.stmts[1] {
            Stmt::Function(decl) => match decl.body.block.stmts[0] {
                Stmt::Return(ret) => assert_eq!(ret.values.len(), 2),
                other => panic!("Expected return, got {other:?}"),
            },
            other => panic!("Expected function, got {other:?}"),
        }
    }

    #[test]
    fn parse_assignment_and_call() {
        let arena = Bump::new();
        let block = parse_ok("a, b.c, d[1] = 1, 2, 3 obj:method 'x'", &arena);
        match block.stmts[0] {
            Stmt::Assign(assign) => {
                assert_eq!(assign.targets.len(), 3);
                assert_eq!(assign.values.len(), 3);
            }
            other => panic!("Expected assignment, got {other:?}"),
        }
        match block.stmts[1] {
            Stmt::Call(call) => {
                assert!(matches!(call.args, CallArgs::String(_)));
                assert_eq!(call.method.map(|m| m.name), Some("method"));
            }
            other => panic!("Expected call, got {other:?}"),
        }
    }

    #[test]
    fn parse_global_as_plain_name() {
        let arena = Bump::new();
        let block = parse_ok("global = 1 global.x = 2 global(3)", &arena);
        assert_eq!(block.len(), 3);
        assert!(matches!(block.stmts[0], Stmt::Assign(_)));
        assert!(matches!(block.stmts[2], Stmt::Call(_)));
    }

    #[test]
    fn expression_statement_is_ambiguous() {
        let arena = Bump::new();
        let outcome = Parser::parse("x.y\nlocal z = 1", &arena);
        let block = outcome.block.unwrap();
        assert_eq!(block.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        let error = outcome.errors.first().unwrap();
        assert_eq!(error.kind, ParseErrorKind::AmbiguousStatement);
        assert_eq!((error.line(), error.col()), (1, 1));
    }

    #[test]
    fn cannot_assign_to_call() {
        let arena = Bump::new();
        let outcome = Parser::parse("f() = 1", &arena);
        let block = outcome.block.unwrap();
        match block.stmts[0] {
            Stmt::Assign(assign) => assert!(assign.targets[0].is_error()),
            other => panic!("Expected assignment, got {other:?}"),
        }
        assert_eq!(
            outcome.errors.first().map(|e| e.message.as_str()),
            Some("cannot assign to function call")
        );
    }

    #[test]
    fn missing_then() {
        let arena = Bump::new();
        let outcome = Parser::parse("if x y = 1 end", &arena);
        assert!(outcome.block.is_some());
        let error = outcome.errors.first().unwrap();
        assert_eq!(error.message, "expected 'then' after condition");
        assert_eq!((error.line(), error.col()), (1, 6));
    }

    #[test]
    fn missing_end_reports_once() {
        let arena = Bump::new();
        let outcome = Parser::parse("while x do y()", &arena);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(
            outcome.errors.first().map(|e| e.message.as_str()),
            Some("expected 'end' to close 'while'")
        );
    }

    #[test]
    fn stray_closer_is_consumed() {
        let arena = Bump::new();
        let outcome = Parser::parse("x = 1 end y = 2", &arena);
        let block = outcome.block.unwrap();
        assert_eq!(block.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(
            outcome.errors.first().map(|e| e.message.as_str()),
            Some("unexpected 'end'")
        );
    }

    #[test]
    fn recovery_keeps_neighbours() {
        let arena = Bump::new();
        let outcome = Parser::parse("local a = 1\n) x\nlocal b = 2", &arena);
        let block = outcome.block.unwrap();
        assert_eq!(block.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        let error = outcome.errors.first().unwrap();
        assert_eq!((error.line(), error.col()), (2, 1));
    }

    #[test]
    fn missing_until() {
        let arena = Bump::new();
        let outcome = Parser::parse("repeat x = 1", &arena);
        match outcome.block.unwrap().stmts[0] {
            Stmt::Repeat(stmt) => assert!(stmt.condition.is_error()),
            other => panic!("Expected repeat, got {other:?}"),
        }
        assert_eq!(
            outcome.errors.first().map(|e| e.message.as_str()),
            Some("expected 'until' after 'repeat' block")
        );
    }

    #[test]
    fn block_spans_cover_statements() {
        let arena = Bump::new();
        let block = parse_ok("x = 1", &arena);
        assert_eq!(block.span, Span::new(1, 1, 5));
        assert_eq!(block.stmts[0].span(), Span::new(1, 1, 5));
    }
}
