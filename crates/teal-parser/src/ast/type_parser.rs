//! Type annotation parsing.
//!
//! Covers primitive and nominal names, the `{T}` / `{K : V}` / `{T1, T2}`
//! table shorthands, function types, unions, and the record, interface and
//! enum bodies used by declarations. An unparseable type is reported once
//! and replaced with [`TypeExpr::Unknown`].

use bumpalo::collections::Vec as BVec;
use teal_core::{ParseErrorKind, Span};

use super::parser::{PResult, Parser};
use crate::ast::Ident;
use crate::ast::types::*;
use crate::lexer::TokenKind;
use crate::stack::ensure_sufficient_stack;

impl<'ast> Parser<'ast> {
    /// Parse a type, including `A | B` unions.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_type(&mut self) -> PResult<TypeExpr<'ast>> {
        self.enter()?;
        let result = ensure_sufficient_stack(|| self.parse_type_inner());
        self.leave();
        result
    }

    fn parse_type_inner(&mut self) -> PResult<TypeExpr<'ast>> {
        let first = self.parse_base_type()?;
        if !self.check(TokenKind::Pipe) {
            return Ok(first);
        }

        let mut options = BVec::new_in(self.arena);
        options.push(first);
        while self.eat(TokenKind::Pipe).is_some() {
            options.push(self.parse_base_type()?);
        }

        let span = self.span_from(first.span());
        Ok(TypeExpr::Union(self.arena.alloc(UnionType {
            options: options.into_bump_slice(),
            span,
        })))
    }

    /// Parse `T {, T}`.
    pub(super) fn parse_type_list(&mut self) -> PResult<&'ast [TypeExpr<'ast>]> {
        let mut types = BVec::new_in(self.arena);
        types.push(self.parse_type()?);
        while self.eat(TokenKind::Comma).is_some() {
            types.push(self.parse_type()?);
        }
        Ok(types.into_bump_slice())
    }

    fn parse_base_type(&mut self) -> PResult<TypeExpr<'ast>> {
        let token = self.peek();
        match token.kind {
            TokenKind::Nil => {
                self.advance();
                Ok(TypeExpr::Basic(PrimitiveType::Nil, token.span))
            }
            TokenKind::LeftBrace => self.parse_table_type(),
            TokenKind::Function => self.parse_function_type(),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.consume(TokenKind::RightParen, "expected ')' after type")?;
                Ok(inner)
            }
            _ if self.check(TokenKind::Name) => {
                let primitive = PrimitiveType::from_name(token.lexeme)
                    .filter(|_| token.kind == TokenKind::Name && self.peek_nth(1).kind != TokenKind::Dot);
                match primitive {
                    Some(primitive) => {
                        self.advance();
                        Ok(TypeExpr::Basic(primitive, token.span))
                    }
                    None => Ok(TypeExpr::Nominal(self.parse_nominal_type()?)),
                }
            }
            _ => {
                self.push_error(ParseErrorKind::ExpectedType, format!("expected type, got {token}"))?;
                Ok(TypeExpr::Unknown(token.span))
            }
        }
    }

    /// Parse a dotted name. The current token must be name-like.
    pub(super) fn parse_nominal_type(&mut self) -> PResult<NominalType<'ast>> {
        let first = self.advance();
        let mut path = BVec::new_in(self.arena);
        path.push(Ident::from_token(first));

        while self.eat(TokenKind::Dot).is_some() {
            match self.eat(TokenKind::Name) {
                Some(segment) => path.push(Ident::from_token(segment)),
                None => {
                    self.push_error(ParseErrorKind::InvalidType, "expected name after '.' in type")?;
                    break;
                }
            }
        }

        Ok(NominalType {
            path: path.into_bump_slice(),
            span: self.span_from(first.span),
        })
    }

    /// Parse `{T}`, `{K : V}` or `{T1, T2, ...}`.
    fn parse_table_type(&mut self) -> PResult<TypeExpr<'ast>> {
        let open = self.advance();
        let first = self.parse_type()?;

        if self.eat(TokenKind::Colon).is_some() {
            let value = self.parse_type()?;
            self.consume(TokenKind::RightBrace, "expected '}' to close map type")?;
            return Ok(TypeExpr::Map(self.arena.alloc(MapType {
                key: first,
                value,
                span: self.span_from(open.span),
            })));
        }

        if self.check(TokenKind::Comma) {
            let mut elements = BVec::new_in(self.arena);
            elements.push(first);
            while self.eat(TokenKind::Comma).is_some() {
                elements.push(self.parse_type()?);
            }
            self.consume(TokenKind::RightBrace, "expected '}' to close tuple type")?;
            return Ok(TypeExpr::Tuple(self.arena.alloc(TupleType {
                elements: elements.into_bump_slice(),
                span: self.span_from(open.span),
            })));
        }

        self.consume(TokenKind::RightBrace, "expected '}' to close array type")?;
        Ok(TypeExpr::Array(self.arena.alloc(ArrayType {
            element: first,
            span: self.span_from(open.span),
        })))
    }

    /// Parse `function(params): returns`. A bare `function` is allowed.
    fn parse_function_type(&mut self) -> PResult<TypeExpr<'ast>> {
        let start = self.advance().span;
        let mut params = BVec::new_in(self.arena);

        if self.eat(TokenKind::LeftParen).is_some() {
            if !self.check(TokenKind::RightParen) {
                loop {
                    let param = self.parse_function_type_param()?;
                    params.push(param);
                    if param.variadic || self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightParen, "expected ')' to close function type parameters")?;
        }

        let returns = if self.eat(TokenKind::Colon).is_some() {
            Some(self.parse_return_types()?)
        } else {
            None
        };

        Ok(TypeExpr::Function(self.arena.alloc(FunctionType {
            params: params.into_bump_slice(),
            returns,
            span: self.span_from(start),
        })))
    }

    fn parse_function_type_param(&mut self) -> PResult<FunctionTypeParam<'ast>> {
        if let Some(dots) = self.eat(TokenKind::Ellipsis) {
            let ty = if self.consume(TokenKind::Colon, "expected ':' after '...'")?.is_some() {
                self.parse_type()?
            } else {
                TypeExpr::Unknown(dots.span)
            };
            return Ok(FunctionTypeParam {
                name: None,
                ty,
                optional: false,
                variadic: true,
            });
        }

        let named = self.check(TokenKind::Name)
            && matches!(self.peek_nth(1).kind, TokenKind::Colon | TokenKind::Question);
        if named {
            let name = Ident::from_token(self.advance());
            let optional = self.eat(TokenKind::Question).is_some();
            self.consume(TokenKind::Colon, "expected ':' after parameter name")?;
            let ty = self.parse_type()?;
            return Ok(FunctionTypeParam {
                name: Some(name),
                ty,
                optional,
                variadic: false,
            });
        }

        let optional = self.eat(TokenKind::Question).is_some();
        let ty = self.parse_type()?;
        // `T...` is the unnamed spelling of `...: T`
        let variadic = !optional && self.eat(TokenKind::Ellipsis).is_some();
        Ok(FunctionTypeParam {
            name: None,
            ty,
            optional,
            variadic,
        })
    }

    /// Parse a return list after `:`, either `(T1, T2...)` or `T1, T2...`.
    pub(super) fn parse_return_types(&mut self) -> PResult<ReturnTypes<'ast>> {
        let start = self.peek().span;

        if self.eat(TokenKind::LeftParen).is_some() {
            let (types, variadic) = if self.check(TokenKind::RightParen) {
                (&[][..], false)
            } else {
                self.parse_variadic_type_list()?
            };
            self.consume(TokenKind::RightParen, "expected ')' to close return types")?;
            return Ok(ReturnTypes {
                types,
                variadic,
                span: self.span_from(start),
            });
        }

        let (types, variadic) = self.parse_variadic_type_list()?;
        Ok(ReturnTypes {
            types,
            variadic,
            span: self.span_from(start),
        })
    }

    fn parse_variadic_type_list(&mut self) -> PResult<(&'ast [TypeExpr<'ast>], bool)> {
        let mut types = BVec::new_in(self.arena);
        loop {
            types.push(self.parse_type()?);
            if self.eat(TokenKind::Ellipsis).is_some() {
                return Ok((types.into_bump_slice(), true));
            }
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok((types.into_bump_slice(), false))
    }

    /// Parse the right side of a type alias: `record ... end`,
    /// `interface ... end`, `enum ... end`, or any other type.
    pub(super) fn parse_alias_type(&mut self) -> PResult<TypeExpr<'ast>> {
        let token = self.peek();
        match token.kind {
            TokenKind::Record | TokenKind::Interface => {
                self.advance();
                Ok(TypeExpr::Record(self.parse_record_body(token.span)?))
            }
            TokenKind::Enum => {
                self.advance();
                Ok(TypeExpr::Enum(self.parse_enum_body(token.span)?))
            }
            _ => self.parse_type(),
        }
    }

    // ========================================================================
    // Record and interface bodies
    // ========================================================================

    /// Parse everything after `record Name` up to and including `end`.
    pub(super) fn parse_record_body(&mut self, start: Span) -> PResult<&'ast RecordBody<'ast>> {
        self.enter()?;
        let result = ensure_sufficient_stack(|| self.parse_record_body_inner(start));
        self.leave();
        result
    }

    fn parse_record_body_inner(&mut self, start: Span) -> PResult<&'ast RecordBody<'ast>> {
        let mut array_element = None;
        let mut interfaces = BVec::new_in(self.arena);

        if self.check(TokenKind::Is) && self.peek_nth(1).kind != TokenKind::Colon {
            self.advance();
            self.parse_interface_list(&mut array_element, &mut interfaces)?;
        }

        let where_clause = if self.check(TokenKind::Where) && self.peek_nth(1).kind != TokenKind::Colon {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        let mut entries = BVec::new_in(self.arena);
        while !self.check(TokenKind::End) && !self.is_eof() {
            if let Some(entry) = self.parse_record_entry(&mut array_element)? {
                entries.push(entry);
            }
        }
        self.consume(TokenKind::End, "expected 'end' to close record")?;

        Ok(&*self.arena.alloc(RecordBody {
            array_element,
            interfaces: interfaces.into_bump_slice(),
            where_clause,
            entries: entries.into_bump_slice(),
            span: self.span_from(start),
        }))
    }

    /// Parse the list after `is`: an optional `{T}` extension, then names.
    fn parse_interface_list(
        &mut self,
        array_element: &mut Option<TypeExpr<'ast>>,
        interfaces: &mut BVec<'ast, NominalType<'ast>>,
    ) -> PResult<()> {
        if self.check(TokenKind::LeftBrace) {
            self.parse_array_extension(array_element, ParseErrorKind::InvalidInterfaceList)?;
            if self.eat(TokenKind::Comma).is_none() {
                return Ok(());
            }
        }

        loop {
            if !self.check(TokenKind::Name) {
                self.push_error(ParseErrorKind::InvalidInterfaceList, "expected interface name")?;
                return Ok(());
            }
            interfaces.push(self.parse_nominal_type()?);
            if self.eat(TokenKind::Comma).is_none() {
                return Ok(());
            }
        }
    }

    /// Parse a `{T}` that makes a record array-like.
    fn parse_array_extension(
        &mut self,
        array_element: &mut Option<TypeExpr<'ast>>,
        error_kind: ParseErrorKind,
    ) -> PResult<()> {
        let ty = self.parse_table_type()?;
        match ty {
            TypeExpr::Array(array) if array_element.is_none() => {
                *array_element = Some(array.element);
            }
            TypeExpr::Array(_) => {
                self.push_error_at(error_kind, ty.span(), "duplicate array type in record")?;
            }
            _ => {
                self.push_error_at(error_kind, ty.span(), "expected array type '{T}' in record")?;
            }
        }
        Ok(())
    }

    fn parse_record_entry(
        &mut self,
        array_element: &mut Option<TypeExpr<'ast>>,
    ) -> PResult<Option<RecordEntry<'ast>>> {
        let token = self.peek();

        if token.kind == TokenKind::LeftBrace {
            self.parse_array_extension(array_element, ParseErrorKind::InvalidType)?;
            return Ok(None);
        }

        // `type: string` and friends are fields, not nested declarations.
        let field_follows = self.peek_nth(1).kind == TokenKind::Colon;
        if !field_follows {
            if self.check_word("userdata") {
                self.advance();
                return Ok(Some(RecordEntry::Userdata(token.span)));
            }
            match token.kind {
                TokenKind::Type => return self.parse_record_type_alias(),
                TokenKind::Record | TokenKind::Interface | TokenKind::Enum => {
                    return self.parse_nested_declaration();
                }
                _ => {}
            }
        }

        let is_metamethod = !field_follows
            && self.check_word("metamethod")
            && (self.check_nth(1, TokenKind::Name) || self.peek_nth(1).kind == TokenKind::LeftBracket);
        if is_metamethod {
            self.advance();
        }

        let key_token = self.peek();
        let key = if self.eat(TokenKind::LeftBracket).is_some() {
            let Some(literal) = self.eat(TokenKind::String) else {
                self.push_error(ParseErrorKind::ExpectedToken, "expected string key in record field")?;
                return Ok(None);
            };
            self.consume(TokenKind::RightBracket, "expected ']' after field key")?;
            FieldKey::Literal(literal.lexeme, literal.span)
        } else if self.check(TokenKind::Name) {
            FieldKey::Name(Ident::from_token(self.advance()))
        } else {
            self.push_error(
                ParseErrorKind::UnexpectedToken,
                format!("unexpected {key_token} in record body"),
            )?;
            self.advance();
            return Ok(None);
        };

        if self
            .consume(TokenKind::Colon, "expected ':' after field name")?
            .is_none()
        {
            return Ok(None);
        }
        let ty = self.parse_type()?;

        Ok(Some(RecordEntry::Field(RecordField {
            key,
            ty,
            is_metamethod,
            span: self.span_from(token.span),
        })))
    }

    /// `type Name = T` inside a record body.
    fn parse_record_type_alias(&mut self) -> PResult<Option<RecordEntry<'ast>>> {
        let start = self.advance().span;
        let Some(name) = self.expect_name("expected type name")? else {
            return Ok(None);
        };
        if self
            .consume(TokenKind::Equal, "expected '=' after type name")?
            .is_none()
        {
            return Ok(None);
        }
        let ty = self.parse_alias_type()?;
        Ok(Some(RecordEntry::TypeAlias {
            name: Ident::from_token(name),
            ty,
            span: self.span_from(start),
        }))
    }

    /// Nested `record`, `interface` or `enum` inside a record body.
    fn parse_nested_declaration(&mut self) -> PResult<Option<RecordEntry<'ast>>> {
        let keyword = self.advance();
        let message = match keyword.kind {
            TokenKind::Enum => "expected enum name",
            TokenKind::Interface => "expected interface name",
            _ => "expected record name",
        };
        let name = self.expect_name(message)?.map(Ident::from_token);

        let entry = if keyword.kind == TokenKind::Enum {
            let body = self.parse_enum_body(keyword.span)?;
            name.map(|name| RecordEntry::Enum {
                name,
                body,
                span: body.span,
            })
        } else {
            let body = self.parse_record_body(keyword.span)?;
            name.map(|name| RecordEntry::Record {
                name,
                is_interface: keyword.kind == TokenKind::Interface,
                body,
                span: body.span,
            })
        };
        Ok(entry)
    }

    // ========================================================================
    // Enum bodies
    // ========================================================================

    /// Parse string members up to and including `end`.
    pub(super) fn parse_enum_body(&mut self, start: Span) -> PResult<&'ast EnumBody<'ast>> {
        let mut values = BVec::new_in(self.arena);

        while !self.check(TokenKind::End) && !self.is_eof() {
            match self.eat(TokenKind::String) {
                Some(literal) => values.push(EnumValue {
                    literal: literal.lexeme,
                    span: literal.span,
                }),
                None => {
                    self.push_error(ParseErrorKind::ExpectedToken, "expected string in enum")?;
                    self.advance();
                }
            }
            self.eat_any(&[TokenKind::Comma, TokenKind::Semicolon]);
        }
        self.consume(TokenKind::End, "expected 'end' to close enum")?;

        Ok(self.arena.alloc(EnumBody {
            values: values.into_bump_slice(),
            span: self.span_from(start),
        }))
    }
}
