//! Type annotation AST nodes.
//!
//! Types form their own closed catalogue, separate from expressions:
//! primitive names, dotted nominal references, table shorthands, function
//! types, unions, and inline record/enum bodies.

use std::fmt;

use teal_core::Span;

use crate::ast::Ident;
use crate::ast::expr::Expr;

/// A type annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    /// `string`, `number`, `nil`, ...
    Basic(PrimitiveType, Span),
    /// `Point`, `io.File`
    Nominal(NominalType<'ast>),
    /// `{T}`
    Array(&'ast ArrayType<'ast>),
    /// `{K : V}`
    Map(&'ast MapType<'ast>),
    /// `{T1, T2}`
    Tuple(&'ast TupleType<'ast>),
    /// `function(A): R`
    Function(&'ast FunctionType<'ast>),
    /// `A | B`
    Union(&'ast UnionType<'ast>),
    /// `record ... end` on the right of a type alias
    Record(&'ast RecordBody<'ast>),
    /// `enum ... end` on the right of a type alias
    Enum(&'ast EnumBody<'ast>),
    /// Placeholder for a type that failed to parse.
    Unknown(Span),
}

impl<'ast> TypeExpr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Basic(_, span) => *span,
            TypeExpr::Nominal(t) => t.span,
            TypeExpr::Array(t) => t.span,
            TypeExpr::Map(t) => t.span,
            TypeExpr::Tuple(t) => t.span,
            TypeExpr::Function(t) => t.span,
            TypeExpr::Union(t) => t.span,
            TypeExpr::Record(t) => t.span,
            TypeExpr::Enum(t) => t.span,
            TypeExpr::Unknown(span) => *span,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeExpr::Unknown(_))
    }
}

/// Built-in type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
    Nil,
    Any,
    Thread,
}

impl PrimitiveType {
    /// Recognize a built-in type name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "string" => PrimitiveType::String,
            "number" => PrimitiveType::Number,
            "integer" => PrimitiveType::Integer,
            "boolean" => PrimitiveType::Boolean,
            "nil" => PrimitiveType::Nil,
            "any" => PrimitiveType::Any,
            "thread" => PrimitiveType::Thread,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Number => "number",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Nil => "nil",
            PrimitiveType::Any => "any",
            PrimitiveType::Thread => "thread",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type referenced by (possibly dotted) name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NominalType<'ast> {
    /// Name segments; never empty.
    pub path: &'ast [Ident<'ast>],
    pub span: Span,
}

impl<'ast> NominalType<'ast> {
    /// The final segment.
    pub fn name(&self) -> Option<Ident<'ast>> {
        self.path.last().copied()
    }
}

impl fmt::Display for NominalType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayType<'ast> {
    pub element: TypeExpr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapType<'ast> {
    pub key: TypeExpr<'ast>,
    pub value: TypeExpr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TupleType<'ast> {
    /// Two or more element types.
    pub elements: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnionType<'ast> {
    /// Two or more alternatives, in source order.
    pub options: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

/// `function(params): returns`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionType<'ast> {
    pub params: &'ast [FunctionTypeParam<'ast>],
    pub returns: Option<ReturnTypes<'ast>>,
    pub span: Span,
}

/// A parameter in a function type; the name is optional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionTypeParam<'ast> {
    pub name: Option<Ident<'ast>>,
    pub ty: TypeExpr<'ast>,
    pub optional: bool,
    pub variadic: bool,
}

/// A return type list, `R1, R2` or `R...`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnTypes<'ast> {
    pub types: &'ast [TypeExpr<'ast>],
    /// The last type repeats (`T...`).
    pub variadic: bool,
    pub span: Span,
}

/// Body of a record or interface, between the header and `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordBody<'ast> {
    /// Structural array extension, `is {T}` or a leading `{T}` entry.
    pub array_element: Option<TypeExpr<'ast>>,
    /// Interfaces named after `is`.
    pub interfaces: &'ast [NominalType<'ast>],
    /// `where` predicate.
    pub where_clause: Option<&'ast Expr<'ast>>,
    pub entries: &'ast [RecordEntry<'ast>],
    pub span: Span,
}

impl<'ast> RecordBody<'ast> {
    pub fn fields(&self) -> impl Iterator<Item = &RecordField<'ast>> {
        self.entries.iter().filter_map(|entry| match entry {
            RecordEntry::Field(field) => Some(field),
            _ => None,
        })
    }

    pub fn is_userdata(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, RecordEntry::Userdata(_)))
    }
}

/// A member of a record or interface body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordEntry<'ast> {
    /// `userdata`
    Userdata(Span),
    /// `name: T`, `["key"]: T` or `metamethod name: T`
    Field(RecordField<'ast>),
    /// `type Name = T`
    TypeAlias {
        name: Ident<'ast>,
        ty: TypeExpr<'ast>,
        span: Span,
    },
    /// Nested `record Name ... end` or `interface Name ... end`
    Record {
        name: Ident<'ast>,
        is_interface: bool,
        body: &'ast RecordBody<'ast>,
        span: Span,
    },
    /// Nested `enum Name ... end`
    Enum {
        name: Ident<'ast>,
        body: &'ast EnumBody<'ast>,
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordField<'ast> {
    pub key: FieldKey<'ast>,
    pub ty: TypeExpr<'ast>,
    pub is_metamethod: bool,
    pub span: Span,
}

/// How a record field is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey<'ast> {
    Name(Ident<'ast>),
    /// `["raw key"]`, raw string lexeme and its span.
    Literal(&'ast str, Span),
}

impl FieldKey<'_> {
    pub fn span(&self) -> Span {
        match self {
            FieldKey::Name(ident) => ident.span,
            FieldKey::Literal(_, span) => *span,
        }
    }
}

/// Body of an enum: its string members.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumBody<'ast> {
    pub values: &'ast [EnumValue<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue<'ast> {
    /// Raw string lexeme, quotes included.
    pub literal: &'ast str,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_names() {
        assert_eq!(PrimitiveType::from_name("integer"), Some(PrimitiveType::Integer));
        assert_eq!(PrimitiveType::from_name("thread"), Some(PrimitiveType::Thread));
        assert_eq!(PrimitiveType::from_name("Point"), None);
        assert_eq!(PrimitiveType::Boolean.to_string(), "boolean");
    }

    #[test]
    fn nominal_display() {
        let path = [
            Ident::new("io", Span::new(1, 1, 2)),
            Ident::new("File", Span::new(1, 4, 4)),
        ];
        let nominal = NominalType {
            path: &path,
            span: Span::new(1, 1, 7),
        };
        assert_eq!(nominal.to_string(), "io.File");
        assert_eq!(nominal.name().map(|i| i.name), Some("File"));
    }

    #[test]
    fn record_body_queries() {
        let entries = [
            RecordEntry::Userdata(Span::new(2, 4, 8)),
            RecordEntry::Field(RecordField {
                key: FieldKey::Name(Ident::new("x", Span::new(3, 4, 1))),
                ty: TypeExpr::Basic(PrimitiveType::Number, Span::new(3, 7, 6)),
                is_metamethod: false,
                span: Span::new(3, 4, 9),
            }),
        ];
        let body = RecordBody {
            array_element: None,
            interfaces: &[],
            where_clause: None,
            entries: &entries,
            span: Span::new(1, 1, 6),
        };
        assert!(body.is_userdata());
        assert_eq!(body.fields().count(), 1);
    }
}
