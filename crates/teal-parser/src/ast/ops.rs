//! Operators and their precedence.
//!
//! Precedence levels, loosest first:
//!
//! | level | operators                    | assoc |
//! |-------|------------------------------|-------|
//! | 1     | `or`                         | left  |
//! | 2     | `and`                        | left  |
//! | 3     | `is`                         | left  |
//! | 4     | `<` `>` `<=` `>=` `~=` `==`  | left  |
//! | 5     | `\|`                         | left  |
//! | 6     | `~`                          | left  |
//! | 7     | `&`                          | left  |
//! | 8     | `<<` `>>`                    | left  |
//! | 9     | `..`                         | right |
//! | 10    | `+` `-`                      | left  |
//! | 11    | `*` `/` `//` `%`             | left  |
//! | 12    | unary `not` `#` `-` `~`      |       |
//! | 13    | `^`                          | right |
//! | 14    | `as`                         | left  |

use std::fmt;

use crate::lexer::TokenKind;

/// Binding level of prefix unary operators.
pub const UNARY_PRECEDENCE: u8 = 12;

/// Lowest level accepted by a full expression.
pub const MIN_PRECEDENCE: u8 = 1;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    BitOr,
    BitXor,
    BitAnd,
    ShiftLeft,
    ShiftRight,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn precedence(self) -> u8 {
        use BinaryOp::*;
        match self {
            Or => 1,
            And => 2,
            Less | LessEqual | Greater | GreaterEqual | Equal | NotEqual => 4,
            BitOr => 5,
            BitXor => 6,
            BitAnd => 7,
            ShiftLeft | ShiftRight => 8,
            Concat => 9,
            Add | Sub => 10,
            Mul | Div | FloorDiv | Mod => 11,
            Pow => 13,
        }
    }

    /// `..` and `^` group to the right.
    pub fn is_right_associative(self) -> bool {
        matches!(self, BinaryOp::Concat | BinaryOp::Pow)
    }

    /// Minimum precedence for the right-hand operand.
    pub fn right_precedence(self) -> u8 {
        if self.is_right_associative() {
            self.precedence()
        } else {
            self.precedence() + 1
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match kind {
            Or => BinaryOp::Or,
            And => BinaryOp::And,
            Less => BinaryOp::Less,
            LessEqual => BinaryOp::LessEqual,
            Greater => BinaryOp::Greater,
            GreaterEqual => BinaryOp::GreaterEqual,
            EqualEqual => BinaryOp::Equal,
            NotEqual => BinaryOp::NotEqual,
            Pipe => BinaryOp::BitOr,
            Tilde => BinaryOp::BitXor,
            Amp => BinaryOp::BitAnd,
            LessLess => BinaryOp::ShiftLeft,
            GreaterGreater => BinaryOp::ShiftRight,
            DotDot => BinaryOp::Concat,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            SlashSlash => BinaryOp::FloorDiv,
            Percent => BinaryOp::Mod,
            Caret => BinaryOp::Pow,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Or => "or",
            And => "and",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "~=",
            BitOr => "|",
            BitXor => "~",
            BitAnd => "&",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            Concat => "..",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            FloorDiv => "//",
            Mod => "%",
            Pow => "^",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `not`
    Not,
    /// `-`
    Neg,
    /// `#`
    Len,
    /// `~`
    BitNot,
}

impl UnaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Hash => Some(UnaryOp::Len),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Neg => "-",
            UnaryOp::Len => "#",
            UnaryOp::BitNot => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postfix operators that take a type instead of an expression operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeOp {
    /// `expr as T`
    Cast,
    /// `expr is T`
    Is,
}

impl TypeOp {
    pub fn precedence(self) -> u8 {
        match self {
            TypeOp::Is => 3,
            TypeOp::Cast => 14,
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::As => Some(TypeOp::Cast),
            TokenKind::Is => Some(TypeOp::Is),
            _ => None,
        }
    }
}
