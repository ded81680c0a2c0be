use crate::string_interning::{StringId, StringTable};
use crate::tokens::tokens::SourceLocation;
use std::hash::Hasher;

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub source: SourceLocation,
}

// Identity is structural; source locations are carried for
// diagnostics only
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Expr {
    pub fn new(kind: ExprKind, source: SourceLocation) -> Self {
        Self { kind, source }
    }

    /// True for the literal `true` token, which loop lowering treats
    /// specially (no test block is emitted).
    pub fn is_literal_true(&self) -> bool {
        matches!(self.kind, ExprKind::BoolLiteral(true))
    }

    /// Feed this expression's structure into a hasher. Used by the
    /// structural hash of AST types that still carry length expressions.
    pub fn structural_hash<H: Hasher>(&self, state: &mut H) {
        match &self.kind {
            ExprKind::IntLiteral(value) => {
                state.write_u8(0);
                state.write_i64(*value);
            }
            ExprKind::FloatLiteral(value) => {
                state.write_u8(1);
                state.write_u64(value.to_bits());
            }
            ExprKind::BoolLiteral(value) => {
                state.write_u8(2);
                state.write_u8(*value as u8);
            }
            ExprKind::StrLiteral(value) | ExprKind::CStrLiteral(value) => {
                state.write_u8(3);
                state.write(value.as_bytes());
            }
            ExprKind::NullLiteral => state.write_u8(4),
            ExprKind::Variable(name) => {
                state.write_u8(5);
                state.write_u32(name.as_u32());
            }
            ExprKind::Polycount(name) => {
                state.write_u8(6);
                state.write_u32(name.as_u32());
            }
            ExprKind::Call { name, args } => {
                state.write_u8(7);
                state.write_u32(name.as_u32());
                for arg in args {
                    arg.structural_hash(state);
                }
            }
            ExprKind::Member { value, field } => {
                state.write_u8(8);
                value.structural_hash(state);
                state.write_u32(field.as_u32());
            }
            ExprKind::AddressOf(value) => {
                state.write_u8(9);
                value.structural_hash(state);
            }
            ExprKind::Dereference(value) => {
                state.write_u8(10);
                value.structural_hash(state);
            }
            ExprKind::Unary { op, value } => {
                state.write_u8(11);
                state.write_u8(*op as u8);
                value.structural_hash(state);
            }
            ExprKind::Binary { op, left, right } => {
                state.write_u8(12);
                state.write_u8(*op as u8);
                left.structural_hash(state);
                right.structural_hash(state);
            }
        }
    }

    /// Print the expression back out as parseable source text.
    pub fn to_source(&self, string_table: &StringTable) -> String {
        match &self.kind {
            ExprKind::IntLiteral(value) => value.to_string(),
            ExprKind::FloatLiteral(value) => {
                // Keep a trailing ".0" so the round trip stays a float
                let mut printed = value.to_string();
                if !printed.contains('.') && !printed.contains('e') {
                    printed.push_str(".0");
                }
                printed
            }
            ExprKind::BoolLiteral(true) => String::from("true"),
            ExprKind::BoolLiteral(false) => String::from("false"),
            ExprKind::StrLiteral(value) => format!("\"{value}\""),
            ExprKind::CStrLiteral(value) => format!("'{value}'"),
            ExprKind::NullLiteral => String::from("null"),
            ExprKind::Variable(name) => string_table.resolve(*name).to_string(),
            ExprKind::Polycount(name) => format!("$#{}", string_table.resolve(*name)),
            ExprKind::Call { name, args } => {
                let printed_args: Vec<String> =
                    args.iter().map(|arg| arg.to_source(string_table)).collect();
                format!("{}({})", string_table.resolve(*name), printed_args.join(", "))
            }
            ExprKind::Member { value, field } => format!(
                "{}.{}",
                value.to_source(string_table),
                string_table.resolve(*field)
            ),
            ExprKind::AddressOf(value) => format!("&{}", value.to_source(string_table)),
            ExprKind::Dereference(value) => format!("*{}", value.to_source(string_table)),
            ExprKind::Unary { op, value } => {
                format!("{}{}", op.symbol(), value.to_source(string_table))
            }
            ExprKind::Binary { op, left, right } => format!(
                "({} {} {})",
                left.to_source(string_table),
                op.symbol(),
                right.to_source(string_table)
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    BoolLiteral(bool),
    StrLiteral(Box<str>),
    CStrLiteral(Box<str>),
    NullLiteral,

    Variable(StringId),

    /// A `$#N` count variable, only valid inside type shapes
    Polycount(StringId),

    Call {
        name: StringId,
        args: Vec<Expr>,
    },
    Member {
        value: Box<Expr>,
        field: StringId,
    },
    AddressOf(Box<Expr>),
    Dereference(Box<Expr>),
    Unary {
        op: UnaryOp,
        value: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum UnaryOp {
    Negate,
    Not,
    BitComplement,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitComplement => "~",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessThanOrEq,
    GreaterThanOrEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    BitLShift,
    BitRShift,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulus => "%",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessThanOrEq => "<=",
            BinaryOp::GreaterThanOrEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitLShift => "<<",
            BinaryOp::BitRShift => ">>",
        }
    }

    /// Binding power for precedence climbing; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Equals | BinaryOp::NotEquals => 3,
            BinaryOp::LessThan
            | BinaryOp::GreaterThan
            | BinaryOp::LessThanOrEq
            | BinaryOp::GreaterThanOrEq => 4,
            BinaryOp::BitOr => 5,
            BinaryOp::BitXor => 6,
            BinaryOp::BitAnd => 7,
            BinaryOp::BitLShift | BinaryOp::BitRShift => 8,
            BinaryOp::Add | BinaryOp::Subtract => 9,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulus => 10,
        }
    }
}
