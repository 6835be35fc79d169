//! Syntax tree for the typed scripting subset
//!
//! The tree is produced by an external front end and handed to the compiler
//! already validated; the compiler reads it and never mutates it. Node kinds
//! form a closed tagged union so every consumer matches exhaustively and a
//! new kind is a compile-time error rather than a runtime fallthrough.
//!
//! All types derive serde so front ends can deliver trees as JSON.

use kr_span::Pos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One compilation unit: the ordered top-level statements of a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Top-level statements in source order
    pub body: Vec<Stmt>,
}

/// A function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Source name of the function
    pub name: String,
    /// Parameters in declaration order
    pub params: Vec<Param>,
    /// Return type annotation; absent means the function returns nothing
    pub returns: Option<String>,
    /// Body statements
    pub body: Vec<Stmt>,
    /// Decorator names, outermost first
    pub decorators: Vec<String>,
    pub pos: Pos,
}

/// A single function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    /// Type annotation; the compiler rejects unannotated parameters
    pub annotation: Option<String>,
    pub pos: Pos,
}

/// The target of a plain assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignTarget {
    /// `x = ...`
    Name { name: String, pos: Pos },
    /// `a.b = ...` (unsupported, kept representable so it can be rejected)
    Attribute { path: Vec<String>, pos: Pos },
}

/// Statement node kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `def name(params) -> ret: body`
    FunctionDef(FunctionDef),
    /// `target: annotation = value` (value may be absent)
    AnnAssign {
        target: String,
        annotation: String,
        value: Option<Expr>,
        pos: Pos,
    },
    /// `targets = value`
    Assign {
        targets: Vec<AssignTarget>,
        value: Expr,
        pos: Pos,
    },
    /// `if test: body else: orelse`
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        pos: Pos,
    },
    /// `while test: body else: orelse`
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        pos: Pos,
    },
    /// `return value`
    Return { value: Option<Expr>, pos: Pos },
    /// An expression evaluated for its effect
    Expr { value: Expr, pos: Pos },
    /// `import names`
    Import { names: Vec<String>, pos: Pos },
    /// `pass`
    Pass { pos: Pos },
}

impl Stmt {
    /// Source position of the statement
    pub fn pos(&self) -> Pos {
        match self {
            Self::FunctionDef(def) => def.pos,
            Self::AnnAssign { pos, .. }
            | Self::Assign { pos, .. }
            | Self::If { pos, .. }
            | Self::While { pos, .. }
            | Self::Return { pos, .. }
            | Self::Expr { pos, .. }
            | Self::Import { pos, .. }
            | Self::Pass { pos } => *pos,
        }
    }
}

/// Expression node kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    Int { value: i32, pos: Pos },
    /// String literal
    Str { value: String, pos: Pos },
    /// Boolean literal
    Bool { value: bool, pos: Pos },
    /// Bare name reference
    Name { name: String, pos: Pos },
    /// Dotted attribute access, e.g. `module.symbol`
    Attribute {
        value: Box<Expr>,
        attr: String,
        pos: Pos,
    },
    /// Call with positional arguments
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        pos: Pos,
    },
    /// Binary arithmetic
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        pos: Pos,
    },
    /// Comparison chain: `left ops[0] comparators[0] ops[1] comparators[1] ...`
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
        pos: Pos,
    },
    /// Short-circuit logical chain over two or more operands
    Logical {
        op: LogicalOp,
        values: Vec<Expr>,
        pos: Pos,
    },
    /// Unary operator application
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        pos: Pos,
    },
}

impl Expr {
    /// Source position of the expression
    pub fn pos(&self) -> Pos {
        match self {
            Self::Int { pos, .. }
            | Self::Str { pos, .. }
            | Self::Bool { pos, .. }
            | Self::Name { pos, .. }
            | Self::Attribute { pos, .. }
            | Self::Call { pos, .. }
            | Self::Binary { pos, .. }
            | Self::Compare { pos, .. }
            | Self::Logical { pos, .. }
            | Self::Unary { pos, .. } => *pos,
        }
    }
}

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        };
        write!(formatter, "{token}")
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtE => "<=",
            Self::Gt => ">",
            Self::GtE => ">=",
        };
        write!(formatter, "{token}")
    }
}

/// Short-circuit logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::And => "&&",
            Self::Or => "||",
        };
        write!(formatter, "{token}")
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical negation (`not`)
    Not,
}
