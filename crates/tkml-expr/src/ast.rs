//! Abstract Syntax Tree for TKML expressions.
//!
//! These are the nodes produced from the text between `{` and `}` in an
//! attribute value or element body. The grammar is closed: literals, names,
//! operators, member/index access and calls to host functions.

/// A position in expression text, in characters, relative to the expression
/// string rather than the surrounding markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A complete expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expression {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `null`
    Null,

    /// `true`, `false`
    Bool(bool),

    /// Integer literal: `42`
    Int(i64),

    /// Decimal literal: `0.3048`
    Float(f64),

    /// String literal: `"feet"`, `'W E'`
    Str(String),

    /// Name looked up in the scope: `meters`
    Identifier(String),

    /// List literal: `[1, 2, 3]`
    List(Vec<Expression>),

    /// Map literal: `{ padx: 5, "pady": 5 }`
    Map(Vec<(String, Expression)>),

    /// Unary operation: `!done`, `-offset`
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    /// Binary operation: `var + 1`, `count > 0`
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
    },

    /// `cond ? a : b`
    Ternary {
        condition: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },

    /// Named member access: `size.width`
    Member {
        object: Box<Expression>,
        property: String,
    },

    /// Computed access: `rows[0]`, `opts["sticky"]`
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
    },

    /// Call of a host function: `convert(feet)`
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Lte => "<=",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}
