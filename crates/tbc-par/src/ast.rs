//! The numbered AST: the program as parsed, before control-flow analysis
//! has resolved any jump target or extracted any procedure.

use tbc_util::Span;

/// A relational operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelOp {
    Lt,
    Gt,
    Eq,
    LtEq,
    GtEq,
    NotEq,
}

/// An arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// An arithmetic expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Number(i64),
    Var(char),
    Binary(Box<Expression>, BinOp, Box<Expression>),
}

/// A single relational comparison. `IF a THEN IF b THEN ...` is kept as
/// nested `If` statements rather than flattened here -- the structuring
/// pass in `tbc-sem` is the one place that reasons about the conjunction.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub lhs: Expression,
    pub op: RelOp,
    pub rhs: Expression,
}

/// One item in a `PRINT` list.
#[derive(Clone, Debug, PartialEq)]
pub enum PrintItem {
    Str(String),
    Expr(Expression),
}

/// A statement in the numbered AST, as produced directly by the parser.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Print(Vec<PrintItem>),
    Input(Vec<char>),
    Let(char, Expression),
    If(Condition, Box<Statement>),
    Goto(u32),
    Gosub(u32),
    Return,
    End,
    Rem(String),
}

/// A line number plus the (non-empty) statements that share it. The
/// grammar only ever produces a single statement per line, but the group
/// is kept as a `Vec` to match the data model directly and to leave room
/// for a line joining multiple statements without reshaping every pass
/// that walks a `Program`.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelledGroup {
    pub line_number: Option<u32>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// A full program: an ordered sequence of labelled groups.
pub type Program = Vec<LabelledGroup>;
