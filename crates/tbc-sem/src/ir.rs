//! The structured IR: the sole input to the emitter. No `Goto` node
//! exists anywhere in this tree -- every jump the source program made has
//! already been rewritten into `If`/`Loop`/`Break`/`BreakIf`/`Call` by the
//! structuring pass.

use tbc_par::ast::{BinOp, RelOp};

/// A variable in the structured program: either a user variable (a single
/// uppercase letter) or a synthetic escape flag minted by the structuring
/// pass (`t1`, `t2`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SVar {
    User(char),
    Flag(u32),
}

/// An arithmetic expression. Unchanged in shape from the parsed
/// [`tbc_par::ast::Expression`] -- structuring never rewrites arithmetic,
/// only control flow.
#[derive(Clone, Debug, PartialEq)]
pub enum SExpr {
    Num(i64),
    Var(char),
    Bin(Box<SExpr>, BinOp, Box<SExpr>),
}

/// A boolean condition. `Flag` reads a synthetic escape flag; `Not` exists
/// only to negate a `Flag` read or an `And` of comparisons, since
/// `RelOp` already has no direct complement-free representation (e.g. the
/// complement of `<` is `>=`, which `negate_relop` produces directly
/// instead of wrapping in `Not`).
#[derive(Clone, Debug, PartialEq)]
pub enum SCondition {
    Compare(SExpr, RelOp, SExpr),
    And(Vec<SCondition>),
    Flag(u32),
    Not(Box<SCondition>),
}

impl SCondition {
    /// Negate a condition, pushing the negation down to relational
    /// operators (so `!(<)` becomes `>=`, not `Not(Compare(<))`) and
    /// distributing over conjunctions via De Morgan. `Flag` and nested
    /// `Not` are the only cases that actually need the `Not` wrapper.
    pub fn negate(self) -> SCondition {
        match self {
            SCondition::Compare(lhs, op, rhs) => SCondition::Compare(lhs, negate_relop(op), rhs),
            SCondition::And(parts) => {
                // De Morgan's law would turn this into a disjunction, which
                // the structured IR has no node for. A chained IF rewritten
                // as a C1/C5 escape does negate its conjunction (to guard
                // the fallthrough of the skipped block), so this does reach
                // the emitter; wrapping in `Not` is simplest there.
                SCondition::Not(Box::new(SCondition::And(parts)))
            }
            SCondition::Flag(id) => SCondition::Not(Box::new(SCondition::Flag(id))),
            SCondition::Not(inner) => *inner,
        }
    }
}

/// Negate a relational operator: `<` becomes `>=`, etc.
pub fn negate_relop(op: RelOp) -> RelOp {
    match op {
        RelOp::Lt => RelOp::GtEq,
        RelOp::GtEq => RelOp::Lt,
        RelOp::Gt => RelOp::LtEq,
        RelOp::LtEq => RelOp::Gt,
        RelOp::Eq => RelOp::NotEq,
        RelOp::NotEq => RelOp::Eq,
    }
}

/// A block of structured statements.
pub type SBlock = Vec<SStmt>;

/// A structured statement. No variant here can express a raw jump.
#[derive(Clone, Debug, PartialEq)]
pub enum SStmt {
    Print(Vec<SPrintItem>),
    Input(Vec<char>),
    Let(char, SExpr),
    /// Assigns a synthetic flag its guarding condition, evaluated once at
    /// the jump site that used to read `IF c THEN GOTO t`.
    SetFlag(u32, SCondition),
    If {
        cond: SCondition,
        then_block: SBlock,
        else_block: Option<SBlock>,
    },
    Loop(SBlock),
    Break,
    BreakIf(SCondition),
    Call(String),
    Return,
    End,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SPrintItem {
    Str(String),
    Expr(SExpr),
}

/// A named procedure extracted from a `GOSUB` target.
#[derive(Clone, Debug, PartialEq)]
pub struct Procedure {
    pub name: String,
    pub body: SBlock,
}

/// The fully structured program: its entry block, its extracted
/// procedures, and every variable (user or synthetic) written anywhere in
/// the output.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredProgram {
    pub entry: SBlock,
    pub procedures: Vec<Procedure>,
    pub variables: Vec<SVar>,
}
