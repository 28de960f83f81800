//! The goto-elimination structuring pass (§4.4): rewrite a flat,
//! line-numbered, `GOTO`-driven statement sequence into the nested
//! `If`/`Loop`/`Break`/`BreakIf` shape of [`crate::ir`].
//!
//! Every jump site is classified against the range of the block currently
//! being structured:
//!
//! - **C3** backward, unconditional, targets the current block's first
//!   statement: a `LOOP { ... }`.
//! - **C4** backward, conditional, targets the current block's first
//!   statement: a do-while loop, `LOOP { ...; BREAK IF NOT cond }`.
//! - **C2** forward, unconditional, paired with a preceding conditional
//!   skip: the `ELSE` half of an `IF`/`THEN`/`ELSE`.
//! - **C5** forward, conditional, target inside the current range: an
//!   `IF`/`THEN` with no `ELSE`.
//! - **C1** forward, conditional or unconditional, target outside the
//!   current range: an escape, rewritten as `BREAK`/`BREAK IF` when the
//!   target is exactly this range's exit, or as a synthetic escape flag
//!   threaded out through each enclosing level otherwise.
//!
//! Backward jumps are tried first, then forward-unconditional, then the
//! two forward-conditional cases, matching the priority above: a
//! statement is never misread as an escape before its loop-closing role
//! is considered.

use crate::error::{StructureError, StructureResult};
use crate::ir::{SBlock, SCondition, SExpr, SPrintItem, SStmt, SVar};
use tbc_par::ast::{Condition, Expression, LabelledGroup, PrintItem, Statement};
use tbc_util::{FxHashMap, FxHashSet};

/// A pending jump out of the range currently being structured. Threaded
/// back through the recursion until some enclosing range's exit matches
/// `target`, at which point it resolves into a plain `Break`/`BreakIf`.
#[derive(Clone)]
struct Escape {
    /// Absolute index (into the top-level group slice) the jump targets.
    target: usize,
    /// `None` for an unconditional jump, `Some(cond)` for the condition
    /// under which the escape fires.
    cond: Option<SCondition>,
}

pub struct Structurer<'a> {
    groups: &'a [LabelledGroup],
    label_index: FxHashMap<u32, usize>,
    /// Mints the id for each synthetic escape flag (`SVar::Flag`) a C1
    /// forward-conditional escape captures. Shared across the entry and
    /// every extracted procedure (they all write into the same `Vars`
    /// struct), so callers pass one generator in rather than each
    /// `Structurer` owning its own.
    flags: &'a tbc_util::DefIdGenerator,
}

impl<'a> Structurer<'a> {
    pub fn new(groups: &'a [LabelledGroup], flags: &'a tbc_util::DefIdGenerator) -> Self {
        let mut label_index = FxHashMap::default();
        for (i, g) in groups.iter().enumerate() {
            if let Some(n) = g.line_number {
                label_index.insert(n, i);
            }
        }
        Self { groups, label_index, flags }
    }

    fn index_of(&self, line: u32) -> usize {
        self.label_index[&line]
    }

    /// Structure the whole slice (the program entry, or a procedure body)
    /// into one block. Any escape reaching past the end of the slice is a
    /// genuine structuring failure: there is nowhere left to propagate it.
    pub fn structure_all(&self) -> StructureResult<SBlock> {
        let (block, escape) = self.structure_range(0, self.groups.len())?;
        if let Some(e) = escape {
            let line = self.groups[e.target.min(self.groups.len() - 1)].span.line;
            return Err(StructureError::Unstructurable {
                line: self.groups[0].span.line,
                target: line,
            });
        }
        Ok(block)
    }

    fn structure_range(&self, lo: usize, hi: usize) -> StructureResult<(SBlock, Option<Escape>)> {
        let mut out = SBlock::new();
        let mut i = lo;

        while i < hi {
            if let Some(close) = self.find_loop_close(lo, i, hi) {
                let (loop_stmt, escape) = self.structure_loop(i, close)?;
                out.push(loop_stmt);

                if let Some(e) = escape {
                    let (tail, tail_escape) = self.structure_range(close + 1, hi)?;
                    self.splice_guarded(&mut out, e.clone(), tail);
                    return Ok((out, merge_escape(Some(e), tail_escape)));
                }

                i = close + 1;
                continue;
            }

            let group = &self.groups[i];
            let stmt = &group.statements[0];

            match stmt {
                Statement::Goto(target_line) => {
                    let target = self.index_of(*target_line);
                    if target < hi && target > i {
                        // unpaired forward skip within this block: the
                        // statements it jumps over are unreachable.
                        i = target;
                        continue;
                    } else {
                        // Everything after an unconditional jump in this
                        // range is unreachable; nothing left to structure.
                        let e = Escape { target, cond: None };
                        return Ok((out, Some(e)));
                    }
                }
                Statement::If(cond, body) => {
                    let (combined_cond, inner) = self.flatten_if_chain(cond, body.as_ref());
                    if let Statement::Goto(target_line) = inner {
                        let target = self.index_of(*target_line);
                        if target > i && target < hi {
                            if let Some(else_end) = self.paired_else_end(target, hi) {
                                // C2/C5 combined: IF/THEN/ELSE.
                                let (then_block, then_escape) =
                                    self.structure_range(i + 1, target - 1)?;
                                let (else_block, else_escape) =
                                    self.structure_range(target, else_end)?;
                                out.push(SStmt::If {
                                    cond: combined_cond.clone().negate(),
                                    then_block,
                                    else_block: Some(else_block),
                                });
                                if let Some(e) = merge_escape(then_escape, else_escape) {
                                    let (tail, tail_escape) =
                                        self.structure_range(else_end, hi)?;
                                    self.splice_guarded(&mut out, e.clone(), tail);
                                    return Ok((out, merge_escape(Some(e), tail_escape)));
                                }
                                i = else_end;
                                continue;
                            } else {
                                // C5: IF/THEN with no ELSE.
                                let (then_block, then_escape) =
                                    self.structure_range(i + 1, target)?;
                                out.push(SStmt::If {
                                    cond: combined_cond.clone().negate(),
                                    then_block,
                                    else_block: None,
                                });
                                if let Some(e) = then_escape {
                                    let (tail, tail_escape) = self.structure_range(target, hi)?;
                                    self.splice_guarded(&mut out, e.clone(), tail);
                                    return Ok((out, merge_escape(Some(e), tail_escape)));
                                }
                                i = target;
                                continue;
                            }
                        } else {
                            // C1: conditional escape out of this range.
                            // Capture the guard into a synthetic flag at
                            // the jump site (`tk := c`) rather than
                            // threading `c` itself outward -- by the time
                            // this escape resolves into a `BreakIf` at an
                            // enclosing loop's exit, the variables `c`
                            // reads may have already been reassigned by
                            // the guarded tail below, so re-evaluating `c`
                            // there would test the wrong moment in time.
                            let flag = self.flags.next().0;
                            out.push(SStmt::SetFlag(flag, combined_cond));
                            let (tail, tail_escape) = self.structure_range(i + 1, hi)?;
                            let e = Escape {
                                target,
                                cond: Some(SCondition::Flag(flag)),
                            };
                            self.splice_guarded(&mut out, e.clone(), tail);
                            return Ok((out, merge_escape(Some(e), tail_escape)));
                        }
                    } else {
                        // No jump anywhere in the chain: a plain guarded
                        // statement, e.g. `IF a THEN IF b THEN PRINT X`.
                        let then_block = match inner {
                            Statement::Rem(_) => SBlock::new(),
                            other => vec![self.lower_plain(other)],
                        };
                        out.push(SStmt::If { cond: combined_cond, then_block, else_block: None });
                        i += 1;
                    }
                }
                Statement::Rem(_) => {
                    // Dropped: a REM carries no runtime effect.
                    i += 1;
                }
                other => {
                    out.push(self.lower_plain(other));
                    i += 1;
                }
            }
        }

        Ok((out, None))
    }

    /// Follows a chain of nested `If`s -- `IF a THEN IF b THEN ... THEN S`,
    /// the parser's representation of a multi-condition guard, since the
    /// grammar has no explicit `AND` -- down to the first non-`If`
    /// statement, conjoining every condition along the way. A single-level
    /// `If` just returns its own condition unchanged.
    fn flatten_if_chain<'b>(
        &self,
        cond: &Condition,
        body: &'b Statement,
    ) -> (SCondition, &'b Statement) {
        let mut conds = vec![lower_condition(cond)];
        let mut inner = body;
        while let Statement::If(next_cond, next_body) = inner {
            conds.push(lower_condition(next_cond));
            inner = next_body.as_ref();
        }
        let combined = if conds.len() == 1 {
            conds.remove(0)
        } else {
            SCondition::And(conds)
        };
        (combined, inner)
    }

    /// `target`'s preceding statement is an unconditional `GOTO` within
    /// range: the classic `IF cond THEN GOTO else; ...then...; GOTO end;
    /// else: ...else...; end:` shape. Returns the index just past the
    /// `ELSE` block when that shape is present.
    fn paired_else_end(&self, then_goto_target: usize, hi: usize) -> Option<usize> {
        if then_goto_target == 0 {
            return None;
        }
        let prev = then_goto_target - 1;
        if let Statement::Goto(end_line) = &self.groups[prev].statements[0] {
            let end = self.index_of(*end_line);
            if end > then_goto_target && end <= hi {
                return Some(end);
            }
        }
        None
    }

    /// Does a backward jump from within `(i, hi)` target exactly `i`? If
    /// several do, the loop body is claimed by the furthest one so that
    /// nested backward edges targeting the same head are absorbed.
    fn find_loop_close(&self, _lo: usize, i: usize, hi: usize) -> Option<usize> {
        let mut close = None;
        for (j, group) in self.groups.iter().enumerate().take(hi).skip(i + 1) {
            let target = match &group.statements[0] {
                Statement::Goto(line) => Some(self.index_of(*line)),
                Statement::If(cond, body) => {
                    match self.flatten_if_chain(cond, body.as_ref()).1 {
                        Statement::Goto(line) => Some(self.index_of(*line)),
                        _ => None,
                    }
                }
                _ => None,
            };
            if target == Some(i) {
                close = Some(j);
            }
        }
        close
    }

    fn structure_loop(
        &self,
        head: usize,
        close: usize,
    ) -> StructureResult<(SStmt, Option<Escape>)> {
        let closing = &self.groups[close].statements[0];
        match closing {
            Statement::Goto(_) => {
                // C3: backward unconditional -- the closing jump itself
                // carries no payload, just the repeat.
                let (mut body, escape) = self.structure_range(head, close)?;
                let remaining = self.resolve_loop_escape(&mut body, escape, close + 1);
                Ok((SStmt::Loop(body), remaining))
            }
            Statement::If(cond, body) => {
                let (combined_cond, inner) = self.flatten_if_chain(cond, body.as_ref());
                if !matches!(inner, Statement::Goto(_)) {
                    return Err(self.unstructurable(head, close));
                }
                // C4: backward conditional -- a do-while loop.
                let (mut block, escape) = self.structure_range(head, close)?;
                let remaining = self.resolve_loop_escape(&mut block, escape, close + 1);
                block.push(SStmt::BreakIf(combined_cond.negate()));
                Ok((SStmt::Loop(block), remaining))
            }
            _ => Err(self.unstructurable(head, close)),
        }
    }

    /// A jump escaping the loop body always also breaks the loop itself,
    /// whether or not its target is the loop's own natural exit
    /// (`loop_exit`). Push the matching `Break`/`BreakIf`, then report the
    /// escape back to the caller only if its target lies beyond this
    /// loop -- otherwise it is fully resolved here.
    fn resolve_loop_escape(
        &self,
        body: &mut SBlock,
        escape: Option<Escape>,
        loop_exit: usize,
    ) -> Option<Escape> {
        let escape = escape?;
        match &escape.cond {
            None => body.push(SStmt::Break),
            Some(cond) => body.push(SStmt::BreakIf(cond.clone())),
        }
        if escape.target == loop_exit {
            None
        } else {
            Some(escape)
        }
    }

    /// Wrap `tail` so it only runs when `escape` did not fire, and append
    /// it (or the guard) to `out`.
    fn splice_guarded(&self, out: &mut SBlock, escape: Escape, tail: SBlock) {
        match escape.cond {
            None => {
                // Unconditional escape: everything after it in this block
                // (and the tail we just built) is unreachable.
                let _ = tail;
            }
            Some(cond) => {
                if !tail.is_empty() {
                    out.push(SStmt::If {
                        cond: cond.negate(),
                        then_block: tail,
                        else_block: None,
                    });
                }
            }
        }
    }

    fn lower_plain(&self, stmt: &Statement) -> SStmt {
        match stmt {
            Statement::Print(items) => SStmt::Print(items.iter().map(lower_print_item).collect()),
            Statement::Input(vars) => SStmt::Input(vars.clone()),
            Statement::Let(var, expr) => SStmt::Let(*var, lower_expr(expr)),
            Statement::Gosub(target) => SStmt::Call(procedure_name(*target)),
            Statement::Return => SStmt::Return,
            Statement::End => SStmt::End,
            Statement::Goto(_) | Statement::If(_, _) | Statement::Rem(_) => {
                unreachable!("handled by structure_range directly")
            }
        }
    }

    fn unstructurable(&self, from: usize, at: usize) -> StructureError {
        StructureError::Unstructurable {
            line: self.groups[from].span.line,
            target: self.groups[at].span.line,
        }
    }
}

fn merge_escape(a: Option<Escape>, b: Option<Escape>) -> Option<Escape> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if a.target <= b.target { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn lower_condition(cond: &Condition) -> SCondition {
    SCondition::Compare(lower_expr(&cond.lhs), cond.op, lower_expr(&cond.rhs))
}

fn lower_expr(expr: &Expression) -> SExpr {
    match expr {
        Expression::Number(n) => SExpr::Num(*n),
        Expression::Var(v) => SExpr::Var(*v),
        Expression::Binary(lhs, op, rhs) => {
            SExpr::Bin(Box::new(lower_expr(lhs)), *op, Box::new(lower_expr(rhs)))
        }
    }
}

fn lower_print_item(item: &PrintItem) -> SPrintItem {
    match item {
        PrintItem::Str(s) => SPrintItem::Str(s.clone()),
        PrintItem::Expr(e) => SPrintItem::Expr(lower_expr(e)),
    }
}

/// The name a `GOSUB target`'s extracted procedure is given in the
/// structured IR, keyed by the line number it starts at.
pub fn procedure_name(target: u32) -> String {
    format!("f_{}", target)
}

/// Collect every variable assigned or read anywhere in the structured
/// program, in first-appearance order, plus every synthetic flag minted.
pub fn collect_variables(entry: &SBlock, procedures: &[crate::ir::Procedure]) -> Vec<SVar> {
    let mut seen = FxHashSet::default();
    let mut order = Vec::new();
    for block in std::iter::once(entry).chain(procedures.iter().map(|p| &p.body)) {
        walk_block(block, &mut seen, &mut order);
    }
    order
}

fn walk_block(block: &SBlock, seen: &mut FxHashSet<SVar>, order: &mut Vec<SVar>) {
    for stmt in block {
        walk_stmt(stmt, seen, order);
    }
}

fn walk_stmt(stmt: &SStmt, seen: &mut FxHashSet<SVar>, order: &mut Vec<SVar>) {
    let mut note = |v: SVar, seen: &mut FxHashSet<SVar>, order: &mut Vec<SVar>| {
        if seen.insert(v) {
            order.push(v);
        }
    };
    match stmt {
        SStmt::Print(items) => {
            for item in items {
                if let SPrintItem::Expr(e) = item {
                    walk_expr(e, &mut note, seen, order);
                }
            }
        }
        SStmt::Input(vars) => {
            for v in vars {
                note(SVar::User(*v), seen, order);
            }
        }
        SStmt::Let(v, e) => {
            note(SVar::User(*v), seen, order);
            walk_expr(e, &mut note, seen, order);
        }
        SStmt::SetFlag(id, cond) => {
            note(SVar::Flag(*id), seen, order);
            walk_cond(cond, &mut note, seen, order);
        }
        SStmt::If { cond, then_block, else_block } => {
            walk_cond(cond, &mut note, seen, order);
            walk_block(then_block, seen, order);
            if let Some(e) = else_block {
                walk_block(e, seen, order);
            }
        }
        SStmt::Loop(body) => walk_block(body, seen, order),
        SStmt::BreakIf(cond) => walk_cond(cond, &mut note, seen, order),
        SStmt::Break | SStmt::Call(_) | SStmt::Return | SStmt::End => {}
    }
}

fn walk_expr(
    expr: &SExpr,
    note: &mut impl FnMut(SVar, &mut FxHashSet<SVar>, &mut Vec<SVar>),
    seen: &mut FxHashSet<SVar>,
    order: &mut Vec<SVar>,
) {
    match expr {
        SExpr::Num(_) => {}
        SExpr::Var(v) => note(SVar::User(*v), seen, order),
        SExpr::Bin(lhs, _, rhs) => {
            walk_expr(lhs, note, seen, order);
            walk_expr(rhs, note, seen, order);
        }
    }
}

fn walk_cond(
    cond: &SCondition,
    note: &mut impl FnMut(SVar, &mut FxHashSet<SVar>, &mut Vec<SVar>),
    seen: &mut FxHashSet<SVar>,
    order: &mut Vec<SVar>,
) {
    match cond {
        SCondition::Compare(lhs, _, rhs) => {
            walk_expr(lhs, note, seen, order);
            walk_expr(rhs, note, seen, order);
        }
        SCondition::And(parts) => {
            for p in parts {
                walk_cond(p, note, seen, order);
            }
        }
        SCondition::Flag(id) => note(SVar::Flag(*id), seen, order),
        SCondition::Not(inner) => walk_cond(inner, note, seen, order),
    }
}
