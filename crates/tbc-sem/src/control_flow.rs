//! Control-flow analysis (§4.3): build the label/gosub tables, resolve
//! every jump target, and extract `GOSUB` targets into standalone
//! procedures before the structuring pass ever sees them.

use crate::error::{ResolveError, ResolveResult};
use tbc_par::ast::{LabelledGroup, Program, Statement};
use tbc_util::{FxHashMap, FxHashSet};

/// `labelIndex` / `gosubTargets` from §4.3.
pub struct ControlFlowTables {
    /// Line number -> position of its `LabelledGroup` in the top-level
    /// sequence.
    pub label_index: FxHashMap<u32, usize>,
    /// Every line number that appears as a `GOSUB` argument anywhere in
    /// the program.
    pub gosub_targets: FxHashSet<u32>,
}

pub fn build_tables(program: &Program) -> ControlFlowTables {
    let mut label_index = FxHashMap::default();
    for (i, group) in program.iter().enumerate() {
        if let Some(n) = group.line_number {
            label_index.insert(n, i);
        }
    }

    let mut gosub_targets = FxHashSet::default();
    for group in program {
        for_each_statement(group, &mut |stmt| {
            if let Statement::Gosub(target) = stmt {
                gosub_targets.insert(*target);
            }
        });
    }

    ControlFlowTables {
        label_index,
        gosub_targets,
    }
}

/// Walk a statement and every statement nested under it (the `If` chain
/// produced by `IF a THEN IF b THEN ...`), invoking `f` on each.
pub fn for_each_statement(group: &LabelledGroup, f: &mut impl FnMut(&Statement)) {
    for stmt in &group.statements {
        walk_statement(stmt, f);
    }
}

fn walk_statement(stmt: &Statement, f: &mut impl FnMut(&Statement)) {
    f(stmt);
    if let Statement::If(_, body) = stmt {
        walk_statement(body, f);
    }
}

/// Verify every `GOTO`/`GOSUB` target names a line that actually exists.
pub fn resolve_references(program: &Program, tables: &ControlFlowTables) -> ResolveResult<()> {
    for group in program {
        check_group(group, group.span.line, tables)?;
    }
    Ok(())
}

fn check_group(
    group: &LabelledGroup,
    line: u32,
    tables: &ControlFlowTables,
) -> ResolveResult<()> {
    for stmt in &group.statements {
        check_statement(stmt, line, tables)?;
    }
    Ok(())
}

fn check_statement(stmt: &Statement, line: u32, tables: &ControlFlowTables) -> ResolveResult<()> {
    match stmt {
        Statement::Goto(target) => {
            if !tables.label_index.contains_key(target) {
                return Err(ResolveError::UnknownLabel {
                    line,
                    kind: "GOTO",
                    target: *target,
                });
            }
        }
        Statement::Gosub(target) => {
            if !tables.label_index.contains_key(target) {
                return Err(ResolveError::UnknownLabel {
                    line,
                    kind: "GOSUB",
                    target: *target,
                });
            }
        }
        Statement::If(_, body) => check_statement(body, line, tables)?,
        _ => {}
    }
    Ok(())
}

/// A `GOSUB` target's extracted body: the contiguous run of
/// `LabelledGroup`s starting at its line and ending at (and including)
/// the first `RETURN` reached in sequential order.
pub struct ExtractedProcedure {
    pub target: u32,
    pub groups: Vec<LabelledGroup>,
}

/// Split `gosubTargets` out of `program` into standalone procedures,
/// leaving the remaining groups as the entry sequence. Each extracted
/// procedure is validated to contain no `GOTO` escaping its own bounds.
pub fn extract_procedures(
    program: Program,
    tables: &ControlFlowTables,
) -> ResolveResult<(Program, Vec<ExtractedProcedure>)> {
    let mut removed = FxHashSet::default();
    let mut procedures = Vec::new();

    let mut targets: Vec<u32> = tables.gosub_targets.iter().copied().collect();
    targets.sort_unstable();

    for target in targets {
        let start = tables.label_index[&target];
        if removed.contains(&start) {
            continue; // already covered by an overlapping extraction
        }

        let mut end = start;
        loop {
            let contains_return = program[end]
                .statements
                .iter()
                .any(|s| matches!(s, Statement::Return));
            if contains_return {
                break;
            }
            end += 1;
            if end >= program.len() {
                break;
            }
        }

        for idx in start..=end.min(program.len().saturating_sub(1)) {
            removed.insert(idx);
        }

        let groups: Vec<LabelledGroup> = program[start..=end.min(program.len() - 1)].to_vec();
        validate_procedure_bounds(&groups, target)?;
        procedures.push(ExtractedProcedure { target, groups });
    }

    let remaining: Program = program
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, g)| g)
        .collect();

    Ok((remaining, procedures))
}

/// A `GOTO` inside a procedure must target one of the procedure's own
/// lines -- it may not jump back into the main program or into a
/// different procedure.
fn validate_procedure_bounds(groups: &[LabelledGroup], target: u32) -> ResolveResult<()> {
    let local_lines: FxHashSet<u32> = groups.iter().filter_map(|g| g.line_number).collect();

    for group in groups {
        let line = group.span.line;
        for stmt in &group.statements {
            check_goto_stays_local(stmt, line, &local_lines, target)?;
        }
    }
    Ok(())
}

fn check_goto_stays_local(
    stmt: &Statement,
    line: u32,
    local_lines: &FxHashSet<u32>,
    procedure_start: u32,
) -> ResolveResult<()> {
    match stmt {
        Statement::Goto(dest) if !local_lines.contains(dest) => {
            Err(ResolveError::ProcedureBoundaryViolation {
                line,
                target: *dest,
                procedure_start,
            })
        }
        Statement::If(_, body) => check_goto_stays_local(body, line, local_lines, procedure_start),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tbc_lex::Lexer;

    fn parse(src: &str) -> Program {
        let tokens = Lexer::new(src).tokenize().expect("lex");
        tbc_par::parse(tokens).expect("parse")
    }

    #[test]
    fn builds_label_index_over_every_line() {
        let program = parse("10 LET A = 1\n20 PRINT A\n30 END\n");
        let tables = build_tables(&program);
        assert_eq!(tables.label_index[&10], 0);
        assert_eq!(tables.label_index[&20], 1);
        assert_eq!(tables.label_index[&30], 2);
        assert!(tables.gosub_targets.is_empty());
    }

    #[test]
    fn collects_gosub_targets_including_nested_if() {
        let program = parse("10 IF A = 1 THEN GOSUB 100\n100 RETURN\n");
        let tables = build_tables(&program);
        assert!(tables.gosub_targets.contains(&100));
    }

    #[test]
    fn unknown_goto_target_is_an_error() {
        let program = parse("10 GOTO 999\n");
        let tables = build_tables(&program);
        let err = resolve_references(&program, &tables).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnknownLabel { kind: "GOTO", target: 999, .. }
        ));
    }

    #[test]
    fn unknown_gosub_target_is_an_error() {
        let program = parse("10 GOSUB 999\n");
        let tables = build_tables(&program);
        let err = resolve_references(&program, &tables).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnknownLabel { kind: "GOSUB", target: 999, .. }
        ));
    }

    #[test]
    fn extracts_gosub_target_into_its_own_procedure() {
        let program = parse("10 GOSUB 100\n20 END\n100 PRINT \"HI\"\n110 RETURN\n");
        let tables = build_tables(&program);
        let (remaining, procedures) = extract_procedures(program, &tables).unwrap();

        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].line_number, Some(10));
        assert_eq!(remaining[1].line_number, Some(20));

        assert_eq!(procedures.len(), 1);
        assert_eq!(procedures[0].target, 100);
        assert_eq!(procedures[0].groups.len(), 2);
    }

    #[test]
    fn goto_leaving_a_procedure_is_a_boundary_violation() {
        let program = parse("10 GOSUB 100\n20 END\n100 GOTO 20\n110 RETURN\n");
        let tables = build_tables(&program);
        let err = extract_procedures(program, &tables).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ProcedureBoundaryViolation { target: 20, procedure_start: 100, .. }
        ));
    }

    #[test]
    fn goto_within_a_procedure_is_fine() {
        let program = parse("10 GOSUB 100\n20 END\n100 GOTO 110\n110 RETURN\n");
        let tables = build_tables(&program);
        let (_, procedures) = extract_procedures(program, &tables).unwrap();
        assert_eq!(procedures.len(), 1);
    }
}
