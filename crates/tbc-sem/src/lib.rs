//! tbc-sem - control-flow resolution and goto-elimination
//!
//! Turns the parser's flat, line-numbered [`tbc_par::ast::Program`] into a
//! [`ir::StructuredProgram`] with no `GOTO` left in it, in two passes:
//!
//! 1. [`control_flow`]: build the label/GOSUB tables, validate every jump
//!    target exists, and extract each `GOSUB` target into its own
//!    procedure.
//! 2. [`structure`]: classify every remaining jump against the C1-C5
//!    cases and rewrite it into `If`/`Loop`/`Break`/`BreakIf`/`Call`.

pub mod control_flow;
pub mod error;
pub mod ir;
pub mod structure;

use control_flow::{build_tables, extract_procedures, resolve_references};
use error::SemResult;
use ir::{Procedure, StructuredProgram};
use structure::{collect_variables, Structurer};
use tbc_par::ast::Program;

/// Run control-flow resolution and structuring over a parsed program,
/// producing the IR the emitter consumes.
pub fn analyze(program: Program) -> SemResult<StructuredProgram> {
    let tables = build_tables(&program);
    resolve_references(&program, &tables)?;

    let (entry_groups, extracted) = extract_procedures(program, &tables)?;

    // One flag allocator shared by the entry and every extracted
    // procedure: they all write into the same `Vars` struct at emission
    // time, so their synthetic flag ids must not collide.
    let flags = tbc_util::DefIdGenerator::new();

    let entry = Structurer::new(&entry_groups, &flags).structure_all()?;

    let mut procedures = Vec::with_capacity(extracted.len());
    for proc in &extracted {
        let body = Structurer::new(&proc.groups, &flags).structure_all()?;
        procedures.push(Procedure {
            name: structure::procedure_name(proc.target),
            body,
        });
    }

    let variables = collect_variables(&entry, &procedures);

    Ok(StructuredProgram {
        entry,
        procedures,
        variables,
    })
}
