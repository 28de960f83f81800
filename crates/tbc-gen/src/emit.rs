//! Structured IR -> Rust source text.
//!
//! This is the spec's "external collaborator": it consumes
//! [`tbc_sem::ir`] through a narrow surface and has no say over anything
//! upstream of it. Pretty-printing quality is explicitly out of scope,
//! so this favours straightforward `write!` calls over a real
//! pretty-printer -- every statement writes itself and its own trailing
//! newline, indentation is tracked by hand.

use crate::error::Result;
use std::fmt::Write;
use tbc_par::ast::{BinOp, RelOp};
use tbc_sem::ir::{Procedure, SBlock, SCondition, SExpr, SPrintItem, SStmt, SVar, StructuredProgram};

/// Emit a complete, standalone Rust source file for `program`.
pub fn emit(program: &StructuredProgram) -> Result<String> {
    let mut out = String::new();

    emit_vars_struct(&mut out, &program.variables)?;
    writeln!(out)?;

    for proc in &program.procedures {
        emit_procedure(&mut out, proc)?;
        writeln!(out)?;
    }

    writeln!(out, "fn main() {{")?;
    writeln!(out, "    let mut vars = Vars::default();")?;
    emit_block(&mut out, &program.entry, 1)?;
    writeln!(out, "}}")?;

    Ok(out)
}

fn emit_vars_struct(out: &mut String, variables: &[SVar]) -> Result<()> {
    writeln!(out, "#[derive(Default)]")?;
    writeln!(out, "struct Vars {{")?;
    for var in variables {
        match var {
            SVar::User(c) => writeln!(out, "    {}: i32,", user_field(*c))?,
            SVar::Flag(id) => writeln!(out, "    {}: bool,", flag_field(*id))?,
        }
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn emit_procedure(out: &mut String, proc: &Procedure) -> Result<()> {
    writeln!(out, "fn {}(vars: &mut Vars) {{", proc.name)?;
    emit_block(out, &proc.body, 1)?;
    writeln!(out, "}}")?;
    Ok(())
}

fn emit_block(out: &mut String, block: &SBlock, indent: usize) -> Result<()> {
    for stmt in block {
        emit_stmt(out, stmt, indent)?;
    }
    Ok(())
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("    ");
    }
}

fn emit_stmt(out: &mut String, stmt: &SStmt, indent: usize) -> Result<()> {
    pad(out, indent);
    match stmt {
        SStmt::Print(items) => {
            for item in items {
                match item {
                    SPrintItem::Str(s) => writeln!(out, "print!(\"{}\");", escape_str(s))?,
                    SPrintItem::Expr(e) => {
                        writeln!(out, "print!(\"{{}}\", {});", emit_expr(e))?
                    }
                }
                pad(out, indent);
            }
            writeln!(out, "println!();")?;
        }
        SStmt::Input(vars) => {
            writeln!(out, "{{")?;
            for v in vars {
                pad(out, indent + 1);
                writeln!(out, "let mut line = String::new();")?;
                pad(out, indent + 1);
                writeln!(
                    out,
                    "std::io::stdin().read_line(&mut line).expect(\"failed to read line\");"
                )?;
                pad(out, indent + 1);
                writeln!(
                    out,
                    "vars.{} = line.trim().parse().expect(\"expected an integer\");",
                    user_field(*v)
                )?;
            }
            pad(out, indent);
            writeln!(out, "}}")?;
        }
        SStmt::Let(var, expr) => {
            writeln!(out, "vars.{} = {};", user_field(*var), emit_expr(expr))?;
        }
        SStmt::SetFlag(id, cond) => {
            writeln!(out, "vars.{} = {};", flag_field(*id), emit_cond(cond))?;
        }
        SStmt::If { cond, then_block, else_block } => {
            writeln!(out, "if {} {{", emit_cond(cond))?;
            emit_block(out, then_block, indent + 1)?;
            pad(out, indent);
            if let Some(else_block) = else_block {
                writeln!(out, "}} else {{")?;
                emit_block(out, else_block, indent + 1)?;
                pad(out, indent);
            }
            writeln!(out, "}}")?;
        }
        SStmt::Loop(body) => {
            writeln!(out, "loop {{")?;
            emit_block(out, body, indent + 1)?;
            pad(out, indent);
            writeln!(out, "}}")?;
        }
        SStmt::Break => {
            writeln!(out, "break;")?;
        }
        SStmt::BreakIf(cond) => {
            writeln!(out, "if {} {{ break; }}", emit_cond(cond))?;
        }
        SStmt::Call(name) => {
            writeln!(out, "{}(&mut vars);", name)?;
        }
        SStmt::Return => {
            writeln!(out, "return;")?;
        }
        SStmt::End => {
            writeln!(out, "std::process::exit(0);")?;
        }
    }
    Ok(())
}

fn emit_expr(expr: &SExpr) -> String {
    match expr {
        SExpr::Num(n) => n.to_string(),
        SExpr::Var(v) => format!("vars.{}", user_field(*v)),
        SExpr::Bin(lhs, op, rhs) => {
            format!("({} {} {})", emit_expr(lhs), bin_op_str(*op), emit_expr(rhs))
        }
    }
}

fn emit_cond(cond: &SCondition) -> String {
    match cond {
        SCondition::Compare(lhs, op, rhs) => {
            format!("{} {} {}", emit_expr(lhs), rel_op_str(*op), emit_expr(rhs))
        }
        SCondition::And(parts) => parts
            .iter()
            .map(|p| format!("({})", emit_cond(p)))
            .collect::<Vec<_>>()
            .join(" && "),
        SCondition::Flag(id) => format!("vars.{}", flag_field(*id)),
        SCondition::Not(inner) => format!("!({})", emit_cond(inner)),
    }
}

fn bin_op_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
    }
}

fn rel_op_str(op: RelOp) -> &'static str {
    match op {
        RelOp::Lt => "<",
        RelOp::Gt => ">",
        RelOp::Eq => "==",
        RelOp::LtEq => "<=",
        RelOp::GtEq => ">=",
        RelOp::NotEq => "!=",
    }
}

fn user_field(c: char) -> String {
    c.to_ascii_lowercase().to_string()
}

fn flag_field(id: u32) -> String {
    format!("flag_{}", id)
}

fn escape_str(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
