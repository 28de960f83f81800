//! CLI behaviour of the `tbc` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::TempDir;

fn tbc_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tbc"))
}

fn write_source(dir: &TempDir, name: &str, src: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(src.as_bytes()).unwrap();
    path
}

#[test]
fn help_mentions_usage() {
    tbc_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_reports_something() {
    tbc_bin().arg("--version").assert().success();
}

#[test]
fn compiles_a_file_to_the_default_output_path() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "hi.bas", "10 PRINT \"HI\"\n20 END\n");

    tbc_bin().arg(&input).assert().success();

    let output = input.with_extension("rs");
    assert!(output.exists());
    let generated = std::fs::read_to_string(output).unwrap();
    assert!(generated.contains("fn main()"));
}

#[test]
fn respects_an_explicit_output_path() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "hi.bas", "10 END\n");
    let output = dir.path().join("out.rs");

    tbc_bin()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn verbose_flag_does_not_break_compilation() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "hi.bas", "10 END\n");
    let output = dir.path().join("out.rs");

    tbc_bin()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--verbose")
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn missing_input_file_exits_2() {
    tbc_bin()
        .arg("/nonexistent/does-not-exist.bas")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn invalid_syntax_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "bad.bas", "10 LET A = @\n");

    tbc_bin().arg(&input).assert().failure().code(1);
}

#[test]
fn unknown_goto_target_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "bad.bas", "10 GOTO 999\n");

    tbc_bin()
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("999"));
}
