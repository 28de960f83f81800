//! tbc-drv - the `tbc` command-line tool.
//!
//! Wires the pipeline together: read a BASIC source file, run it through
//! `tbc-lex` -> `tbc-par` -> `tbc-sem` -> `tbc-gen`, and write the emitted
//! Rust source next to it. Argument parsing and logging setup follow
//! `faxt`'s `clap`-derive/`tracing-subscriber` shape; the error aggregate
//! follows `faxt::error::FaxtError`.

pub mod error;

use clap::Parser;
use error::{Result, TbcError};
use std::path::{Path, PathBuf};
use tbc_sem::ir::StructuredProgram;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Translate a TinyBasic program into structured Rust source.
#[derive(Debug, Parser)]
#[command(name = "tbc", version, about = "TinyBasic-to-structured-Rust transpiler")]
pub struct Cli {
    /// BASIC source file to translate
    pub input: PathBuf,

    /// Where to write the generated Rust source (default: input with a
    /// `.rs` extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit debug-level logs instead of info-level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Install a `tracing` subscriber writing to stderr.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::new(if verbose { "debug" } else { "info" });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // A subscriber can only be installed once per process; tests that
    // exercise `run` directly (rather than through the `tbc` binary) may
    // call this more than once, so a failed install is not fatal.
    let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
}

/// Run the full pipeline for `cli`, returning the path written.
pub fn run(cli: &Cli) -> Result<PathBuf> {
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let structured = compile(&cli.input)?;
    let rust_src = tbc_gen::emit(&structured)?;

    std::fs::write(&output, rust_src)?;
    tracing::info!(path = %output.display(), "wrote generated source");

    Ok(output)
}

/// Run lex -> parse -> analyze for `input`, without touching the filesystem
/// beyond reading the source. Split out from [`run`] so tests can drive
/// the pipeline without caring about output paths.
pub fn compile(input: &Path) -> Result<StructuredProgram> {
    let source = std::fs::read_to_string(input)?;
    tracing::debug!(path = %input.display(), bytes = source.len(), "read source");

    let tokens = tbc_lex::Lexer::new(&source).tokenize()?;
    tracing::debug!(tokens = tokens.len(), "lexed");

    let program = tbc_par::parse(tokens)?;
    tracing::debug!(lines = program.len(), "parsed");

    let structured = tbc_sem::analyze(program)?;
    tracing::debug!(procedures = structured.procedures.len(), "structured");

    Ok(structured)
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("rs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_source(dir: &tempfile::TempDir, name: &str, src: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(src.as_bytes()).unwrap();
        path
    }

    #[test]
    fn default_output_path_swaps_extension_to_rs() {
        assert_eq!(default_output_path(Path::new("prog.bas")), PathBuf::from("prog.rs"));
    }

    #[test]
    fn run_writes_generated_source_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(&dir, "hi.bas", "10 PRINT \"HI\"\n20 END\n");
        let cli = Cli { input: input.clone(), output: None, verbose: false };

        let output = run(&cli).unwrap();
        assert_eq!(output, input.with_extension("rs"));
        let generated = std::fs::read_to_string(output).unwrap();
        assert!(generated.contains("fn main()"));
        assert!(generated.contains("print!(\"HI\");"));
    }

    #[test]
    fn run_honours_an_explicit_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(&dir, "hi.bas", "10 END\n");
        let explicit = dir.path().join("out.rs");
        let cli = Cli { input, output: Some(explicit.clone()), verbose: false };

        let output = run(&cli).unwrap();
        assert_eq!(output, explicit);
        assert!(explicit.exists());
    }

    #[test]
    fn lex_error_surfaces_through_compile() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(&dir, "bad.bas", "LET A = @\n");
        let err = compile(&input).unwrap_err();
        assert!(matches!(err, TbcError::Lex(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn missing_input_file_is_an_io_error() {
        let err = compile(Path::new("/nonexistent/path.bas")).unwrap_err();
        assert!(matches!(err, TbcError::Io(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
