use thiserror::Error;

/// Errors raised while resolving `GOTO`/`GOSUB` targets and extracting
/// procedures (§4.3).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("line {line}: {kind} target {target} does not label any line")]
    UnknownLabel {
        line: u32,
        /// "GOTO" or "GOSUB", for the message.
        kind: &'static str,
        target: u32,
    },

    #[error("line {line}: RETURN outside of any procedure")]
    OrphanReturn { line: u32 },

    #[error(
        "line {line}: GOTO {target} leaves procedure starting at {procedure_start}"
    )]
    ProcedureBoundaryViolation {
        line: u32,
        target: u32,
        procedure_start: u32,
    },
}

/// Errors raised by the goto-elimination structuring pass (§4.4).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("line {line}: unstructurable control flow (jump to line {target} escapes the enclosing region)")]
    Unstructurable { line: u32, target: u32 },
}

pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
pub type StructureResult<T> = std::result::Result<T, StructureError>;

/// Either phase of semantic analysis can fail; `tbc_sem::analyze` reports
/// through this combined type so its caller only has one error to match
/// on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SemError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Structure(#[from] StructureError),
}

pub type SemResult<T> = std::result::Result<T, SemError>;
