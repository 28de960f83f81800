//! Driver-level error aggregate.
//!
//! Every pass crate owns its own error enum; `TbcError` just wraps them so
//! the driver has one type to match on and one place to pick an exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TbcError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lex(#[from] tbc_lex::LexError),

    #[error(transparent)]
    Parse(#[from] tbc_par::ParseError),

    #[error(transparent)]
    Sem(#[from] tbc_sem::error::SemError),

    #[error(transparent)]
    Gen(#[from] tbc_gen::CodeGenError),
}

impl TbcError {
    /// 1 for a pipeline error (bad input), 2 for I/O/usage trouble.
    pub fn exit_code(&self) -> i32 {
        match self {
            TbcError::Io(_) => 2,
            TbcError::Lex(_) | TbcError::Parse(_) | TbcError::Sem(_) | TbcError::Gen(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, TbcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_exits_2() {
        let err: TbcError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn lex_error_exits_1() {
        let err: TbcError = tbc_lex::LexError::UnknownChar { line: 1, ch: '@' }.into();
        assert_eq!(err.exit_code(), 1);
    }
}
