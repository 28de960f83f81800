use thiserror::Error;

/// Errors raised while building the numbered AST from a token stream.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: u32,
        expected: String,
        found: String,
    },

    #[error("unexpected end of input while expecting {expected}")]
    UnexpectedEof { expected: String },

    #[error("line {line}: duplicate line number {line_number}")]
    DuplicateLine { line: u32, line_number: u32 },
}

pub type Result<T> = std::result::Result<T, ParseError>;
