use thiserror::Error;

/// Errors raised while turning source text into a token stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("line {line}: unexpected character {ch:?}")]
    UnknownChar { line: u32, ch: char },

    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: u32 },

    #[error("line {line}: malformed number literal {text:?}")]
    MalformedNumber { line: u32, text: String },
}

pub type Result<T> = std::result::Result<T, LexError>;
