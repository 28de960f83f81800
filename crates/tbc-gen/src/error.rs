//! Error types for Rust source emission

use thiserror::Error;

/// Error type for code generation
#[derive(Debug, Error)]
pub enum CodeGenError {
    /// Writing to the in-memory output buffer failed
    #[error("failed to format generated source: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Result type alias for code generation operations
pub type Result<T> = std::result::Result<T, CodeGenError>;
