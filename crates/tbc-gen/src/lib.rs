//! tbc-gen - structured IR to Rust source emission
//!
//! The spec's "external collaborator": consumes a [`tbc_sem::ir::
//! StructuredProgram`] through [`emit`] and produces a standalone Rust
//! source file. Nothing upstream of this crate depends on anything in
//! it.

pub mod emit;
pub mod error;

pub use emit::emit;
pub use error::{CodeGenError, Result};
