//! tbc-util - Core utilities and foundation types
//!
//! Shared infrastructure used by every pass of the transpiler: source spans
//! and the [`def_id`] allocator used for synthetic escape flags. Nothing in
//! this crate is specific to BASIC; `tbc-lex`, `tbc-par`, and `tbc-sem`
//! build their pass-specific types on top of it.

pub mod def_id;
pub mod span;

pub use def_id::{DefId, DefIdGenerator};
pub use span::{FileId, Span};

// Re-export commonly used types
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
