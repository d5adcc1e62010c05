//! Unified error type for worddoc.
//!
//! Every fallible operation in the crate, from a single table decode up to a
//! full open or save, reports through [`Error`].

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
