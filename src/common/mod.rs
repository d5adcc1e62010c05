//! Common types and utilities shared by every table codec.
//!
//! This module provides the little-endian byte helpers and the unified
//! error type used throughout the reader and the writer.

// Submodule declarations
pub mod binary;
pub mod error;

// Re-exports for convenience
pub use error::{Error, Result};
