//! DOC file writing module
//!
//! Serializers for every table, and the pipeline in [`core`] that runs them
//! in a fixed order.

/// Write pipeline
mod core;

/// FIB (File Information Block) generation
pub mod fib;

/// Piece table for text storage
pub mod piece_table;

/// FKP (Formatted Disk Pages) structures
pub mod fkp;

/// SPRM (Single Property Modifier) generation
pub mod sprm;

/// StyleSheet generation
pub mod stylesheet;

/// DocumentProperties generation
pub mod dop;

/// Section table generation
pub mod section;

/// Bin table (plcfbte) generation
pub mod bin_table;

/// Font table generation
pub mod font_table;

// Re-export public types
pub use self::core::{OutputStreams, write_document};
pub use fib::FibBuilder;
pub use fkp::{ChpxFkpBuilder, PapxFkpBuilder};
pub use font_table::FontTableBuilder;
pub use sprm::SprmBuilder;
