/// Whole-entry storage for the document streams
pub mod container;

/// Generic PLC (plex of CPs) codec shared by every positional table
pub mod plcf;

/// SPRM decoding
pub mod sprm;

/// SPRM opcode constants
pub mod sprm_operations;

/// Legacy Word document (.doc) reader and writer
///
/// This module provides functionality to parse, edit and re-serialize
/// Microsoft Word documents in the legacy binary format (.doc files).
pub mod doc;
