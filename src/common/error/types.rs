//! Error taxonomy for reading and writing binary Word documents.
use thiserror::Error;

/// Main error type for worddoc operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error raised by a container implementation
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The main stream is shorter than the fixed part of the header block
    #[error("Truncated header: need {needed} bytes, stream has {available}")]
    TruncatedHeader { needed: usize, available: usize },

    /// A table's length, record size or position ordering is inconsistent
    #[error("Malformed {table}: {reason}")]
    MalformedTable { table: &'static str, reason: String },

    /// Lookup outside the range a table covers
    #[error("Position {position} outside covered range [{start}, {end})")]
    PositionNotFound { position: u32, start: u32, end: u32 },

    /// A stream the document cannot be opened without is absent
    #[error("Missing stream: {0}")]
    MissingStream(String),

    /// Container-level lookup failure
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// A declared size would require an allocation above the configured ceiling
    #[error("Declared size {requested} exceeds allocation limit {limit}")]
    AllocationLimitExceeded { requested: usize, limit: usize },

    /// Not a Word 97+ header block
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Recognized but not handled (encrypted documents, oversized runs)
    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

impl Error {
    /// Shorthand for [`Error::MalformedTable`].
    pub(crate) fn malformed(table: &'static str, reason: impl Into<String>) -> Self {
        Error::MalformedTable {
            table,
            reason: reason.into(),
        }
    }
}

/// Result type for worddoc operations.
pub type Result<T> = std::result::Result<T, Error>;
