//! worddoc - lossless round-trip reading and writing of legacy binary Word
//! (.doc) documents
//!
//! The crate parses every table a Word 97-2003 document keeps in its
//! WordDocument and table streams, lets callers edit the text while the
//! character, paragraph and section tables follow along, and writes the
//! whole document back out in a canonical layout.
//!
//! The compound-file (OLE2) layer is not part of the crate: a document is
//! read from and written to anything implementing
//! [`Container`](ole::container::Container).
//!
//! # Example
//!
//! ```no_run
//! use worddoc::ole::container::MemoryContainer;
//! use worddoc::ole::doc::{DocOptions, Document, PropertyBases};
//!
//! # fn main() -> worddoc::common::Result<()> {
//! # let container = MemoryContainer::new();
//! let mut doc = Document::open(&container, &DocOptions::default())?;
//! println!("Document text: {}", doc.text());
//!
//! let bases = PropertyBases::default();
//! println!("bold at 0: {}", doc.character_properties_at(0, &bases)?.bold);
//!
//! doc.apply_text_edit(0, 0, "Hello ")?;
//! let streams = doc.to_streams(&bases, &DocOptions::default())?;
//! assert_eq!(streams.main.len() % 4096, 0);
//! # Ok(())
//! # }
//! ```

/// Common types and utilities shared across formats
pub mod common;

/// OLE2-hosted formats
pub mod ole;

pub use common::{Error, Result};
