//! Compound-file container seam.
//!
//! The document pipeline never touches the compound-file format itself. It
//! reads whole named entries, writes whole named entries, and asks which
//! entries exist. Anything that can do those three things can host a
//! document: an OLE2 reader/writer pair, an archive in memory, a directory
//! on disk.

use crate::common::error::{Error, Result};
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};

/// Whole-entry storage used by [`Package`](crate::ole::doc::Package).
pub trait Container {
    /// Read an entry in full.
    ///
    /// Fails with [`Error::EntryNotFound`] when no entry has that name.
    fn open_entry(&self, name: &str) -> Result<Bytes>;

    /// Write an entry in full, replacing any previous contents.
    fn create_entry(&mut self, name: &str, data: Vec<u8>) -> Result<()>;

    /// Names of every entry currently stored.
    fn list_entries(&self) -> BTreeSet<String>;

    /// Whether an entry with this name exists.
    fn has_entry(&self, name: &str) -> bool {
        self.list_entries().contains(name)
    }
}

/// An in-memory container keyed by entry name.
///
/// # Examples
///
/// ```
/// use worddoc::ole::container::{Container, MemoryContainer};
///
/// let mut container = MemoryContainer::new();
/// container.create_entry("Data", vec![1, 2, 3]).unwrap();
/// assert_eq!(container.open_entry("Data").unwrap().as_ref(), &[1, 2, 3]);
/// assert!(container.open_entry("1Table").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    entries: BTreeMap<String, Bytes>,
}

impl MemoryContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for assembling fixtures.
    pub fn with_entry(mut self, name: &str, data: impl Into<Bytes>) -> Self {
        self.entries.insert(name.to_string(), data.into());
        self
    }

    /// Remove an entry, returning its contents if it was present.
    pub fn remove_entry(&mut self, name: &str) -> Option<Bytes> {
        self.entries.remove(name)
    }

    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Container for MemoryContainer {
    fn open_entry(&self, name: &str) -> Result<Bytes> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))
    }

    fn create_entry(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        self.entries.insert(name.to_string(), Bytes::from(data));
        Ok(())
    }

    fn list_entries(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    fn has_entry(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}
