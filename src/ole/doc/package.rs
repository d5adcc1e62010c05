/// Package implementation for legacy Word documents (.doc).
use super::document::Document;
use super::options::DocOptions;
use super::parts::property_engine::PropertyBases;
use super::{DATA_STREAM, TABLE_STREAM_1, WORD_DOCUMENT_STREAM};
use crate::common::error::{Error, Result};
use crate::ole::container::Container;

/// A Word (.doc) package.
///
/// This is the main entry point for working with legacy Word documents.
/// It wraps a [`Container`] and provides Word-specific functionality.
///
/// # Examples
///
/// ```
/// use worddoc::ole::container::MemoryContainer;
/// use worddoc::ole::doc::Package;
///
/// let pkg = Package::new(MemoryContainer::new());
/// assert!(pkg.document().is_err());
/// ```
#[derive(Debug)]
pub struct Package<C: Container> {
    /// The underlying container
    container: C,
    options: DocOptions,
}

impl<C: Container> Package<C> {
    /// Wrap a container with default options.
    pub fn new(container: C) -> Self {
        Self::with_options(container, DocOptions::default())
    }

    pub fn with_options(container: C, options: DocOptions) -> Self {
        Self { container, options }
    }

    /// Read the main document.
    pub fn document(&self) -> Result<Document> {
        Document::open(&self.container, &self.options)
    }

    /// Serialize `doc` and store its streams in the container.
    ///
    /// The streams are built in full before the container is touched, so a
    /// serialization failure leaves the container as it was. WordDocument
    /// is created first, then 1Table, then Data. Every stream is at least
    /// one block long, so Data is written even when the source had none.
    pub fn save(&mut self, doc: &Document, bases: &PropertyBases) -> Result<()> {
        let streams = doc.to_streams(bases, &self.options)?;
        if streams.main.is_empty() {
            return Err(Error::InvalidFormat("empty WordDocument stream".to_string()));
        }
        self.container
            .create_entry(WORD_DOCUMENT_STREAM, streams.main)?;
        self.container.create_entry(TABLE_STREAM_1, streams.table)?;
        self.container.create_entry(DATA_STREAM, streams.data)?;
        log::debug!("saved document to {} entries", self.container.list_entries().len());
        Ok(())
    }

    #[inline]
    pub fn options(&self) -> &DocOptions {
        &self.options
    }

    /// Get the underlying container.
    #[inline]
    pub fn container(&self) -> &C {
        &self.container
    }

    /// Unwrap the container, e.g. to flush it to disk.
    pub fn into_inner(self) -> C {
        self.container
    }
}
