/// Word (.doc) document support.
///
/// This module reads and rewrites Microsoft Word documents in the legacy
/// binary format (.doc files), which live in OLE2 structured storage.
///
/// # Architecture
///
/// - `Package`: a container holding the document streams
/// - `Document`: every table of the document, parsed and editable
/// - `parts`: readers for the individual tables
/// - `writer`: the matching serializers and the write pipeline
///
/// # DOC File Structure
///
/// A .doc file is an OLE2 structured storage containing several streams:
/// - **WordDocument**: Main document stream containing the FIB and text
/// - **1Table** or **0Table**: Contains formatting and structure information
/// - **Data**: Contains embedded objects and oversized paragraph properties
///
/// # Example
///
/// ```rust,no_run
/// use worddoc::ole::container::MemoryContainer;
/// use worddoc::ole::doc::{Package, PropertyBases};
///
/// # fn load() -> MemoryContainer { MemoryContainer::new() }
/// let mut package = Package::new(load());
/// let mut doc = package.document()?;
/// println!("Document text: {}", doc.text());
///
/// doc.apply_text_edit(0, 0, "Title\r")?;
/// package.save(&doc, &PropertyBases::default())?;
/// # Ok::<(), worddoc::common::Error>(())
/// ```
pub mod document;
pub mod options;
pub mod package;
pub mod parts;
pub mod writer;

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod tests;

pub use document::Document;
pub use options::DocOptions;
pub use package::Package;
pub use parts::property_engine::PropertyBases;
pub use writer::OutputStreams;

/// Main stream: header block, text and FKP pages.
pub const WORD_DOCUMENT_STREAM: &str = "WordDocument";
/// Table stream selected when `fWhichTblStm` is clear.
pub const TABLE_STREAM_0: &str = "0Table";
/// Table stream selected when `fWhichTblStm` is set. Always used on write.
pub const TABLE_STREAM_1: &str = "1Table";
/// Optional stream of embedded binary data.
pub const DATA_STREAM: &str = "Data";

/// Stream a physical byte range refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// WordDocument
    Main,
    /// 0Table or 1Table
    Table,
    /// Data
    Data,
}
