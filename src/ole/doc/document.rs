/// Document - an opened Word document held entirely in memory.
use super::options::DocOptions;
use super::parts::bin_data::NilPicfAndBinData;
use super::parts::bin_table::{CharacterBinTable, ParagraphBinTable};
use super::parts::chp::CharacterProperties;
use super::parts::dop::DocumentProperties;
use super::parts::fib::{FibTable, FileInformationBlock};
use super::parts::font_table::FontTable;
use super::parts::list_tables::ListTables;
use super::parts::pap::ParagraphProperties;
use super::parts::piece_table::PieceTable;
use super::parts::property_engine::PropertyBases;
use super::parts::section_table::SectionTable;
use super::parts::stylesheet::StyleSheet;
use super::writer::OutputStreams;
use super::{DATA_STREAM, WORD_DOCUMENT_STREAM};
use crate::common::error::{Error, Result};
use crate::ole::container::Container;
use bytes::Bytes;

/// A Word (.doc) document.
///
/// Every table is parsed at open; afterwards lookups and edits work on the
/// in-memory tables only, and [`to_streams`](Self::to_streams) serializes
/// them into fresh streams.
///
/// # Examples
///
/// ```
/// use worddoc::ole::container::MemoryContainer;
/// use worddoc::ole::doc::{DocOptions, Document};
/// use worddoc::common::Error;
///
/// let empty = MemoryContainer::new();
/// let result = Document::open(&empty, &DocOptions::default());
/// assert!(matches!(result, Err(Error::MissingStream(_))));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    /// File Information Block from the WordDocument stream
    fib: FileInformationBlock,
    pieces: PieceTable,
    characters: CharacterBinTable,
    paragraphs: ParagraphBinTable,
    sections: SectionTable,
    styles: StyleSheet,
    fonts: FontTable,
    lists: Option<ListTables>,
    dop: DocumentProperties,
    /// Character count of the main story, kept current across edits
    ccp_text: u32,
    main: Bytes,
    table: Bytes,
    data: Bytes,
    options: DocOptions,
}

fn required_stream<C: Container>(container: &C, name: &str) -> Result<Bytes> {
    container.open_entry(name).map_err(|e| match e {
        Error::EntryNotFound(name) => Error::MissingStream(name),
        other => other,
    })
}

impl Document {
    /// Open the document stored in `container`.
    ///
    /// The WordDocument stream and the table stream named by the header
    /// block are required; a missing Data stream reads as empty.
    pub fn open<C: Container>(container: &C, options: &DocOptions) -> Result<Self> {
        let main = required_stream(container, WORD_DOCUMENT_STREAM)?;

        let fib = FileInformationBlock::parse(&main)?;
        if !fib.is_valid() {
            return Err(Error::InvalidFormat(format!(
                "header block magic 0x{:04X}, nFib 0x{:04X}: not a Word 97 or later document",
                fib.magic(),
                fib.version()
            )));
        }
        if fib.is_encrypted() {
            return Err(Error::Unsupported("encrypted document".to_string()));
        }

        let table_name = fib.table_stream_name();
        if !container.has_entry(table_name) {
            return Err(Error::MissingStream(table_name.to_string()));
        }
        let table = required_stream(container, table_name)?;
        let data = if container.has_entry(DATA_STREAM) {
            container.open_entry(DATA_STREAM)?
        } else {
            Bytes::new()
        };

        let clx = fib.get(FibTable::Clx);
        if clx.lcb == 0 {
            return Err(Error::malformed("piece table", "header block records no CLX"));
        }
        let mut pieces = PieceTable::parse(clx.slice(&table, FibTable::Clx.name())?, &main)?;

        let mut characters = CharacterBinTable::read(
            &table,
            fib.get(FibTable::ChpBinTable),
            &main,
            &pieces,
            data.clone(),
            options,
        )?;
        let mut paragraphs = ParagraphBinTable::read(
            &table,
            fib.get(FibTable::PapBinTable),
            &main,
            &pieces,
            data.clone(),
            options,
        )?;
        let mut sections =
            SectionTable::read(&table, fib.get(FibTable::SectionTable), &main, options)?;
        let styles = StyleSheet::read(&table, fib.get(FibTable::StyleSheet), options)?;
        let fonts = FontTable::read(&table, fib.get(FibTable::FontTable))?;
        let lists = ListTables::read(&table, &fib)?;
        let dop = DocumentProperties::read(&table, fib.get(FibTable::DocumentProperties))?;

        let cp_min = pieces.cp_min();
        if cp_min > 0 {
            log::debug!("text starts at CP {}, rebasing every table", cp_min);
            pieces.rebase(cp_min);
            characters.rebase(cp_min);
            paragraphs.rebase(cp_min);
            sections.rebase(cp_min);
        }

        Ok(Self {
            ccp_text: fib.ccp_text(),
            fib,
            pieces,
            characters,
            paragraphs,
            sections,
            styles,
            fonts,
            lists,
            dop,
            main,
            table,
            data,
            options: options.clone(),
        })
    }

    /// File Information Block as read.
    #[inline]
    pub fn fib(&self) -> &FileInformationBlock {
        &self.fib
    }

    #[inline]
    pub fn pieces(&self) -> &PieceTable {
        &self.pieces
    }

    /// Character runs (CHPBinTable).
    #[inline]
    pub fn characters(&self) -> &CharacterBinTable {
        &self.characters
    }

    /// Paragraph runs (PAPBinTable).
    #[inline]
    pub fn paragraphs(&self) -> &ParagraphBinTable {
        &self.paragraphs
    }

    #[inline]
    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    #[inline]
    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    #[inline]
    pub fn fonts(&self) -> &FontTable {
        &self.fonts
    }

    #[inline]
    pub fn lists(&self) -> Option<&ListTables> {
        self.lists.as_ref()
    }

    #[inline]
    pub fn dop(&self) -> &DocumentProperties {
        &self.dop
    }

    /// Options the document was opened with.
    #[inline]
    pub fn options(&self) -> &DocOptions {
        &self.options
    }

    /// WordDocument stream as read.
    #[inline]
    pub fn main_stream(&self) -> &[u8] {
        &self.main
    }

    /// Table stream as read.
    #[inline]
    pub fn table_stream(&self) -> &[u8] {
        &self.table
    }

    /// Data stream; empty when the document has none.
    #[inline]
    pub fn data_stream(&self) -> &[u8] {
        &self.data
    }

    /// Whole document text, every story included.
    pub fn text(&self) -> String {
        self.pieces.text()
    }

    /// Character count of the main story.
    #[inline]
    pub fn ccp_text(&self) -> u32 {
        self.ccp_text
    }

    /// Effective character properties at `cp`.
    pub fn character_properties_at(
        &self,
        cp: u32,
        bases: &PropertyBases,
    ) -> Result<CharacterProperties> {
        self.characters.properties_at(cp, bases)
    }

    /// Effective paragraph properties at `cp`.
    pub fn paragraph_properties_at(
        &self,
        cp: u32,
        bases: &PropertyBases,
    ) -> Result<ParagraphProperties> {
        self.paragraphs.properties_at(cp, bases)
    }

    /// Binary data record referenced by the character run at `cp`, if the
    /// run is a special character with `fData` set.
    pub fn bin_data_at(&self, cp: u32, bases: &PropertyBases) -> Result<Option<NilPicfAndBinData>> {
        let chp = self.character_properties_at(cp, bases)?;
        if !chp.has_bin_data() {
            return Ok(None);
        }
        NilPicfAndBinData::parse(&self.data, chp.pic_location as usize, &self.options).map(Some)
    }

    /// Replace `removed` characters at `start` with `inserted`.
    ///
    /// The piece table is spliced first, then the character bin table, the
    /// paragraph bin table and the section table are adjusted with the same
    /// start and delta. Returns the change in document length.
    pub fn apply_text_edit(&mut self, start: u32, removed: u32, inserted: &str) -> Result<i64> {
        let delta = self.pieces.splice(start, removed, inserted)?;
        self.characters.adjust_for_edit(start, delta);
        self.paragraphs.adjust_for_edit(start, delta);
        self.sections.adjust_for_edit(start, delta);

        let total = self.pieces.total_cps();
        self.characters.extend_to(total)?;
        self.paragraphs.extend_to(total)?;

        if start <= self.ccp_text {
            let end = start + removed;
            let inserted_len = (i64::from(removed) + delta) as u32;
            self.ccp_text = if self.ccp_text >= end {
                (i64::from(self.ccp_text) + delta) as u32
            } else {
                start + inserted_len
            };
        }
        log::debug!(
            "edit at {}: -{} +{} chars, ccpText now {}",
            start,
            removed,
            i64::from(removed) + delta,
            self.ccp_text
        );
        Ok(delta)
    }

    /// Serialize every table into fresh streams.
    ///
    /// Nothing is handed to a container here; a failure leaves no partial
    /// output behind.
    pub fn to_streams(&self, bases: &PropertyBases, options: &DocOptions) -> Result<OutputStreams> {
        super::writer::write_document(self, bases, options)
    }
}
