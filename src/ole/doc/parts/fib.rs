/// File Information Block (FIB) parser for DOC files.
///
/// The FIB is located at the beginning of the WordDocument stream and contains
/// critical information about the document structure, including:
/// - File format version
/// - Which table stream to use (0Table or 1Table)
/// - The text window in the WordDocument stream
/// - (offset, length) pointers to every table in the table stream
///
/// Everything after the 32-byte base is self-describing: each array is
/// preceded by its element count, so the reader walks counts instead of
/// assuming a particular Word version's layout.
use crate::common::binary;
use crate::common::error::{Error, Result};

/// Size of the fixed FibBase structure
pub const FIB_BASE_SIZE: usize = 32;

/// Word 97+ magic number (wIdent)
pub const WORD97_MAGIC: u16 = 0xA5EC;

/// Lowest nFib of a Word 97 document
pub const MIN_NFIB: u16 = 0x00C1;

pub(crate) const FLAGS_OFFSET: usize = 10;
pub(crate) const FC_MIN_OFFSET: usize = 24;
pub(crate) const FC_MAC_OFFSET: usize = 28;

/// fComplex: the document was incrementally saved
pub const FLAG_COMPLEX: u16 = 0x0004;
/// fEncrypted
pub const FLAG_ENCRYPTED: u16 = 0x0100;
/// fWhichTblStm: tables live in 1Table instead of 0Table
pub const FLAG_WHICH_TABLE_STREAM: u16 = 0x0200;

/// Index of cbMac within rgLw
const LW_CB_MAC: usize = 0;
/// Index of ccpText within rgLw
const LW_CCP_TEXT: usize = 3;

/// An (offset, length) pair from FibRgFcLcb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FcLcb {
    pub fc: u32,
    pub lcb: u32,
}

impl FcLcb {
    #[inline]
    pub fn new(fc: u32, lcb: u32) -> Self {
        Self { fc, lcb }
    }

    /// A pair is absent when either half is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fc == 0 || self.lcb == 0
    }

    /// Exclusive end offset.
    #[inline]
    pub fn end(&self) -> u64 {
        u64::from(self.fc) + u64::from(self.lcb)
    }

    /// The bytes this pair names inside `stream`.
    pub fn slice<'a>(&self, stream: &'a [u8], table: &'static str) -> Result<&'a [u8]> {
        binary::slice_at(stream, self.fc as usize, self.lcb as usize).map_err(|_| {
            Error::malformed(
                table,
                format!(
                    "span 0x{:X}+{} outside stream of {} bytes",
                    self.fc,
                    self.lcb,
                    stream.len()
                ),
            )
        })
    }
}

/// The tables this crate reads and writes, by FibRgFcLcb index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FibTable {
    StyleSheet,
    SectionTable,
    ChpBinTable,
    PapBinTable,
    FontTable,
    DocumentProperties,
    Clx,
    ListData,
    ListOverrides,
}

impl FibTable {
    /// Every table, in write order.
    pub const WRITE_ORDER: [FibTable; 9] = [
        FibTable::StyleSheet,
        FibTable::Clx,
        FibTable::ChpBinTable,
        FibTable::PapBinTable,
        FibTable::SectionTable,
        FibTable::ListData,
        FibTable::ListOverrides,
        FibTable::FontTable,
        FibTable::DocumentProperties,
    ];

    /// Position of the pair in FibRgFcLcb.
    pub const fn index(self) -> usize {
        match self {
            FibTable::StyleSheet => 1,
            FibTable::SectionTable => 6,
            FibTable::ChpBinTable => 12,
            FibTable::PapBinTable => 13,
            FibTable::FontTable => 15,
            FibTable::DocumentProperties => 31,
            FibTable::Clx => 33,
            FibTable::ListData => 73,
            FibTable::ListOverrides => 74,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            FibTable::StyleSheet => "style sheet",
            FibTable::SectionTable => "section table",
            FibTable::ChpBinTable => "character bin table",
            FibTable::PapBinTable => "paragraph bin table",
            FibTable::FontTable => "font table",
            FibTable::DocumentProperties => "document properties",
            FibTable::Clx => "piece table",
            FibTable::ListData => "list data",
            FibTable::ListOverrides => "list overrides",
        }
    }
}

/// File Information Block.
///
/// # Structure
///
/// - Bytes 0-31: FibBase (wIdent, nFib, lid, flags, fcMin, fcMac)
/// - csw + rgW (u16 array)
/// - cslw + rgLw (u32 array; cbMac, ccpText, ...)
/// - cbRgFcLcb + FibRgFcLcb (pairs of u32)
/// - cswNew + rgCswNew (u16 array)
///
/// The whole region is kept as bytes so fields this crate does not model
/// survive a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInformationBlock {
    pub(crate) data: Vec<u8>,
    pub(crate) rg_lw_offset: usize,
    pub(crate) cslw: usize,
    pub(crate) fc_lcb_offset: usize,
    pub(crate) fc_lcb_count: usize,
}

impl FileInformationBlock {
    /// Parse a FIB from the start of the WordDocument stream.
    ///
    /// Only the structure is checked here; whether the block describes a
    /// supported document is answered by [`is_valid`](Self::is_valid) and
    /// [`is_encrypted`](Self::is_encrypted).
    pub fn parse(word_document: &[u8]) -> Result<Self> {
        let available = word_document.len();
        let count_at = |offset: usize| -> Result<usize> {
            binary::read_u16_le(word_document, offset)
                .map(usize::from)
                .map_err(|_| Error::TruncatedHeader {
                    needed: offset + 2,
                    available,
                })
        };

        if available < FIB_BASE_SIZE {
            return Err(Error::TruncatedHeader {
                needed: FIB_BASE_SIZE,
                available,
            });
        }

        let csw = count_at(FIB_BASE_SIZE)?;
        let cslw_offset = FIB_BASE_SIZE + 2 + csw * 2;
        let cslw = count_at(cslw_offset)?;
        let rg_lw_offset = cslw_offset + 2;
        let fc_lcb_count_offset = rg_lw_offset + cslw * 4;
        let fc_lcb_count = count_at(fc_lcb_count_offset)?;
        let fc_lcb_offset = fc_lcb_count_offset + 2;
        let csw_new_offset = fc_lcb_offset + fc_lcb_count * 8;
        let csw_new = count_at(csw_new_offset)?;
        let end = csw_new_offset + 2 + csw_new * 2;
        if end > available {
            return Err(Error::TruncatedHeader {
                needed: end,
                available,
            });
        }
        if cslw <= LW_CCP_TEXT {
            return Err(Error::malformed(
                "header block",
                format!("rgLw holds {} values, ccpText needs {}", cslw, LW_CCP_TEXT + 1),
            ));
        }

        Ok(Self {
            data: word_document[..end].to_vec(),
            rg_lw_offset,
            cslw,
            fc_lcb_offset,
            fc_lcb_count,
        })
    }

    fn u16_at(&self, offset: usize) -> u16 {
        binary::read_u16_le(&self.data, offset).unwrap_or(0)
    }

    fn u32_at(&self, offset: usize) -> u32 {
        binary::read_u32_le(&self.data, offset).unwrap_or(0)
    }

    #[inline]
    pub fn magic(&self) -> u16 {
        self.u16_at(0)
    }

    /// Get the file format version.
    ///
    /// Common values:
    /// - 0x00C1 (193): Word 97 through Word 2003
    /// - 0x0101 (257): Word 2007
    /// - 0x0112 (274): Word 2010+
    #[inline]
    pub fn version(&self) -> u16 {
        self.u16_at(2)
    }

    #[inline]
    pub fn flags(&self) -> u16 {
        self.u16_at(FLAGS_OFFSET)
    }

    /// A Word 97 or later header block.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic() == WORD97_MAGIC && self.version() >= MIN_NFIB
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.flags() & FLAG_ENCRYPTED != 0
    }

    /// Returns `true` for "1Table", `false` for "0Table".
    #[inline]
    pub fn which_table_stream(&self) -> bool {
        self.flags() & FLAG_WHICH_TABLE_STREAM != 0
    }

    /// Name of the table stream this block points into.
    #[inline]
    pub fn table_stream_name(&self) -> &'static str {
        if self.which_table_stream() {
            super::super::TABLE_STREAM_1
        } else {
            super::super::TABLE_STREAM_0
        }
    }

    /// Offset of the first text byte in the WordDocument stream.
    #[inline]
    pub fn fc_min(&self) -> u32 {
        self.u32_at(FC_MIN_OFFSET)
    }

    /// Offset just past the last text byte.
    #[inline]
    pub fn fc_mac(&self) -> u32 {
        self.u32_at(FC_MAC_OFFSET)
    }

    /// Meaningful length of the WordDocument stream.
    #[inline]
    pub fn cb_mac(&self) -> u32 {
        self.u32_at(self.lw_offset(LW_CB_MAC))
    }

    /// Character count of the main story.
    #[inline]
    pub fn ccp_text(&self) -> u32 {
        self.u32_at(self.lw_offset(LW_CCP_TEXT))
    }

    #[inline]
    pub(crate) fn lw_offset(&self, index: usize) -> usize {
        self.rg_lw_offset + index * 4
    }

    /// Number of (fc, lcb) pairs.
    #[inline]
    pub fn fc_lcb_count(&self) -> usize {
        self.fc_lcb_count
    }

    /// Raw pair at FibRgFcLcb position `index`.
    pub fn pair(&self, index: usize) -> Option<FcLcb> {
        if index >= self.fc_lcb_count {
            return None;
        }
        let offset = self.fc_lcb_offset + index * 8;
        Some(FcLcb::new(self.u32_at(offset), self.u32_at(offset + 4)))
    }

    /// Location of `table` in the table stream, or an empty pair if the
    /// block is too short to describe it.
    #[inline]
    pub fn get(&self, table: FibTable) -> FcLcb {
        self.pair(table.index()).unwrap_or_default()
    }

    /// Bytes of the whole block.
    #[inline]
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::doc::writer::fib::FibBuilder;

    #[test]
    fn test_fib_min_size() {
        let short_data = vec![0u8; 16];
        assert!(matches!(
            FileInformationBlock::parse(&short_data),
            Err(Error::TruncatedHeader {
                needed: 32,
                available: 16
            })
        ));
    }

    #[test]
    fn test_fib_variable_region_truncated() {
        let mut data = FibBuilder::new().build();
        data.truncate(300);
        assert!(matches!(
            FileInformationBlock::parse(&data),
            Err(Error::TruncatedHeader { .. })
        ));
    }

    #[test]
    fn test_fib_magic_validation() {
        let mut data = FibBuilder::new().build();
        data[0] = 0xFF;
        data[1] = 0xFF;
        let fib = FileInformationBlock::parse(&data).unwrap();
        assert!(!fib.is_valid());
    }

    #[test]
    fn test_fib_valid() {
        let data = FibBuilder::new().ccp_text(42).build();
        let fib = FileInformationBlock::parse(&data).unwrap();
        assert!(fib.is_valid());
        assert!(!fib.is_encrypted());
        assert_eq!(fib.ccp_text(), 42);
        assert_eq!(fib.raw_data().len(), data.len());
    }

    #[test]
    fn test_fib_table_pointer() {
        let data = FibBuilder::new()
            .table(FibTable::Clx, FcLcb::new(0x200, 21))
            .build();
        let fib = FileInformationBlock::parse(&data).unwrap();
        assert_eq!(fib.get(FibTable::Clx), FcLcb::new(0x200, 21));
        assert!(fib.get(FibTable::ListData).is_empty());
        assert_eq!(fib.pair(fib.fc_lcb_count()), None);
    }

    #[test]
    fn test_fib_table_stream_flag() {
        let mut data = FibBuilder::new().build();
        data[FLAGS_OFFSET] = 0;
        data[FLAGS_OFFSET + 1] = 0;
        let fib = FileInformationBlock::parse(&data).unwrap();
        assert!(!fib.which_table_stream());
        assert_eq!(fib.table_stream_name(), "0Table");
    }
}
