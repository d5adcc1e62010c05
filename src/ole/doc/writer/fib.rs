//! FIB (File Information Block) generation for DOC files
//!
//! Two entry points:
//! - [`FibBuilder`] lays out a fresh Word 97 block from scratch.
//! - The write half of [`FileInformationBlock`] rewrites a parsed block in
//!   place: offsets are cleared, re-recorded as each table is written, and
//!   the text window is finalized last.
//!
//! # Structure
//!
//! The FIB contains:
//! - Base information (version, encryption status)
//! - csw/cslw arrays (counts and sizes of various structures)
//! - FibRgFcLcb (file character positions and byte counts)
//! - FibRgCswNew (additional data)

use crate::common::binary;
use crate::common::error::{Error, Result};
use crate::ole::doc::parts::fib::{
    FC_MAC_OFFSET, FC_MIN_OFFSET, FIB_BASE_SIZE, FLAG_COMPLEX, FLAG_WHICH_TABLE_STREAM,
    FLAGS_OFFSET, FcLcb, FibTable, FileInformationBlock, MIN_NFIB, WORD97_MAGIC,
};

/// The header block occupies whole 512-byte sectors of the main stream.
pub const FIB_ALIGNMENT: usize = 512;

/// Shorts in FibRgW97
const CSW: usize = 14;
/// Longs in FibRgLw97
const CSLW: usize = 22;
/// Pairs in FibRgFcLcb97
const CB_RG_FC_LCB: usize = 0x5D;

/// Writer-side operations on a parsed header block.
impl FileInformationBlock {
    /// Bytes the block serializes to.
    #[inline]
    pub fn serialized_size(&self) -> usize {
        self.data.len()
    }

    /// Size of the main-stream region reserved for the block.
    #[inline]
    pub fn placeholder_size(&self) -> usize {
        binary::align_up(self.serialized_size(), FIB_ALIGNMENT)
    }

    /// Zero every (fc, lcb) pair before a fresh write.
    pub fn clear_offsets(&mut self) {
        let start = self.fc_lcb_offset;
        let end = start + self.fc_lcb_count * 8;
        self.data[start..end].fill(0);
    }

    /// Record where `table` was written.
    pub fn set(&mut self, table: FibTable, span: FcLcb) -> Result<()> {
        let index = table.index();
        if index >= self.fc_lcb_count {
            return Err(Error::malformed(
                "header block",
                format!(
                    "no slot for the {} (index {}, block holds {} pairs)",
                    table.name(),
                    index,
                    self.fc_lcb_count
                ),
            ));
        }
        let offset = self.fc_lcb_offset + index * 8;
        binary::put_u32_le(&mut self.data, offset, span.fc)?;
        binary::put_u32_le(&mut self.data, offset + 4, span.lcb)?;
        log::debug!(
            "{} at 0x{:X}, {} bytes",
            table.name(),
            span.fc,
            span.lcb
        );
        Ok(())
    }

    /// Select 0Table or 1Table.
    pub fn set_which_table_stream(&mut self, one_table: bool) -> Result<()> {
        let mut flags = self.flags();
        if one_table {
            flags |= FLAG_WHICH_TABLE_STREAM;
        } else {
            flags &= !FLAG_WHICH_TABLE_STREAM;
        }
        binary::put_u16_le(&mut self.data, FLAGS_OFFSET, flags)?;
        Ok(())
    }

    pub fn set_ccp_text(&mut self, ccp_text: u32) -> Result<()> {
        let offset = self.lw_offset(3);
        binary::put_u32_le(&mut self.data, offset, ccp_text)?;
        Ok(())
    }

    /// Set the text window and meaningful stream length once every table
    /// has been written.
    pub fn finalize(&mut self, fc_min: u32, fc_mac: u32, cb_mac: u32) -> Result<()> {
        binary::put_u32_le(&mut self.data, FC_MIN_OFFSET, fc_min)?;
        binary::put_u32_le(&mut self.data, FC_MAC_OFFSET, fc_mac)?;
        let cb_mac_offset = self.lw_offset(0);
        binary::put_u32_le(&mut self.data, cb_mac_offset, cb_mac)?;
        Ok(())
    }

    /// Every recorded pair must lie inside a table stream of `table_len`
    /// bytes.
    pub fn check_spans(&self, table_len: usize) -> Result<()> {
        for table in FibTable::WRITE_ORDER {
            let span = self.get(table);
            if span.lcb != 0 && span.end() > table_len as u64 {
                return Err(Error::malformed(
                    table.name(),
                    format!(
                        "recorded span 0x{:X}+{} ends past table stream of {} bytes",
                        span.fc, span.lcb, table_len
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Serialized block.
    #[inline]
    pub fn serialize(&self) -> &[u8] {
        &self.data
    }
}

/// FIB (File Information Block) builder
///
/// Produces a Word 97 layout: 14 shorts, 22 longs, 93 pairs and an empty
/// FibRgCswNew.
#[derive(Debug, Clone)]
pub struct FibBuilder {
    version: u16,
    lid: u16,
    flags: u16,
    fc_min: u32,
    fc_mac: u32,
    cb_mac: u32,
    ccp_text: u32,
    tables: Vec<(FibTable, FcLcb)>,
}

impl FibBuilder {
    /// Create a new FIB builder
    pub fn new() -> Self {
        Self {
            version: MIN_NFIB,
            // English US
            lid: 0x0409,
            flags: FLAG_WHICH_TABLE_STREAM | FLAG_COMPLEX,
            fc_min: 0,
            fc_mac: 0,
            cb_mac: 0,
            ccp_text: 0,
            tables: Vec::new(),
        }
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    /// Set main document text range
    pub fn text_window(mut self, fc_min: u32, fc_mac: u32) -> Self {
        self.fc_min = fc_min;
        self.fc_mac = fc_mac;
        self
    }

    pub fn cb_mac(mut self, cb_mac: u32) -> Self {
        self.cb_mac = cb_mac;
        self
    }

    pub fn ccp_text(mut self, ccp_text: u32) -> Self {
        self.ccp_text = ccp_text;
        self
    }

    /// Record a table location.
    pub fn table(mut self, table: FibTable, span: FcLcb) -> Self {
        self.tables.push((table, span));
        self
    }

    /// Size of the generated block.
    pub const fn size() -> usize {
        FIB_BASE_SIZE + 2 + CSW * 2 + 2 + CSLW * 4 + 2 + CB_RG_FC_LCB * 8 + 2
    }

    /// Generate the FIB as bytes
    pub fn build(&self) -> Vec<u8> {
        let mut fib = Vec::with_capacity(Self::size());

        // FibBase
        binary::write_u16_le(&mut fib, WORD97_MAGIC);
        binary::write_u16_le(&mut fib, self.version);
        // nProduct
        binary::write_u16_le(&mut fib, 0);
        binary::write_u16_le(&mut fib, self.lid);
        // pnNext
        binary::write_u16_le(&mut fib, 0);
        binary::write_u16_le(&mut fib, self.flags);
        // nFibBack
        binary::write_u16_le(&mut fib, 0x00BF);
        // lKey, envr, flags2, Chs, chsTables
        fib.resize(FC_MIN_OFFSET, 0);
        binary::write_u32_le(&mut fib, self.fc_min);
        binary::write_u32_le(&mut fib, self.fc_mac);

        binary::write_u16_le(&mut fib, CSW as u16);
        // wMagicCreated/Revised and their private twins: "jb"
        for _ in 0..4 {
            binary::write_u16_le(&mut fib, 0x6A62);
        }
        fib.resize(fib.len() + (CSW - 4) * 2, 0);

        binary::write_u16_le(&mut fib, CSLW as u16);
        for i in 0..CSLW {
            let value = match i {
                0 => self.cb_mac,
                3 => self.ccp_text,
                _ => 0,
            };
            binary::write_u32_le(&mut fib, value);
        }

        binary::write_u16_le(&mut fib, CB_RG_FC_LCB as u16);
        let pairs_start = fib.len();
        fib.resize(pairs_start + CB_RG_FC_LCB * 8, 0);
        for (table, span) in &self.tables {
            let offset = pairs_start + table.index() * 8;
            fib[offset..offset + 4].copy_from_slice(&span.fc.to_le_bytes());
            fib[offset + 4..offset + 8].copy_from_slice(&span.lcb.to_le_bytes());
        }

        // cswNew
        binary::write_u16_le(&mut fib, 0);
        fib
    }
}

impl Default for FibBuilder {
    fn default() -> Self {
        Self::new()
    }
}
