//! DocumentProperties (DOP) generation for DOC files
//!
//! Based on [MS-DOC] 2.7.1.
use crate::ole::doc::parts::dop::DocumentProperties;
use crate::ole::doc::parts::fib::FcLcb;
use bytes::Bytes;

/// Size of a Word 97 DOP
pub const DOP_SIZE: usize = 0x1F4;

impl DocumentProperties {
    /// A Word 97 sized DOP with widow control on.
    ///
    /// - `facing_pages`: sets fFacingPages
    /// - `include_header`/`include_footer`: set the docinfo5 flags Word uses
    ///   to decide whether header and footer stories are shown
    pub fn generate(facing_pages: bool, include_header: bool, include_footer: bool) -> Self {
        let mut dop = vec![0u8; DOP_SIZE];

        // bit0: fFacingPages, bit1: fWidowControl, bits5-6: fpc, default 01
        let mut format_flags: u8 = 0x02 | 0x20;
        if facing_pages {
            format_flags |= 0x01;
        }
        dop[0x00] = format_flags;

        let mut docinfo5: u16 = 0;
        if include_header {
            docinfo5 |= 0x1000;
        }
        if include_footer {
            docinfo5 |= 0x2000;
        }
        dop[0x19A..0x19C].copy_from_slice(&docinfo5.to_le_bytes());

        Self::new(Bytes::from(dop))
    }

    /// Append the block to `table`.
    pub fn write(&self, table: &mut Vec<u8>) -> FcLcb {
        if self.is_empty() {
            return FcLcb::default();
        }
        let fc = table.len() as u32;
        table.extend_from_slice(self.as_bytes());
        FcLcb::new(fc, self.as_bytes().len() as u32)
    }
}
