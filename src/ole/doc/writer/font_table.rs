//! Font Table (STTBFFFN) generation for DOC files
//!
//! The font table lists all fonts used in the document.
//! Based on [MS-DOC] 2.9.283 SttbfFfn and 2.9.82 FFN.
use crate::common::binary;
use crate::ole::doc::parts::fib::FcLcb;
use crate::ole::doc::parts::font_table::{FFN_FIXED_SIZE, FontTable};
use bytes::Bytes;

/// Builder for STTBFFFN (Font Table)
///
/// Collects fonts by name; lookups are ASCII case-insensitive.
#[derive(Debug, Default)]
pub struct FontTableBuilder {
    fonts: Vec<String>,
}

impl FontTableBuilder {
    /// Create a new builder with default font "Times New Roman"
    pub fn new() -> Self {
        let mut b = Self { fonts: Vec::new() };
        b.get_or_add("Times New Roman");
        b
    }

    /// Get the index of a font, inserting it if not present
    pub fn get_or_add(&mut self, name: &str) -> u16 {
        if let Some(idx) = self.fonts.iter().position(|f| f.eq_ignore_ascii_case(name)) {
            return idx as u16;
        }
        self.fonts.push(name.to_string());
        (self.fonts.len() as u16) - 1
    }

    pub fn build(&self) -> FontTable {
        FontTable::from_ffns(self.fonts.iter().map(|name| Bytes::from(build_ffn(name))).collect())
    }
}

/// Build an FFN structure for a given font name (UTF-16LE, zero-terminated)
fn build_ffn(name: &str) -> Vec<u8> {
    let mut ffn = vec![0u8; FFN_FIXED_SIZE];
    // prq=2, fTrueType=1, ff=1 (Roman)
    ffn[1] = 0x02 | 0x04 | (0x01 << 4);
    // wWeight = 400
    ffn[2..4].copy_from_slice(&400u16.to_le_bytes());
    // chs = 0 (ANSI), ixchSzAlt = 0 (no alternate)

    for unit in name.encode_utf16() {
        binary::write_u16_le(&mut ffn, unit);
    }
    binary::write_u16_le(&mut ffn, 0);

    // cbFfnM1 = total length - 1
    ffn[0] = (ffn.len() as u8).wrapping_sub(1);
    ffn
}

impl FontTable {
    /// Append the SttbfFfn to `table`.
    pub fn write(&self, table: &mut Vec<u8>) -> FcLcb {
        if self.is_empty() {
            return FcLcb::default();
        }
        let (cb_extra, ffns, extras) = self.parts();
        let fc = table.len();
        binary::write_u16_le(table, ffns.len() as u16);
        binary::write_u16_le(table, cb_extra);
        for (ffn, extra) in ffns.iter().zip(extras) {
            table.extend_from_slice(ffn);
            table.extend_from_slice(extra);
        }
        FcLcb::new(fc as u32, (table.len() - fc) as u32)
    }
}
