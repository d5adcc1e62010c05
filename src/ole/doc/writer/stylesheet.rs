//! StyleSheet (STSH) generation for DOC files
//!
//! Based on [MS-DOC] 2.9.271. A parsed style sheet is written back slot by
//! slot; [`StyleSheet::minimal`] builds the Normal-only sheet used for new
//! documents.
use crate::common::binary;
use crate::ole::doc::parts::fib::FcLcb;
use crate::ole::doc::parts::stylesheet::{STI_NORMAL, StyleSheet};
use bytes::Bytes;

/// cbStshi for Word 97-2003
const CB_STSHI: u16 = 18;

/// cbSTDBaseInFile for Word 97-2003
const CB_STD_BASE: u16 = 10;

/// istdBase meaning "no base style"
const ISTD_NIL: u16 = 0x0FFF;

impl StyleSheet {
    /// A style sheet holding only the Normal paragraph style.
    pub fn minimal() -> Self {
        let mut stshi = Vec::with_capacity(CB_STSHI as usize);
        // cstd
        binary::write_u16_le(&mut stshi, 1);
        binary::write_u16_le(&mut stshi, CB_STD_BASE);
        // fStdStylenamesWritten
        binary::write_u16_le(&mut stshi, 1);
        // stiMaxWhenSaved, istdMaxFixedWhenSaved
        binary::write_u16_le(&mut stshi, 1);
        binary::write_u16_le(&mut stshi, 1);
        // nVerBuiltInNamesWhenSaved
        binary::write_u16_le(&mut stshi, 0);
        // ftcAsci, ftcFE, ftcOther, ftcBi
        stshi.extend_from_slice(&[0u8; 8]);

        let mut std = Vec::new();
        binary::write_u16_le(&mut std, STI_NORMAL);
        // sgc = paragraph style
        binary::write_u16_le(&mut std, 1);
        binary::write_u16_le(&mut std, ISTD_NIL);
        // cupx, bchUpe
        binary::write_u16_le(&mut std, 0);
        binary::write_u16_le(&mut std, 0);
        let name = "Normal";
        binary::write_u16_le(&mut std, name.len() as u16);
        for unit in name.encode_utf16() {
            binary::write_u16_le(&mut std, unit);
        }
        binary::pad_to(&mut std, 2);

        Self::from_parts(Bytes::from(stshi), vec![Bytes::from(std)])
    }

    /// Append the STSH to `table`.
    pub fn write(&self, table: &mut Vec<u8>) -> FcLcb {
        if self.is_empty() {
            return FcLcb::default();
        }
        let fc = table.len();
        binary::write_u16_le(table, self.stshi().len() as u16);
        table.extend_from_slice(self.stshi());
        for std in self.stds() {
            binary::write_u16_le(table, std.len() as u16);
            table.extend_from_slice(std);
        }
        table.extend_from_slice(self.tail());
        FcLcb::new(fc as u32, (table.len() - fc) as u32)
    }
}
