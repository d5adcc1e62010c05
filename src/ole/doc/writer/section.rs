//! Section table (PLCF of SEDs) generation for DOC files
//!
//! SEPXs land in the WordDocument stream, each as a u16 size followed by its
//! grpprl, and the PlcfSed in the table stream points back at them.
//! Based on [MS-DOC] 2.8.26 PlcfSed and 2.9.260 Sed.
use super::sprm::SprmBuilder;
use crate::common::binary;
use crate::common::error::{Error, Result};
use crate::ole::doc::parts::fib::FcLcb;
use crate::ole::doc::parts::section_table::{NO_SEPX, SED_SIZE, SectionTable};
use crate::ole::plcf::Plcf;
use crate::ole::sprm_operations::{SPRM_S_BKC, SPRM_S_C_COLUMNS, SPRM_S_F_TITLE_PAGE};
use zerocopy::U32;

/// Build a SEPX grpprl with the common section SPRMs.
///
/// - `title_page` emits `sprmSFTitlePage` to enable a distinct first page.
/// - `columns` above 1 emits `sprmSCcolumns`.
/// - `break_code` other than 2 (new page) emits `sprmSBkc`.
pub fn generate_sepx(title_page: bool, columns: u16, break_code: u8) -> Vec<u8> {
    let mut builder = SprmBuilder::new();
    if break_code != 2 {
        builder.add_byte(SPRM_S_BKC, break_code);
    }
    if title_page {
        builder.add_bool(SPRM_S_F_TITLE_PAGE, true);
    }
    if columns > 1 {
        builder.add_word(SPRM_S_C_COLUMNS, columns - 1);
    }
    builder.build()
}

impl SectionTable {
    /// Write every SEPX to `main` and the PlcfSed to `table`.
    ///
    /// Returns the span of the PlcfSed in the table stream; an empty table
    /// writes nothing.
    pub fn write(&self, main: &mut Vec<u8>, table: &mut Vec<u8>) -> Result<FcLcb> {
        if self.is_empty() {
            return Ok(FcLcb::default());
        }

        let mut records = Vec::with_capacity(self.count());
        for index in 0..self.count() {
            let mut sed = self.descriptor(index)?;
            let slot = sed.fc_sepx.get();
            if slot != NO_SEPX {
                let grpprl = self.sepxs().get(slot as usize).ok_or_else(|| {
                    Error::malformed("section table", format!("unknown SEPX slot {}", slot))
                })?;
                let size = u16::try_from(grpprl.len()).map_err(|_| {
                    Error::Unsupported(format!("{}-byte SEPX does not fit a u16 size", grpprl.len()))
                })?;
                binary::pad_to(main, 2);
                sed.fc_sepx = U32::new(main.len() as u32);
                binary::write_u16_le(main, size);
                main.extend_from_slice(grpprl);
            }
            records.push(sed.to_record());
        }

        let plcf = Plcf::from_parts(self.plcf().positions().to_vec(), records, SED_SIZE)?;
        let fc = table.len() as u32;
        plcf.write_to(table);
        let span = FcLcb::new(fc, plcf.encoded_len() as u32);
        log::debug!("PlcfSed: {} sections at {:?}", self.count(), span);
        Ok(span)
    }
}
