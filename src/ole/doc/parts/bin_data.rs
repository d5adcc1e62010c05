//! NilPICFAndBinData: binary data stored in the Data stream in place of a
//! picture, referenced by a character run with `fData` set.
//!
//! Layout: `lcb` (u32, total size), `cbHeader` (u16, 0x44), the rest of an
//! ignored 0x44-byte header, then `lcb - cbHeader` bytes of payload.
//!
//! References:
//! - [MS-DOC] 2.9.172 NilPICFAndBinData
use crate::common::binary;
use crate::common::error::{Error, Result};
use crate::ole::doc::options::DocOptions;
use bytes::Bytes;

const TABLE: &str = "binary data record";

/// Expected `cbHeader`.
pub const NIL_PICF_HEADER_SIZE: usize = 0x44;

/// A decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NilPicfAndBinData {
    payload: Bytes,
    /// `cbHeader` when it was not 0x44
    header_mismatch: Option<u16>,
}

impl NilPicfAndBinData {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            header_mismatch: None,
        }
    }

    /// Decode the record at `offset` in `data`.
    ///
    /// Both size fields are checked against the allocation ceiling before
    /// anything is copied. An unexpected `cbHeader` is logged and honored.
    pub fn parse(data: &[u8], offset: usize, options: &DocOptions) -> Result<Self> {
        let lcb = binary::read_u32_le(data, offset)? as usize;
        let cb_header = binary::read_u16_le(data, offset + 4)?;

        let header_mismatch = if cb_header as usize != NIL_PICF_HEADER_SIZE {
            log::warn!(
                "binary data record at {} has cbHeader 0x{:X}, expected 0x{:X}",
                offset,
                cb_header,
                NIL_PICF_HEADER_SIZE
            );
            Some(cb_header)
        } else {
            None
        };

        options.check_allocation(lcb)?;
        options.check_allocation(cb_header as usize)?;

        let header = cb_header as usize;
        if lcb < header {
            return Err(Error::malformed(
                TABLE,
                format!("lcb {} at {} is smaller than its {}-byte header", lcb, offset, header),
            ));
        }
        let payload = binary::slice_at(data, offset + header, lcb - header).map_err(|_| {
            Error::malformed(
                TABLE,
                format!(
                    "{} bytes at {} run past data stream of {} bytes",
                    lcb,
                    offset,
                    data.len()
                ),
            )
        })?;

        Ok(Self {
            payload: Bytes::copy_from_slice(payload),
            header_mismatch,
        })
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The declared `cbHeader`, if it differed from 0x44.
    #[inline]
    pub fn header_mismatch(&self) -> Option<u16> {
        self.header_mismatch
    }

    /// Encode with a zeroed 0x44-byte header.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = vec![0u8; NIL_PICF_HEADER_SIZE];
        let lcb = (self.payload.len() + NIL_PICF_HEADER_SIZE) as u32;
        out[0..4].copy_from_slice(&lcb.to_le_bytes());
        out[4..6].copy_from_slice(&(NIL_PICF_HEADER_SIZE as u16).to_le_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}
