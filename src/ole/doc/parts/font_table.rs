//! Font table (SttbfFfn) reader.
//!
//! `cData` FFNs follow a two-word header. Each FFN starts with `cbFfnM1`,
//! the structure size minus one; the zero-terminated UTF-16 font name sits
//! after the 40-byte fixed part.
//!
//! References:
//! - [MS-DOC] 2.9.283 SttbfFfn
//! - [MS-DOC] 2.9.82 FFN
use super::fib::FcLcb;
use crate::common::binary;
use crate::common::error::{Error, Result};
use bytes::Bytes;
use encoding_rs::UTF_16LE;

const TABLE: &str = "font table";

/// Bytes before `xszFfn` in an FFN.
pub const FFN_FIXED_SIZE: usize = 40;

/// Parsed font table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontTable {
    ffns: Vec<Bytes>,
    /// Per-entry extra data, `cbExtra` bytes each
    extras: Vec<Bytes>,
    cb_extra: u16,
}

impl FontTable {
    pub fn read(table_stream: &[u8], span: FcLcb) -> Result<Self> {
        if span.lcb == 0 {
            return Ok(Self::default());
        }
        let region = span.slice(table_stream, TABLE)?;
        let count = binary::read_u16_le(region, 0)? as usize;
        let cb_extra = binary::read_u16_le(region, 2)?;

        let mut ffns = Vec::with_capacity(count.min(region.len()));
        let mut extras = Vec::with_capacity(count.min(region.len()));
        let mut offset = 4;
        for index in 0..count {
            let size = binary::read_u8(region, offset).map_err(|_| {
                Error::malformed(TABLE, format!("font {} of {} starts past the end", index, count))
            })? as usize
                + 1;
            let ffn = binary::slice_at(region, offset, size).map_err(|_| {
                Error::malformed(TABLE, format!("font {} of {} bytes overruns the table", index, size))
            })?;
            offset += size;
            let extra = binary::slice_at(region, offset, cb_extra as usize)?;
            offset += cb_extra as usize;
            ffns.push(Bytes::copy_from_slice(ffn));
            extras.push(Bytes::copy_from_slice(extra));
        }
        if offset != region.len() {
            log::warn!(
                "font table declares {} bytes, {} used by {} fonts",
                region.len(),
                offset,
                count
            );
        }

        Ok(Self {
            ffns,
            extras,
            cb_extra,
        })
    }

    pub(crate) fn from_ffns(ffns: Vec<Bytes>) -> Self {
        let extras = vec![Bytes::new(); ffns.len()];
        Self {
            ffns,
            extras,
            cb_extra: 0,
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.ffns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ffns.is_empty()
    }

    /// Raw FFN at `index`.
    pub fn ffn(&self, index: usize) -> Option<&[u8]> {
        self.ffns.get(index).map(|ffn| ffn.as_ref())
    }

    /// Primary font name of the FFN at `index`.
    pub fn name(&self, index: usize) -> Option<String> {
        let ffn = self.ffns.get(index)?;
        let raw = ffn.get(FFN_FIXED_SIZE..)?;
        let len = raw
            .chunks_exact(2)
            .position(|unit| unit == [0, 0])
            .map_or(raw.len() - raw.len() % 2, |units| units * 2);
        let (name, _) = UTF_16LE.decode_without_bom_handling(&raw[..len]);
        Some(name.into_owned())
    }

    pub(crate) fn parts(&self) -> (u16, &[Bytes], &[Bytes]) {
        (self.cb_extra, &self.ffns, &self.extras)
    }
}
