//! Style sheet (STSH) reader.
//!
//! Only the shape is interpreted: a u16 `cbStshi`, the STSHI itself (whose
//! first word is `cstd`), then `cstd` STDs each prefixed by a u16 size.
//! A zero size is an empty slot. Style contents stay opaque.
//!
//! References:
//! - [MS-DOC] 2.9.271 STSH
//! - [MS-DOC] 2.9.272 STSHI
use super::fib::FcLcb;
use crate::common::binary;
use crate::common::error::{Error, Result};
use crate::ole::doc::options::DocOptions;
use bytes::Bytes;

const TABLE: &str = "style sheet";

/// sti of the Normal style
pub const STI_NORMAL: u16 = 0;

/// Parsed style sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    stshi: Bytes,
    stds: Vec<Bytes>,
    /// Bytes after the last STD, kept for the round trip
    tail: Bytes,
}

impl StyleSheet {
    pub fn read(table_stream: &[u8], span: FcLcb, options: &DocOptions) -> Result<Self> {
        if span.lcb == 0 {
            return Ok(Self::default());
        }
        let region = span.slice(table_stream, TABLE)?;

        let cb_stshi = binary::read_u16_le(region, 0)? as usize;
        options.check_allocation(cb_stshi)?;
        let stshi = binary::slice_at(region, 2, cb_stshi).map_err(|_| {
            Error::malformed(TABLE, format!("STSHI of {} bytes overruns the table", cb_stshi))
        })?;
        let cstd = binary::read_u16_le(stshi, 0).map_err(|_| {
            Error::malformed(TABLE, format!("STSHI of {} bytes has no style count", cb_stshi))
        })? as usize;

        let mut offset = 2 + cb_stshi;
        let mut stds = Vec::with_capacity(cstd.min(region.len() / 2));
        for istd in 0..cstd {
            let cb_std = binary::read_u16_le(region, offset).map_err(|_| {
                Error::malformed(TABLE, format!("style {} of {} starts past the end", istd, cstd))
            })? as usize;
            options.check_allocation(cb_std)?;
            let std = binary::slice_at(region, offset + 2, cb_std).map_err(|_| {
                Error::malformed(TABLE, format!("style {} of {} bytes overruns the table", istd, cb_std))
            })?;
            stds.push(Bytes::copy_from_slice(std));
            offset += 2 + cb_std;
        }

        Ok(Self {
            stshi: Bytes::copy_from_slice(stshi),
            stds,
            tail: Bytes::copy_from_slice(&region[offset..]),
        })
    }

    pub(crate) fn from_parts(stshi: Bytes, stds: Vec<Bytes>) -> Self {
        Self {
            stshi,
            stds,
            tail: Bytes::new(),
        }
    }

    /// Whether the document carried a style sheet at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stshi.is_empty() && self.stds.is_empty()
    }

    #[inline]
    pub fn stshi(&self) -> &[u8] {
        &self.stshi
    }

    /// Number of style slots.
    #[inline]
    pub fn count(&self) -> usize {
        self.stds.len()
    }

    /// Raw STD at `istd`; `None` for an empty slot or an index past the end.
    pub fn std(&self, istd: u16) -> Option<&[u8]> {
        self.stds
            .get(istd as usize)
            .filter(|std| !std.is_empty())
            .map(|std| std.as_ref())
    }

    /// Style identifier (low 12 bits of the first word) of the style at `istd`.
    pub fn sti(&self, istd: u16) -> Option<u16> {
        self.std(istd)
            .and_then(|std| binary::read_u16_le(std, 0).ok())
            .map(|word| word & 0x0FFF)
    }

    pub(crate) fn stds(&self) -> &[Bytes] {
        &self.stds
    }

    pub(crate) fn tail(&self) -> &[u8] {
        &self.tail
    }
}
