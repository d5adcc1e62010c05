//! Document properties (DOP).
//!
//! The block is carried as opaque bytes; a few leading flags are decoded
//! for callers that want them. [MS-DOC] 2.7.1 Dop.
use super::fib::FcLcb;
use crate::common::error::Result;
use bytes::Bytes;

const TABLE: &str = "document properties";

/// DOP block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentProperties {
    data: Bytes,
}

impl DocumentProperties {
    pub fn read(table_stream: &[u8], span: FcLcb) -> Result<Self> {
        if span.lcb == 0 {
            return Ok(Self::default());
        }
        Ok(Self::new(Bytes::copy_from_slice(span.slice(table_stream, TABLE)?)))
    }

    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn flag(&self, mask: u8) -> bool {
        self.data.first().is_some_and(|b| b & mask != 0)
    }

    /// fFacingPages
    pub fn facing_pages(&self) -> bool {
        self.flag(0x01)
    }

    /// fWidowControl
    pub fn widow_control(&self) -> bool {
        self.flag(0x02)
    }
}
