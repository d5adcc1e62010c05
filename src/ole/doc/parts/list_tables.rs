//! List tables: list definitions (PlfLst) and list overrides (PlfLfo).
//!
//! Both regions are kept opaque. A document has list tables only when the
//! PlfLst pair is fully set.
//!
//! References:
//! - [MS-DOC] 2.9.149 PlfLst
//! - [MS-DOC] 2.9.148 PlfLfo
use super::fib::{FcLcb, FibTable, FileInformationBlock};
use crate::common::binary;
use crate::common::error::Result;
use bytes::Bytes;

/// The two list regions of the table stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTables {
    list_data: Bytes,
    overrides: Bytes,
}

impl ListTables {
    /// Read both regions, or `None` when the document has no lists.
    pub fn read(table_stream: &[u8], fib: &FileInformationBlock) -> Result<Option<Self>> {
        let lst = fib.get(FibTable::ListData);
        if lst.is_empty() {
            return Ok(None);
        }
        let list_data = lst.slice(table_stream, FibTable::ListData.name())?;
        let lfo = fib.get(FibTable::ListOverrides);
        let overrides = if lfo.lcb == 0 {
            &[][..]
        } else {
            lfo.slice(table_stream, FibTable::ListOverrides.name())?
        };
        Ok(Some(Self::new(
            Bytes::copy_from_slice(list_data),
            Bytes::copy_from_slice(overrides),
        )))
    }

    pub fn new(list_data: Bytes, overrides: Bytes) -> Self {
        Self {
            list_data,
            overrides,
        }
    }

    #[inline]
    pub fn list_data(&self) -> &[u8] {
        &self.list_data
    }

    #[inline]
    pub fn overrides(&self) -> &[u8] {
        &self.overrides
    }

    /// `cLst`, the number of list definitions.
    pub fn list_count(&self) -> u16 {
        binary::read_u16_le(&self.list_data, 0).unwrap_or(0)
    }

    /// `lfoMac`, the number of list overrides.
    pub fn override_count(&self) -> u32 {
        binary::read_u32_le(&self.overrides, 0).unwrap_or(0)
    }

    /// Append list data then overrides to `table`.
    pub fn write(&self, table: &mut Vec<u8>) -> (FcLcb, FcLcb) {
        let lst = FcLcb::new(table.len() as u32, self.list_data.len() as u32);
        table.extend_from_slice(&self.list_data);
        let lfo = if self.overrides.is_empty() {
            FcLcb::default()
        } else {
            FcLcb::new(table.len() as u32, self.overrides.len() as u32)
        };
        table.extend_from_slice(&self.overrides);
        (lst, lfo)
    }
}
