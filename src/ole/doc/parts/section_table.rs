//! Section table (PlcfSed) parser.
//!
//! A PLCF of 12-byte section descriptors (SEDs). Each SED points at a SEPX
//! in the WordDocument stream: a u16 size followed by the section's grpprl.
//! SEPXs are loaded at open; in memory the descriptor's `fcSepx` slot holds
//! an index into [`SectionTable::sepxs`] so the table survives edits without
//! tracking file offsets.
//!
//! References:
//! - [MS-DOC] 2.8.26 PlcfSed
//! - [MS-DOC] 2.9.260 Sed
use super::fib::FcLcb;
use crate::common::binary;
use crate::common::error::{Error, Result};
use crate::ole::doc::options::DocOptions;
use crate::ole::plcf::Plcf;
use bytes::Bytes;
use zerocopy::FromBytes as _;
use zerocopy::IntoBytes as _;
use zerocopy::{LE, U16, U32};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Size of one SED.
pub const SED_SIZE: usize = 12;

/// `fcSepx` value meaning "no SEPX".
pub const NO_SEPX: u32 = 0xFFFF_FFFF;

/// On-disk section descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub(crate) struct Sed {
    pub(crate) fn_flags: U16<LE>,
    pub(crate) fc_sepx: U32<LE>,
    pub(crate) fn_mpr: U16<LE>,
    pub(crate) fc_mpr: U32<LE>,
}

impl Sed {
    pub(crate) fn read(record: &[u8]) -> Result<Self> {
        Sed::read_from_bytes(record)
            .map_err(|_| Error::malformed("section table", "descriptor of unexpected size"))
    }

    pub(crate) fn to_record(self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

/// A section as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    pub cp_start: u32,
    pub cp_end: u32,
    /// Section property modifiers, if the section has any
    pub sepx: Option<&'a [u8]>,
}

/// Section table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTable {
    plcf: Plcf,
    sepxs: Vec<Bytes>,
}

impl Default for SectionTable {
    fn default() -> Self {
        Self {
            plcf: Plcf::new(SED_SIZE, 0),
            sepxs: Vec::new(),
        }
    }
}

impl SectionTable {
    /// Read the PlcfSed at `span` and load every SEPX from `main`.
    pub fn read(table_stream: &[u8], span: FcLcb, main: &[u8], options: &DocOptions) -> Result<Self> {
        if span.lcb == 0 {
            return Ok(Self::default());
        }
        let stored = Plcf::decode(table_stream, span.fc as usize, span.lcb as usize, SED_SIZE)?;

        let mut sepxs = Vec::new();
        let mut records = Vec::with_capacity(stored.count());
        for (cp_start, _, record) in stored.runs() {
            let mut sed = Sed::read(record)?;
            let fc = sed.fc_sepx.get();
            if fc != NO_SEPX {
                let size = binary::read_u16_le(main, fc as usize).map_err(|_| {
                    Error::malformed(
                        "section table",
                        format!("SEPX for section at {} lies outside the main stream", cp_start),
                    )
                })? as usize;
                options.check_allocation(size)?;
                let grpprl = binary::slice_at(main, fc as usize + 2, size).map_err(|_| {
                    Error::malformed(
                        "section table",
                        format!("SEPX of {} bytes at 0x{:X} overruns the main stream", size, fc),
                    )
                })?;
                sed.fc_sepx = U32::new(sepxs.len() as u32);
                sepxs.push(Bytes::copy_from_slice(grpprl));
            }
            records.push(sed.to_record());
        }

        let plcf = Plcf::from_parts(stored.positions().to_vec(), records, SED_SIZE)?;
        Ok(Self { plcf, sepxs })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.plcf.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.plcf.is_empty()
    }

    #[inline]
    pub fn plcf(&self) -> &Plcf {
        &self.plcf
    }

    /// Loaded SEPX grpprls, indexed by the in-memory `fcSepx`.
    #[inline]
    pub fn sepxs(&self) -> &[Bytes] {
        &self.sepxs
    }

    pub(crate) fn descriptor(&self, index: usize) -> Result<Sed> {
        Sed::read(self.plcf.property(index).unwrap_or_default())
    }

    fn section(&self, index: usize) -> Result<Section<'_>> {
        let (cp_start, cp_end) = self
            .plcf
            .range(index)
            .ok_or_else(|| Error::malformed("section table", format!("no section {}", index)))?;
        let slot = self.descriptor(index)?.fc_sepx.get();
        let sepx = if slot == NO_SEPX {
            None
        } else {
            Some(
                self.sepxs
                    .get(slot as usize)
                    .map(|b| b.as_ref())
                    .ok_or_else(|| {
                        Error::malformed("section table", format!("unknown SEPX slot {}", slot))
                    })?,
            )
        };
        Ok(Section {
            cp_start,
            cp_end,
            sepx,
        })
    }

    /// Iterate sections in order.
    pub fn sections(&self) -> impl Iterator<Item = Result<Section<'_>>> + '_ {
        (0..self.count()).map(move |i| self.section(i))
    }

    /// The section containing `cp`.
    pub fn section_at(&self, cp: u32) -> Result<Section<'_>> {
        let index = self.plcf.lookup(cp)?;
        self.section(index)
    }

    #[inline]
    pub fn adjust_for_edit(&mut self, edit_start: u32, delta: i64) {
        self.plcf.adjust_for_edit(edit_start, delta);
    }

    #[inline]
    pub fn rebase(&mut self, shift: u32) {
        self.plcf.rebase(shift);
    }
}
