/// Piece Table parser for DOC files.
///
/// The piece table maps Character Positions (CP) to File Characters (FC)
/// in the WordDocument stream, handling text stored in different locations.
/// Incrementally saved files leave pieces scattered through the stream in
/// any order and with mixed encodings, so nothing here assumes the physical
/// ranges ascend or that text is single-byte.
///
/// References:
/// - [MS-DOC] 2.9.38 Clx (Complex file information)
/// - [MS-DOC] 2.9.177 PlcPcd
/// - [MS-DOC] 2.9.178 Pcd (Piece Descriptor)
use crate::common::binary::{read_i16_le, read_u32_le, read_u8};
use crate::common::error::{Error, Result};
use crate::ole::doc::StreamKind;
use crate::ole::plcf::Plcf;
use bytes::Bytes;
use encoding_rs::{UTF_16LE, WINDOWS_1252};
use zerocopy::FromBytes as _;
use zerocopy::{LE, U16, U32};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Clx entry holding a grpprl referenced by a piece's prm.
pub(crate) const CLX_PRC: u8 = 0x01;
/// Clx entry holding the PlcPcd.
pub(crate) const CLX_PCDT: u8 = 0x02;

/// Bit 30 of the stored fc: the piece is 8-bit text at fc / 2.
pub(crate) const FC_COMPRESSED: u32 = 0x4000_0000;
const FC_MASK: u32 = 0x3FFF_FFFF;

/// Size of one PCD record.
pub const PCD_SIZE: usize = 8;

/// On-disk layout of a piece descriptor.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub(crate) struct PcdRecord {
    pub(crate) descriptor: U16<LE>,
    pub(crate) fc_compressed: U32<LE>,
    pub(crate) prm: U16<LE>,
}

/// Where a piece's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalRange {
    pub stream: StreamKind,
    pub start: u32,
    pub end: u32,
}

impl PhysicalRange {
    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// A text piece - maps a range of CPs to an FC in the WordDocument stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// Start character position (CP)
    pub cp_start: u32,
    /// End character position (CP), exclusive
    pub cp_end: u32,
    /// Byte offset of the first character in the WordDocument stream.
    /// `None` for text inserted by an edit and not yet written.
    pub fc: Option<u32>,
    /// Whether the text is UTF-16LE (true) or single-byte (false)
    pub is_unicode: bool,
    /// PCD flag bits, carried through unchanged
    pub descriptor: u16,
    /// Property modifier, carried through unchanged
    pub prm: u16,
    /// The piece's encoded text
    pub(crate) text: Bytes,
}

impl Piece {
    /// Bytes per character.
    #[inline]
    pub fn width(&self) -> u32 {
        if self.is_unicode { 2 } else { 1 }
    }

    /// Get the length in characters.
    #[inline]
    pub fn len(&self) -> u32 {
        self.cp_end - self.cp_start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cp_end <= self.cp_start
    }

    #[inline]
    pub fn contains(&self, cp: u32) -> bool {
        self.cp_start <= cp && cp < self.cp_end
    }

    /// Byte range of the piece in the main stream, if it has been placed.
    #[inline]
    pub fn physical_range(&self) -> Option<PhysicalRange> {
        self.fc.map(|fc| PhysicalRange {
            stream: StreamKind::Main,
            start: fc,
            end: fc + self.len() * self.width(),
        })
    }

    /// Convert a CP within this piece (end inclusive) to an FC.
    pub fn cp_to_fc(&self, cp: u32) -> Option<u32> {
        if cp < self.cp_start || cp > self.cp_end {
            return None;
        }
        self.fc.map(|fc| fc + (cp - self.cp_start) * self.width())
    }

    /// Encoded text bytes.
    #[inline]
    pub fn raw_text(&self) -> &[u8] {
        &self.text
    }

    /// Decoded text.
    pub fn text(&self) -> String {
        let encoding = if self.is_unicode { UTF_16LE } else { WINDOWS_1252 };
        let (text, _) = encoding.decode_without_bom_handling(&self.text);
        text.into_owned()
    }

    /// The part of this piece from character `offset` on.
    fn tail(&self, offset: u32) -> Piece {
        let byte_offset = (offset * self.width()) as usize;
        Piece {
            cp_start: self.cp_start + offset,
            fc: self.fc.map(|fc| fc + byte_offset as u32),
            text: self.text.slice(byte_offset..),
            ..self.clone()
        }
    }

    /// The part of this piece before character `offset`.
    fn head(&self, offset: u32) -> Piece {
        let byte_offset = (offset * self.width()) as usize;
        Piece {
            cp_end: self.cp_start + offset,
            text: self.text.slice(..byte_offset),
            ..self.clone()
        }
    }
}

/// Piece Table - manages the mapping between CP and FC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceTable {
    /// Prc entries preceding the Pcdt, verbatim including their headers
    pub(crate) prcs: Vec<Bytes>,
    /// All text pieces, sorted by CP and contiguous
    pub(crate) pieces: Vec<Piece>,
}

impl PieceTable {
    /// Parse a piece table from the CLX at `clx` and load each piece's text
    /// from `main`.
    pub fn parse(clx: &[u8], main: &[u8]) -> Result<Self> {
        let mut offset = 0;
        let mut prcs = Vec::new();

        while read_u8(clx, offset).ok() == Some(CLX_PRC) {
            let size = read_i16_le(clx, offset + 1)?;
            if size < 0 {
                return Err(Error::malformed(
                    "piece table",
                    format!("Prc at {} declares negative size {}", offset, size),
                ));
            }
            let end = offset + 3 + size as usize;
            if end > clx.len() {
                return Err(Error::malformed(
                    "piece table",
                    format!("Prc at {} runs past CLX of {} bytes", offset, clx.len()),
                ));
            }
            prcs.push(Bytes::copy_from_slice(&clx[offset..end]));
            offset = end;
        }

        let marker = read_u8(clx, offset)?;
        if marker != CLX_PCDT {
            return Err(Error::malformed(
                "piece table",
                format!("expected Pcdt marker at {}, found 0x{:02X}", offset, marker),
            ));
        }
        let lcb = read_u32_le(clx, offset + 1)? as usize;
        let plc = Plcf::decode(clx, offset + 5, lcb, PCD_SIZE)?;

        let mut pieces = Vec::with_capacity(plc.count());
        for (cp_start, cp_end, record) in plc.runs() {
            let pcd = PcdRecord::read_from_bytes(record).map_err(|_| {
                Error::malformed("piece table", "piece descriptor of unexpected size")
            })?;
            let stored = pcd.fc_compressed.get();
            let is_unicode = stored & FC_COMPRESSED == 0;
            let fc = if is_unicode {
                stored & FC_MASK
            } else {
                (stored & FC_MASK) / 2
            };
            let width = if is_unicode { 2 } else { 1 };
            let start = fc as usize;
            let end = start + (cp_end - cp_start) as usize * width;
            let text = main.get(start..end).ok_or_else(|| {
                Error::malformed(
                    "piece table",
                    format!(
                        "piece [{}, {}) at bytes {}..{} outside main stream of {} bytes",
                        cp_start,
                        cp_end,
                        start,
                        end,
                        main.len()
                    ),
                )
            })?;
            pieces.push(Piece {
                cp_start,
                cp_end,
                fc: Some(fc),
                is_unicode,
                descriptor: pcd.descriptor.get(),
                prm: pcd.prm.get(),
                text: Bytes::copy_from_slice(text),
            });
        }

        Ok(Self { prcs, pieces })
    }

    /// Get all text pieces.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Prc entries carried through from the source CLX.
    #[inline]
    pub fn prcs(&self) -> &[Bytes] {
        &self.prcs
    }

    /// First covered CP.
    #[inline]
    pub fn cp_min(&self) -> u32 {
        self.pieces.first().map(|p| p.cp_start).unwrap_or(0)
    }

    /// Get the total number of characters (last CP).
    #[inline]
    pub fn total_cps(&self) -> u32 {
        self.pieces.last().map(|p| p.cp_end).unwrap_or(0)
    }

    /// Index of the piece containing `cp`.
    fn index_of(&self, cp: u32) -> Result<usize> {
        let index = self.pieces.partition_point(|p| p.cp_end <= cp);
        match self.pieces.get(index) {
            Some(piece) if piece.contains(cp) => Ok(index),
            _ => Err(Error::PositionNotFound {
                position: cp,
                start: self.cp_min(),
                end: self.total_cps(),
            }),
        }
    }

    /// Find the text piece containing a given CP.
    pub fn piece_containing(&self, cp: u32) -> Result<&Piece> {
        self.index_of(cp).map(|i| &self.pieces[i])
    }

    /// Byte range of `piece` in the main stream.
    ///
    /// Fails for text inserted since the table was opened or written.
    pub fn physical_range(&self, piece: &Piece) -> Result<PhysicalRange> {
        piece.physical_range().ok_or_else(|| unplaced(piece))
    }

    /// Convert a CP to an FC.
    pub fn cp_to_fc(&self, cp: u32) -> Result<u32> {
        let piece = self.piece_containing(cp)?;
        piece.cp_to_fc(cp).ok_or_else(|| unplaced(piece))
    }

    /// CP ranges whose bytes fall inside `[fc_start, fc_end)`, in piece order.
    ///
    /// A byte range can map to several CP ranges when pieces are scattered;
    /// the ranges come back unsorted relative to each other only if the
    /// pieces themselves are out of physical order.
    pub fn fc_to_cp_ranges(&self, fc_start: u32, fc_end: u32) -> Vec<(u32, u32)> {
        let mut ranges = Vec::new();
        for piece in &self.pieces {
            let Some(range) = piece.physical_range() else {
                continue;
            };
            let lo = fc_start.max(range.start);
            let hi = fc_end.min(range.end);
            if lo >= hi {
                continue;
            }
            let width = piece.width();
            let cp_lo = piece.cp_start + (lo - range.start) / width;
            let cp_hi = piece.cp_start + (hi - range.start).div_ceil(width);
            if cp_lo < cp_hi {
                ranges.push((cp_lo, cp_hi));
            }
        }
        ranges
    }

    /// Extract the document text.
    pub fn text(&self) -> String {
        self.pieces.iter().map(Piece::text).collect()
    }

    /// Shift every piece down by `shift` CPs.
    pub fn rebase(&mut self, shift: u32) {
        for piece in &mut self.pieces {
            piece.cp_start = piece.cp_start.saturating_sub(shift);
            piece.cp_end = piece.cp_end.saturating_sub(shift);
        }
    }

    /// Replace `removed` characters at `start` with `inserted`.
    ///
    /// Inserted text becomes a UTF-16 piece; surrounding pieces are split
    /// where needed and keep their encoding, descriptor and prm. Returns the
    /// signed change in document length.
    pub fn splice(&mut self, start: u32, removed: u32, inserted: &str) -> Result<i64> {
        let end = start
            .checked_add(removed)
            .filter(|&end| start >= self.cp_min() && end <= self.total_cps())
            .ok_or(Error::PositionNotFound {
                position: start.saturating_add(removed),
                start: self.cp_min(),
                end: self.total_cps(),
            })?;

        let units: Vec<u16> = inserted.encode_utf16().collect();
        let inserted_len = units.len() as u32;
        if removed == 0 && inserted_len == 0 {
            return Ok(0);
        }
        let origin = self.cp_min();

        let mut spliced = Vec::with_capacity(self.pieces.len() + 2);
        let mut placed = false;
        for piece in self.pieces.drain(..) {
            if piece.cp_end <= start {
                spliced.push(piece);
                continue;
            }
            if piece.cp_start < start {
                spliced.push(piece.head(start - piece.cp_start));
            }
            if !placed {
                push_inserted(&mut spliced, &units);
                placed = true;
            }
            if piece.cp_end > end {
                let offset = end.saturating_sub(piece.cp_start);
                spliced.push(piece.tail(offset));
            }
        }
        if !placed {
            push_inserted(&mut spliced, &units);
        }

        let mut cp = origin;
        for piece in &mut spliced {
            let len = piece.text.len() as u32 / piece.width();
            piece.cp_start = cp;
            piece.cp_end = cp + len;
            cp += len;
        }
        spliced.retain(|p| !p.is_empty());
        self.pieces = spliced;
        Ok(i64::from(inserted_len) - i64::from(removed))
    }
}

fn unplaced(piece: &Piece) -> Error {
    Error::Unsupported(format!(
        "piece [{}, {}) has no location until the document is written",
        piece.cp_start, piece.cp_end
    ))
}

fn push_inserted(pieces: &mut Vec<Piece>, units: &[u16]) {
    if units.is_empty() {
        return;
    }
    let mut text = Vec::with_capacity(units.len() * 2);
    for unit in units {
        text.extend_from_slice(&unit.to_le_bytes());
    }
    pieces.push(Piece {
        cp_start: 0,
        cp_end: units.len() as u32,
        fc: None,
        is_unicode: true,
        descriptor: 0,
        prm: 0,
        text: Bytes::from(text),
    });
}
