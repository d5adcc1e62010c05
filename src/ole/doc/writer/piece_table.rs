//! Piece Table generation for DOC files
//!
//! Writing normalizes the table: whatever fragmentation the source file had,
//! every piece's text is laid out in CP order as one contiguous ascending run
//! at the main-stream cursor. Pieces keep their encoding, descriptor and prm,
//! and the Prc entries of the source CLX are carried over verbatim.
//!
//! Based on [MS-DOC] 2.9.38 Clx and 2.9.178 Pcd.
use crate::common::binary;
use crate::common::error::{Error, Result};
use crate::ole::doc::parts::piece_table::{
    CLX_PCDT, FC_COMPRESSED, PCD_SIZE, PcdRecord, Piece, PieceTable,
};
use crate::ole::plcf::Plcf;
use bytes::Bytes;
use zerocopy::IntoBytes as _;
use zerocopy::{U16, U32};

impl PieceTable {
    /// Append every piece's text to `main` and build the CLX.
    ///
    /// Returns the relocated piece table (whose FCs describe the new layout)
    /// together with the CLX bytes.
    pub fn write(&self, main: &mut Vec<u8>) -> Result<(PieceTable, Vec<u8>)> {
        let mut pieces = Vec::with_capacity(self.pieces.len());
        let mut positions = Vec::with_capacity(self.pieces.len() + 1);
        let mut records = Vec::with_capacity(self.pieces.len());
        positions.push(self.cp_min());

        for piece in &self.pieces {
            let fc = main.len() as u32;
            let stored = encode_fc(fc, piece.is_unicode)?;
            main.extend_from_slice(piece.raw_text());

            let pcd = PcdRecord {
                descriptor: U16::new(piece.descriptor),
                fc_compressed: U32::new(stored),
                prm: U16::new(piece.prm),
            };
            records.push(Bytes::copy_from_slice(pcd.as_bytes()));
            positions.push(piece.cp_end);
            pieces.push(Piece {
                fc: Some(fc),
                ..piece.clone()
            });
        }

        let plc = Plcf::from_parts(positions, records, PCD_SIZE)?;
        let mut clx = Vec::new();
        for prc in &self.prcs {
            clx.extend_from_slice(prc);
        }
        clx.push(CLX_PCDT);
        binary::write_u32_le(&mut clx, plc.encoded_len() as u32);
        plc.write_to(&mut clx);

        Ok((
            PieceTable {
                prcs: self.prcs.clone(),
                pieces,
            },
            clx,
        ))
    }
}

/// Stored form of a piece's FC: narrow text is addressed at `fc * 2` with
/// bit 30 set.
fn encode_fc(fc: u32, is_unicode: bool) -> Result<u32> {
    if is_unicode {
        if fc >= FC_COMPRESSED {
            return Err(Error::Unsupported(format!(
                "text at 0x{:X} is beyond the addressable range of a piece",
                fc
            )));
        }
        return Ok(fc);
    }
    match fc.checked_mul(2) {
        Some(doubled) if doubled < FC_COMPRESSED => Ok(doubled | FC_COMPRESSED),
        _ => Err(Error::Unsupported(format!(
            "narrow text at 0x{:X} is beyond the addressable range of a piece",
            fc
        ))),
    }
}
