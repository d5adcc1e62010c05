//! Bin table (PLCFBTE) generation for DOC files
//!
//! CP runs are mapped onto the freshly written text through the relocated
//! piece table, laid out over FKP pages appended to the WordDocument stream,
//! and indexed by a PlcfBte whose positions are FCs and whose records are
//! page numbers (byte offset / 512).
//! See [MS-DOC] 2.8.5 PlcfBteChpx and 2.8.6 PlcfBtePapx.
use crate::common::binary;
use crate::common::error::{Error, Result};
use crate::ole::doc::options::DocOptions;
use crate::ole::doc::parts::bin_table::{BTE_RECORD_SIZE, BinKind, BinTable};
use crate::ole::doc::parts::fib::FcLcb;
use crate::ole::doc::parts::fkp::{FKP_PAGE_SIZE, FkpRun};
use crate::ole::doc::parts::piece_table::PieceTable;
use crate::ole::doc::parts::property_engine::{HasBases, apply_with_stats, compress};
use crate::ole::plcf::Plcf;
use bytes::Bytes;

impl<P: BinKind> BinTable<P> {
    /// FKP runs over the byte layout described by `pieces`.
    ///
    /// A run spanning several pieces is split at piece boundaries. With
    /// `recompress_properties`, each grpprl is re-derived from the run's
    /// effective record unless it carries opcodes the record does not model.
    pub(crate) fn fkp_runs<B: HasBases<P>>(
        &self,
        pieces: &PieceTable,
        bases: &B,
        options: &DocOptions,
    ) -> Result<Vec<FkpRun>> {
        let mut out = Vec::with_capacity(self.count());
        for run in self.runs() {
            let run = run?;
            let grpprl = if options.recompress_properties {
                let base = P::seeded(bases.bases().for_style(run.istd), run.istd);
                let expanded = P::expand(run.grpprl, self.data())?;
                let (effective, stats) = apply_with_stats(&base, &expanded);
                if stats.unknown > 0 {
                    Bytes::copy_from_slice(run.grpprl)
                } else {
                    Bytes::from(compress(&base, &effective))
                }
            } else {
                Bytes::copy_from_slice(run.grpprl)
            };

            for piece in pieces.pieces() {
                let lo = run.cp_start.max(piece.cp_start);
                let hi = run.cp_end.min(piece.cp_end);
                if lo >= hi {
                    continue;
                }
                let (Some(fc_start), Some(fc_end)) = (piece.cp_to_fc(lo), piece.cp_to_fc(hi)) else {
                    return Err(Error::Unsupported(format!(
                        "piece [{}, {}) has not been placed in the main stream",
                        piece.cp_start, piece.cp_end
                    )));
                };
                out.push(FkpRun {
                    fc_start,
                    fc_end,
                    istd: run.istd,
                    grpprl: grpprl.clone(),
                });
            }
        }
        Ok(out)
    }

    /// Write FKP pages to `main` and the PlcfBte to `table`.
    ///
    /// `pieces` must be the piece table returned by
    /// [`PieceTable::write`], so FCs point at the new text.
    pub fn write<B: HasBases<P>>(
        &self,
        pieces: &PieceTable,
        bases: &B,
        options: &DocOptions,
        main: &mut Vec<u8>,
        table: &mut Vec<u8>,
    ) -> Result<FcLcb> {
        let runs = self.fkp_runs(pieces, bases, options)?;
        let (Some(first), Some(last)) = (runs.first(), runs.last()) else {
            return Ok(FcLcb::default());
        };
        if let Some(pair) = runs.windows(2).find(|w| w[0].fc_end != w[1].fc_start) {
            return Err(Error::malformed(
                P::TABLE,
                format!(
                    "runs 0x{:X}..0x{:X} and 0x{:X}.. are not contiguous",
                    pair[0].fc_start, pair[0].fc_end, pair[1].fc_start
                ),
            ));
        }
        let fc_end = last.fc_end;
        let fc_start = first.fc_start;

        let pages = P::paginate(&runs)?;
        binary::pad_to(main, FKP_PAGE_SIZE);
        let mut positions = Vec::with_capacity(pages.len() + 1);
        let mut records = Vec::with_capacity(pages.len());
        for page in &pages {
            let pn = (main.len() / FKP_PAGE_SIZE) as u32;
            positions.push(binary::read_u32_le(page, 0)?);
            records.push(Bytes::copy_from_slice(&pn.to_le_bytes()));
            main.extend_from_slice(page);
        }
        positions.push(fc_end);

        let bte = Plcf::from_parts(positions, records, BTE_RECORD_SIZE)?;
        let fc = table.len() as u32;
        bte.write_to(table);
        let span = FcLcb::new(fc, bte.encoded_len() as u32);
        log::debug!(
            "{}: {} runs over 0x{:X}..0x{:X} on {} FKP page(s)",
            P::TABLE,
            runs.len(),
            fc_start,
            fc_end,
            pages.len()
        );
        Ok(span)
    }
}
