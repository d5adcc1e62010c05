//! Synthetic document builders shared by the unit and end-to-end tests.
//!
//! [`DocFixture`] lays a document out the way an arbitrary producer might:
//! pieces sit at caller-chosen FCs in any order, and the table stream
//! holds its tables in an order unrelated to the one the writer uses.
use crate::ole::container::MemoryContainer;
use crate::ole::doc::parts::bin_table::{BTE_RECORD_SIZE, BinKind};
use crate::ole::doc::parts::chp::CharacterProperties;
use crate::ole::doc::parts::dop::DocumentProperties;
use crate::ole::doc::parts::fib::{
    FLAG_COMPLEX, FLAG_WHICH_TABLE_STREAM, FcLcb, FibTable,
};
use crate::ole::doc::parts::fkp::{FKP_PAGE_SIZE, FkpRun};
use crate::ole::doc::parts::list_tables::ListTables;
use crate::ole::doc::parts::pap::ParagraphProperties;
use crate::ole::doc::parts::piece_table::{CLX_PCDT, FC_COMPRESSED};
use crate::ole::doc::parts::section_table::NO_SEPX;
use crate::ole::doc::parts::stylesheet::StyleSheet;
use crate::ole::doc::writer::fib::FibBuilder;
use crate::ole::doc::writer::fkp::paginate_chpx;
use crate::ole::doc::writer::font_table::FontTableBuilder;
use crate::ole::doc::{DATA_STREAM, TABLE_STREAM_0, TABLE_STREAM_1, WORD_DOCUMENT_STREAM};
use crate::ole::plcf::Plcf;
use bytes::Bytes;

/// CLX for contiguous pieces `(cp_start, cp_end, fc, is_unicode)`,
/// preceded by `prcs` verbatim.
pub(crate) fn clx_for(pieces: &[(u32, u32, u32, bool)], prcs: &[u8]) -> Vec<u8> {
    let mut positions: Vec<u32> = pieces.iter().map(|p| p.0).collect();
    positions.push(pieces.last().map_or(0, |p| p.1));
    let records = pieces
        .iter()
        .map(|&(_, _, fc, unicode)| {
            let stored = if unicode { fc } else { (fc * 2) | FC_COMPRESSED };
            let mut pcd = vec![0u8; 8];
            pcd[2..6].copy_from_slice(&stored.to_le_bytes());
            Bytes::from(pcd)
        })
        .collect();
    let plc = Plcf::from_parts(positions, records, 8).unwrap().encode();

    let mut clx = prcs.to_vec();
    clx.push(CLX_PCDT);
    clx.extend_from_slice(&(plc.len() as u32).to_le_bytes());
    clx.extend_from_slice(&plc);
    clx
}

/// Fill the byte gaps between sorted runs with unformatted runs.
fn gap_filled(mut runs: Vec<FkpRun>) -> Vec<FkpRun> {
    runs.sort_by_key(|r| r.fc_start);
    let mut out: Vec<FkpRun> = Vec::with_capacity(runs.len() * 2);
    for run in runs {
        if let Some(prev) = out.last() {
            if prev.fc_end < run.fc_start {
                out.push(FkpRun {
                    fc_start: prev.fc_end,
                    fc_end: run.fc_start,
                    istd: 0,
                    grpprl: Bytes::new(),
                });
            }
        }
        out.push(run);
    }
    out
}

/// A single-page CHPX bin table over `(fc_start, fc_end, grpprl)` runs.
///
/// Returns the PlcfBteChpx (pointing at page `pn`) and the page itself.
pub(crate) fn chpx_bin_table(runs: &[(u32, u32, Bytes)], pn: u32) -> (Vec<u8>, Vec<u8>) {
    let runs = gap_filled(
        runs.iter()
            .map(|(fc_start, fc_end, grpprl)| FkpRun {
                fc_start: *fc_start,
                fc_end: *fc_end,
                istd: 0,
                grpprl: grpprl.clone(),
            })
            .collect(),
    );
    let mut pages = paginate_chpx(&runs).unwrap();
    assert_eq!(pages.len(), 1);
    let first = runs.first().map_or(0, |r| r.fc_start);
    let last = runs.last().map_or(0, |r| r.fc_end);
    let bte = Plcf::from_parts(
        vec![first, last],
        vec![Bytes::copy_from_slice(&pn.to_le_bytes())],
        BTE_RECORD_SIZE,
    )
    .unwrap();
    (bte.encode(), pages.remove(0))
}

/// PlcfSed over `(cp_start, cp_end, fc_sepx)` sections.
pub(crate) fn plcfsed_for(sections: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut positions: Vec<u32> = sections.iter().map(|s| s.0).collect();
    positions.push(sections.last().map_or(0, |s| s.1));
    let records = sections
        .iter()
        .map(|&(_, _, fc_sepx)| {
            let mut sed = vec![0u8; 12];
            sed[2..6].copy_from_slice(&fc_sepx.to_le_bytes());
            Bytes::from(sed)
        })
        .collect();
    Plcf::from_parts(positions, records, 12).unwrap().encode()
}

#[derive(Debug, Clone)]
struct FixturePiece {
    text: String,
    fc: u32,
    unicode: bool,
}

/// Builder for a complete synthetic document.
#[derive(Debug, Clone, Default)]
pub(crate) struct DocFixture {
    pieces: Vec<FixturePiece>,
    cp_min: u32,
    chars: Vec<(u32, u32, Bytes)>,
    paras: Vec<(u32, u32, u16, Bytes)>,
    sections: Vec<(u32, u32, Option<Vec<u8>>)>,
    lists: Option<ListTables>,
    data: Option<Vec<u8>>,
    zero_table: bool,
    extra_flags: u16,
    ccp_text: Option<u32>,
}

impl DocFixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a piece whose text is stored at `fc`. FCs below 0x400 overlap
    /// the header block.
    pub(crate) fn piece(mut self, text: &str, fc: u32, unicode: bool) -> Self {
        self.pieces.push(FixturePiece {
            text: text.to_string(),
            fc,
            unicode,
        });
        self
    }

    /// CP of the first piece.
    pub(crate) fn cp_min(mut self, cp_min: u32) -> Self {
        self.cp_min = cp_min;
        self
    }

    /// Character run over absolute CPs.
    pub(crate) fn chars(mut self, cp_start: u32, cp_end: u32, grpprl: impl Into<Bytes>) -> Self {
        self.chars.push((cp_start, cp_end, grpprl.into()));
        self
    }

    /// Paragraph run over absolute CPs.
    pub(crate) fn paras(
        mut self,
        cp_start: u32,
        cp_end: u32,
        istd: u16,
        grpprl: impl Into<Bytes>,
    ) -> Self {
        self.paras.push((cp_start, cp_end, istd, grpprl.into()));
        self
    }

    pub(crate) fn section(mut self, cp_start: u32, cp_end: u32, sepx: Option<Vec<u8>>) -> Self {
        self.sections.push((cp_start, cp_end, sepx));
        self
    }

    pub(crate) fn lists(mut self, list_data: &[u8], overrides: &[u8]) -> Self {
        self.lists = Some(ListTables::new(
            Bytes::copy_from_slice(list_data),
            Bytes::copy_from_slice(overrides),
        ));
        self
    }

    pub(crate) fn data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    /// Store the tables in 0Table instead of 1Table.
    pub(crate) fn zero_table(mut self) -> Self {
        self.zero_table = true;
        self
    }

    pub(crate) fn flags(mut self, flags: u16) -> Self {
        self.extra_flags |= flags;
        self
    }

    pub(crate) fn ccp_text(mut self, ccp_text: u32) -> Self {
        self.ccp_text = Some(ccp_text);
        self
    }

    /// Whole text of the fixture, in CP order.
    pub(crate) fn text(&self) -> String {
        self.pieces.iter().map(|p| p.text.as_str()).collect()
    }

    /// `(cp_start, cp_end, fc, width)` per piece.
    fn layout(&self) -> Vec<(u32, u32, u32, u32)> {
        let mut cp = self.cp_min;
        self.pieces
            .iter()
            .map(|p| {
                let len = p.text.encode_utf16().count() as u32;
                let entry = (cp, cp + len, p.fc, if p.unicode { 2 } else { 1 });
                cp += len;
                entry
            })
            .collect()
    }

    fn fkp_runs(&self, runs: impl Iterator<Item = (u32, u32, u16, Bytes)>) -> Vec<FkpRun> {
        let layout = self.layout();
        let mut out = Vec::new();
        for (cp_start, cp_end, istd, grpprl) in runs {
            for &(p_start, p_end, fc, width) in &layout {
                let lo = cp_start.max(p_start);
                let hi = cp_end.min(p_end);
                if lo < hi {
                    out.push(FkpRun {
                        fc_start: fc + (lo - p_start) * width,
                        fc_end: fc + (hi - p_start) * width,
                        istd,
                        grpprl: grpprl.clone(),
                    });
                }
            }
        }
        gap_filled(out)
    }

    /// Append FKP pages to `main` and return the PlcfBte.
    fn bin_table<P: BinKind>(runs: &[FkpRun], main: &mut Vec<u8>) -> Vec<u8> {
        if runs.is_empty() {
            return Vec::new();
        }
        let pages = P::paginate(runs).unwrap();
        main.resize(main.len().div_ceil(FKP_PAGE_SIZE) * FKP_PAGE_SIZE, 0);
        let mut positions = Vec::new();
        let mut records = Vec::new();
        for page in pages {
            positions.push(u32::from_le_bytes([page[0], page[1], page[2], page[3]]));
            records.push(Bytes::copy_from_slice(
                &((main.len() / FKP_PAGE_SIZE) as u32).to_le_bytes(),
            ));
            main.extend_from_slice(&page);
        }
        positions.push(runs[runs.len() - 1].fc_end);
        Plcf::from_parts(positions, records, BTE_RECORD_SIZE)
            .unwrap()
            .encode()
    }

    /// Assemble the container.
    pub(crate) fn build(&self) -> MemoryContainer {
        let layout = self.layout();
        let text_end = layout
            .iter()
            .map(|&(s, e, fc, w)| (fc + (e - s) * w) as usize)
            .max()
            .unwrap_or(0x400);
        let mut main = vec![0u8; text_end.max(0x400)];
        for piece in &self.pieces {
            let at = piece.fc as usize;
            let bytes: Vec<u8> = if piece.unicode {
                piece.text.encode_utf16().flat_map(u16::to_le_bytes).collect()
            } else {
                encoding_rs::WINDOWS_1252.encode(&piece.text).0.into_owned()
            };
            main[at..at + bytes.len()].copy_from_slice(&bytes);
        }

        let chp_runs = self.fkp_runs(
            self.chars
                .iter()
                .map(|(s, e, g)| (*s, *e, 0, g.clone())),
        );
        let pap_runs = self.fkp_runs(self.paras.iter().cloned());
        let plcf_bte_chpx = Self::bin_table::<CharacterProperties>(&chp_runs, &mut main);
        let plcf_bte_papx = Self::bin_table::<ParagraphProperties>(&pap_runs, &mut main);

        let mut seds = Vec::new();
        for (cp_start, cp_end, sepx) in &self.sections {
            let fc_sepx = match sepx {
                Some(grpprl) => {
                    if main.len() % 2 != 0 {
                        main.push(0);
                    }
                    let fc = main.len() as u32;
                    main.extend_from_slice(&(grpprl.len() as u16).to_le_bytes());
                    main.extend_from_slice(grpprl);
                    fc
                }
                None => NO_SEPX,
            };
            seds.push((*cp_start, *cp_end, fc_sepx));
        }

        // Tables land in an order of their own, after some leading noise
        let mut table = vec![0xCDu8; 16];
        let mut spans = Vec::new();
        let mut place = |table: &mut Vec<u8>, kind: FibTable, bytes: &[u8]| {
            if !bytes.is_empty() {
                spans.push((kind, FcLcb::new(table.len() as u32, bytes.len() as u32)));
                table.extend_from_slice(bytes);
            }
        };

        let mut fonts = Vec::new();
        FontTableBuilder::new().build().write(&mut fonts);
        place(&mut table, FibTable::FontTable, &fonts);
        let pieces: Vec<(u32, u32, u32, bool)> = layout
            .iter()
            .zip(&self.pieces)
            .map(|(&(s, e, fc, _), p)| (s, e, fc, p.unicode))
            .collect();
        place(&mut table, FibTable::Clx, &clx_for(&pieces, &[]));
        place(&mut table, FibTable::PapBinTable, &plcf_bte_papx);
        let mut styles = Vec::new();
        StyleSheet::minimal().write(&mut styles);
        place(&mut table, FibTable::StyleSheet, &styles);
        place(&mut table, FibTable::ChpBinTable, &plcf_bte_chpx);
        if !seds.is_empty() {
            place(&mut table, FibTable::SectionTable, &plcfsed_for(&seds));
        }
        let dop = DocumentProperties::generate(true, false, false);
        place(&mut table, FibTable::DocumentProperties, dop.as_bytes());
        if let Some(lists) = &self.lists {
            place(&mut table, FibTable::ListData, lists.list_data());
            place(&mut table, FibTable::ListOverrides, lists.overrides());
        }

        let which = if self.zero_table { 0 } else { FLAG_WHICH_TABLE_STREAM };
        let fc_min = layout.iter().map(|p| p.2).min().unwrap_or(0x400);
        let ccp_text = self
            .ccp_text
            .unwrap_or_else(|| self.text().encode_utf16().count() as u32);
        let mut builder = FibBuilder::new()
            .flags(FLAG_COMPLEX | which | self.extra_flags)
            .text_window(fc_min, text_end as u32)
            .cb_mac(main.len() as u32)
            .ccp_text(ccp_text);
        for (kind, span) in spans {
            builder = builder.table(kind, span);
        }
        let fib = builder.build();
        main[..fib.len()].copy_from_slice(&fib);

        let table_name = if self.zero_table {
            TABLE_STREAM_0
        } else {
            TABLE_STREAM_1
        };
        let mut container = MemoryContainer::new()
            .with_entry(WORD_DOCUMENT_STREAM, main)
            .with_entry(table_name, table);
        if let Some(data) = &self.data {
            container = container.with_entry(DATA_STREAM, data.clone());
        }
        container
    }
}
