/// Character and paragraph bin tables.
///
/// On disk a bin table is two-level:
/// 1. PlcfBteChpx / PlcfBtePapx: FC boundaries and the page number of the
///    FKP covering each span
/// 2. FKP pages in the WordDocument stream holding the actual runs
///
/// In memory both levels collapse into one range table over character
/// positions whose records point into a deduplicated grpprl store. FC spans
/// are translated through the piece table at open, so scattered pieces and
/// mixed encodings are resolved once and lookups never touch file offsets.
///
/// References:
/// - [MS-DOC] 2.8.5 PlcfBteChpx
/// - [MS-DOC] 2.8.6 PlcfBtePapx
/// - [MS-DOC] 2.9.180 PnFkpChpx
use super::chp::CharacterProperties;
use super::fkp::{ChpxFkp, FKP_PAGE_SIZE, FkpRun, PapxFkp};
use super::fib::FcLcb;
use super::pap::ParagraphProperties;
use super::piece_table::PieceTable;
use super::property_engine::{ApplyStats, HasBases, PropertyRecord, apply_with_stats};
use crate::common::binary;
use crate::common::error::{Error, Result};
use crate::ole::doc::options::DocOptions;
use crate::ole::doc::writer::fkp::{paginate_chpx, paginate_papx};
use crate::ole::plcf::Plcf;
use crate::ole::sprm::{find_sprm, parse_sprms};
use crate::ole::sprm_operations::SPRM_P_HUGE_PAPX;
use bytes::Bytes;
use std::borrow::Cow;
use std::collections::HashMap;
use std::marker::PhantomData;

/// In-memory record: grpprl index (u32) + istd (u16).
pub const BIN_RECORD_SIZE: usize = 6;

/// PlcfBte record: a page number.
pub(crate) const BTE_RECORD_SIZE: usize = 4;

/// Bits 0-21 of a PnFkp*; the rest MUST be ignored.
const PN_MASK: u32 = 0x003F_FFFF;

/// FKP flavor and property vocabulary of a bin table.
pub trait BinKind: PropertyRecord {
    /// Name used in diagnostics.
    const TABLE: &'static str;

    /// Runs stored on one FKP page.
    fn parse_page(page: &[u8]) -> Result<Vec<FkpRun>>;

    /// Lay runs out over FKP pages.
    fn paginate(runs: &[FkpRun]) -> Result<Vec<Vec<u8>>>;

    /// Check references a grpprl makes outside the FKP.
    fn validate(_grpprl: &[u8], _data: &[u8], _options: &DocOptions) -> Result<()> {
        Ok(())
    }

    /// The grpprl to apply for a stored one.
    fn expand<'a>(grpprl: &'a [u8], _data: &[u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(grpprl))
    }
}

impl BinKind for CharacterProperties {
    const TABLE: &'static str = "character bin table";

    fn parse_page(page: &[u8]) -> Result<Vec<FkpRun>> {
        ChpxFkp::parse(page).map(ChpxFkp::into_runs)
    }

    fn paginate(runs: &[FkpRun]) -> Result<Vec<Vec<u8>>> {
        paginate_chpx(runs)
    }
}

impl BinKind for ParagraphProperties {
    const TABLE: &'static str = "paragraph bin table";

    fn parse_page(page: &[u8]) -> Result<Vec<FkpRun>> {
        PapxFkp::parse(page).map(PapxFkp::into_runs)
    }

    fn paginate(runs: &[FkpRun]) -> Result<Vec<Vec<u8>>> {
        paginate_papx(runs)
    }

    fn validate(grpprl: &[u8], data: &[u8], options: &DocOptions) -> Result<()> {
        if let Some(offset) = huge_papx_offset(grpprl) {
            let size = huge_papx_size(data, offset)?;
            options.check_allocation(size)?;
            huge_papx_body(data, offset, size)?;
        }
        Ok(())
    }

    fn expand<'a>(grpprl: &'a [u8], data: &[u8]) -> Result<Cow<'a, [u8]>> {
        match huge_papx_offset(grpprl) {
            Some(offset) => {
                let size = huge_papx_size(data, offset)?;
                Ok(Cow::Owned(huge_papx_body(data, offset, size)?.to_vec()))
            },
            None => Ok(Cow::Borrowed(grpprl)),
        }
    }
}

/// Data stream offset named by sprmPHugePapx, if present.
fn huge_papx_offset(grpprl: &[u8]) -> Option<usize> {
    let sprms = parse_sprms(grpprl);
    find_sprm(&sprms, SPRM_P_HUGE_PAPX)
        .and_then(|sprm| sprm.operand_dword())
        .map(|offset| offset as usize)
}

fn huge_papx_size(data: &[u8], offset: usize) -> Result<usize> {
    binary::read_u16_le(data, offset)
        .map(usize::from)
        .map_err(|_| {
            Error::malformed(
                "paragraph bin table",
                format!(
                    "huge PAPX at {} outside data stream of {} bytes",
                    offset,
                    data.len()
                ),
            )
        })
}

fn huge_papx_body(data: &[u8], offset: usize, size: usize) -> Result<&[u8]> {
    binary::slice_at(data, offset + 2, size).map_err(|_| {
        Error::malformed(
            "paragraph bin table",
            format!(
                "huge PAPX of {} bytes at {} runs past data stream of {} bytes",
                size,
                offset,
                data.len()
            ),
        )
    })
}

/// Deduplicated grpprl storage. Index 0 is always the empty grpprl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrpprlStore {
    entries: Vec<Bytes>,
    index: HashMap<Bytes, u32>,
}

impl Default for GrpprlStore {
    fn default() -> Self {
        let mut store = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        store.intern(Bytes::new());
        store
    }
}

impl GrpprlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `grpprl`, adding it if unseen.
    pub fn intern(&mut self, grpprl: Bytes) -> u32 {
        if let Some(&index) = self.index.get(&grpprl) {
            return index;
        }
        let index = self.entries.len() as u32;
        self.entries.push(grpprl.clone());
        self.index.insert(grpprl, index);
        index
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<&Bytes> {
        self.entries.get(index as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Record stored per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BinRecord {
    pub grpprl: u32,
    pub istd: u16,
}

impl BinRecord {
    fn encode(self) -> Bytes {
        let mut out = Vec::with_capacity(BIN_RECORD_SIZE);
        binary::write_u32_le(&mut out, self.grpprl);
        binary::write_u16_le(&mut out, self.istd);
        Bytes::from(out)
    }

    fn decode(record: &[u8]) -> Result<Self> {
        Ok(Self {
            grpprl: binary::read_u32_le(record, 0)?,
            istd: binary::read_u16_le(record, 4)?,
        })
    }
}

/// One run of a bin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinRun<'a> {
    pub cp_start: u32,
    pub cp_end: u32,
    pub istd: u16,
    pub grpprl: &'a [u8],
}

/// A bin table over character positions.
#[derive(Debug, Clone)]
pub struct BinTable<P> {
    plcf: Plcf,
    store: GrpprlStore,
    /// Data stream, for huge PAPX references
    data: Bytes,
    _kind: PhantomData<P>,
}

/// CHPBinTable - character runs
pub type CharacterBinTable = BinTable<CharacterProperties>;

/// PAPBinTable - paragraph runs
pub type ParagraphBinTable = BinTable<ParagraphProperties>;

impl<P: BinKind> BinTable<P> {
    /// A table with no runs, anchored at `origin`.
    pub fn empty(origin: u32) -> Self {
        Self {
            plcf: Plcf::new(BIN_RECORD_SIZE, origin),
            store: GrpprlStore::new(),
            data: Bytes::new(),
            _kind: PhantomData,
        }
    }

    /// Build a table covering exactly `[cp_min, total)` from possibly
    /// unordered, overlapping runs.
    ///
    /// Runs are sorted by start; a run overlapping its predecessor loses the
    /// overlapped part, runs outside the window are clipped, and every gap is
    /// filled with an unformatted run.
    pub fn from_runs<I>(runs: I, cp_min: u32, total: u32, data: Bytes) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, u32, u16, Bytes)>,
    {
        let mut table = Self::empty(cp_min);
        table.data = data;

        let mut sorted: Vec<(u32, u32, BinRecord)> = runs
            .into_iter()
            .map(|(start, end, istd, grpprl)| {
                let grpprl = table.store.intern(grpprl);
                (start, end, BinRecord { grpprl, istd })
            })
            .collect();
        sorted.sort_by_key(|run| run.0);

        let gap = BinRecord::default().encode();
        let mut cursor = cp_min;
        for (start, end, record) in sorted {
            let start = start.max(cursor);
            let end = end.min(total);
            if start >= end {
                continue;
            }
            if start > cursor {
                table.plcf.push(start, gap.clone())?;
            }
            table.plcf.push(end, record.encode())?;
            cursor = end;
        }
        if cursor < total {
            table.plcf.push(total, gap)?;
        }
        Ok(table)
    }

    /// Read the bin table whose PlcfBte sits at `span` in the table stream.
    pub fn read(
        table_stream: &[u8],
        span: FcLcb,
        main: &[u8],
        pieces: &PieceTable,
        data: Bytes,
        options: &DocOptions,
    ) -> Result<Self> {
        let mut runs = Vec::new();
        if span.lcb != 0 {
            let bte = Plcf::decode(
                table_stream,
                span.fc as usize,
                span.lcb as usize,
                BTE_RECORD_SIZE,
            )?;
            for (fc_start, fc_end, record) in bte.runs() {
                let pn = binary::read_u32_le(record, 0)? & PN_MASK;
                let offset = pn as usize * FKP_PAGE_SIZE;
                let page = binary::slice_at(main, offset, FKP_PAGE_SIZE).map_err(|_| {
                    Error::malformed(
                        P::TABLE,
                        format!(
                            "FKP page {} for 0x{:X}..0x{:X} outside main stream of {} bytes",
                            pn,
                            fc_start,
                            fc_end,
                            main.len()
                        ),
                    )
                })?;
                for run in P::parse_page(page)? {
                    if run.fc_start >= run.fc_end {
                        continue;
                    }
                    P::validate(&run.grpprl, &data, options)?;
                    let ranges = pieces.fc_to_cp_ranges(run.fc_start, run.fc_end);
                    if ranges.is_empty() {
                        log::warn!(
                            "{} run 0x{:X}..0x{:X} maps to no text piece",
                            P::TABLE,
                            run.fc_start,
                            run.fc_end
                        );
                    }
                    for (cp_start, cp_end) in ranges {
                        runs.push((cp_start, cp_end, run.istd, run.grpprl.clone()));
                    }
                }
            }
        }
        Self::from_runs(runs, pieces.cp_min(), pieces.total_cps(), data)
    }

    /// The underlying range table.
    #[inline]
    pub fn plcf(&self) -> &Plcf {
        &self.plcf
    }

    #[inline]
    pub fn store(&self) -> &GrpprlStore {
        &self.store
    }

    #[inline]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Number of runs.
    #[inline]
    pub fn count(&self) -> usize {
        self.plcf.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.plcf.is_empty()
    }

    fn run(&self, index: usize) -> Result<BinRun<'_>> {
        let (cp_start, cp_end) = self
            .plcf
            .range(index)
            .ok_or_else(|| Error::malformed(P::TABLE, format!("no run {}", index)))?;
        let record = BinRecord::decode(self.plcf.property(index).unwrap_or_default())?;
        let grpprl = self.store.get(record.grpprl).ok_or_else(|| {
            Error::malformed(
                P::TABLE,
                format!("run {} names unknown grpprl {}", index, record.grpprl),
            )
        })?;
        Ok(BinRun {
            cp_start,
            cp_end,
            istd: record.istd,
            grpprl,
        })
    }

    /// Iterate all runs in position order.
    pub fn runs(&self) -> impl Iterator<Item = Result<BinRun<'_>>> + '_ {
        (0..self.count()).map(move |i| self.run(i))
    }

    /// The run containing `cp`.
    pub fn run_at(&self, cp: u32) -> Result<BinRun<'_>> {
        let index = self.plcf.lookup(cp)?;
        self.run(index)
    }

    /// Effective properties at `cp`: lookup composed with apply.
    pub fn properties_at<B: HasBases<P>>(&self, cp: u32, bases: &B) -> Result<P> {
        self.properties_with_stats(cp, bases).map(|(p, _)| p)
    }

    /// Like [`properties_at`](Self::properties_at), also reporting skipped
    /// opcodes.
    pub fn properties_with_stats<B: HasBases<P>>(
        &self,
        cp: u32,
        bases: &B,
    ) -> Result<(P, ApplyStats)> {
        let run = self.run_at(cp)?;
        let base = P::seeded(bases.bases().for_style(run.istd), run.istd);
        let grpprl = P::expand(run.grpprl, &self.data)?;
        Ok(apply_with_stats(&base, &grpprl))
    }

    /// Shift runs after `|delta|` characters were inserted or removed at
    /// `edit_start`.
    #[inline]
    pub fn adjust_for_edit(&mut self, edit_start: u32, delta: i64) {
        self.plcf.adjust_for_edit(edit_start, delta);
    }

    /// Subtract `shift` from every position.
    #[inline]
    pub fn rebase(&mut self, shift: u32) {
        self.plcf.rebase(shift);
    }

    /// Cover any text past the last run with an unformatted run.
    ///
    /// Text inserted into a document that had none lands outside every run,
    /// since an insertion at the table origin does not grow an empty table.
    pub(crate) fn extend_to(&mut self, total: u32) -> Result<()> {
        if self.plcf.end() < total {
            self.plcf.push(total, BinRecord::default().encode())?;
        }
        Ok(())
    }
}
