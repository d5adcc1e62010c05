//! FKP (Formatted Disk Page) generation for DOC files
//!
//! FKPs store character and paragraph formatting information in a compact,
//! page-based structure. Each FKP is 512 bytes: run boundaries and offsets
//! grow from the front, property blobs are packed backward from the count
//! byte at the end. Builders accept runs until the next one would not fit,
//! and [`paginate_chpx`]/[`paginate_papx`] split a whole table into pages.

use crate::common::error::{Error, Result};
use crate::ole::doc::parts::fkp::{
    BX_SIZE, FKP_COUNT_OFFSET, FKP_PAGE_SIZE, FkpRun, MAX_CHPX_RUNS, MAX_PAPX_RUNS,
};

/// Largest grpprl a CHPX can hold (its size is a single byte).
pub const MAX_CHPX_GRPPRL: usize = 0xFF;

/// Character FKP (CHPX FKP) builder
#[derive(Debug, Default)]
pub struct ChpxFkpBuilder {
    runs: Vec<(u32, u32, Vec<u8>)>,
    /// Bytes reserved at the end of the page, alignment included
    packed: usize,
}

impl ChpxFkpBuilder {
    /// Create a new character FKP builder
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn chpx_cost(grpprl: &[u8]) -> usize {
        if grpprl.is_empty() {
            0
        } else {
            // size byte, grpprl, and one byte of word alignment
            grpprl.len() + 2
        }
    }

    /// Add a formatting run covering `[fc_start, fc_end)` if it fits on the
    /// page. Returns `false` when the page is full.
    pub fn try_add(&mut self, fc_start: u32, fc_end: u32, grpprl: &[u8]) -> bool {
        let count = self.runs.len() + 1;
        let header = (count + 1) * 4 + count;
        let packed = self.packed + Self::chpx_cost(grpprl);
        if count > MAX_CHPX_RUNS || header + packed > FKP_COUNT_OFFSET {
            return false;
        }
        self.packed = packed;
        self.runs.push((fc_start, fc_end, grpprl.to_vec()));
        true
    }

    /// First file position covered by the page.
    pub fn fc_start(&self) -> Option<u32> {
        self.runs.first().map(|r| r.0)
    }

    /// Generate the FKP as a 512-byte page
    pub fn generate(&self) -> Vec<u8> {
        let mut fkp = vec![0u8; FKP_PAGE_SIZE];
        let count = self.runs.len();
        if count == 0 {
            return fkp;
        }

        // FC array has (n+1) entries for n formatting runs
        for (i, (fc_start, _, _)) in self.runs.iter().enumerate() {
            fkp[i * 4..i * 4 + 4].copy_from_slice(&fc_start.to_le_bytes());
        }
        let fc_end = self.runs[count - 1].1;
        fkp[count * 4..count * 4 + 4].copy_from_slice(&fc_end.to_le_bytes());
        fkp[FKP_COUNT_OFFSET] = count as u8;

        let rgb_offset = (count + 1) * 4;
        let mut data_offset = FKP_COUNT_OFFSET;
        for (i, (_, _, grpprl)) in self.runs.iter().enumerate() {
            if grpprl.is_empty() {
                // rgb stays 0: no formatting
                continue;
            }
            data_offset -= 1 + grpprl.len();
            data_offset -= data_offset % 2;
            fkp[data_offset] = grpprl.len() as u8;
            fkp[data_offset + 1..data_offset + 1 + grpprl.len()].copy_from_slice(grpprl);
            // Offset in words
            fkp[rgb_offset + i] = (data_offset / 2) as u8;
        }

        fkp
    }
}

/// Paragraph FKP (PAPX FKP) builder
#[derive(Debug, Default)]
pub struct PapxFkpBuilder {
    runs: Vec<(u32, u32, Vec<u8>)>,
    packed: usize,
}

impl PapxFkpBuilder {
    /// Create a new paragraph FKP builder
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Largest istd + grpprl payload that fits on an otherwise empty page.
    pub const fn max_payload() -> usize {
        FKP_COUNT_OFFSET - 2 * 4 - BX_SIZE - 3
    }

    fn papx_cost(payload_len: usize) -> usize {
        // one or two size bytes, the payload, and alignment
        payload_len + 3
    }

    /// Add a paragraph run if it fits on the page.
    pub fn try_add(&mut self, fc_start: u32, fc_end: u32, istd: u16, grpprl: &[u8]) -> bool {
        let count = self.runs.len() + 1;
        let header = (count + 1) * 4 + count * BX_SIZE;
        let packed = self.packed + Self::papx_cost(2 + grpprl.len());
        if count > MAX_PAPX_RUNS || header + packed > FKP_COUNT_OFFSET {
            return false;
        }
        self.packed = packed;
        let mut payload = Vec::with_capacity(2 + grpprl.len());
        payload.extend_from_slice(&istd.to_le_bytes());
        payload.extend_from_slice(grpprl);
        self.runs.push((fc_start, fc_end, payload));
        true
    }

    pub fn fc_start(&self) -> Option<u32> {
        self.runs.first().map(|r| r.0)
    }

    /// Generate the FKP as a 512-byte page
    pub fn generate(&self) -> Vec<u8> {
        let mut fkp = vec![0u8; FKP_PAGE_SIZE];
        let count = self.runs.len();
        if count == 0 {
            return fkp;
        }

        for (i, (fc_start, _, _)) in self.runs.iter().enumerate() {
            fkp[i * 4..i * 4 + 4].copy_from_slice(&fc_start.to_le_bytes());
        }
        let fc_end = self.runs[count - 1].1;
        fkp[count * 4..count * 4 + 4].copy_from_slice(&fc_end.to_le_bytes());
        fkp[FKP_COUNT_OFFSET] = count as u8;

        let bx_offset = (count + 1) * 4;
        let mut papx_offset = FKP_COUNT_OFFSET;
        for (i, (_, _, payload)) in self.runs.iter().enumerate() {
            let len = payload.len();
            let odd = len % 2 == 1;
            papx_offset -= len + if odd { 1 } else { 2 };
            papx_offset -= papx_offset % 2;

            // BxPap: word offset, then a zeroed PHE
            fkp[bx_offset + i * BX_SIZE] = (papx_offset / 2) as u8;

            let mut copy_offset = papx_offset;
            if odd {
                fkp[copy_offset] = len.div_ceil(2) as u8;
                copy_offset += 1;
            } else {
                // A zero cb, then the real size in the next byte
                fkp[copy_offset + 1] = (len / 2) as u8;
                copy_offset += 2;
            }
            fkp[copy_offset..copy_offset + len].copy_from_slice(payload);
        }

        fkp
    }
}

/// Split character runs over as many pages as needed.
pub fn paginate_chpx(runs: &[FkpRun]) -> Result<Vec<Vec<u8>>> {
    let mut pages = Vec::new();
    let mut builder = ChpxFkpBuilder::new();
    for run in runs {
        if run.grpprl.len() > MAX_CHPX_GRPPRL {
            return Err(Error::Unsupported(format!(
                "character run at 0x{:X} has a {}-byte grpprl, at most {} fit in a CHPX",
                run.fc_start,
                run.grpprl.len(),
                MAX_CHPX_GRPPRL
            )));
        }
        if !builder.try_add(run.fc_start, run.fc_end, &run.grpprl) {
            pages.push(builder.generate());
            builder = ChpxFkpBuilder::new();
            builder.try_add(run.fc_start, run.fc_end, &run.grpprl);
        }
    }
    if !builder.is_empty() {
        pages.push(builder.generate());
    }
    Ok(pages)
}

/// Split paragraph runs over as many pages as needed.
pub fn paginate_papx(runs: &[FkpRun]) -> Result<Vec<Vec<u8>>> {
    let mut pages = Vec::new();
    let mut builder = PapxFkpBuilder::new();
    for run in runs {
        if 2 + run.grpprl.len() > PapxFkpBuilder::max_payload() {
            return Err(Error::Unsupported(format!(
                "paragraph run at 0x{:X} has a {}-byte grpprl, at most {} fit in a PAPX",
                run.fc_start,
                run.grpprl.len(),
                PapxFkpBuilder::max_payload() - 2
            )));
        }
        if !builder.try_add(run.fc_start, run.fc_end, run.istd, &run.grpprl) {
            pages.push(builder.generate());
            builder = PapxFkpBuilder::new();
            builder.try_add(run.fc_start, run.fc_end, run.istd, &run.grpprl);
        }
    }
    if !builder.is_empty() {
        pages.push(builder.generate());
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::doc::parts::fkp::{ChpxFkp, PapxFkp};
    use bytes::Bytes;

    fn run(i: u32, grpprl: &[u8]) -> FkpRun {
        FkpRun {
            fc_start: i * 2,
            fc_end: i * 2 + 2,
            istd: (i % 3) as u16,
            grpprl: Bytes::copy_from_slice(grpprl),
        }
    }

    #[test]
    fn test_chpx_fkp() {
        let mut builder = ChpxFkpBuilder::new();
        assert!(builder.try_add(0, 100, &[0x35, 0x08, 0x01]));
        assert!(builder.try_add(100, 200, &[0x36, 0x08, 0x01]));

        let fkp = builder.generate();
        assert_eq!(fkp.len(), 512);
        assert_eq!(fkp[511], 2);
    }

    #[test]
    fn test_chpx_run_limit() {
        let runs: Vec<FkpRun> = (0..250).map(|i| run(i, &[])).collect();
        let pages = paginate_chpx(&runs).unwrap();
        assert_eq!(pages.len(), 3);
        let parsed: Vec<FkpRun> = pages
            .iter()
            .flat_map(|p| ChpxFkp::parse(p).unwrap().into_runs())
            .collect();
        assert_eq!(parsed.len(), 250);
        assert_eq!(parsed[249].fc_end, 500);
    }

    #[test]
    fn test_chpx_space_limit() {
        let big = [0x4A, 0x43, 0x18, 0x00].repeat(20);
        let runs: Vec<FkpRun> = (0..12).map(|i| run(i, &big)).collect();
        let pages = paginate_chpx(&runs).unwrap();
        assert!(pages.len() > 1);
        let total: usize = pages.iter().map(|p| ChpxFkp::parse(p).unwrap().count()).sum();
        assert_eq!(total, 12);
    }

    #[test]
    fn test_oversized_chpx() {
        let runs = vec![run(0, &[0u8; 300])];
        assert!(matches!(paginate_chpx(&runs), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_papx_pagination_keeps_styles() {
        let runs: Vec<FkpRun> = (0..70).map(|i| run(i, &[0x05, 0x24, 0x01])).collect();
        let pages = paginate_papx(&runs).unwrap();
        // 20 five-byte PAPXs per page
        assert_eq!(pages.len(), 4);
        let parsed: Vec<FkpRun> = pages
            .iter()
            .flat_map(|p| PapxFkp::parse(p).unwrap().into_runs())
            .collect();
        assert_eq!(parsed, runs);
    }
}
