/// FKP (Formatted Disk Page) parser for DOC files.
///
/// FKPs are 512-byte pages in the WordDocument stream that store character
/// and paragraph properties for a contiguous span of file positions.
///
/// References:
/// - [MS-DOC] 2.9.36 ChpxFkp
/// - [MS-DOC] 2.9.177 PapxFkp
/// - [MS-DOC] 2.9.23 BxPap
use crate::common::binary::{read_u16_le, read_u32_le};
use crate::common::error::{Error, Result};
use bytes::Bytes;

/// Size of an FKP page in bytes (always 512)
pub const FKP_PAGE_SIZE: usize = 512;

/// Offset of the run count byte.
pub(crate) const FKP_COUNT_OFFSET: usize = FKP_PAGE_SIZE - 1;

/// Maximum runs in a CHPX FKP
pub const MAX_CHPX_RUNS: usize = 0x65;

/// Maximum runs in a PAPX FKP
pub const MAX_PAPX_RUNS: usize = 0x1D;

/// BxPap: one offset byte followed by a 12-byte PHE
pub(crate) const BX_SIZE: usize = 13;

/// One formatting run stored in an FKP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FkpRun {
    /// Start file character position (byte offset in WordDocument stream)
    pub fc_start: u32,
    /// End file character position, exclusive
    pub fc_end: u32,
    /// Paragraph style; always 0 for character runs
    pub istd: u16,
    /// Property modifiers (grpprl)
    pub grpprl: Bytes,
}

/// Read the `count + 1` run boundaries at the start of a page.
fn read_boundaries(page: &[u8], count: usize, table: &'static str) -> Result<Vec<u32>> {
    let mut fcs = Vec::with_capacity(count + 1);
    for i in 0..=count {
        fcs.push(read_u32_le(page, i * 4)?);
    }
    if let Some(i) = fcs.windows(2).position(|w| w[1] < w[0]) {
        return Err(Error::malformed(
            table,
            format!("page boundary {} decreases to {}", fcs[i], fcs[i + 1]),
        ));
    }
    Ok(fcs)
}

fn check_page(page: &[u8], table: &'static str, max_runs: usize) -> Result<usize> {
    if page.len() != FKP_PAGE_SIZE {
        return Err(Error::malformed(
            table,
            format!("page of {} bytes, expected {}", page.len(), FKP_PAGE_SIZE),
        ));
    }
    let count = page[FKP_COUNT_OFFSET] as usize;
    if count > max_runs {
        return Err(Error::malformed(
            table,
            format!("{} runs on one page, at most {} fit", count, max_runs),
        ));
    }
    Ok(count)
}

/// CHPX FKP (Character Property Formatted Disk Page).
///
/// Each 512-byte page contains:
/// - FC array at start (4 bytes each, crun + 1 entries)
/// - rgb array after FCs (1 byte each, word offset of a CHPX)
/// - CHPXs (size byte + grpprl) packed toward the end of the page
/// - crun count at byte 511
#[derive(Debug, Clone)]
pub struct ChpxFkp {
    runs: Vec<FkpRun>,
}

impl ChpxFkp {
    const TABLE: &'static str = "character FKP";

    /// Parse a CHPX FKP from a 512-byte page.
    pub fn parse(page: &[u8]) -> Result<Self> {
        let crun = check_page(page, Self::TABLE, MAX_CHPX_RUNS)?;
        let fcs = read_boundaries(page, crun, Self::TABLE)?;
        let rgb_offset = (crun + 1) * 4;

        let mut runs = Vec::with_capacity(crun);
        for i in 0..crun {
            let word_offset = page[rgb_offset + i] as usize;
            // An offset of zero means no formatting
            let grpprl = if word_offset == 0 {
                Bytes::new()
            } else {
                let chpx = word_offset * 2;
                let cb = page[chpx] as usize;
                let start = chpx + 1;
                if start + cb > FKP_COUNT_OFFSET {
                    return Err(Error::malformed(
                        Self::TABLE,
                        format!("CHPX {} at {} overruns the page", i, chpx),
                    ));
                }
                Bytes::copy_from_slice(&page[start..start + cb])
            };
            runs.push(FkpRun {
                fc_start: fcs[i],
                fc_end: fcs[i + 1],
                istd: 0,
                grpprl,
            });
        }

        Ok(Self { runs })
    }

    /// Get the number of entries in this FKP.
    #[inline]
    pub fn count(&self) -> usize {
        self.runs.len()
    }

    #[inline]
    pub fn runs(&self) -> &[FkpRun] {
        &self.runs
    }

    #[inline]
    pub fn into_runs(self) -> Vec<FkpRun> {
        self.runs
    }
}

/// PAPX FKP (Paragraph Property Formatted Disk Page).
///
/// Same page shape as the CHPX FKP, but each run is described by a 13-byte
/// BxPap and its PAPX carries a style index ahead of the grpprl. A PAPX
/// starts with a size byte `cb`: non-zero means `2 * cb - 1` bytes follow,
/// zero means the next byte `cb'` gives `2 * cb'` bytes.
#[derive(Debug, Clone)]
pub struct PapxFkp {
    runs: Vec<FkpRun>,
}

impl PapxFkp {
    const TABLE: &'static str = "paragraph FKP";

    /// Parse a PAPX FKP from a 512-byte page.
    pub fn parse(page: &[u8]) -> Result<Self> {
        let cpara = check_page(page, Self::TABLE, MAX_PAPX_RUNS)?;
        let fcs = read_boundaries(page, cpara, Self::TABLE)?;
        let bx_offset = (cpara + 1) * 4;

        let mut runs = Vec::with_capacity(cpara);
        for i in 0..cpara {
            let word_offset = page[bx_offset + i * BX_SIZE] as usize;
            let (istd, grpprl) = if word_offset == 0 {
                (0, Bytes::new())
            } else {
                Self::read_papx(page, word_offset * 2, i)?
            };
            runs.push(FkpRun {
                fc_start: fcs[i],
                fc_end: fcs[i + 1],
                istd,
                grpprl,
            });
        }

        Ok(Self { runs })
    }

    fn read_papx(page: &[u8], offset: usize, index: usize) -> Result<(u16, Bytes)> {
        let cb = page[offset] as usize;
        let (start, len) = if cb != 0 {
            (offset + 1, 2 * cb - 1)
        } else {
            let cb = page.get(offset + 1).copied().unwrap_or(0) as usize;
            (offset + 2, 2 * cb)
        };
        if len < 2 || start + len > FKP_COUNT_OFFSET {
            return Err(Error::malformed(
                Self::TABLE,
                format!("PAPX {} at {} declares {} bytes", index, offset, len),
            ));
        }
        let istd = read_u16_le(page, start)?;
        Ok((istd, Bytes::copy_from_slice(&page[start + 2..start + len])))
    }

    /// Get the number of entries in this FKP.
    #[inline]
    pub fn count(&self) -> usize {
        self.runs.len()
    }

    #[inline]
    pub fn runs(&self) -> &[FkpRun] {
        &self.runs
    }

    #[inline]
    pub fn into_runs(self) -> Vec<FkpRun> {
        self.runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::doc::writer::fkp::{ChpxFkpBuilder, PapxFkpBuilder};

    #[test]
    fn test_invalid_page_size() {
        let small_page = vec![0u8; 100];
        assert!(ChpxFkp::parse(&small_page).is_err());

        let large_page = vec![0u8; 1000];
        assert!(PapxFkp::parse(&large_page).is_err());
    }

    #[test]
    fn test_invalid_crun() {
        let mut page = vec![0u8; 512];
        page[511] = 0;
        assert_eq!(ChpxFkp::parse(&page).unwrap().count(), 0);

        page[511] = 200;
        assert!(ChpxFkp::parse(&page).is_err());

        page[511] = 30;
        assert!(PapxFkp::parse(&page).is_err());
    }

    #[test]
    fn test_chpx_page() {
        let mut builder = ChpxFkpBuilder::new();
        assert!(builder.try_add(0x400, 0x410, &[0x35, 0x08, 0x01]));
        assert!(builder.try_add(0x410, 0x420, &[]));
        let fkp = ChpxFkp::parse(&builder.generate()).unwrap();
        assert_eq!(fkp.count(), 2);
        assert_eq!(fkp.runs()[0].fc_start, 0x400);
        assert_eq!(fkp.runs()[0].fc_end, 0x410);
        assert_eq!(fkp.runs()[0].grpprl.as_ref(), &[0x35, 0x08, 0x01]);
        assert!(fkp.runs()[1].grpprl.is_empty());
        assert_eq!(fkp.runs()[1].fc_end, 0x420);
    }

    #[test]
    fn test_papx_page_odd_and_even_sizes() {
        let mut builder = PapxFkpBuilder::new();
        // istd + 3 bytes: odd total
        assert!(builder.try_add(0, 10, 3, &[0x05, 0x24, 0x01]));
        // istd + 4 bytes: even total
        assert!(builder.try_add(10, 20, 0, &[0x0F, 0x84, 0xD0, 0x02]));
        let fkp = PapxFkp::parse(&builder.generate()).unwrap();
        assert_eq!(fkp.count(), 2);
        assert_eq!(fkp.runs()[0].istd, 3);
        assert_eq!(fkp.runs()[0].grpprl.as_ref(), &[0x05, 0x24, 0x01]);
        assert_eq!(fkp.runs()[1].istd, 0);
        assert_eq!(fkp.runs()[1].grpprl.as_ref(), &[0x0F, 0x84, 0xD0, 0x02]);
    }

    #[test]
    fn test_chpx_overrun() {
        let mut page = vec![0u8; 512];
        page[511] = 1;
        page[4..8].copy_from_slice(&10u32.to_le_bytes());
        // rgb[0] points at byte 500, cb claims 40 bytes
        page[8] = 250;
        page[500] = 40;
        assert!(matches!(
            ChpxFkp::parse(&page),
            Err(Error::MalformedTable { .. })
        ));
    }
}
