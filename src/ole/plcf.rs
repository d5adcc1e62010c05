//! Property List with Character Positions (PLCF).
//!
//! PLCF is the plex shape behind every position-indexed table in a Word
//! document: N+1 strictly increasing positions followed by N fixed-size
//! records. Run `i` covers `[positions[i], positions[i + 1])`; the final
//! position is an exclusive bound and never starts a run.

use crate::common::binary;
use crate::common::error::{Error, Result};
use bytes::Bytes;

/// Size of one stored position.
const POSITION_SIZE: usize = 4;

/// A decoded range table.
///
/// # Format
///
/// - n+1 positions (4 bytes each, little-endian)
/// - n property records (`record_size` bytes each)
///
/// # Examples
///
/// ```
/// use worddoc::ole::plcf::Plcf;
///
/// // CPs: 0, 10, 20 with two 2-byte records
/// let data = vec![
///     0x00, 0x00, 0x00, 0x00, // CP 0
///     0x0A, 0x00, 0x00, 0x00, // CP 10
///     0x14, 0x00, 0x00, 0x00, // CP 20
///     0x01, 0x02, // Property 1
///     0x03, 0x04, // Property 2
/// ];
///
/// let plcf = Plcf::parse(&data, 2).unwrap();
/// assert_eq!(plcf.count(), 2);
/// assert_eq!(plcf.range(1), Some((10, 20)));
/// assert_eq!(plcf.lookup(15).unwrap(), 1);
/// assert!(plcf.lookup(20).is_err());
/// assert_eq!(plcf.encode(), data);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plcf {
    /// Run boundaries, always `count() + 1` entries
    positions: Vec<u32>,
    /// One record per run
    records: Vec<Bytes>,
    record_size: usize,
}

impl Plcf {
    /// An empty table anchored at `origin`.
    pub fn new(record_size: usize, origin: u32) -> Self {
        Self {
            positions: vec![origin],
            records: Vec::new(),
            record_size,
        }
    }

    /// Build a table from already-split parts, validating the same
    /// invariants `decode` does.
    pub fn from_parts(positions: Vec<u32>, records: Vec<Bytes>, record_size: usize) -> Result<Self> {
        if positions.len() != records.len() + 1 {
            return Err(Error::malformed(
                "range table",
                format!(
                    "{} positions for {} records",
                    positions.len(),
                    records.len()
                ),
            ));
        }
        if let Some(bad) = records.iter().find(|r| r.len() != record_size) {
            return Err(Error::malformed(
                "range table",
                format!("record of {} bytes, expected {}", bad.len(), record_size),
            ));
        }
        check_increasing(&positions)?;
        Ok(Self {
            positions,
            records,
            record_size,
        })
    }

    /// Decode the table stored at `data[offset..offset + length]`.
    ///
    /// The run count is inferred from `length`; any remainder means the
    /// declared length and the record size disagree.
    pub fn decode(data: &[u8], offset: usize, length: usize, record_size: usize) -> Result<Self> {
        if length < POSITION_SIZE {
            return Err(Error::malformed(
                "range table",
                format!("length {} cannot hold a single position", length),
            ));
        }
        let stride = POSITION_SIZE + record_size;
        if (length - POSITION_SIZE) % stride != 0 {
            return Err(Error::malformed(
                "range table",
                format!(
                    "length {} is not (n+1)*4 + n*{} for any n",
                    length, record_size
                ),
            ));
        }
        let region = binary::slice_at(data, offset, length).map_err(|_| {
            Error::malformed(
                "range table",
                format!(
                    "region {}..{} exceeds stream of {} bytes",
                    offset,
                    offset.saturating_add(length),
                    data.len()
                ),
            )
        })?;
        let region = Bytes::copy_from_slice(region);

        let n = (length - POSITION_SIZE) / stride;
        let mut positions = Vec::with_capacity(n + 1);
        for i in 0..=n {
            positions.push(binary::read_u32_le(&region, i * POSITION_SIZE)?);
        }
        check_increasing(&positions)?;

        let records_start = (n + 1) * POSITION_SIZE;
        let records = (0..n)
            .map(|i| {
                let start = records_start + i * record_size;
                region.slice(start..start + record_size)
            })
            .collect();

        Ok(Self {
            positions,
            records,
            record_size,
        })
    }

    /// Decode a table that occupies the whole of `data`.
    #[inline]
    pub fn parse(data: &[u8], record_size: usize) -> Result<Self> {
        Self::decode(data, 0, data.len(), record_size)
    }

    /// Serialize into the on-disk layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out);
        out
    }

    /// Append the on-disk layout to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        for &position in &self.positions {
            binary::write_u32_le(out, position);
        }
        for record in &self.records {
            out.extend_from_slice(record);
        }
    }

    /// Byte length of the encoded table.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.positions.len() * POSITION_SIZE + self.records.len() * self.record_size
    }

    /// Number of runs.
    #[inline]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Position at index (0..=count).
    #[inline]
    pub fn position(&self, index: usize) -> Option<u32> {
        self.positions.get(index).copied()
    }

    #[inline]
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    /// Record of run `index`.
    #[inline]
    pub fn property(&self, index: usize) -> Option<&[u8]> {
        self.records.get(index).map(|r| r.as_ref())
    }

    /// `(start, end)` of run `index`.
    pub fn range(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.records.len() {
            return None;
        }
        Some((self.positions[index], self.positions[index + 1]))
    }

    /// First covered position.
    #[inline]
    pub fn start(&self) -> u32 {
        self.positions[0]
    }

    /// Exclusive upper bound of the covered range.
    #[inline]
    pub fn end(&self) -> u32 {
        self.positions[self.positions.len() - 1]
    }

    /// Iterate `(start, end, record)` triples.
    pub fn runs(&self) -> impl Iterator<Item = (u32, u32, &[u8])> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (self.positions[i], self.positions[i + 1], r.as_ref()))
    }

    /// Append a run ending at `end`, starting where the table currently ends.
    pub fn push(&mut self, end: u32, record: Bytes) -> Result<()> {
        if record.len() != self.record_size {
            return Err(Error::malformed(
                "range table",
                format!(
                    "record of {} bytes, expected {}",
                    record.len(),
                    self.record_size
                ),
            ));
        }
        if end <= self.end() {
            return Err(Error::malformed(
                "range table",
                format!("run end {} does not follow {}", end, self.end()),
            ));
        }
        self.positions.push(end);
        self.records.push(record);
        Ok(())
    }

    /// Index of the run containing `position`.
    pub fn lookup(&self, position: u32) -> Result<usize> {
        if self.records.is_empty() || position < self.start() || position >= self.end() {
            return Err(Error::PositionNotFound {
                position,
                start: self.start(),
                end: self.end(),
            });
        }
        // First boundary greater than `position`, minus one.
        Ok(self.positions.partition_point(|&p| p <= position) - 1)
    }

    /// Shift the table after `|delta|` characters were inserted (`delta > 0`)
    /// or removed (`delta < 0`) at `edit_start`.
    ///
    /// Every position at or after `edit_start` moves by `delta`; positions that
    /// would land before `edit_start` are clamped to it, and runs emptied by
    /// the clamp are dropped. An insertion exactly at the table origin extends
    /// the first run instead of opening an uncovered gap.
    pub fn adjust_for_edit(&mut self, edit_start: u32, delta: i64) {
        if delta == 0 {
            return;
        }
        let anchored_origin = delta > 0 && self.positions[0] == edit_start;
        for (i, position) in self.positions.iter_mut().enumerate() {
            if *position < edit_start || (i == 0 && anchored_origin) {
                continue;
            }
            let moved = (*position as i64 + delta).max(edit_start as i64);
            *position = moved.min(u32::MAX as i64) as u32;
        }
        self.drop_empty_runs();
    }

    /// Subtract `shift` from every position, clamping at zero.
    ///
    /// Used once at open time when the text does not start at position 0.
    pub fn rebase(&mut self, shift: u32) {
        self.adjust_for_edit(0, -(shift as i64));
    }

    fn drop_empty_runs(&mut self) {
        let mut i = 0;
        while i < self.records.len() {
            if self.positions[i] == self.positions[i + 1] {
                self.records.remove(i);
                self.positions.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }
}

fn check_increasing(positions: &[u32]) -> Result<()> {
    if let Some(i) = positions.windows(2).position(|w| w[0] >= w[1]) {
        return Err(Error::malformed(
            "range table",
            format!(
                "position {} at index {} does not exceed {}",
                positions[i + 1],
                i + 1,
                positions[i]
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(positions: &[u32], record_size: usize) -> Plcf {
        let records = (0..positions.len() - 1)
            .map(|i| Bytes::from(vec![i as u8; record_size]))
            .collect();
        Plcf::from_parts(positions.to_vec(), records, record_size).unwrap()
    }

    #[test]
    fn test_length_record_size_mismatch() {
        let data = vec![0u8; 13];
        match Plcf::decode(&data, 0, 13, 4) {
            Err(Error::MalformedTable { .. }) => {},
            other => panic!("expected malformed table, got {:?}", other),
        }
    }

    #[test]
    fn test_non_increasing_positions() {
        let mut data = Vec::new();
        for cp in [0u32, 10, 10] {
            data.extend_from_slice(&cp.to_le_bytes());
        }
        data.extend_from_slice(&[0u8; 4]);
        assert!(matches!(
            Plcf::parse(&data, 2),
            Err(Error::MalformedTable { .. })
        ));
    }

    #[test]
    fn test_region_outside_stream() {
        let data = vec![0u8; 16];
        assert!(Plcf::decode(&data, 8, 12, 4).is_err());
    }

    #[test]
    fn test_decode_at_offset() {
        let mut data = vec![0xEE; 3];
        let plcf = table(&[5, 9], 4);
        data.extend_from_slice(&plcf.encode());
        let decoded = Plcf::decode(&data, 3, 12, 4).unwrap();
        assert_eq!(decoded, plcf);
    }

    #[test]
    fn test_empty_table() {
        let plcf = Plcf::parse(&7u32.to_le_bytes(), 8).unwrap();
        assert!(plcf.is_empty());
        assert_eq!(plcf.start(), 7);
        assert!(plcf.lookup(7).is_err());
    }

    #[test]
    fn test_deletion_clamps_and_drops_runs() {
        let mut plcf = table(&[0, 10, 20, 30], 1);
        // Remove [5, 25): run 1 disappears entirely.
        plcf.adjust_for_edit(5, -20);
        assert_eq!(plcf.positions(), &[0, 5, 10]);
        assert_eq!(plcf.property(0), Some(&[0u8][..]));
        assert_eq!(plcf.property(1), Some(&[2u8][..]));
    }

    #[test]
    fn test_insertion_at_origin_extends_first_run() {
        let mut plcf = table(&[0, 10], 1);
        plcf.adjust_for_edit(0, 4);
        assert_eq!(plcf.positions(), &[0, 14]);
    }

    #[test]
    fn test_rebase() {
        let mut plcf = table(&[0, 512, 600, 700], 1);
        plcf.rebase(512);
        assert_eq!(plcf.positions(), &[0, 88, 188]);
        assert_eq!(plcf.property(0), Some(&[1u8][..]));
    }

    #[test]
    fn test_push() {
        let mut plcf = Plcf::new(2, 0);
        plcf.push(4, Bytes::from_static(&[1, 1])).unwrap();
        assert!(plcf.push(4, Bytes::from_static(&[2, 2])).is_err());
        assert!(plcf.push(9, Bytes::from_static(&[2])).is_err());
        assert_eq!(plcf.count(), 1);
    }

    fn arb_table() -> impl Strategy<Value = Plcf> {
        (0u32..1000, prop::collection::vec(1u32..500, 0..20), 0usize..8).prop_map(
            |(origin, widths, record_size)| {
                let mut positions = vec![origin];
                for w in &widths {
                    let last = *positions.last().unwrap();
                    positions.push(last + w);
                }
                table(&positions, record_size)
            },
        )
    }

    proptest! {
        #[test]
        fn prop_round_trip(plcf in arb_table()) {
            let bytes = plcf.encode();
            let decoded = Plcf::decode(&bytes, 0, bytes.len(), plcf.record_size()).unwrap();
            prop_assert_eq!(decoded, plcf);
        }

        #[test]
        fn prop_lookup_unique(plcf in arb_table(), cp in 0u32..12_000) {
            match plcf.lookup(cp) {
                Ok(i) => {
                    let (start, end) = plcf.range(i).unwrap();
                    prop_assert!(start <= cp && cp < end);
                },
                Err(Error::PositionNotFound { .. }) => {
                    prop_assert!(plcf.is_empty() || cp < plcf.start() || cp >= plcf.end());
                },
                Err(e) => prop_assert!(false, "unexpected error {:?}", e),
            }
        }

        #[test]
        fn prop_edit_reversible(plcf in arb_table(), at in 1u32..12_000, delta in 1i64..300, insert_first in any::<bool>()) {
            prop_assume!(!plcf.is_empty());
            let edit_start = plcf.start() + 1 + at % (plcf.end() - plcf.start());
            let mut edited = plcf.clone();
            if insert_first {
                edited.adjust_for_edit(edit_start, delta);
                edited.adjust_for_edit(edit_start, -delta);
            } else {
                // Only non-clamping deletions are reversible.
                let end = edit_start as i64 + delta;
                prop_assume!(plcf.positions().iter().all(|&p| (p as i64) < edit_start as i64 || p as i64 >= end));
                edited.adjust_for_edit(edit_start, -delta);
                edited.adjust_for_edit(edit_start, delta);
            }
            prop_assert_eq!(edited, plcf);
        }
    }
}
