//! Property compression engine.
//!
//! A formatting run stores a grpprl: an opcode sequence that turns a base
//! property record into the run's effective record. [`apply`] replays such
//! a sequence, and [`compress`] derives one from a pair of records.
//!
//! Base records are always passed in explicitly through [`PropertyBases`];
//! nothing here consults shared defaults.

use crate::ole::doc::writer::sprm::SprmBuilder;
use crate::ole::sprm::{Sprm, parse_sprms};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::Debug;

use super::chp::CharacterProperties;
use super::pap::ParagraphProperties;

/// One decoded opcode of a property record's vocabulary.
pub trait PropertyOp: Debug {
    /// Opcodes the record does not understand are skipped during apply.
    fn is_unknown(&self) -> bool;

    /// Re-encode as an SPRM.
    fn encode(&self, out: &mut SprmBuilder);
}

/// A property record that grpprls can modify.
pub trait PropertyRecord: Clone + PartialEq + Debug + Default {
    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Tagged opcode vocabulary, including an unknown variant.
    type Op: PropertyOp;

    /// Classify an SPRM.
    fn decode_op(sprm: &Sprm) -> Self::Op;

    /// Apply one opcode. `base` is the record the sequence started from and
    /// is what toggle operands refer to.
    fn apply_op(&mut self, base: &Self, op: &Self::Op);

    /// Opcodes that turn `base` into `target`.
    fn diff(base: &Self, target: &Self) -> Vec<Self::Op>;

    /// Starting record for a run whose stored style index is `istd`.
    fn seeded(base: &Self, _istd: u16) -> Self {
        base.clone()
    }
}

/// Counters collected while applying a grpprl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Opcodes that changed or could have changed a field
    pub applied: usize,
    /// Opcodes skipped because the record has no field for them
    pub unknown: usize,
    /// Distinct unknown opcodes, in order of first appearance
    pub unknown_opcodes: SmallVec<[u16; 4]>,
}

impl ApplyStats {
    fn record_unknown(&mut self, opcode: u16) {
        self.unknown += 1;
        if !self.unknown_opcodes.contains(&opcode) {
            self.unknown_opcodes.push(opcode);
        }
    }
}

/// Apply `grpprl` to a copy of `base`.
pub fn apply<P: PropertyRecord>(base: &P, grpprl: &[u8]) -> P {
    apply_with_stats(base, grpprl).0
}

/// Apply `grpprl` to a copy of `base`, reporting skipped opcodes.
pub fn apply_with_stats<P: PropertyRecord>(base: &P, grpprl: &[u8]) -> (P, ApplyStats) {
    let mut effective = base.clone();
    let mut stats = ApplyStats::default();
    for sprm in parse_sprms(grpprl) {
        let op = P::decode_op(&sprm);
        if op.is_unknown() {
            stats.record_unknown(sprm.opcode);
            continue;
        }
        effective.apply_op(base, &op);
        stats.applied += 1;
    }
    if stats.unknown > 0 {
        log::debug!(
            "skipped {} unknown {} opcode(s): {:04X?}",
            stats.unknown,
            P::NAME,
            stats.unknown_opcodes.as_slice()
        );
    }
    (effective, stats)
}

/// Derive a grpprl that turns `base` into `target`.
///
/// Only differing fields are emitted, so equal records compress to an empty
/// sequence.
pub fn compress<P: PropertyRecord>(base: &P, target: &P) -> Vec<u8> {
    let mut builder = SprmBuilder::new();
    for op in P::diff(base, target) {
        op.encode(&mut builder);
    }
    builder.build()
}

/// Base records for one property kind: a document default and optional
/// per-style overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseRecords<P> {
    default: P,
    styles: HashMap<u16, P>,
}

impl<P: PropertyRecord> BaseRecords<P> {
    pub fn new(default: P) -> Self {
        Self {
            default,
            styles: HashMap::new(),
        }
    }

    /// Register the base record used for style `istd`.
    pub fn with_style(mut self, istd: u16, record: P) -> Self {
        self.styles.insert(istd, record);
        self
    }

    /// Base record for style `istd`, falling back to the default.
    pub fn for_style(&self, istd: u16) -> &P {
        self.styles.get(&istd).unwrap_or(&self.default)
    }

    /// The document default record.
    #[inline]
    pub fn default_record(&self) -> &P {
        &self.default
    }
}

/// Decompression bases for every kind of formatting run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBases {
    pub character: BaseRecords<CharacterProperties>,
    pub paragraph: BaseRecords<ParagraphProperties>,
}

/// Access to the base table for a record kind.
pub trait HasBases<P> {
    fn bases(&self) -> &BaseRecords<P>;
}

impl HasBases<CharacterProperties> for PropertyBases {
    fn bases(&self) -> &BaseRecords<CharacterProperties> {
        &self.character
    }
}

impl HasBases<ParagraphProperties> for PropertyBases {
    fn bases(&self) -> &BaseRecords<ParagraphProperties> {
        &self.paragraph
    }
}
