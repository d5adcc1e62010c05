/// Shared SPRM (Single Property Modifier) parsing.
///
/// A grpprl is a packed sequence of SPRMs: a 2-byte opcode whose top three
/// bits select the operand size, followed by the operand. Variable-size
/// operands carry their own length prefix.
use crate::common::binary::{read_i16_le, read_u16_le, read_u32_le};
use crate::ole::sprm_operations::{SPRM_P_CHG_TABS, SPRM_T_DEF_TABLE, SPRM_T_DEF_TABLE10};
use smallvec::SmallVec;

/// SPRM operation types based on size code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprmOperation {
    /// Size code 0 - toggle (1 byte operand)
    Toggle,
    /// Size code 1 - 1 byte operand
    Byte,
    /// Size code 2 - 2 byte operand
    Word,
    /// Size code 3 - 4 byte operand
    DWord,
    /// Size code 4 - 2 byte operand
    Word2,
    /// Size code 5 - 2 byte operand
    Word3,
    /// Size code 6 - variable length operand
    Variable,
    /// Size code 7 - 3 byte operand
    ThreeByte,
}

impl SprmOperation {
    /// Operation type encoded in the top three bits of `opcode`.
    #[inline]
    pub fn of(opcode: u16) -> Self {
        Self::from(((opcode & 0xE000) >> 13) as u8)
    }

    /// Operand width for fixed-size operations.
    #[inline]
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            SprmOperation::Toggle | SprmOperation::Byte => Some(1),
            SprmOperation::Word | SprmOperation::Word2 | SprmOperation::Word3 => Some(2),
            SprmOperation::DWord => Some(4),
            SprmOperation::ThreeByte => Some(3),
            SprmOperation::Variable => None,
        }
    }
}

impl From<u8> for SprmOperation {
    fn from(size_code: u8) -> Self {
        match size_code & 0x07 {
            0 => SprmOperation::Toggle,
            1 => SprmOperation::Byte,
            2 => SprmOperation::Word,
            3 => SprmOperation::DWord,
            4 => SprmOperation::Word2,
            5 => SprmOperation::Word3,
            6 => SprmOperation::Variable,
            _ => SprmOperation::ThreeByte,
        }
    }
}

/// An SPRM (Single Property Modifier).
///
/// `operand` holds the bytes exactly as stored after the opcode, including
/// the length prefix of variable-size operations, so re-emitting an SPRM
/// is a plain copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprm {
    /// SPRM opcode
    pub opcode: u16,
    /// SPRM operation type
    pub operation: SprmOperation,
    /// SPRM operand data
    pub operand: SmallVec<[u8; 4]>,
}

impl Sprm {
    /// Build an SPRM from an opcode and its raw operand bytes.
    pub fn new(opcode: u16, operand: &[u8]) -> Self {
        Self {
            opcode,
            operation: SprmOperation::of(opcode),
            operand: SmallVec::from_slice(operand),
        }
    }

    /// Get the operand as a byte.
    #[inline]
    pub fn operand_byte(&self) -> Option<u8> {
        self.operand.first().copied()
    }

    /// Get the operand as a word (u16).
    #[inline]
    pub fn operand_word(&self) -> Option<u16> {
        read_u16_le(&self.operand, 0).ok()
    }

    /// Get the operand as a signed word (i16).
    #[inline]
    pub fn operand_i16(&self) -> Option<i16> {
        read_i16_le(&self.operand, 0).ok()
    }

    /// Get the operand as a dword (u32).
    #[inline]
    pub fn operand_dword(&self) -> Option<u32> {
        read_u32_le(&self.operand, 0).ok()
    }

    /// Operand bytes with any variable-length prefix removed.
    pub fn payload(&self) -> &[u8] {
        if self.operation != SprmOperation::Variable {
            return &self.operand;
        }
        let prefix = if is_long_variable(self.opcode) { 2 } else { 1 };
        self.operand.get(prefix..).unwrap_or(&[])
    }

    /// Encoded length including the opcode.
    #[inline]
    pub fn len(&self) -> usize {
        2 + self.operand.len()
    }

    /// Append opcode and operand to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.opcode.to_le_bytes());
        out.extend_from_slice(&self.operand);
    }
}

/// Table definitions store a 2-byte size, one more than the operand length.
#[inline]
fn is_long_variable(opcode: u16) -> bool {
    opcode == SPRM_T_DEF_TABLE || opcode == SPRM_T_DEF_TABLE10
}

/// Number of operand bytes (including any length prefix) of the SPRM whose
/// operand starts at `offset`, or `None` if the grpprl is cut short.
fn operand_len(opcode: u16, grpprl: &[u8], offset: usize) -> Option<usize> {
    let operation = SprmOperation::of(opcode);
    if let Some(size) = operation.fixed_size() {
        return Some(size);
    }
    if is_long_variable(opcode) {
        let size = read_u16_le(grpprl, offset).ok()? as usize;
        return Some(2 + size.saturating_sub(1));
    }
    let size = *grpprl.get(offset)? as usize;
    if opcode == SPRM_P_CHG_TABS && size == 255 {
        // Oversized tab change: itbdDelMax deletions (4 bytes each) then
        // itbdAddMax additions (3 bytes each).
        let del = *grpprl.get(offset + 1)? as usize;
        let add = *grpprl.get(offset + 2 + del * 4)? as usize;
        return Some(1 + 1 + del * 4 + 1 + add * 3);
    }
    Some(1 + size)
}

/// Parse SPRMs from a byte array (grpprl - group of SPRMs).
///
/// Parsing stops at the first SPRM whose operand runs past the end of the
/// buffer; the complete SPRMs before it are returned.
pub fn parse_sprms(grpprl: &[u8]) -> Vec<Sprm> {
    let mut sprms = Vec::new();
    let mut offset = 0;

    while offset + 2 <= grpprl.len() {
        let Ok(opcode) = read_u16_le(grpprl, offset) else {
            break;
        };
        offset += 2;

        let Some(size) = operand_len(opcode, grpprl, offset) else {
            log::warn!(
                "grpprl truncated inside SPRM 0x{:04X} at offset {}",
                opcode,
                offset - 2
            );
            break;
        };
        let Some(operand) = grpprl.get(offset..offset + size) else {
            log::warn!(
                "SPRM 0x{:04X} operand of {} bytes exceeds grpprl of {} bytes",
                opcode,
                size,
                grpprl.len()
            );
            break;
        };
        offset += size;

        sprms.push(Sprm::new(opcode, operand));
    }

    if offset < grpprl.len() && offset + 2 > grpprl.len() {
        log::debug!("ignoring {} trailing grpprl byte(s)", grpprl.len() - offset);
    }

    sprms
}

/// Find a specific SPRM by opcode in a list of SPRMs.
#[inline]
pub fn find_sprm(sprms: &[Sprm], opcode: u16) -> Option<&Sprm> {
    sprms.iter().find(|sprm| sprm.opcode == opcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprm_operation_from() {
        assert_eq!(SprmOperation::from(0), SprmOperation::Toggle);
        assert_eq!(SprmOperation::from(1), SprmOperation::Byte);
        assert_eq!(SprmOperation::from(2), SprmOperation::Word);
        assert_eq!(SprmOperation::from(4), SprmOperation::Word2);
        assert_eq!(SprmOperation::from(5), SprmOperation::Word3);
        assert_eq!(SprmOperation::of(0x6A03), SprmOperation::DWord);
        assert_eq!(SprmOperation::of(0xC60D), SprmOperation::Variable);
    }

    #[test]
    fn test_parse_sprms() {
        let grpprl = vec![
            0x35, 0x08, // sprmCFBold
            0x01, // on
            0x43, 0x4A, // sprmCHps
            0x18, 0x00, // 24 half-points
        ];

        let sprms = parse_sprms(&grpprl);
        assert_eq!(sprms.len(), 2);
        assert_eq!(sprms[0].opcode, 0x0835);
        assert_eq!(sprms[0].operand_byte(), Some(1));
        assert_eq!(sprms[1].opcode, 0x4A43);
        assert_eq!(sprms[1].operand_word(), Some(24));
    }

    #[test]
    fn test_variable_operand_keeps_prefix() {
        // sprmPChgTabsPapx with a 3-byte operand
        let grpprl = vec![0x0D, 0xC6, 0x03, 0xAA, 0xBB, 0xCC, 0x35, 0x08, 0x00];
        let sprms = parse_sprms(&grpprl);
        assert_eq!(sprms.len(), 2);
        assert_eq!(sprms[0].operand.as_slice(), &[0x03, 0xAA, 0xBB, 0xCC]);
        assert_eq!(sprms[0].payload(), &[0xAA, 0xBB, 0xCC]);

        let mut out = Vec::new();
        for sprm in &sprms {
            sprm.write_to(&mut out);
        }
        assert_eq!(out, grpprl);
    }

    #[test]
    fn test_long_table_definition() {
        // sprmTDefTable: size word of 4 means 3 operand bytes
        let grpprl = vec![0x08, 0xD6, 0x04, 0x00, 0x01, 0x02, 0x03];
        let sprms = parse_sprms(&grpprl);
        assert_eq!(sprms.len(), 1);
        assert_eq!(sprms[0].payload(), &[0x01, 0x02, 0x03]);
        assert_eq!(sprms[0].len(), grpprl.len());
    }

    #[test]
    fn test_truncated_grpprl_keeps_complete_prefix() {
        let grpprl = vec![0x35, 0x08, 0x01, 0x43, 0x4A, 0x18];
        let sprms = parse_sprms(&grpprl);
        assert_eq!(sprms.len(), 1);
        assert!(find_sprm(&sprms, 0x0835).is_some());
        assert!(find_sprm(&sprms, 0x4A43).is_none());
    }
}
