//! SPRM (Single Property Modifier) generation.
//!
//! The builder only knows operand widths; which opcode carries which field
//! is decided by the property records in `parts::chp` and `parts::pap`.

/// SPRM builder for generating property modification sequences
#[derive(Debug, Default, Clone)]
pub struct SprmBuilder {
    sprms: Vec<u8>,
}

impl SprmBuilder {
    /// Create a new SPRM builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a boolean SPRM (0 or 1 value)
    pub fn add_bool(&mut self, code: u16, value: bool) {
        self.sprms.extend_from_slice(&code.to_le_bytes());
        self.sprms.push(u8::from(value));
    }

    /// Add a byte SPRM
    pub fn add_byte(&mut self, code: u16, value: u8) {
        self.sprms.extend_from_slice(&code.to_le_bytes());
        self.sprms.push(value);
    }

    /// Add a word (u16) SPRM
    pub fn add_word(&mut self, code: u16, value: u16) {
        self.sprms.extend_from_slice(&code.to_le_bytes());
        self.sprms.extend_from_slice(&value.to_le_bytes());
    }

    /// Add a signed word SPRM
    pub fn add_signed_word(&mut self, code: u16, value: i16) {
        self.sprms.extend_from_slice(&code.to_le_bytes());
        self.sprms.extend_from_slice(&value.to_le_bytes());
    }

    /// Add a dword (u32) SPRM
    pub fn add_dword(&mut self, code: u16, value: u32) {
        self.sprms.extend_from_slice(&code.to_le_bytes());
        self.sprms.extend_from_slice(&value.to_le_bytes());
    }

    /// Encoded length so far
    #[inline]
    pub fn len(&self) -> usize {
        self.sprms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sprms.is_empty()
    }

    /// Get the SPRM sequence as bytes
    pub fn build(self) -> Vec<u8> {
        self.sprms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::sprm::parse_sprms;
    use crate::ole::sprm_operations::{SPRM_C_CV, SPRM_C_F_BOLD, SPRM_C_HPS, SPRM_P_DXA_LEFT80};

    #[test]
    fn test_sprm_builder() {
        let mut builder = SprmBuilder::new();
        builder.add_bool(SPRM_C_F_BOLD, true);
        builder.add_word(SPRM_C_HPS, 24);
        assert_eq!(builder.len(), 3 + 4);

        let sprms = parse_sprms(&builder.build());
        assert_eq!(sprms.len(), 2);
        assert_eq!(sprms[0].operand_byte(), Some(1));
        assert_eq!(sprms[1].operand_word(), Some(24));
    }

    #[test]
    fn test_signed_and_dword_operands() {
        let mut builder = SprmBuilder::new();
        builder.add_signed_word(SPRM_P_DXA_LEFT80, -720);
        builder.add_dword(SPRM_C_CV, 0x00FF_0000);

        let sprms = parse_sprms(&builder.build());
        assert_eq!(sprms[0].operand_i16(), Some(-720));
        assert_eq!(sprms[1].operand_dword(), Some(0x00FF_0000));
    }
}
