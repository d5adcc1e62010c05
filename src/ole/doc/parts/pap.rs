//! Paragraph Properties (PAP) and their opcode vocabulary.
use super::property_engine::{PropertyOp, PropertyRecord};
use crate::ole::doc::writer::sprm::SprmBuilder;
use crate::ole::sprm::Sprm;
use crate::ole::sprm_operations::*;

/// Line spacing descriptor (LSPD).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpacing {
    /// Spacing in twips, or 240ths of a line when `multiple` is set
    pub dya_line: i16,
    pub multiple: bool,
}

impl Default for LineSpacing {
    fn default() -> Self {
        Self {
            dya_line: 240,
            multiple: true,
        }
    }
}

/// Effective paragraph formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphProperties {
    /// Paragraph style index
    pub istd: u16,
    /// Justification: 0 left, 1 center, 2 right, 3 both
    pub justification: u8,
    pub keep: bool,
    pub keep_follow: bool,
    pub page_break_before: bool,
    pub ilvl: u8,
    pub ilfo: i16,
    pub dxa_right: i16,
    pub dxa_left: i16,
    pub dxa_left1: i16,
    pub line_spacing: LineSpacing,
    pub dya_before: u16,
    pub dya_after: u16,
    pub in_table: bool,
    pub table_row_end: bool,
    pub widow_control: bool,
    pub outline_level: u8,
    pub bidi: bool,
    pub contextual_spacing: bool,
}

impl Default for ParagraphProperties {
    fn default() -> Self {
        Self {
            istd: 0,
            justification: 0,
            keep: false,
            keep_follow: false,
            page_break_before: false,
            ilvl: 0,
            ilfo: 0,
            dxa_right: 0,
            dxa_left: 0,
            dxa_left1: 0,
            line_spacing: LineSpacing::default(),
            dya_before: 0,
            dya_after: 0,
            in_table: false,
            table_row_end: false,
            widow_control: true,
            outline_level: 9,
            bidi: false,
            contextual_spacing: false,
        }
    }
}

/// Paragraph opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PapOp {
    Istd(u16),
    Justification(u8),
    Keep(bool),
    KeepFollow(bool),
    PageBreakBefore(bool),
    Ilvl(u8),
    Ilfo(i16),
    DxaRight(i16),
    DxaLeft(i16),
    DxaLeft1(i16),
    LineSpacing(LineSpacing),
    DyaBefore(u16),
    DyaAfter(u16),
    InTable(bool),
    TableRowEnd(bool),
    WidowControl(bool),
    OutlineLevel(u8),
    BiDi(bool),
    ContextualSpacing(bool),
    /// Reference to a PAPX stored in the Data stream; expanded before apply
    HugePapx(u32),
    Unknown(u16),
}

impl PropertyOp for PapOp {
    fn is_unknown(&self) -> bool {
        matches!(self, PapOp::Unknown(_))
    }

    fn encode(&self, out: &mut SprmBuilder) {
        match *self {
            PapOp::Istd(v) => out.add_word(SPRM_P_ISTD, v),
            PapOp::Justification(v) => out.add_byte(SPRM_P_JC80, v),
            PapOp::Keep(v) => out.add_bool(SPRM_P_F_KEEP, v),
            PapOp::KeepFollow(v) => out.add_bool(SPRM_P_F_KEEP_FOLLOW, v),
            PapOp::PageBreakBefore(v) => out.add_bool(SPRM_P_F_PAGE_BREAK_BEFORE, v),
            PapOp::Ilvl(v) => out.add_byte(SPRM_P_ILVL, v),
            PapOp::Ilfo(v) => out.add_signed_word(SPRM_P_ILFO, v),
            PapOp::DxaRight(v) => out.add_signed_word(SPRM_P_DXA_RIGHT80, v),
            PapOp::DxaLeft(v) => out.add_signed_word(SPRM_P_DXA_LEFT80, v),
            PapOp::DxaLeft1(v) => out.add_signed_word(SPRM_P_DXA_LEFT1_80, v),
            PapOp::LineSpacing(lspd) => {
                let packed = (lspd.dya_line as u16 as u32) | (u32::from(lspd.multiple) << 16);
                out.add_dword(SPRM_P_DYA_LINE, packed);
            },
            PapOp::DyaBefore(v) => out.add_word(SPRM_P_DYA_BEFORE, v),
            PapOp::DyaAfter(v) => out.add_word(SPRM_P_DYA_AFTER, v),
            PapOp::InTable(v) => out.add_bool(SPRM_P_F_IN_TABLE, v),
            PapOp::TableRowEnd(v) => out.add_bool(SPRM_P_F_TTP, v),
            PapOp::WidowControl(v) => out.add_bool(SPRM_P_F_WIDOW_CONTROL, v),
            PapOp::OutlineLevel(v) => out.add_byte(SPRM_P_OUT_LVL, v),
            PapOp::BiDi(v) => out.add_bool(SPRM_P_F_BIDI, v),
            PapOp::ContextualSpacing(v) => out.add_bool(SPRM_P_F_CONTEXTUAL_SPACING, v),
            PapOp::HugePapx(offset) => out.add_dword(SPRM_P_HUGE_PAPX, offset),
            PapOp::Unknown(_) => {},
        }
    }
}

impl PropertyRecord for ParagraphProperties {
    const NAME: &'static str = "paragraph";
    type Op = PapOp;

    fn decode_op(sprm: &Sprm) -> PapOp {
        let byte = sprm.operand_byte().unwrap_or(0);
        let flag = byte != 0;
        let word = sprm.operand_word().unwrap_or(0);
        let signed = sprm.operand_i16().unwrap_or(0);
        match sprm.opcode {
            SPRM_P_ISTD => PapOp::Istd(word),
            SPRM_P_JC80 | SPRM_P_JC => PapOp::Justification(byte),
            SPRM_P_F_KEEP => PapOp::Keep(flag),
            SPRM_P_F_KEEP_FOLLOW => PapOp::KeepFollow(flag),
            SPRM_P_F_PAGE_BREAK_BEFORE => PapOp::PageBreakBefore(flag),
            SPRM_P_ILVL => PapOp::Ilvl(byte),
            SPRM_P_ILFO => PapOp::Ilfo(signed),
            SPRM_P_DXA_RIGHT80 => PapOp::DxaRight(signed),
            SPRM_P_DXA_LEFT80 => PapOp::DxaLeft(signed),
            SPRM_P_DXA_LEFT1_80 => PapOp::DxaLeft1(signed),
            SPRM_P_DYA_LINE => {
                let packed = sprm.operand_dword().unwrap_or(0);
                PapOp::LineSpacing(LineSpacing {
                    dya_line: (packed & 0xFFFF) as u16 as i16,
                    multiple: (packed >> 16) != 0,
                })
            },
            SPRM_P_DYA_BEFORE => PapOp::DyaBefore(word),
            SPRM_P_DYA_AFTER => PapOp::DyaAfter(word),
            SPRM_P_F_IN_TABLE => PapOp::InTable(flag),
            SPRM_P_F_TTP => PapOp::TableRowEnd(flag),
            SPRM_P_F_WIDOW_CONTROL => PapOp::WidowControl(flag),
            SPRM_P_OUT_LVL => PapOp::OutlineLevel(byte),
            SPRM_P_F_BIDI => PapOp::BiDi(flag),
            SPRM_P_F_CONTEXTUAL_SPACING => PapOp::ContextualSpacing(flag),
            SPRM_P_HUGE_PAPX => PapOp::HugePapx(sprm.operand_dword().unwrap_or(0)),
            other => PapOp::Unknown(other),
        }
    }

    fn apply_op(&mut self, _base: &Self, op: &PapOp) {
        match *op {
            PapOp::Istd(v) => self.istd = v,
            PapOp::Justification(v) => self.justification = v,
            PapOp::Keep(v) => self.keep = v,
            PapOp::KeepFollow(v) => self.keep_follow = v,
            PapOp::PageBreakBefore(v) => self.page_break_before = v,
            PapOp::Ilvl(v) => self.ilvl = v,
            PapOp::Ilfo(v) => self.ilfo = v,
            PapOp::DxaRight(v) => self.dxa_right = v,
            PapOp::DxaLeft(v) => self.dxa_left = v,
            PapOp::DxaLeft1(v) => self.dxa_left1 = v,
            PapOp::LineSpacing(v) => self.line_spacing = v,
            PapOp::DyaBefore(v) => self.dya_before = v,
            PapOp::DyaAfter(v) => self.dya_after = v,
            PapOp::InTable(v) => self.in_table = v,
            PapOp::TableRowEnd(v) => self.table_row_end = v,
            PapOp::WidowControl(v) => self.widow_control = v,
            PapOp::OutlineLevel(v) => self.outline_level = v,
            PapOp::BiDi(v) => self.bidi = v,
            PapOp::ContextualSpacing(v) => self.contextual_spacing = v,
            PapOp::HugePapx(_) | PapOp::Unknown(_) => {},
        }
    }

    fn diff(base: &Self, target: &Self) -> Vec<PapOp> {
        let mut ops = Vec::new();
        macro_rules! differs {
            ($field:ident, $op:expr) => {
                if base.$field != target.$field {
                    ops.push($op(target.$field));
                }
            };
        }
        differs!(istd, PapOp::Istd);
        differs!(justification, PapOp::Justification);
        differs!(keep, PapOp::Keep);
        differs!(keep_follow, PapOp::KeepFollow);
        differs!(page_break_before, PapOp::PageBreakBefore);
        differs!(ilvl, PapOp::Ilvl);
        differs!(ilfo, PapOp::Ilfo);
        differs!(dxa_right, PapOp::DxaRight);
        differs!(dxa_left, PapOp::DxaLeft);
        differs!(dxa_left1, PapOp::DxaLeft1);
        differs!(line_spacing, PapOp::LineSpacing);
        differs!(dya_before, PapOp::DyaBefore);
        differs!(dya_after, PapOp::DyaAfter);
        differs!(in_table, PapOp::InTable);
        differs!(table_row_end, PapOp::TableRowEnd);
        differs!(widow_control, PapOp::WidowControl);
        differs!(outline_level, PapOp::OutlineLevel);
        differs!(bidi, PapOp::BiDi);
        differs!(contextual_spacing, PapOp::ContextualSpacing);
        ops
    }

    fn seeded(base: &Self, istd: u16) -> Self {
        Self {
            istd,
            ..base.clone()
        }
    }
}
