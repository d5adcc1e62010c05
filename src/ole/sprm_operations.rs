/// SPRM (Single Property Modifier) opcode constants.
///
/// # SPRM Structure
///
/// A SPRM consists of:
/// - **Opcode** (2 bytes): Encodes the operation type and size
///   - Bits 0-8: Operation code
///   - Bit 9: Special flag
///   - Bits 10-12: Property type (PAP=1, CHP=2, PIC=3, SEP=4, TAP=5)
///   - Bits 13-15: Size code (determines operand size)
/// - **Operand** (variable): The data for the operation
///
/// # Size Codes
///
/// - 0, 1: 1-byte operand
/// - 2, 4, 5: 2-byte operand
/// - 3: 4-byte operand
/// - 6: Variable length (size in first byte or word)
/// - 7: 3-byte operand
// CHP (Character Properties) SPRM opcodes

/// sprmCFRMarkDel - Deleted revision mark
pub const SPRM_C_F_RMARK_DEL: u16 = 0x0800;

/// sprmCFRMark - Inserted revision mark
pub const SPRM_C_F_RMARK: u16 = 0x0801;

/// sprmCFFldVanish - Field vanish flag
pub const SPRM_C_F_FLD_VANISH: u16 = 0x0802;

/// sprmCPicLocation - Offset of picture or binary data in the Data stream
pub const SPRM_C_PIC_LOCATION: u16 = 0x6A03;

/// sprmCFData - The picture location points at NilPICFAndBinData
pub const SPRM_C_F_DATA: u16 = 0x0806;

/// sprmCFOle2 - OLE2 embedded object flag
pub const SPRM_C_F_OLE2: u16 = 0x080A;

/// sprmCHighlight - Highlight color index
pub const SPRM_C_HIGHLIGHT: u16 = 0x2A0C;

/// sprmCIstd - Character style
pub const SPRM_C_ISTD: u16 = 0x4A30;

/// sprmCFBold
pub const SPRM_C_F_BOLD: u16 = 0x0835;

/// sprmCFItalic
pub const SPRM_C_F_ITALIC: u16 = 0x0836;

/// sprmCFStrike
pub const SPRM_C_F_STRIKE: u16 = 0x0837;

/// sprmCFOutline
pub const SPRM_C_F_OUTLINE: u16 = 0x0838;

/// sprmCFShadow
pub const SPRM_C_F_SHADOW: u16 = 0x0839;

/// sprmCFSmallCaps
pub const SPRM_C_F_SMALL_CAPS: u16 = 0x083A;

/// sprmCFCaps
pub const SPRM_C_F_CAPS: u16 = 0x083B;

/// sprmCFVanish - Hidden text
pub const SPRM_C_F_VANISH: u16 = 0x083C;

/// sprmCKul - Underline style
pub const SPRM_C_KUL: u16 = 0x2A3E;

/// sprmCDxaSpace - Character spacing in twips
pub const SPRM_C_DXA_SPACE: u16 = 0x8840;

/// sprmCIco - Color index
pub const SPRM_C_ICO: u16 = 0x2A42;

/// sprmCHps - Font size in half-points
pub const SPRM_C_HPS: u16 = 0x4A43;

/// sprmCIss - Superscript/subscript
pub const SPRM_C_ISS: u16 = 0x2A48;

/// sprmCHpsKern - Kerning threshold in half-points
pub const SPRM_C_HPS_KERN: u16 = 0x484B;

/// sprmCRgFtc0 - ASCII font
pub const SPRM_C_RG_FTC0: u16 = 0x4A4F;

/// sprmCRgFtc1 - East Asian font
pub const SPRM_C_RG_FTC1: u16 = 0x4A50;

/// sprmCRgFtc2 - Other font
pub const SPRM_C_RG_FTC2: u16 = 0x4A51;

/// sprmCCharScale - Horizontal scale percentage
pub const SPRM_C_CHAR_SCALE: u16 = 0x4852;

/// sprmCFDStrike - Double strikethrough
pub const SPRM_C_F_DSTRIKE: u16 = 0x2A53;

/// sprmCFImprint
pub const SPRM_C_F_IMPRINT: u16 = 0x0854;

/// sprmCFSpec - Special character
pub const SPRM_C_F_SPEC: u16 = 0x0855;

/// sprmCFObj - Embedded object
pub const SPRM_C_F_OBJ: u16 = 0x0856;

/// sprmCFEmboss
pub const SPRM_C_F_EMBOSS: u16 = 0x0858;

/// sprmCRgLid0_80 - Language ID
pub const SPRM_C_RG_LID0_80: u16 = 0x486D;

/// sprmCCv - 24-bit color
pub const SPRM_C_CV: u16 = 0x6870;

// PAP (Paragraph Properties) SPRM opcodes

/// sprmPIstd - Paragraph style
pub const SPRM_P_ISTD: u16 = 0x4600;

/// sprmPJc80 - Physical justification
pub const SPRM_P_JC80: u16 = 0x2403;

/// sprmPFKeep - Keep lines together
pub const SPRM_P_F_KEEP: u16 = 0x2405;

/// sprmPFKeepFollow - Keep with next
pub const SPRM_P_F_KEEP_FOLLOW: u16 = 0x2406;

/// sprmPFPageBreakBefore
pub const SPRM_P_F_PAGE_BREAK_BEFORE: u16 = 0x2407;

/// sprmPIlvl - List level
pub const SPRM_P_ILVL: u16 = 0x260A;

/// sprmPIlfo - List format override index
pub const SPRM_P_ILFO: u16 = 0x460B;

/// sprmPDxaRight80 - Right indent
pub const SPRM_P_DXA_RIGHT80: u16 = 0x840E;

/// sprmPDxaLeft80 - Left indent
pub const SPRM_P_DXA_LEFT80: u16 = 0x840F;

/// sprmPDxaLeft180 - First line indent
pub const SPRM_P_DXA_LEFT1_80: u16 = 0x8411;

/// sprmPDyaLine - Line spacing (LSPD)
pub const SPRM_P_DYA_LINE: u16 = 0x6412;

/// sprmPDyaBefore - Space before
pub const SPRM_P_DYA_BEFORE: u16 = 0xA413;

/// sprmPDyaAfter - Space after
pub const SPRM_P_DYA_AFTER: u16 = 0xA414;

/// sprmPChgTabs - Tab stop changes, with an oversized encoding
pub const SPRM_P_CHG_TABS: u16 = 0xC615;

/// sprmPFInTable
pub const SPRM_P_F_IN_TABLE: u16 = 0x2416;

/// sprmPFTtp - Table row end mark
pub const SPRM_P_F_TTP: u16 = 0x2417;

/// sprmPFWidowControl
pub const SPRM_P_F_WIDOW_CONTROL: u16 = 0x2431;

/// sprmPOutLvl - Outline level
pub const SPRM_P_OUT_LVL: u16 = 0x2640;

/// sprmPFBiDi - Right-to-left paragraph
pub const SPRM_P_F_BIDI: u16 = 0x2441;

/// sprmPJc - Logical justification
pub const SPRM_P_JC: u16 = 0x2461;

/// sprmPFContextualSpacing
pub const SPRM_P_F_CONTEXTUAL_SPACING: u16 = 0x246D;

/// sprmPHugePapx - PAPX stored in the Data stream
pub const SPRM_P_HUGE_PAPX: u16 = 0x6646;

// SEP (Section Properties) SPRM opcodes

/// sprmSBkc - Section break type
pub const SPRM_S_BKC: u16 = 0x3009;

/// sprmSFTitlePage - Distinct first page header/footer
pub const SPRM_S_F_TITLE_PAGE: u16 = 0x300A;

/// sprmSCcolumns - Column count minus one
pub const SPRM_S_C_COLUMNS: u16 = 0x500B;

/// sprmSXaPage - Page width in twips
pub const SPRM_S_XA_PAGE: u16 = 0xB01F;

/// sprmSYaPage - Page height in twips
pub const SPRM_S_YA_PAGE: u16 = 0xB020;

// TAP (Table Properties) SPRM opcodes

/// sprmTDefTable10 - Obsolete table definition, long variable operand
pub const SPRM_T_DEF_TABLE10: u16 = 0xD606;

/// sprmTDefTable - Table definition, long variable operand
pub const SPRM_T_DEF_TABLE: u16 = 0xD608;

/// Extract SPRM type from opcode (bits 10-12).
#[inline]
pub fn get_sprm_type(opcode: u16) -> u8 {
    ((opcode >> 10) & 0x07) as u8
}

/// Extract SPRM operation code from opcode (bits 0-8).
#[inline]
pub fn get_sprm_operation(opcode: u16) -> u16 {
    opcode & 0x01FF
}

/// Extract SPRM size code from opcode (bits 13-15).
#[inline]
pub fn get_sprm_size_code(opcode: u16) -> u8 {
    ((opcode >> 13) & 0x07) as u8
}
