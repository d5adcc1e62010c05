/// Character Properties (CHP) and their opcode vocabulary.
///
/// CHP records describe character-level formatting: emphasis toggles, font
/// slots and size, color, revision marks, and the picture/binary-data
/// location used by inline objects.
use super::property_engine::{PropertyOp, PropertyRecord};
use crate::ole::doc::writer::sprm::SprmBuilder;
use crate::ole::sprm::Sprm;
use crate::ole::sprm_operations::*;

/// Effective character formatting of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterProperties {
    pub rmark_del: bool,
    pub rmark: bool,
    pub fld_vanish: bool,
    /// Offset into the Data stream of a picture or binary-data record
    pub pic_location: u32,
    /// `pic_location` points at a NilPICFAndBinData record
    pub data: bool,
    pub ole2: bool,
    pub highlight: u8,
    /// Character style index
    pub istd: u16,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub outline: bool,
    pub shadow: bool,
    pub small_caps: bool,
    pub caps: bool,
    pub vanish: bool,
    pub imprint: bool,
    pub emboss: bool,
    pub double_strike: bool,
    pub spec: bool,
    pub obj: bool,
    /// Underline style (kul)
    pub underline: u8,
    /// Character spacing in twips
    pub dxa_space: i16,
    /// Color index
    pub ico: u8,
    /// Font size in half-points
    pub hps: u16,
    /// Superscript/subscript (iss)
    pub iss: u8,
    pub hps_kern: u16,
    pub ftc_ascii: u16,
    pub ftc_east_asian: u16,
    pub ftc_other: u16,
    /// Horizontal scale percentage
    pub char_scale: u16,
    pub lid: u16,
    /// 24-bit color, 0xFF000000 meaning auto
    pub cv: u32,
}

impl Default for CharacterProperties {
    fn default() -> Self {
        Self {
            rmark_del: false,
            rmark: false,
            fld_vanish: false,
            pic_location: 0,
            data: false,
            ole2: false,
            highlight: 0,
            istd: 10,
            bold: false,
            italic: false,
            strike: false,
            outline: false,
            shadow: false,
            small_caps: false,
            caps: false,
            vanish: false,
            imprint: false,
            emboss: false,
            double_strike: false,
            spec: false,
            obj: false,
            underline: 0,
            dxa_space: 0,
            ico: 0,
            hps: 20,
            iss: 0,
            hps_kern: 0,
            ftc_ascii: 0,
            ftc_east_asian: 0,
            ftc_other: 0,
            char_scale: 100,
            lid: 0x0400,
            cv: 0xFF00_0000,
        }
    }
}

/// Boolean character fields whose operand may refer back to the base record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChpToggle {
    Bold,
    Italic,
    Strike,
    Outline,
    Shadow,
    SmallCaps,
    Caps,
    Vanish,
    Imprint,
    Emboss,
}

impl ChpToggle {
    const ALL: [ChpToggle; 10] = [
        ChpToggle::Bold,
        ChpToggle::Italic,
        ChpToggle::Strike,
        ChpToggle::Outline,
        ChpToggle::Shadow,
        ChpToggle::SmallCaps,
        ChpToggle::Caps,
        ChpToggle::Vanish,
        ChpToggle::Imprint,
        ChpToggle::Emboss,
    ];

    fn from_opcode(opcode: u16) -> Option<Self> {
        Some(match opcode {
            SPRM_C_F_BOLD => ChpToggle::Bold,
            SPRM_C_F_ITALIC => ChpToggle::Italic,
            SPRM_C_F_STRIKE => ChpToggle::Strike,
            SPRM_C_F_OUTLINE => ChpToggle::Outline,
            SPRM_C_F_SHADOW => ChpToggle::Shadow,
            SPRM_C_F_SMALL_CAPS => ChpToggle::SmallCaps,
            SPRM_C_F_CAPS => ChpToggle::Caps,
            SPRM_C_F_VANISH => ChpToggle::Vanish,
            SPRM_C_F_IMPRINT => ChpToggle::Imprint,
            SPRM_C_F_EMBOSS => ChpToggle::Emboss,
            _ => return None,
        })
    }

    pub fn opcode(self) -> u16 {
        match self {
            ChpToggle::Bold => SPRM_C_F_BOLD,
            ChpToggle::Italic => SPRM_C_F_ITALIC,
            ChpToggle::Strike => SPRM_C_F_STRIKE,
            ChpToggle::Outline => SPRM_C_F_OUTLINE,
            ChpToggle::Shadow => SPRM_C_F_SHADOW,
            ChpToggle::SmallCaps => SPRM_C_F_SMALL_CAPS,
            ChpToggle::Caps => SPRM_C_F_CAPS,
            ChpToggle::Vanish => SPRM_C_F_VANISH,
            ChpToggle::Imprint => SPRM_C_F_IMPRINT,
            ChpToggle::Emboss => SPRM_C_F_EMBOSS,
        }
    }

    fn get(self, chp: &CharacterProperties) -> bool {
        match self {
            ChpToggle::Bold => chp.bold,
            ChpToggle::Italic => chp.italic,
            ChpToggle::Strike => chp.strike,
            ChpToggle::Outline => chp.outline,
            ChpToggle::Shadow => chp.shadow,
            ChpToggle::SmallCaps => chp.small_caps,
            ChpToggle::Caps => chp.caps,
            ChpToggle::Vanish => chp.vanish,
            ChpToggle::Imprint => chp.imprint,
            ChpToggle::Emboss => chp.emboss,
        }
    }

    fn field(self, chp: &mut CharacterProperties) -> &mut bool {
        match self {
            ChpToggle::Bold => &mut chp.bold,
            ChpToggle::Italic => &mut chp.italic,
            ChpToggle::Strike => &mut chp.strike,
            ChpToggle::Outline => &mut chp.outline,
            ChpToggle::Shadow => &mut chp.shadow,
            ChpToggle::SmallCaps => &mut chp.small_caps,
            ChpToggle::Caps => &mut chp.caps,
            ChpToggle::Vanish => &mut chp.vanish,
            ChpToggle::Imprint => &mut chp.imprint,
            ChpToggle::Emboss => &mut chp.emboss,
        }
    }
}

/// Get toggle value from SPRM operand.
///
/// - 0x00: off
/// - 0x01: on
/// - 0x80: same as the base record
/// - 0x81: opposite of the base record
fn toggle_value(operand: u8, base: bool) -> bool {
    match operand {
        0 => false,
        1 => true,
        0x80 => base,
        0x81 => !base,
        _ => operand & 1 != 0,
    }
}

/// Character opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChpOp {
    RMarkDel(bool),
    RMark(bool),
    FldVanish(bool),
    PicLocation(u32),
    Data(bool),
    Ole2(bool),
    Highlight(u8),
    Istd(u16),
    Toggle(ChpToggle, u8),
    DoubleStrike(bool),
    Spec(bool),
    Obj(bool),
    Underline(u8),
    DxaSpace(i16),
    Ico(u8),
    Hps(u16),
    Iss(u8),
    HpsKern(u16),
    FtcAscii(u16),
    FtcEastAsian(u16),
    FtcOther(u16),
    CharScale(u16),
    Lid(u16),
    Cv(u32),
    Unknown(u16),
}

impl PropertyOp for ChpOp {
    fn is_unknown(&self) -> bool {
        matches!(self, ChpOp::Unknown(_))
    }

    fn encode(&self, out: &mut SprmBuilder) {
        match *self {
            ChpOp::RMarkDel(v) => out.add_bool(SPRM_C_F_RMARK_DEL, v),
            ChpOp::RMark(v) => out.add_bool(SPRM_C_F_RMARK, v),
            ChpOp::FldVanish(v) => out.add_bool(SPRM_C_F_FLD_VANISH, v),
            ChpOp::PicLocation(v) => out.add_dword(SPRM_C_PIC_LOCATION, v),
            ChpOp::Data(v) => out.add_bool(SPRM_C_F_DATA, v),
            ChpOp::Ole2(v) => out.add_bool(SPRM_C_F_OLE2, v),
            ChpOp::Highlight(v) => out.add_byte(SPRM_C_HIGHLIGHT, v),
            ChpOp::Istd(v) => out.add_word(SPRM_C_ISTD, v),
            ChpOp::Toggle(toggle, v) => out.add_byte(toggle.opcode(), v),
            ChpOp::DoubleStrike(v) => out.add_bool(SPRM_C_F_DSTRIKE, v),
            ChpOp::Spec(v) => out.add_bool(SPRM_C_F_SPEC, v),
            ChpOp::Obj(v) => out.add_bool(SPRM_C_F_OBJ, v),
            ChpOp::Underline(v) => out.add_byte(SPRM_C_KUL, v),
            ChpOp::DxaSpace(v) => out.add_signed_word(SPRM_C_DXA_SPACE, v),
            ChpOp::Ico(v) => out.add_byte(SPRM_C_ICO, v),
            ChpOp::Hps(v) => out.add_word(SPRM_C_HPS, v),
            ChpOp::Iss(v) => out.add_byte(SPRM_C_ISS, v),
            ChpOp::HpsKern(v) => out.add_word(SPRM_C_HPS_KERN, v),
            ChpOp::FtcAscii(v) => out.add_word(SPRM_C_RG_FTC0, v),
            ChpOp::FtcEastAsian(v) => out.add_word(SPRM_C_RG_FTC1, v),
            ChpOp::FtcOther(v) => out.add_word(SPRM_C_RG_FTC2, v),
            ChpOp::CharScale(v) => out.add_word(SPRM_C_CHAR_SCALE, v),
            ChpOp::Lid(v) => out.add_word(SPRM_C_RG_LID0_80, v),
            ChpOp::Cv(v) => out.add_dword(SPRM_C_CV, v),
            ChpOp::Unknown(_) => {},
        }
    }
}

impl PropertyRecord for CharacterProperties {
    const NAME: &'static str = "character";
    type Op = ChpOp;

    fn decode_op(sprm: &Sprm) -> ChpOp {
        let byte = sprm.operand_byte().unwrap_or(0);
        let flag = byte != 0;
        let word = sprm.operand_word().unwrap_or(0);
        let dword = sprm.operand_dword().unwrap_or(0);
        if let Some(toggle) = ChpToggle::from_opcode(sprm.opcode) {
            return ChpOp::Toggle(toggle, byte);
        }
        match sprm.opcode {
            SPRM_C_F_RMARK_DEL => ChpOp::RMarkDel(flag),
            SPRM_C_F_RMARK => ChpOp::RMark(flag),
            SPRM_C_F_FLD_VANISH => ChpOp::FldVanish(flag),
            SPRM_C_PIC_LOCATION => ChpOp::PicLocation(dword),
            SPRM_C_F_DATA => ChpOp::Data(flag),
            SPRM_C_F_OLE2 => ChpOp::Ole2(flag),
            SPRM_C_HIGHLIGHT => ChpOp::Highlight(byte),
            SPRM_C_ISTD => ChpOp::Istd(word),
            SPRM_C_F_DSTRIKE => ChpOp::DoubleStrike(flag),
            SPRM_C_F_SPEC => ChpOp::Spec(flag),
            SPRM_C_F_OBJ => ChpOp::Obj(flag),
            SPRM_C_KUL => ChpOp::Underline(byte),
            SPRM_C_DXA_SPACE => ChpOp::DxaSpace(sprm.operand_i16().unwrap_or(0)),
            SPRM_C_ICO => ChpOp::Ico(byte),
            SPRM_C_HPS => ChpOp::Hps(word),
            SPRM_C_ISS => ChpOp::Iss(byte),
            SPRM_C_HPS_KERN => ChpOp::HpsKern(word),
            SPRM_C_RG_FTC0 => ChpOp::FtcAscii(word),
            SPRM_C_RG_FTC1 => ChpOp::FtcEastAsian(word),
            SPRM_C_RG_FTC2 => ChpOp::FtcOther(word),
            SPRM_C_CHAR_SCALE => ChpOp::CharScale(word),
            SPRM_C_RG_LID0_80 => ChpOp::Lid(word),
            SPRM_C_CV => ChpOp::Cv(dword),
            other => ChpOp::Unknown(other),
        }
    }

    fn apply_op(&mut self, base: &Self, op: &ChpOp) {
        match *op {
            ChpOp::RMarkDel(v) => self.rmark_del = v,
            ChpOp::RMark(v) => self.rmark = v,
            ChpOp::FldVanish(v) => self.fld_vanish = v,
            ChpOp::PicLocation(v) => self.pic_location = v,
            ChpOp::Data(v) => self.data = v,
            ChpOp::Ole2(v) => self.ole2 = v,
            ChpOp::Highlight(v) => self.highlight = v,
            ChpOp::Istd(v) => self.istd = v,
            ChpOp::Toggle(toggle, operand) => {
                *toggle.field(self) = toggle_value(operand, toggle.get(base));
            },
            ChpOp::DoubleStrike(v) => self.double_strike = v,
            ChpOp::Spec(v) => self.spec = v,
            ChpOp::Obj(v) => self.obj = v,
            ChpOp::Underline(v) => self.underline = v,
            ChpOp::DxaSpace(v) => self.dxa_space = v,
            ChpOp::Ico(v) => self.ico = v,
            ChpOp::Hps(v) => self.hps = v,
            ChpOp::Iss(v) => self.iss = v,
            ChpOp::HpsKern(v) => self.hps_kern = v,
            ChpOp::FtcAscii(v) => self.ftc_ascii = v,
            ChpOp::FtcEastAsian(v) => self.ftc_east_asian = v,
            ChpOp::FtcOther(v) => self.ftc_other = v,
            ChpOp::CharScale(v) => self.char_scale = v,
            ChpOp::Lid(v) => self.lid = v,
            ChpOp::Cv(v) => self.cv = v,
            ChpOp::Unknown(_) => {},
        }
    }

    fn diff(base: &Self, target: &Self) -> Vec<ChpOp> {
        let mut ops = Vec::new();
        macro_rules! differs {
            ($field:ident, $op:expr) => {
                if base.$field != target.$field {
                    ops.push($op(target.$field));
                }
            };
        }
        differs!(rmark_del, ChpOp::RMarkDel);
        differs!(rmark, ChpOp::RMark);
        differs!(fld_vanish, ChpOp::FldVanish);
        differs!(pic_location, ChpOp::PicLocation);
        differs!(data, ChpOp::Data);
        differs!(ole2, ChpOp::Ole2);
        differs!(highlight, ChpOp::Highlight);
        differs!(istd, ChpOp::Istd);
        for toggle in ChpToggle::ALL {
            let wanted = toggle.get(target);
            if toggle.get(base) != wanted {
                ops.push(ChpOp::Toggle(toggle, u8::from(wanted)));
            }
        }
        differs!(double_strike, ChpOp::DoubleStrike);
        differs!(spec, ChpOp::Spec);
        differs!(obj, ChpOp::Obj);
        differs!(underline, ChpOp::Underline);
        differs!(dxa_space, ChpOp::DxaSpace);
        differs!(ico, ChpOp::Ico);
        differs!(hps, ChpOp::Hps);
        differs!(iss, ChpOp::Iss);
        differs!(hps_kern, ChpOp::HpsKern);
        differs!(ftc_ascii, ChpOp::FtcAscii);
        differs!(ftc_east_asian, ChpOp::FtcEastAsian);
        differs!(ftc_other, ChpOp::FtcOther);
        differs!(char_scale, ChpOp::CharScale);
        differs!(lid, ChpOp::Lid);
        differs!(cv, ChpOp::Cv);
        ops
    }
}

impl CharacterProperties {
    /// Whether the run anchors a NilPICFAndBinData record in the Data stream.
    #[inline]
    pub fn has_bin_data(&self) -> bool {
        self.data && self.spec
    }
}
