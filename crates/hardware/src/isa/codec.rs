//! MIPS Instruction Codec.
//!
//! This module converts between 32-bit instruction words and structured field sets
//! for the eight encoding formats:
//!
//! | Format | Fields (high to low) |
//! |--------|----------------------|
//! | R      | op, rs, rt, rd, shamt, funct |
//! | I      | op, rs, rt, imm16 |
//! | I11    | op, function, rt, base, imm11 |
//! | I26    | op, imm26 |
//! | J      | op, target |
//! | RI     | op, rs, function, imm16 |
//! | RFPU   | op, fmt, ft, fs, fd, funct |
//! | RSOP   | op, rs, rt, rd, sop, funct |
//!
//! Encoding masks every field to its width; decoding never fails.

use std::fmt;

use super::opcodes;

/// Shift and mask table for every instruction field.
pub mod field {
    /// Opcode shift (bits 31-26).
    pub const OPCODE_SHIFT: u32 = 26;
    /// Opcode mask (6 bits).
    pub const OPCODE_MASK: u32 = 0x3F;
    /// `rs`, `fmt` and I11 `function` shift (bits 25-21).
    pub const RS_SHIFT: u32 = 21;
    /// `rt`, `ft` and RI `function` shift (bits 20-16).
    pub const RT_SHIFT: u32 = 16;
    /// `rd`, `fs` and I11 `base` shift (bits 15-11).
    pub const RD_SHIFT: u32 = 11;
    /// `shamt`, `fd` and `sop` shift (bits 10-6).
    pub const SHAMT_SHIFT: u32 = 6;
    /// Mask of any five-bit register field.
    pub const REG_MASK: u32 = 0x1F;
    /// Function field mask (6 bits).
    pub const FUNCT_MASK: u32 = 0x3F;
    /// 16-bit immediate mask.
    pub const IMM16_MASK: u32 = 0xFFFF;
    /// 11-bit immediate mask.
    pub const IMM11_MASK: u32 = 0x7FF;
    /// 26-bit immediate and jump target mask.
    pub const IMM26_MASK: u32 = 0x03FF_FFFF;
}

use field::*;

/// Instruction encoding formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Register format.
    R,
    /// Immediate format with a signed 16-bit immediate.
    I,
    /// Immediate format with a signed 11-bit immediate and a base register.
    I11,
    /// Compact branch format with a signed 26-bit offset.
    I26,
    /// Jump format with an unsigned 26-bit instruction index.
    J,
    /// REGIMM format.
    Ri,
    /// Floating-point register format.
    RFpu,
    /// Register format with a special-operation (`sop`) field.
    RSop,
}

impl Format {
    /// Chooses a format from the opcode and sub-fields of `word`.
    pub const fn detect(word: u32) -> Self {
        let op = (word >> OPCODE_SHIFT) & OPCODE_MASK;
        let rs = (word >> RS_SHIFT) & REG_MASK;
        let funct = word & FUNCT_MASK;
        match op {
            opcodes::SPECIAL => {
                if funct >= opcodes::FUNCT_SOP30 && funct <= opcodes::FUNCT_SOP33 {
                    Self::RSop
                } else {
                    Self::R
                }
            }
            opcodes::REGIMM => Self::Ri,
            opcodes::J | opcodes::JAL => Self::J,
            opcodes::BC | opcodes::BALC => Self::I26,
            opcodes::COP0 => Self::R,
            opcodes::COP1 => match rs {
                opcodes::FMT_S | opcodes::FMT_D | opcodes::FMT_W | opcodes::FMT_L => Self::RFpu,
                _ => Self::R,
            },
            opcodes::COP2 if rs >= 0x0A && rs <= 0x0F => Self::I11,
            _ => Self::I,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::R => "R",
            Self::I => "I",
            Self::I11 => "I11",
            Self::I26 => "I26",
            Self::J => "J",
            Self::Ri => "RI",
            Self::RFpu => "RFPU",
            Self::RSop => "RSOP",
        };
        f.write_str(name)
    }
}

/// Decoded instruction fields, one variant per format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fields {
    /// R format.
    R {
        /// Primary opcode.
        opcode: u8,
        /// First source register.
        rs: u8,
        /// Second source register.
        rt: u8,
        /// Destination register.
        rd: u8,
        /// Shift amount.
        shamt: u8,
        /// Function code.
        funct: u8,
    },
    /// I format.
    I {
        /// Primary opcode.
        opcode: u8,
        /// Source or base register.
        rs: u8,
        /// Target register.
        rt: u8,
        /// Signed immediate.
        imm: i16,
    },
    /// I11 format.
    I11 {
        /// Primary opcode.
        opcode: u8,
        /// Sub-function.
        function: u8,
        /// Target register.
        rt: u8,
        /// Base register.
        base: u8,
        /// Signed 11-bit offset.
        offset: i16,
    },
    /// I26 format.
    I26 {
        /// Primary opcode.
        opcode: u8,
        /// Signed 26-bit offset in instructions.
        offset: i32,
    },
    /// J format.
    J {
        /// Primary opcode.
        opcode: u8,
        /// Unsigned 26-bit instruction index.
        target: u32,
    },
    /// REGIMM format.
    Ri {
        /// Primary opcode.
        opcode: u8,
        /// Source register.
        rs: u8,
        /// Sub-function in the `rt` position.
        function: u8,
        /// Signed immediate.
        imm: i16,
    },
    /// Floating-point register format.
    RFpu {
        /// Primary opcode.
        opcode: u8,
        /// Operand format.
        fmt: u8,
        /// Second source register.
        ft: u8,
        /// First source register.
        fs: u8,
        /// Destination register.
        fd: u8,
        /// Function code.
        funct: u8,
    },
    /// Register format with a special-operation field.
    RSop {
        /// Primary opcode.
        opcode: u8,
        /// First source register.
        rs: u8,
        /// Second source register.
        rt: u8,
        /// Destination register.
        rd: u8,
        /// Special-operation selector.
        sop: u8,
        /// Function code.
        funct: u8,
    },
}

impl Fields {
    /// Format of this field set.
    pub const fn format(&self) -> Format {
        match self {
            Self::R { .. } => Format::R,
            Self::I { .. } => Format::I,
            Self::I11 { .. } => Format::I11,
            Self::I26 { .. } => Format::I26,
            Self::J { .. } => Format::J,
            Self::Ri { .. } => Format::Ri,
            Self::RFpu { .. } => Format::RFpu,
            Self::RSop { .. } => Format::RSop,
        }
    }

    /// Primary opcode.
    pub const fn opcode(&self) -> u8 {
        match *self {
            Self::R { opcode, .. }
            | Self::I { opcode, .. }
            | Self::I11 { opcode, .. }
            | Self::I26 { opcode, .. }
            | Self::J { opcode, .. }
            | Self::Ri { opcode, .. }
            | Self::RFpu { opcode, .. }
            | Self::RSop { opcode, .. } => opcode,
        }
    }

    /// First source or base register, or 0 when the format has none.
    pub const fn rs(&self) -> u8 {
        match *self {
            Self::R { rs, .. } | Self::I { rs, .. } | Self::Ri { rs, .. } | Self::RSop { rs, .. } => rs,
            Self::I11 { base, .. } => base,
            _ => 0,
        }
    }

    /// Register in the `rt` position (bits 20-16), or 0 when the format has none.
    pub const fn rt(&self) -> u8 {
        match *self {
            Self::R { rt, .. } | Self::I { rt, .. } | Self::I11 { rt, .. } | Self::RSop { rt, .. } => rt,
            Self::RFpu { ft, .. } => ft,
            _ => 0,
        }
    }

    /// Register in the `rd` position (bits 15-11), or 0 when the format has none.
    pub const fn rd(&self) -> u8 {
        match *self {
            Self::R { rd, .. } | Self::RSop { rd, .. } => rd,
            Self::RFpu { fs, .. } => fs,
            _ => 0,
        }
    }

    /// Shift amount of R-format words.
    pub const fn shamt(&self) -> u8 {
        match *self {
            Self::R { shamt, .. } => shamt,
            _ => 0,
        }
    }

    /// Function code (bits 5-0) of register formats.
    pub const fn funct(&self) -> u8 {
        match *self {
            Self::R { funct, .. } | Self::RFpu { funct, .. } | Self::RSop { funct, .. } => funct,
            _ => 0,
        }
    }

    /// Sign-extended immediate or offset, or 0 for register formats.
    pub const fn imm(&self) -> i32 {
        match *self {
            Self::I { imm, .. } | Self::Ri { imm, .. } => imm as i32,
            Self::I11 { offset, .. } => offset as i32,
            Self::I26 { offset, .. } => offset,
            Self::J { target, .. } => target as i32,
            _ => 0,
        }
    }
}

const fn opcode_bits(opcode: u8) -> u32 {
    (opcode as u32 & OPCODE_MASK) << OPCODE_SHIFT
}

const fn reg_bits(value: u8, shift: u32) -> u32 {
    (value as u32 & REG_MASK) << shift
}

const fn funct_bits(funct: u8) -> u32 {
    funct as u32 & FUNCT_MASK
}

/// Encodes a field set into an instruction word.
///
/// Every field is masked to its width, so out-of-range values are truncated.
pub const fn encode(fields: &Fields) -> u32 {
    match *fields {
        Fields::R {
            opcode,
            rs,
            rt,
            rd,
            shamt,
            funct,
        } => {
            opcode_bits(opcode)
                | reg_bits(rs, RS_SHIFT)
                | reg_bits(rt, RT_SHIFT)
                | reg_bits(rd, RD_SHIFT)
                | reg_bits(shamt, SHAMT_SHIFT)
                | funct_bits(funct)
        }
        Fields::I { opcode, rs, rt, imm } => {
            opcode_bits(opcode) | reg_bits(rs, RS_SHIFT) | reg_bits(rt, RT_SHIFT) | (imm as u16 as u32)
        }
        Fields::I11 {
            opcode,
            function,
            rt,
            base,
            offset,
        } => {
            opcode_bits(opcode)
                | reg_bits(function, RS_SHIFT)
                | reg_bits(rt, RT_SHIFT)
                | reg_bits(base, RD_SHIFT)
                | (offset as u32 & IMM11_MASK)
        }
        Fields::I26 { opcode, offset } => opcode_bits(opcode) | (offset as u32 & IMM26_MASK),
        Fields::J { opcode, target } => opcode_bits(opcode) | (target & IMM26_MASK),
        Fields::Ri {
            opcode,
            rs,
            function,
            imm,
        } => opcode_bits(opcode) | reg_bits(rs, RS_SHIFT) | reg_bits(function, RT_SHIFT) | (imm as u16 as u32),
        Fields::RFpu {
            opcode,
            fmt,
            ft,
            fs,
            fd,
            funct,
        } => {
            opcode_bits(opcode)
                | reg_bits(fmt, RS_SHIFT)
                | reg_bits(ft, RT_SHIFT)
                | reg_bits(fs, RD_SHIFT)
                | reg_bits(fd, SHAMT_SHIFT)
                | funct_bits(funct)
        }
        Fields::RSop {
            opcode,
            rs,
            rt,
            rd,
            sop,
            funct,
        } => {
            opcode_bits(opcode)
                | reg_bits(rs, RS_SHIFT)
                | reg_bits(rt, RT_SHIFT)
                | reg_bits(rd, RD_SHIFT)
                | reg_bits(sop, SHAMT_SHIFT)
                | funct_bits(funct)
        }
    }
}

const fn reg_at(word: u32, shift: u32) -> u8 {
    ((word >> shift) & REG_MASK) as u8
}

/// Decodes `word` with the layout of `format`.
pub const fn decode(word: u32, format: Format) -> Fields {
    let opcode = ((word >> OPCODE_SHIFT) & OPCODE_MASK) as u8;
    let funct = (word & FUNCT_MASK) as u8;
    match format {
        Format::R => Fields::R {
            opcode,
            rs: reg_at(word, RS_SHIFT),
            rt: reg_at(word, RT_SHIFT),
            rd: reg_at(word, RD_SHIFT),
            shamt: reg_at(word, SHAMT_SHIFT),
            funct,
        },
        Format::I => Fields::I {
            opcode,
            rs: reg_at(word, RS_SHIFT),
            rt: reg_at(word, RT_SHIFT),
            imm: (word & IMM16_MASK) as u16 as i16,
        },
        Format::I11 => Fields::I11 {
            opcode,
            function: reg_at(word, RS_SHIFT),
            rt: reg_at(word, RT_SHIFT),
            base: reg_at(word, RD_SHIFT),
            offset: sign_extend(word & IMM11_MASK, 11) as i16,
        },
        Format::I26 => Fields::I26 {
            opcode,
            offset: sign_extend(word & IMM26_MASK, 26),
        },
        Format::J => Fields::J {
            opcode,
            target: word & IMM26_MASK,
        },
        Format::Ri => Fields::Ri {
            opcode,
            rs: reg_at(word, RS_SHIFT),
            function: reg_at(word, RT_SHIFT),
            imm: (word & IMM16_MASK) as u16 as i16,
        },
        Format::RFpu => Fields::RFpu {
            opcode,
            fmt: reg_at(word, RS_SHIFT),
            ft: reg_at(word, RT_SHIFT),
            fs: reg_at(word, RD_SHIFT),
            fd: reg_at(word, SHAMT_SHIFT),
            funct,
        },
        Format::RSop => Fields::RSop {
            opcode,
            rs: reg_at(word, RS_SHIFT),
            rt: reg_at(word, RT_SHIFT),
            rd: reg_at(word, RD_SHIFT),
            sop: reg_at(word, SHAMT_SHIFT),
            funct,
        },
    }
}

/// Decodes `word` with the format chosen by [`Format::detect`].
pub const fn decode_detected(word: u32) -> Fields {
    decode(word, Format::detect(word))
}

/// Sign-extends the low `bits` bits of `value`.
///
/// `bits == 0` yields 0 and `bits >= 32` returns the value unchanged.
pub const fn sign_extend(value: u32, bits: u32) -> i32 {
    match bits {
        0 => 0,
        32.. => value as i32,
        _ => {
            let shift = 32 - bits;
            ((value << shift) as i32) >> shift
        }
    }
}
