//! Instruction words and field extraction utilities.
//!
//! Provides bit extraction helpers for raw 32-bit words and the `Instruction`
//! type: an immutable word together with its decoded fields and the source
//! construct (basic instruction or pseudo-instruction expansion) it came from.

use serde::Deserialize;

use super::codec::{self, Fields, Format, field};

/// Trait for extracting instruction fields from encoded words.
pub trait InstructionBits {
    /// Primary opcode (bits 31-26).
    fn opcode(&self) -> u32;

    /// `rs` field (bits 25-21).
    fn rs(&self) -> usize;

    /// `rt` field (bits 20-16).
    fn rt(&self) -> usize;

    /// `rd` field (bits 15-11).
    fn rd(&self) -> usize;

    /// `shamt` / `sop` field (bits 10-6).
    fn shamt(&self) -> u32;

    /// Function code (bits 5-0).
    fn funct(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        (self >> field::OPCODE_SHIFT) & field::OPCODE_MASK
    }

    #[inline(always)]
    fn rs(&self) -> usize {
        ((self >> field::RS_SHIFT) & field::REG_MASK) as usize
    }

    #[inline(always)]
    fn rt(&self) -> usize {
        ((self >> field::RT_SHIFT) & field::REG_MASK) as usize
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> field::RD_SHIFT) & field::REG_MASK) as usize
    }

    #[inline(always)]
    fn shamt(&self) -> u32 {
        (self >> field::SHAMT_SHIFT) & field::REG_MASK
    }

    #[inline(always)]
    fn funct(&self) -> u32 {
        self & field::FUNCT_MASK
    }
}

/// Source construct an instruction word was assembled from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Origin {
    /// Origin not recorded.
    #[default]
    Unknown,
    /// A basic instruction.
    Basic {
        /// Mnemonic as written.
        mnemonic: String,
    },
    /// One word of a pseudo-instruction expansion.
    Pseudo {
        /// Pseudo-instruction mnemonic.
        mnemonic: String,
        /// Position of this word within the expansion.
        index: u8,
        /// Number of words in the expansion.
        count: u8,
    },
}

/// An assembled instruction word with its decode metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    word: u32,
    fields: Fields,
    origin: Origin,
}

impl Instruction {
    /// Wraps a raw word, decoding it with the detected format.
    pub const fn new(word: u32, origin: Origin) -> Self {
        Self {
            word,
            fields: codec::decode_detected(word),
            origin,
        }
    }

    /// Builds an instruction from a field set.
    pub const fn from_fields(fields: Fields, origin: Origin) -> Self {
        Self {
            word: codec::encode(&fields),
            fields,
            origin,
        }
    }

    /// Raw word.
    pub const fn word(&self) -> u32 {
        self.word
    }

    /// Encoding format.
    pub const fn format(&self) -> Format {
        self.fields.format()
    }

    /// Decoded fields.
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Source construct.
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }
}
