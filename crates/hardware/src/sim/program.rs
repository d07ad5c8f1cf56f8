//! Program images.
//!
//! A [`Program`] is the already-assembled output of an assembler: resolved
//! instruction words for user and kernel text, initialized data and a symbol
//! table kept for display. It performs:
//! 1. **Construction:** From raw words for tests, or from a JSON document.
//! 2. **Loading:** Places everything in memory without triggering write hooks.
//! 3. **Bounds:** Reports where user and kernel text end, which is where fetching stops.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::constants::{INSTRUCTION_SIZE, KERNEL_TEXT_START, GENERAL_EXCEPTION_OFFSET, TEXT_START};
use crate::common::error::{MemoryError, ProgramError};
use crate::core::cpu::TextBounds;
use crate::isa::instruction::{Instruction, Origin};
use crate::memory::Memory;

/// One assembled instruction word.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProgramWord {
    /// Address of the word.
    pub address: u32,
    /// Encoded instruction.
    pub word: u32,
    /// Source construct the word came from.
    #[serde(default)]
    pub origin: Origin,
}

/// Initialized data.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DataBlock {
    /// Address of the first byte.
    pub address: u32,
    /// Contents.
    pub bytes: Vec<u8>,
}

/// An assembled program.
///
/// # Examples
///
/// ```
/// use mipsim_core::sim::program::Program;
///
/// let json = r#"{
///     "text": [ { "address": 4194304, "word": 0 } ],
///     "symbols": { "main": 4194304 }
/// }"#;
/// let program = Program::from_json(json).unwrap();
/// assert_eq!(program.entry_point(), 0x0040_0000);
/// assert_eq!(program.symbols["main"], 0x0040_0000);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Program {
    /// Address execution starts at. Defaults to the first user text word.
    pub entry: Option<u32>,
    /// User text.
    pub text: Vec<ProgramWord>,
    /// Kernel text, including exception handlers.
    pub kernel_text: Vec<ProgramWord>,
    /// Initialized data.
    pub data: Vec<DataBlock>,
    /// Label addresses, for display only.
    pub symbols: BTreeMap<String, u32>,
}

impl Program {
    /// Builds a program from consecutive user text words starting at the text base.
    pub fn from_words(words: &[u32]) -> Self {
        Self {
            text: consecutive(TEXT_START, words),
            ..Self::default()
        }
    }

    /// Adds an exception handler at the default general exception vector.
    #[must_use]
    pub fn with_exception_handler(mut self, words: &[u32]) -> Self {
        self.kernel_text = consecutive(KERNEL_TEXT_START + GENERAL_EXCEPTION_OFFSET, words);
        self
    }

    /// Adds initialized data.
    #[must_use]
    pub fn with_data(mut self, address: u32, bytes: impl Into<Vec<u8>>) -> Self {
        self.data.push(DataBlock {
            address,
            bytes: bytes.into(),
        });
        self
    }

    /// Parses a JSON program image.
    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON program image file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Address execution starts at.
    pub fn entry_point(&self) -> u32 {
        self.entry
            .or_else(|| self.text.iter().map(|w| w.address).min())
            .unwrap_or(TEXT_START)
    }

    /// User text words decoded for display.
    pub fn instructions(&self) -> impl Iterator<Item = (u32, Instruction)> + '_ {
        self.text
            .iter()
            .map(|w| (w.address, Instruction::new(w.word, w.origin.clone())))
    }

    /// Writes the whole image into `memory`, bypassing write hooks.
    ///
    /// # Returns
    ///
    /// Where user and kernel text end.
    pub fn load_into(&self, memory: &mut Memory) -> Result<TextBounds, MemoryError> {
        let bounds = TextBounds {
            user_end: text_end(&self.text)?,
            kernel_end: text_end(&self.kernel_text)?,
        };
        for word in self.text.iter().chain(&self.kernel_text) {
            memory.load_word(word.address, word.word)?;
        }
        for block in &self.data {
            memory.load_bytes(block.address, &block.bytes)?;
        }
        Ok(bounds)
    }
}

fn consecutive(base: u32, words: &[u32]) -> Vec<ProgramWord> {
    words
        .iter()
        .zip((base..).step_by(INSTRUCTION_SIZE as usize))
        .map(|(&word, address)| ProgramWord {
            address,
            word,
            origin: Origin::Unknown,
        })
        .collect()
}

/// First address past the highest word, or `None` for an empty segment.
fn text_end(words: &[ProgramWord]) -> Result<Option<u32>, MemoryError> {
    let Some(last) = words.iter().map(|w| w.address).max() else {
        return Ok(None);
    };
    last.checked_add(INSTRUCTION_SIZE)
        .map(Some)
        .ok_or(MemoryError::TextWraps { address: last })
}
