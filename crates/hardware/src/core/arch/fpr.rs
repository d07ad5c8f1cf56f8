//! MIPS Floating-Point Register File.
//!
//! This module implements the FPU register bank. It performs the following:
//! 1. **Storage:** Maintains 32 single-width registers (`$f0`-`$f31`).
//! 2. **Raw Access:** Values are kept as raw 32-bit patterns; interpretation
//!    as IEEE 754 single precision is left to the instruction handlers.

use super::register::Register;
use crate::isa::abi::FPR_NAMES;

/// Floating-Point Register file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fpr {
    fregs: [Register; 32],
}

impl Fpr {
    /// Creates a new floating-point register file with all registers cleared.
    pub fn new() -> Self {
        Self {
            fregs: std::array::from_fn(|idx| Register::new(idx as u8, FPR_NAMES[idx], 0, true)),
        }
    }

    /// Reads a register as raw bits.
    pub fn read(&self, idx: usize) -> u32 {
        self.fregs.get(idx).map_or(0, Register::value)
    }

    /// Writes raw bits to a register.
    ///
    /// # Returns
    ///
    /// The previous bits if the register changed.
    pub fn write(&mut self, idx: usize, bits: u32) -> Option<u32> {
        self.fregs.get_mut(idx).and_then(|reg| reg.set(bits))
    }

    /// Looks up a register number by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fregs.iter().position(|reg| reg.answers_to(name))
    }

    /// Clears every register.
    pub fn reset(&mut self) {
        self.fregs.iter_mut().for_each(Register::reset);
    }
}

impl Default for Fpr {
    fn default() -> Self {
        Self::new()
    }
}
