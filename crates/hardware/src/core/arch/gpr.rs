//! MIPS General-Purpose Register File.
//!
//! This module implements the General-Purpose Register (GPR) bank. It performs the following:
//! 1. **Storage:** Maintains 32 integer registers (`$zero`-`$ra`) with their aliases.
//! 2. **Invariant Enforcement:** `$zero` is not modifiable; writes to it are dropped.
//! 3. **Reset Values:** `$gp` and `$sp` come up at their conventional addresses.

use super::register::Register;
use crate::common::constants::{DEFAULT_GLOBAL_POINTER, DEFAULT_STACK_POINTER};
use crate::isa::abi::{GPR_NAMES, REG_GP, REG_SP, REG_ZERO};

/// General-Purpose Register file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gpr {
    regs: [Register; 32],
}

impl Gpr {
    /// Creates the bank with every register at its reset value.
    pub fn new() -> Self {
        Self {
            regs: std::array::from_fn(|idx| {
                let default = match idx {
                    REG_GP => DEFAULT_GLOBAL_POINTER,
                    REG_SP => DEFAULT_STACK_POINTER,
                    _ => 0,
                };
                Register::new(idx as u8, GPR_NAMES[idx], default, idx != REG_ZERO)
            }),
        }
    }

    /// Reads a register. Out-of-range indices read as zero.
    pub fn read(&self, idx: usize) -> u32 {
        self.regs.get(idx).map_or(0, Register::value)
    }

    /// Writes a register.
    ///
    /// # Returns
    ///
    /// The previous value if the register changed. Writes to `$zero` return `None`.
    pub fn write(&mut self, idx: usize, val: u32) -> Option<u32> {
        self.regs.get_mut(idx).and_then(|reg| reg.set(val))
    }

    /// Looks up a register number by any of its aliases.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.regs.iter().position(|reg| reg.answers_to(name))
    }

    /// Returns the register cell at `idx`.
    pub fn register(&self, idx: usize) -> Option<&Register> {
        self.regs.get(idx)
    }

    /// Restores every register to its reset value.
    pub fn reset(&mut self) {
        self.regs.iter_mut().for_each(Register::reset);
    }

    /// Dumps the contents of all general-purpose registers to stdout.
    pub fn dump(&self) {
        for pair in self.regs.chunks(2) {
            let line: Vec<String> = pair
                .iter()
                .map(|reg| format!("{:<5}={:#010x}", reg.name(), reg.value()))
                .collect();
            println!("{}", line.join("  "));
        }
    }
}

impl Default for Gpr {
    fn default() -> Self {
        Self::new()
    }
}
