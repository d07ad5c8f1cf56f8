//! Exception Cause Codes and Vector Computation.
//!
//! This module provides the architectural side of exception handling. It performs
//! the following:
//! 1. **Cause Codes:** Maps exception kinds to the Cause.ExcCode values.
//! 2. **Vectoring:** Computes the general exception vector from EBase.

use std::fmt;

use crate::common::constants::GENERAL_EXCEPTION_OFFSET;

/// Architectural exception causes, encoded as in Cause.ExcCode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ExceptionCause {
    /// External or timer interrupt.
    Interrupt = 0,
    /// Address error on fetch or load.
    AddressErrorLoad = 4,
    /// Address error on store.
    AddressErrorStore = 5,
    /// Bus error on instruction fetch.
    InstructionBusError = 6,
    /// Bus error on data access.
    DataBusError = 7,
    /// `syscall` instruction.
    Syscall = 8,
    /// `break` instruction.
    Breakpoint = 9,
    /// Reserved or illegal instruction.
    ReservedInstruction = 10,
    /// Coprocessor unusable.
    CoprocessorUnusable = 11,
    /// Signed arithmetic overflow.
    ArithmeticOverflow = 12,
    /// Conditional trap or instruction runtime failure.
    Trap = 13,
    /// Floating-point exception.
    FloatingPoint = 15,
}

impl ExceptionCause {
    /// Returns the ExcCode value.
    pub const fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ExceptionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.code())
    }
}

/// Computes the general exception vector for the given EBase value.
///
/// The vector always lies in the unmapped kernel segment.
pub const fn exception_vector(ebase: u32) -> u32 {
    ((ebase & 0xFFFF_F000).wrapping_add(GENERAL_EXCEPTION_OFFSET) & 0x3FFF_FFFF) | 0x8000_0000
}
