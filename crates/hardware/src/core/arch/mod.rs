//! MIPS architecture-specific components.
//!
//! This module contains the implementation of the architectural register banks.
//! It includes the following modules:
//! 1. **Register:** The shared register cell (value, default, aliases).
//! 2. **COP0:** System control registers with masked writes and derived privilege.
//! 3. **FPRs:** Floating-Point Register bank (raw bits).
//! 4. **GPRs:** General-Purpose Register bank.
//! 5. **Traps:** Exception cause codes and vector computation.

/// System control coprocessor registers.
pub mod cop0;

/// Floating-Point Register file implementation.
pub mod fpr;

/// General-Purpose Register file implementation.
pub mod gpr;

/// Architectural register cell.
pub mod register;

/// Exception cause codes and vectoring.
pub mod trap;
