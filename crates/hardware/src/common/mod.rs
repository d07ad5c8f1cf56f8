//! Common utilities and types used throughout the MIPS simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Constants:** Memory layout, register defaults and exit codes.
//! 2. **Error Handling:** Memory errors, guest faults and fatal simulation errors.
//! 3. **Register Management:** A unified interface for the GPR, COP0 and FPU banks.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error, fault and failure definitions.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use error::{AccessKind, ConfigError, Fault, MemoryError, ProgramError, SimError, SyscallError};
pub use reg::{RegRef, RegisterBank, RegisterChange, RegisterFile, RegisterListener};
