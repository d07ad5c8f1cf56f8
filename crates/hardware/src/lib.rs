//! MIPS32 cycle-level simulation core.
//!
//! This crate implements a cycle-level MIPS32 instruction-set simulator with the following:
//! 1. **ISA:** Binary codec for the eight instruction formats and a pluggable instruction set.
//! 2. **Memory:** Sparse sectioned address space with write guards and change listeners.
//! 3. **Core:** GPR, COP0 and FPU banks, precise exceptions and four execution engines
//!    (single-cycle, multi-cycle, pipelined, multi-unit pipelined).
//! 4. **Simulation:** Step, run, undo, reset, breakpoints, syscalls and a thread-safe handle.
//! 5. **Configuration and statistics:** JSON configuration and performance counters.

/// Common types and constants (errors, faults, register file).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// CPU core (architectural state, exceptions, execution engines).
pub mod core;
/// Instruction set (codec, instruction words, handler interface, reference catalog).
pub mod isa;
/// Sectioned guest memory.
pub mod memory;
/// Simulator, handle, program images, syscalls and events.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Architectural state shared by every engine.
pub use crate::core::Cpu;
/// Top-level simulator.
pub use crate::sim::simulator::Simulator;
/// Thread-safe handle around a simulator.
pub use crate::sim::handle::SimulationHandle;
/// Assembled program image.
pub use crate::sim::program::Program;
/// Fatal simulation error.
pub use crate::common::error::SimError;
