//! Core processor implementation.
//!
//! This module contains the CPU state container, the architectural register
//! banks and exception definitions, and the interchangeable execution engines.

/// Architecture-specific components (register banks, COP0, exception causes).
pub mod arch;

/// CPU state container and exception controller.
pub mod cpu;

/// Execution engines (stages, latches, hazards, signals, topologies).
pub mod pipeline;

pub use self::cpu::Cpu;
