//! # Unit Components
//!
//! Tests grouped by the layer of the simulation core they exercise.

/// Instruction codec and reference catalog.
pub mod isa;


/// Cache hierarchy in front of memory.
pub mod cache;

/// Register file, exceptions and execution engines.
pub mod core;

/// Simulator control, syscalls, events and the thread-safe handle.
pub mod sim;

/// Configuration parsing and validation.
pub mod config;
