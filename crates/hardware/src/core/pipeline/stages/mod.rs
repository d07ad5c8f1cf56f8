//! Pipeline stage implementations.
//!
//! This module contains the stage functions shared by every engine topology.
//! It includes:
//! 1. **Fetch:** Retrieves instructions from memory based on the PC.
//! 2. **Decode:** Looks up the handler, computes control signals and reads operands.
//! 3. **Execute:** Runs the handler and resolves branch targets.
//! 4. **Memory:** Handles data load and store operations.
//! 5. **Writeback:** Commits results, dispatches syscalls and raises exceptions.

/// Instruction decode stage implementation.
pub mod decode;

/// Instruction execute stage implementation.
pub mod execute;

/// Instruction fetch stage implementation.
pub mod fetch;

/// Memory access stage implementation.
pub mod memory;

/// Writeback stage implementation.
pub mod writeback;

pub use decode::{decode, read_operands};
pub use execute::execute;
pub use fetch::fetch;
pub use memory::access;
pub use writeback::{Commit, commit};
