//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the binary codec, opcode tables and the pluggable instruction-set
//! interface consulted by the pipeline.
//!
//! # Modules
//!
//! * `codec`: Encoding and decoding of the eight MIPS32 formats.
//! * `instruction`: Instruction words with decode metadata and origin.
//! * `set`: Handler and instruction-set traits plus a handler table.
//! * `catalog`: Reference MIPS32 instruction catalog.

/// Application Binary Interface (ABI) register name mappings.
pub mod abi;

/// Reference MIPS32 instruction catalog.
pub mod catalog;

/// Binary encoding and decoding of instruction formats.
pub mod codec;

/// Instruction words and bit extraction utilities.
pub mod instruction;

/// Primary opcodes and function codes.
pub mod opcodes;

/// Instruction handler and instruction-set interfaces.
pub mod set;

pub use codec::{Fields, Format, decode, encode, sign_extend};
pub use instruction::{Instruction, Origin};
pub use set::{ExecInput, ExecOutput, HandlerTable, InstructionHandler, InstructionSet};
