/// Encoders for individual MIPS32 instructions.
pub mod instruction;
