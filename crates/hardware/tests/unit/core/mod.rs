/// GPR, COP0 and FPU banks.
pub mod registers;

/// Exception entry and return.
pub mod exceptions;


/// Execution engines.
pub mod pipeline;
