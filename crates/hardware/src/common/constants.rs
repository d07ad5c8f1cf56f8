//! Global System Constants.
//!
//! This module defines system-wide constants used across the simulator. It includes:
//! 1. **Memory Layout:** Default section bases and lengths of the MIPS32 address map.
//! 2. **Register Defaults:** Reset values of the stack and global pointers.
//! 3. **Exception Constants:** Vector offsets and exit codes.
//! 4. **Simulation Constants:** Undo history limits and instruction size.

/// Size of one instruction word in bytes.
pub const INSTRUCTION_SIZE: u32 = 4;

/// Default size of a lazily allocated memory cell in bytes.
pub const DEFAULT_CELL_SIZE: u32 = 4096;

/// Base of the user text section.
pub const TEXT_START: u32 = 0x0040_0000;

/// Length of the user text section.
pub const TEXT_LENGTH: u32 = 0x0FC0_0000;

/// Base of the user data section.
pub const DATA_START: u32 = 0x1000_0000;

/// Length of the user data section.
pub const DATA_LENGTH: u32 = 0x7000_0000;

/// Address where static data is placed by convention.
pub const STATIC_DATA_START: u32 = 0x1001_0000;

/// Base of the kernel text section.
pub const KERNEL_TEXT_START: u32 = 0x8000_0000;

/// Length of the kernel text section.
pub const KERNEL_TEXT_LENGTH: u32 = 0x1000_0000;

/// Base of the kernel data section.
pub const KERNEL_DATA_START: u32 = 0x9000_0000;

/// Length of the kernel data section.
pub const KERNEL_DATA_LENGTH: u32 = 0x6FFF_0000;

/// Base of the external (memory-mapped I/O) section.
pub const EXTERNAL_START: u32 = 0xFFFF_0000;

/// Length of the external section.
pub const EXTERNAL_LENGTH: u32 = 0x0001_0000;

/// Reset value of `$gp`.
pub const DEFAULT_GLOBAL_POINTER: u32 = 0x1000_8000;

/// Reset value of `$sp`.
pub const DEFAULT_STACK_POINTER: u32 = 0x7FFF_EFFC;

/// Offset of the general exception vector from EBase.
pub const GENERAL_EXCEPTION_OFFSET: u32 = 0x180;

/// Exit code base used when an exception has no installed handler.
pub const UNHANDLED_EXCEPTION_EXIT_BASE: i32 = 0x1000;

/// Exit code reported after a syscall handler failure.
pub const SYSCALL_FAILURE_EXIT_CODE: i32 = 1;

/// Exit code reported after an internal engine error.
pub const INTERNAL_ERROR_EXIT_CODE: i32 = -1;

/// Default number of undo snapshots kept.
pub const DEFAULT_UNDO_LIMIT: usize = 1024;

/// Upper bound accepted for the undo history length.
pub const MAX_UNDO_LIMIT: usize = 10_000;
