//! Error, fault and failure definitions.
//!
//! This module defines every error surface of the simulator. It provides:
//! 1. **Memory Errors:** Alignment and bounds failures reported by the memory model.
//! 2. **Guest Faults:** Recoverable conditions that become architectural exceptions.
//! 3. **Fatal Errors:** Conditions that poison the simulator and stop execution.
//! 4. **Configuration Errors:** Invalid topologies and memory layouts.

use thiserror::Error;

use crate::core::arch::trap::ExceptionCause;

/// Kind of memory access that produced a fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Instruction fetch.
    Fetch,
    /// Data load.
    Load,
    /// Data store.
    Store,
}

/// Errors reported by the memory model.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The address is not a multiple of the access width.
    #[error("unaligned {width}-byte access at {address:#010x}")]
    Alignment {
        /// Faulting address.
        address: u32,
        /// Access width in bytes.
        width: u32,
    },

    /// The address does not belong to any section.
    #[error("address {address:#010x} is outside every memory section")]
    OutOfBounds {
        /// Faulting address.
        address: u32,
    },

    /// A section overlaps one that is already mapped.
    #[error("section `{name}` overlaps section `{other}`")]
    Overlap {
        /// Name of the rejected section.
        name: String,
        /// Name of the section already mapped.
        other: String,
    },

    /// A text word sits at the very top of the address space, leaving no address after it.
    #[error("text word at {address:#010x} ends past the top of the address space")]
    TextWraps {
        /// Address of the word.
        address: u32,
    },

    /// A section descriptor is malformed.
    #[error("section `{name}` is invalid: {reason}")]
    InvalidSection {
        /// Name of the rejected section.
        name: String,
        /// Human readable reason.
        reason: String,
    },
}

impl MemoryError {
    /// Returns the address involved in an access error, if any.
    pub const fn address(&self) -> Option<u32> {
        match self {
            Self::Alignment { address, .. } | Self::OutOfBounds { address } | Self::TextWraps { address } => {
                Some(*address)
            }
            Self::Overlap { .. } | Self::InvalidSection { .. } => None,
        }
    }
}

/// Recoverable guest faults.
///
/// A fault is recorded in the pipeline slot of the instruction that caused it
/// and turned into an exception only when that instruction reaches the commit
/// point, which keeps exceptions precise.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Fault {
    /// Unaligned memory access.
    #[error("unaligned {access:?} at {address:#010x}")]
    Alignment {
        /// Faulting address.
        address: u32,
        /// Access that faulted.
        access: AccessKind,
    },

    /// Access to an address outside every section.
    #[error("{access:?} outside memory at {address:#010x}")]
    OutOfBounds {
        /// Faulting address.
        address: u32,
        /// Access that faulted.
        access: AccessKind,
    },

    /// Signed integer overflow.
    #[error("arithmetic overflow")]
    Arithmetic,

    /// Instruction-specific runtime failure, such as division by zero.
    #[error("{0}")]
    RuntimeInstruction(String),

    /// `syscall` with a service number that has no handler.
    #[error("no handler for syscall service {0}")]
    UnhandledSyscall(u32),

    /// Unknown encoding, or a control transfer placed in a delay slot.
    #[error("reserved instruction {0:#010x}")]
    Reserved(u32),

    /// `break` instruction.
    #[error("break instruction")]
    Break,

    /// Conditional trap instruction whose condition held.
    #[error("trap condition met")]
    Trap,
}

impl Fault {
    /// Converts a memory error into the guest fault for the given access.
    pub fn from_memory(err: &MemoryError, access: AccessKind) -> Self {
        match *err {
            MemoryError::Alignment { address, .. } => Self::Alignment { address, access },
            _ => Self::OutOfBounds {
                address: err.address().unwrap_or_default(),
                access,
            },
        }
    }

    /// Returns the architectural exception cause for this fault.
    pub const fn cause(&self) -> ExceptionCause {
        match self {
            Self::Alignment {
                access: AccessKind::Store,
                ..
            } => ExceptionCause::AddressErrorStore,
            Self::Alignment { .. } => ExceptionCause::AddressErrorLoad,
            Self::OutOfBounds {
                access: AccessKind::Fetch,
                ..
            } => ExceptionCause::InstructionBusError,
            Self::OutOfBounds { .. } => ExceptionCause::DataBusError,
            Self::Arithmetic => ExceptionCause::ArithmeticOverflow,
            Self::RuntimeInstruction(_) | Self::Trap => ExceptionCause::Trap,
            Self::UnhandledSyscall(_) => ExceptionCause::Syscall,
            Self::Reserved(_) => ExceptionCause::ReservedInstruction,
            Self::Break => ExceptionCause::Breakpoint,
        }
    }

    /// Returns the address to latch into BadVAddr, if the fault carries one.
    pub const fn bad_address(&self) -> Option<u32> {
        match self {
            Self::Alignment { address, .. } => Some(*address),
            _ => None,
        }
    }
}

/// Error reported by a syscall handler.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyscallError {
    message: String,
}

impl SyscallError {
    /// Creates a handler error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Invalid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A multi-unit topology was configured without functional units.
    #[error("the execute stage needs at least one functional unit")]
    NoUnits,

    /// A functional unit has zero latency.
    #[error("functional unit {index} has zero latency")]
    ZeroLatency {
        /// Position of the unit in the configuration.
        index: usize,
    },

    /// No configured unit accepts the given instruction class.
    #[error("no functional unit accepts {0} instructions")]
    NoUnitFor(&'static str),

    /// Cell size is zero, smaller than a word or not a power of two.
    #[error("cell size must be a power of two of at least 4 bytes, got {0}")]
    CellSize(u32),

    /// A cache level has an impossible geometry.
    #[error("cache level {level}: {reason}")]
    InvalidCache {
        /// Position of the cache in the hierarchy.
        level: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Failure to read a program image.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// The file could not be read.
    #[error("cannot read program image: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not a valid program image.
    #[error("malformed program image: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal simulation errors.
///
/// Any of these halts the simulator. Further steps report [`SimError::Halted`].
#[derive(Debug, Error)]
pub enum SimError {
    /// An engine invariant was violated.
    #[error("internal engine error: {0}")]
    Internal(String),

    /// A syscall handler reported an error.
    #[error("syscall {service} failed: {source}")]
    SyscallFailed {
        /// Service number read from `$v0`.
        service: u32,
        /// Error returned by the handler.
        #[source]
        source: SyscallError,
    },

    /// The simulator was poisoned by an earlier fatal error.
    #[error("simulation halted after a fatal error")]
    Halted,

    /// A run is already in progress on a worker thread.
    #[error("a run is already in progress")]
    AlreadyRunning,

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The program image could not be placed in memory.
    #[error("program load failed: {0}")]
    Load(#[from] MemoryError),
}
