//! Pipeline control signals and operation types.
//!
//! This module defines the signals that steer an instruction through the stages. It performs:
//! 1. **Register Usage:** Source and destination registers consulted by hazard detection.
//! 2. **Memory Control:** Access width, direction and sign extension.
//! 3. **Unit Selection:** The functional-unit class that may execute the instruction.
//! 4. **System Control:** Serializing operations handled at the commit point.

pub use crate::common::reg::RegRef;

/// Width of a memory access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MemWidth {
    /// One byte.
    #[default]
    Byte,
    /// Two bytes.
    Half,
    /// Four bytes.
    Word,
}

impl MemWidth {
    /// Width in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }
}

/// Memory operation performed in the MEM stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MemOp {
    /// No memory access.
    #[default]
    None,
    /// Load into the destination register.
    Load {
        /// Access width.
        width: MemWidth,
        /// Sign-extend narrow loads.
        signed: bool,
    },
    /// Store the second operand.
    Store {
        /// Access width.
        width: MemWidth,
    },
}

impl MemOp {
    /// Whether this is a load.
    pub const fn is_load(self) -> bool {
        matches!(self, Self::Load { .. })
    }

    /// Whether this is a store.
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Store { .. })
    }
}

/// Instruction class used to pick a functional unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OpClass {
    /// Integer, memory, branch and system instructions.
    #[default]
    Integer,
    /// Floating-point arithmetic.
    FloatingPoint,
}

impl OpClass {
    /// Lower-case name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::FloatingPoint => "floating-point",
        }
    }
}

/// Operations resolved at the commit point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SystemOp {
    /// Ordinary instruction.
    #[default]
    None,
    /// `syscall`: dispatch to the service in `$v0`.
    Syscall,
    /// `break`: raise a Breakpoint exception.
    Break,
    /// `eret`: return from exception.
    Eret,
}

/// Control signals produced by decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlSignals {
    /// Registers read as operands 0 and 1.
    pub sources: [Option<RegRef>; 2],
    /// Register written at commit.
    pub dest: Option<RegRef>,
    /// Memory operation.
    pub mem: MemOp,
    /// Functional-unit class.
    pub class: OpClass,
    /// Branch or jump.
    pub control_transfer: bool,
    /// Compact control transfer without a delay slot.
    pub compact: bool,
    /// Commit-time system operation.
    pub system: SystemOp,
}

impl ControlSignals {
    /// Integer operation writing `dest` from up to two sources.
    pub const fn alu(dest: RegRef, first: Option<RegRef>, second: Option<RegRef>) -> Self {
        Self {
            sources: [first, second],
            dest: Some(dest),
            mem: MemOp::None,
            class: OpClass::Integer,
            control_transfer: false,
            compact: false,
            system: SystemOp::None,
        }
    }

    /// Control transfer reading up to two sources and optionally linking.
    pub const fn branch(first: Option<RegRef>, second: Option<RegRef>, link: Option<RegRef>) -> Self {
        Self {
            sources: [first, second],
            dest: link,
            mem: MemOp::None,
            class: OpClass::Integer,
            control_transfer: true,
            compact: false,
            system: SystemOp::None,
        }
    }

    /// Marks the control transfer as compact.
    pub const fn compact(mut self) -> Self {
        self.compact = true;
        self
    }

    /// Changes the functional-unit class.
    pub const fn with_class(mut self, class: OpClass) -> Self {
        self.class = class;
        self
    }

    /// Whether the instruction resolves at commit and serializes the pipeline.
    pub const fn is_serializing(&self) -> bool {
        !matches!(self.system, SystemOp::None) || matches!(self.dest, Some(RegRef::Cop0 { .. }))
    }

    /// Whether the instruction has a branch delay slot.
    pub const fn has_delay_slot(&self) -> bool {
        self.control_transfer && !self.compact
    }
}
