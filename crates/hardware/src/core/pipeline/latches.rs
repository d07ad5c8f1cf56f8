//! Pipeline slots and inter-stage latches.
//!
//! Every in-flight instruction lives in a [`PipelineSlot`] that moves from
//! latch to latch as it progresses:
//! 1. **Identity:** A monotonically increasing sequence id orders slots in program order.
//! 2. **Decode State:** Handler, fields and control signals filled in by decode.
//! 3. **Results:** Operand values, execute output and load data.
//! 4. **Faults:** A recorded fault travels with the slot and is raised at commit.

use std::sync::Arc;

use crate::common::error::Fault;
use crate::core::pipeline::signals::{ControlSignals, RegRef};
use crate::core::pipeline::traits::PipelineLatch;
use crate::isa::codec::Fields;
use crate::isa::set::{ExecOutput, InstructionHandler};

/// Pipeline stage identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Instruction fetch.
    Fetch,
    /// Decode and operand read.
    Decode,
    /// Functional units.
    Execute,
    /// Data memory access.
    Memory,
    /// Commit point.
    Writeback,
}

impl Stage {
    /// The stage following this one, wrapping back to fetch.
    pub const fn next(self) -> Self {
        match self {
            Self::Fetch => Self::Decode,
            Self::Decode => Self::Execute,
            Self::Execute => Self::Memory,
            Self::Memory => Self::Writeback,
            Self::Writeback => Self::Fetch,
        }
    }
}

/// An in-flight instruction.
#[derive(Clone, Debug, Default)]
pub struct PipelineSlot {
    /// Program-order sequence number.
    pub id: u64,
    /// Address of the instruction.
    pub pc: u32,
    /// Raw instruction word.
    pub word: u32,
    /// Handler found by decode.
    pub handler: Option<Arc<dyn InstructionHandler>>,
    /// Fields decoded with the handler's format.
    pub fields: Option<Fields>,
    /// Control signals computed by decode.
    pub ctrl: ControlSignals,
    /// Source operand values.
    pub operands: [u32; 2],
    /// Execute stage output.
    pub output: ExecOutput,
    /// Value produced by a load.
    pub load_data: u32,
    /// Fault recorded by any stage.
    pub fault: Option<Fault>,
    /// Clocks spent waiting in decode for operands.
    pub stalls_data: u64,
    /// Clocks spent waiting in decode for a free unit.
    pub stalls_structural: u64,
    /// The slot sits in the delay slot of a control transfer.
    pub delay_slot: bool,
    /// Handler and signals are known.
    pub decoded: bool,
    /// The handler has run.
    pub executed: bool,
}

impl PipelineSlot {
    /// Creates a freshly fetched slot.
    pub fn fetched(id: u64, pc: u32, word: u32) -> Self {
        Self {
            id,
            pc,
            word,
            ..Self::default()
        }
    }

    /// Creates a slot whose fetch faulted.
    pub fn faulted(id: u64, pc: u32, fault: Fault) -> Self {
        Self {
            id,
            pc,
            fault: Some(fault),
            ..Self::default()
        }
    }

    /// Value written to the destination register.
    pub const fn result(&self) -> u32 {
        if self.ctrl.mem.is_load() {
            self.load_data
        } else {
            self.output.value
        }
    }

    /// Whether committing this slot writes `reg`.
    pub fn writes(&self, reg: RegRef) -> bool {
        self.fault.is_none() && !reg.is_zero() && self.ctrl.dest == Some(reg)
    }

    /// Mnemonic of the decoded handler, for tracing.
    pub fn mnemonic(&self) -> &str {
        self.handler.as_deref().map_or("?", |h| h.mnemonic())
    }
}

impl PipelineLatch for Option<PipelineSlot> {
    fn flush(&mut self) -> usize {
        usize::from(self.take().is_some())
    }

    fn flush_younger(&mut self, id: u64) -> usize {
        if self.as_ref().is_some_and(|slot| slot.id > id) {
            *self = None;
            1
        } else {
            0
        }
    }

    fn is_empty(&self) -> bool {
        self.is_none()
    }

    fn has_trap(&self) -> bool {
        self.as_ref().is_some_and(|slot| slot.fault.is_some())
    }
}
