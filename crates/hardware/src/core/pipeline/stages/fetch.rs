//! Instruction Fetch (IF) Stage.
//!
//! Reads the instruction word at a program counter. A misaligned or unmapped
//! program counter does not stop the engine: the fault is recorded in the
//! slot and raised when the slot reaches the commit point. Successful
//! fetches go through the caches.

use tracing::trace;

use crate::common::error::{AccessKind, Fault};
use crate::core::Cpu;
use crate::core::pipeline::latches::PipelineSlot;

/// Fetches the instruction at `pc` into a new slot with sequence number `id`.
pub fn fetch(cpu: &mut Cpu, id: u64, pc: u32) -> PipelineSlot {
    match cpu.memory.read_word(pc) {
        Ok(word) => {
            cpu.access_cache(pc, false);
            if cpu.trace {
                trace!(id, pc = format_args!("{pc:#010x}"), word = format_args!("{word:#010x}"), "IF");
            }
            PipelineSlot::fetched(id, pc, word)
        }
        Err(err) => {
            if cpu.trace {
                trace!(id, pc = format_args!("{pc:#010x}"), %err, "IF fault");
            }
            PipelineSlot::faulted(id, pc, Fault::from_memory(&err, AccessKind::Fetch))
        }
    }
}
