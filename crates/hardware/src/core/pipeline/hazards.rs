//! Data Hazard Detection and Forwarding.
//!
//! This module decides, for an instruction in decode, where each source
//! operand comes from. It provides:
//! 1. **Producer Search:** Finds the youngest older in-flight instruction writing a register.
//! 2. **Operand Forwarding:** Bypasses the register file when the producer's value exists.
//! 3. **Stall Detection:** Reports a RAW hazard when the value is not yet available.
//!
//! Without forwarding every in-flight producer is unavailable, so the consumer
//! waits until the producer commits. Writeback runs before decode within a
//! cycle, which lets the consumer read the register file in the commit cycle.

use crate::common::reg::RegisterFile;
use crate::core::pipeline::latches::PipelineSlot;
use crate::core::pipeline::signals::RegRef;

/// An older in-flight instruction as seen by decode.
#[derive(Clone, Copy, Debug)]
pub struct Producer<'a> {
    /// The producing slot.
    pub slot: &'a PipelineSlot,
    /// The slot's result can be forwarded this cycle.
    pub available: bool,
}

/// Outcome of operand resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operands {
    /// Every source is known.
    Ready([u32; 2]),
    /// A source is produced by an instruction whose result is not available yet.
    Stall,
}

/// Resolves the source operands of `consumer`.
///
/// # Arguments
///
/// * `regs` - Architectural register file, already updated by this cycle's writeback.
/// * `consumer` - Decoded slot in the decode stage.
/// * `producers` - Older in-flight slots with their forwarding availability.
pub fn resolve_operands(
    regs: &RegisterFile,
    consumer: &PipelineSlot,
    producers: &[Producer<'_>],
) -> Operands {
    let mut values = [0; 2];
    for (value, source) in values.iter_mut().zip(consumer.ctrl.sources) {
        let Some(reg) = source else {
            continue;
        };
        let youngest = producers
            .iter()
            .filter(|p| p.slot.id < consumer.id && p.slot.writes(reg))
            .max_by_key(|p| p.slot.id);
        *value = match youngest {
            Some(p) if p.available => p.slot.result(),
            Some(_) => return Operands::Stall,
            None => read_source(regs, reg),
        };
    }
    Operands::Ready(values)
}

/// Reads a source register straight from the register file.
pub fn read_source(regs: &RegisterFile, reg: RegRef) -> u32 {
    regs.read(reg)
}
