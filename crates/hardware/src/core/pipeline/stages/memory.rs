//! Memory Access (MEM) Stage.
//!
//! Performs the data access described by the control signals. Loads are
//! sign- or zero-extended to 32 bits; stores truncate the data to the access
//! width. Alignment and bounds errors become faults of the slot; accesses
//! that succeed are sent through the caches.

use tracing::trace;

use crate::common::error::{AccessKind, Fault, MemoryError};
use crate::core::Cpu;
use crate::core::pipeline::latches::PipelineSlot;
use crate::core::pipeline::signals::{MemOp, MemWidth};

/// Performs the memory access of `slot`, if any.
pub fn access(cpu: &mut Cpu, slot: &mut PipelineSlot) {
    if slot.fault.is_some() {
        return;
    }
    let address = slot.output.value;
    match slot.ctrl.mem {
        MemOp::None => return,
        MemOp::Load { width, signed } => match load(cpu, address, width, signed) {
            Ok(value) => {
                slot.load_data = value;
                cpu.access_cache(address, false);
            }
            Err(err) => slot.fault = Some(Fault::from_memory(&err, AccessKind::Load)),
        },
        MemOp::Store { width } => match store(cpu, address, width, slot.output.store) {
            Ok(()) => cpu.access_cache(address, true),
            Err(err) => slot.fault = Some(Fault::from_memory(&err, AccessKind::Store)),
        },
    }
    if cpu.trace {
        trace!(id = slot.id, address = format_args!("{address:#010x}"), fault = ?slot.fault, "MEM");
    }
}

fn load(cpu: &Cpu, address: u32, width: MemWidth, signed: bool) -> Result<u32, MemoryError> {
    let memory = &cpu.memory;
    Ok(match (width, signed) {
        (MemWidth::Byte, true) => memory.read_byte(address)? as i8 as u32,
        (MemWidth::Byte, false) => u32::from(memory.read_byte(address)?),
        (MemWidth::Half, true) => memory.read_half(address)? as i16 as u32,
        (MemWidth::Half, false) => u32::from(memory.read_half(address)?),
        (MemWidth::Word, _) => memory.read_word(address)?,
    })
}

fn store(cpu: &mut Cpu, address: u32, width: MemWidth, value: u32) -> Result<(), MemoryError> {
    match width {
        MemWidth::Byte => cpu.memory.write_byte(address, value as u8),
        MemWidth::Half => cpu.memory.write_half(address, value as u16),
        MemWidth::Word => cpu.memory.write_word(address, value),
    }
}
