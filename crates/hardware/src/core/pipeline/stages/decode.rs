//! Instruction Decode (ID) Stage.
//!
//! This module looks up the handler of a fetched word and computes its
//! control signals. It performs:
//! 1. **Handler Lookup:** Unknown words record a reserved-instruction fault.
//! 2. **Field Extraction:** Fields are decoded with the handler's own format.
//! 3. **Delay-Slot Check:** A control transfer inside a delay slot is reserved.
//! 4. **Operand Read:** Sources are read from the register file when no
//!    forwarding is involved.

use tracing::trace;

use crate::common::error::Fault;
use crate::common::reg::RegisterFile;
use crate::core::Cpu;
use crate::core::pipeline::hazards::read_source;
use crate::core::pipeline::latches::PipelineSlot;
use crate::isa::codec::decode as decode_fields;

/// Decodes `slot` in place.
///
/// # Arguments
///
/// * `cpu` - CPU state providing the instruction set.
/// * `slot` - Fetched slot; left untouched if it already carries a fault.
/// * `in_delay_slot` - The slot follows a control transfer with a delay slot.
pub fn decode(cpu: &Cpu, slot: &mut PipelineSlot, in_delay_slot: bool) {
    slot.delay_slot = in_delay_slot;
    if slot.fault.is_some() || slot.decoded {
        return;
    }
    let Some(handler) = cpu.lookup(slot.word) else {
        slot.fault = Some(Fault::Reserved(slot.word));
        return;
    };
    let fields = decode_fields(slot.word, handler.format());
    slot.ctrl = handler.signals(&fields);
    slot.fields = Some(fields);
    slot.handler = Some(handler);
    slot.decoded = true;

    if in_delay_slot && slot.ctrl.control_transfer {
        slot.fault = Some(Fault::Reserved(slot.word));
    }
    if cpu.trace {
        trace!(id = slot.id, pc = format_args!("{:#010x}", slot.pc), op = slot.mnemonic(), "ID");
    }
}

/// Reads every source operand of `slot` from the register file.
pub fn read_operands(regs: &RegisterFile, slot: &mut PipelineSlot) {
    for (value, source) in slot.operands.iter_mut().zip(slot.ctrl.sources) {
        *value = source.map_or(0, |reg| read_source(regs, reg));
    }
}
