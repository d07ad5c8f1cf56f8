//! Execute (EX) Stage.
//!
//! Runs the pure computation of the instruction handler: ALU results,
//! effective addresses, store data and branch outcomes. Arithmetic faults are
//! recorded in the slot.

use tracing::trace;

use crate::common::constants::INSTRUCTION_SIZE;
use crate::core::Cpu;
use crate::core::pipeline::latches::PipelineSlot;
use crate::isa::set::ExecInput;

/// Executes `slot` in place.
///
/// Slots that faulted earlier, or that already ran (branches resolved in
/// decode), are left untouched.
pub fn execute(cpu: &Cpu, slot: &mut PipelineSlot) {
    if slot.fault.is_some() || slot.executed {
        return;
    }
    let (Some(handler), Some(fields)) = (slot.handler.as_ref(), slot.fields) else {
        return;
    };
    let link_distance = if cpu.delay_slots && slot.ctrl.has_delay_slot() {
        2 * INSTRUCTION_SIZE
    } else {
        INSTRUCTION_SIZE
    };
    let input = ExecInput {
        pc: slot.pc,
        fields,
        operands: slot.operands,
        link: slot.pc.wrapping_add(link_distance),
    };
    match handler.execute(&input) {
        Ok(output) => slot.output = output,
        Err(fault) => slot.fault = Some(fault),
    }
    slot.executed = true;
    if cpu.trace {
        trace!(
            id = slot.id,
            op = slot.mnemonic(),
            value = format_args!("{:#010x}", slot.output.value),
            branch = ?slot.output.branch,
            "EX"
        );
    }
}
