//! Writeback (WB) Stage.
//!
//! This module implements the commit point of every engine. It commits
//! results to the register file (integer, floating-point or COP0), handles
//! the commit-time system operations (`syscall`, `eret`), raises recorded
//! faults as precise exceptions and updates retirement statistics.

use tracing::trace;

use crate::common::error::{Fault, SimError};
use crate::core::Cpu;
use crate::core::pipeline::latches::PipelineSlot;
use crate::core::pipeline::signals::SystemOp;
use crate::isa::abi::REG_V0;
use crate::sim::events::SimEvent;
use crate::sim::syscall::{SyscallAction, SyscallContext};

/// What the engine must do after a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commit {
    /// The instruction retired normally.
    Retired,
    /// A serializing instruction retired; younger slots must be refetched.
    Serialized,
    /// Control moved to the program counter now held in the register file
    /// (exception or `eret`); younger slots must be discarded.
    Redirected,
    /// The program finished with an exit code.
    Exit(i32),
}

/// Commits `slot`.
///
/// # Returns
///
/// The commit outcome, or `SimError::SyscallFailed` when a syscall handler
/// reports an error.
pub fn commit(cpu: &mut Cpu, slot: &PipelineSlot) -> Result<Commit, SimError> {
    if let Some(fault) = &slot.fault {
        return Ok(take_exception(cpu, slot, fault));
    }

    if let Some(dest) = slot.ctrl.dest {
        cpu.regs.write(dest, slot.result());
    }

    let mut outcome = if slot.ctrl.is_serializing() {
        Commit::Serialized
    } else {
        Commit::Retired
    };
    match slot.ctrl.system {
        SystemOp::Syscall => {
            let service = cpu.regs.gpr(REG_V0);
            let Some(handler) = cpu.syscalls().get(service) else {
                return Ok(take_exception(cpu, slot, &Fault::UnhandledSyscall(service)));
            };
            let mut ctx = SyscallContext {
                regs: &mut cpu.regs,
                memory: &mut cpu.memory,
                pc: slot.pc,
            };
            match handler.handle(&mut ctx) {
                Ok(SyscallAction::Continue) => {}
                Ok(SyscallAction::Exit(code)) => outcome = Commit::Exit(code),
                Err(source) => return Err(SimError::SyscallFailed { service, source }),
            }
        }
        SystemOp::Eret => {
            cpu.eret();
            outcome = Commit::Redirected;
        }
        SystemOp::Break | SystemOp::None => {}
    }

    cpu.stats.record_retired(&slot.ctrl);
    if slot.output.branch.is_some() {
        cpu.stats.branches_taken += 1;
    }
    if cpu.trace {
        trace!(id = slot.id, pc = format_args!("{:#010x}", slot.pc), op = slot.mnemonic(), "WB");
    }
    let (pc, word) = (slot.pc, slot.word);
    cpu.emit(|| SimEvent::InstructionRetired { pc, word });
    Ok(outcome)
}

fn take_exception(cpu: &mut Cpu, slot: &PipelineSlot, fault: &Fault) -> Commit {
    if cpu.trace {
        trace!(id = slot.id, pc = format_args!("{:#010x}", slot.pc), %fault, "WB exception");
    }
    match cpu.raise_fault(fault, slot.pc, slot.delay_slot) {
        Some(code) => Commit::Exit(code),
        None => Commit::Redirected,
    }
}
