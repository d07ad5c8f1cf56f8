//! Exception Handling Logic.
//!
//! This module implements the exception controller. It performs the following:
//! 1. **Context Saving:** Latches EPC, Cause.BD, Cause.ExcCode and BadVAddr.
//! 2. **Mode Switch:** Sets Status.EXL, which disables interrupts and enters kernel mode.
//! 3. **Dispatch:** Redirects the program counter to the general exception vector.
//! 4. **Interrupts:** Accepts pending interrupts between two instructions.
//! 5. **Return Handling:** Implements `eret`.
//!
//! Exceptions are only raised at the commit point, so the saved context is
//! always precise.

use tracing::debug;

use super::Cpu;
use crate::common::constants::UNHANDLED_EXCEPTION_EXIT_BASE;
use crate::common::error::Fault;
use crate::core::arch::cop0;
use crate::core::arch::trap::{ExceptionCause, exception_vector};
use crate::sim::events::SimEvent;

impl Cpu {
    /// Takes an exception.
    ///
    /// # Arguments
    ///
    /// * `cause` - Exception cause.
    /// * `pc` - Address of the faulting instruction.
    /// * `delay_slot` - The instruction sits in a branch delay slot.
    /// * `bad_address` - Faulting address of an address error.
    ///
    /// # Returns
    ///
    /// `Some(exit_code)` when no handler is installed at the vector and the
    /// simulation must finish, `None` otherwise.
    pub fn raise(
        &mut self,
        cause: ExceptionCause,
        pc: u32,
        delay_slot: bool,
        bad_address: Option<u32>,
    ) -> Option<i32> {
        let status = self.regs.cop0().read_at(cop0::STATUS);
        if (status >> cop0::STATUS_EXL) & 1 == 0 {
            let epc = if delay_slot { pc.wrapping_sub(4) } else { pc };
            self.regs.write_cop0_hardware(cop0::EPC, epc);
            self.regs
                .modify_cop0_bits(cop0::CAUSE, u32::from(delay_slot), cop0::CAUSE_BD, 1);
        }
        self.regs
            .modify_cop0_bits(cop0::CAUSE, cause.code(), cop0::CAUSE_EXC_CODE, 5);
        self.regs.modify_cop0_bits(cop0::STATUS, 1, cop0::STATUS_EXL, 1);
        if let Some(address) = bad_address {
            self.regs.write_cop0_hardware(cop0::BAD_VADDR, address);
        }

        let vector = exception_vector(self.regs.cop0().read_at(cop0::EBASE));
        let epc = self.regs.cop0().read_at(cop0::EPC);
        self.regs.set_pc(vector);
        self.stats.traps_taken += 1;
        debug!(
            %cause,
            pc = format_args!("{pc:#010x}"),
            vector = format_args!("{vector:#010x}"),
            "exception raised"
        );
        self.emit(|| SimEvent::ExceptionRaised {
            cause,
            epc,
            pc: vector,
        });

        match self.memory.read_word(vector) {
            Ok(word) if word != 0 => None,
            _ => {
                debug!(%cause, "no exception handler installed");
                Some(UNHANDLED_EXCEPTION_EXIT_BASE + cause.code() as i32)
            }
        }
    }

    /// Takes the exception corresponding to a recorded fault.
    pub fn raise_fault(&mut self, fault: &Fault, pc: u32, delay_slot: bool) -> Option<i32> {
        self.raise(fault.cause(), pc, delay_slot, fault.bad_address())
    }

    /// Takes a pending interrupt in front of the instruction at `pc`.
    ///
    /// The caller guarantees that every older instruction has committed and
    /// that `pc` is not a delay slot. EPC receives `pc`, so `eret` resumes there.
    pub fn take_interrupt(&mut self, pc: u32) -> Option<i32> {
        self.stats.interrupts_taken += 1;
        let pending = (self.regs.cop0().read_at(cop0::CAUSE) >> cop0::CAUSE_IP) & 0xFF;
        debug!(pending = format_args!("{pending:#04x}"), "interrupt accepted");
        self.raise(ExceptionCause::Interrupt, pc, false, None)
    }

    /// Returns from an exception (`eret`).
    ///
    /// With Status.ERL set control goes to ErrorEPC and ERL is cleared;
    /// otherwise control goes to EPC and EXL is cleared.
    pub fn eret(&mut self) {
        let status = self.regs.cop0().read_at(cop0::STATUS);
        if (status >> cop0::STATUS_ERL) & 1 == 1 {
            let target = self.regs.cop0().read_at(cop0::ERROR_EPC);
            self.regs.modify_cop0_bits(cop0::STATUS, 0, cop0::STATUS_ERL, 1);
            self.regs.set_pc(target);
        } else {
            let target = self.regs.cop0().read_at(cop0::EPC);
            self.regs.modify_cop0_bits(cop0::STATUS, 0, cop0::STATUS_EXL, 1);
            self.regs.set_pc(target);
        }
    }
}
