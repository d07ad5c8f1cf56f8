//! Single-cycle engine.
//!
//! Every clock runs fetch, decode, execute, memory and writeback of one
//! instruction back to back. No intermediate state survives the clock.
//! Accepting an interrupt takes a clock of its own.

use crate::common::error::SimError;
use crate::core::Cpu;
use crate::core::pipeline::engine::{
    Breakpoints, PendingDelay, Tick, next_fetch, sequential_commit, sequential_interrupt,
};
use crate::core::pipeline::stages::{access, commit, decode, execute, fetch, read_operands};

/// Engine completing one instruction per clock.
#[derive(Clone, Debug, Default)]
pub struct SingleCycleEngine {
    next_id: u64,
    delay: Option<PendingDelay>,
}

impl SingleCycleEngine {
    /// Runs one instruction.
    pub fn tick(&mut self, cpu: &mut Cpu, breakpoints: Breakpoints<'_>) -> Result<Tick, SimError> {
        let Some(pc) = next_fetch(cpu, &mut self.delay) else {
            return Ok(Tick::drained());
        };
        if breakpoints.is_some_and(|set| set.contains(&pc)) {
            return Ok(Tick::blocked(pc));
        }
        if let Some(tick) = sequential_interrupt(cpu, &mut self.delay, pc) {
            return Ok(tick);
        }

        let mut slot = fetch(cpu, self.next_id, pc);
        self.next_id += 1;
        decode(cpu, &mut slot, self.delay.is_some());
        read_operands(&cpu.regs, &mut slot);
        execute(cpu, &mut slot);
        access(cpu, &mut slot);
        let outcome = commit(cpu, &slot)?;
        Ok(sequential_commit(cpu, &mut self.delay, &slot, outcome))
    }

    /// Always true: nothing survives a clock.
    pub const fn is_drained(&self) -> bool {
        true
    }
}
