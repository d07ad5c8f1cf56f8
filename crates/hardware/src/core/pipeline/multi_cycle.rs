//! Multi-cycle engine.
//!
//! One instruction is in flight at a time and advances one stage per clock,
//! so every instruction takes five clocks. A fault recorded by an early stage
//! skips the remaining stage work; the exception is raised at writeback.

use crate::common::error::SimError;
use crate::core::Cpu;
use crate::core::pipeline::engine::{
    Breakpoints, PendingDelay, Tick, next_fetch, sequential_commit, sequential_interrupt,
};
use crate::core::pipeline::latches::{PipelineSlot, Stage};
use crate::core::pipeline::stages::{access, commit, decode, execute, fetch, read_operands};

/// Engine running one stage of one instruction per clock.
#[derive(Clone, Debug)]
pub struct MultiCycleEngine {
    next_id: u64,
    stage: Stage,
    slot: Option<PipelineSlot>,
    delay: Option<PendingDelay>,
}

impl Default for MultiCycleEngine {
    fn default() -> Self {
        Self {
            next_id: 0,
            stage: Stage::Fetch,
            slot: None,
            delay: None,
        }
    }
}

impl MultiCycleEngine {
    /// Stage that runs on the next clock.
    pub const fn current_stage(&self) -> Stage {
        self.stage
    }

    /// Runs the current stage.
    pub fn tick(&mut self, cpu: &mut Cpu, breakpoints: Breakpoints<'_>) -> Result<Tick, SimError> {
        if self.stage == Stage::Fetch {
            let Some(pc) = next_fetch(cpu, &mut self.delay) else {
                return Ok(Tick::drained());
            };
            if breakpoints.is_some_and(|set| set.contains(&pc)) {
                return Ok(Tick::blocked(pc));
            }
            if let Some(tick) = sequential_interrupt(cpu, &mut self.delay, pc) {
                return Ok(tick);
            }
            self.slot = Some(fetch(cpu, self.next_id, pc));
            self.next_id += 1;
            self.stage = Stage::Decode;
            return Ok(Tick::ran());
        }

        let Some(slot) = self.slot.as_mut() else {
            return Err(SimError::Internal(format!(
                "multi-cycle engine reached {:?} with no instruction",
                self.stage
            )));
        };
        let mut tick = Tick::ran();
        match self.stage {
            Stage::Fetch => {}
            Stage::Decode => {
                decode(cpu, slot, self.delay.is_some());
                read_operands(&cpu.regs, slot);
            }
            Stage::Execute => execute(cpu, slot),
            Stage::Memory => access(cpu, slot),
            Stage::Writeback => {
                let outcome = commit(cpu, slot)?;
                tick = sequential_commit(cpu, &mut self.delay, slot, outcome);
                self.slot = None;
            }
        }
        self.stage = self.stage.next();
        Ok(tick)
    }

    /// Stage and address of the instruction in flight.
    pub fn view(&self) -> Vec<(Stage, u32)> {
        self.slot
            .as_ref()
            .map(|slot| (self.stage, slot.pc))
            .into_iter()
            .collect()
    }

    /// Whether no instruction is in flight.
    pub const fn is_drained(&self) -> bool {
        self.slot.is_none()
    }
}
