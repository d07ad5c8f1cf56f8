//! Overlapped five-stage pipeline.
//!
//! This engine implements both the classic pipeline and the multi-unit
//! variant. It performs:
//! 1. **Stage Order:** WB, MEM, EX, ID, IF within a clock, so results move
//!    forward before younger instructions look for them.
//! 2. **Hazards:** Operand forwarding or stalls, and structural stalls when
//!    no compatible unit is free.
//! 3. **Control Flow:** Branches resolve in EX (or ID); the redirect is applied
//!    at the end of the clock, discarding the younger wrong-path slots.
//! 4. **Precise Exceptions:** Faults are raised at WB and discard everything younger.
//!    Interrupts are accepted right after a commit, in front of the next slot.

use tracing::debug;

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::SimError;
use crate::core::Cpu;
use crate::core::pipeline::engine::{Breakpoints, Tick};
use crate::core::pipeline::hazards::{Operands, Producer, resolve_operands};
use crate::core::pipeline::latches::{PipelineSlot, Stage};
use crate::core::pipeline::signals::OpClass;
use crate::core::pipeline::stages::{Commit, access, commit, decode, execute, fetch};
use crate::core::pipeline::topology::Topology;
use crate::core::pipeline::traits::PipelineLatch;
use crate::core::pipeline::units::ExecuteUnits;

/// A taken control transfer found this clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Redirect {
    branch_id: u64,
    target: u32,
    keep_delay_slot: bool,
}

/// A redirect waiting for its delay slot to be fetched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingTarget {
    delay_slot_id: u64,
    target: u32,
}

/// The pipelined engine.
#[derive(Clone, Debug)]
pub struct PipelinedEngine {
    forwarding: bool,
    branch_on_decode: bool,
    next_id: u64,
    /// IF/ID latch.
    decode: Option<PipelineSlot>,
    /// Functional units (ID/EX).
    units: ExecuteUnits,
    /// EX/MEM latch.
    memory: Option<PipelineSlot>,
    /// MEM/WB latch.
    writeback: Option<PipelineSlot>,
    /// Last issued control transfer that owns a delay slot.
    delay_owner: Option<u64>,
    redirect: Option<Redirect>,
    pending: Option<PendingTarget>,
}

impl PipelinedEngine {
    /// Creates an empty pipeline.
    pub fn new(topology: &Topology) -> Self {
        Self {
            forwarding: topology.forwarding,
            branch_on_decode: topology.branch_on_decode,
            next_id: 0,
            decode: None,
            units: ExecuteUnits::new(&topology.units),
            memory: None,
            writeback: None,
            delay_owner: None,
            redirect: None,
            pending: None,
        }
    }

    /// Functional units of the execute stage.
    pub const fn units(&self) -> &ExecuteUnits {
        &self.units
    }

    /// Advances every stage by one clock.
    pub fn tick(&mut self, cpu: &mut Cpu, breakpoints: Breakpoints<'_>) -> Result<Tick, SimError> {
        if self.is_drained() && self.pending.is_none() && cpu.fetch_exhausted(cpu.regs.pc()) {
            return Ok(Tick::drained());
        }
        let mut tick = Tick::ran();

        if let Some(code) = self.writeback_stage(cpu)? {
            tick.exit = Some(code);
            return Ok(tick);
        }
        self.memory_stage(cpu);
        self.execute_stage(cpu);
        self.decode_stage(cpu);
        let fetched = self.fetch_stage(cpu);
        let mut hit = fetched
            .and_then(|_| self.decode.as_ref())
            .filter(|slot| breakpoints.is_some_and(|set| set.contains(&slot.pc)))
            .map(|slot| (slot.id, slot.pc));

        if let Some(redirect) = self.redirect.take() {
            let cutoff = self.apply_redirect(cpu, redirect);
            // A wrong-path fetch does not stop the run.
            hit = hit.filter(|(id, _)| *id <= cutoff);
        }
        tick.breakpoint = hit.map(|(_, pc)| pc);
        if self.is_drained() && self.pending.is_none() && cpu.fetch_exhausted(cpu.regs.pc()) {
            tick.exit = Some(0);
        }
        Ok(tick)
    }

    fn writeback_stage(&mut self, cpu: &mut Cpu) -> Result<Option<i32>, SimError> {
        let Some(slot) = self.writeback.take() else {
            return Ok(None);
        };
        // Stalls are charged once the slot is known to be on the committed path.
        cpu.stats.stalls_data += slot.stalls_data;
        cpu.stats.stalls_structural += slot.stalls_structural;
        match commit(cpu, &slot)? {
            Commit::Retired => {}
            Commit::Serialized => {
                let resume = self.oldest_in_flight().map(|s| s.pc);
                let resume = resume.unwrap_or_else(|| cpu.regs.pc());
                self.discard_all(cpu);
                cpu.regs.set_pc(resume);
            }
            Commit::Redirected => {
                self.discard_all(cpu);
                return Ok(None);
            }
            Commit::Exit(code) => {
                self.discard_all(cpu);
                return Ok(Some(code));
            }
        }
        Ok(self.interrupt_after_commit(cpu))
    }

    /// Takes a pending interrupt between the slot that just committed and the next one.
    ///
    /// Nothing younger has touched memory yet, so discarding it keeps the
    /// interrupt precise. Delay slots are never interrupted.
    fn interrupt_after_commit(&mut self, cpu: &mut Cpu) -> Option<i32> {
        if self.pending.is_some() || !cpu.regs.interrupt_pending() {
            return None;
        }
        let next = self.oldest_in_flight();
        let delay_slot = next.is_some_and(|slot| {
            slot.delay_slot || (cpu.delay_slots && self.delay_owner.is_some_and(|owner| owner + 1 == slot.id))
        });
        if delay_slot {
            return None;
        }
        let resume = next.map_or_else(|| cpu.regs.pc(), |slot| slot.pc);
        self.discard_all(cpu);
        cpu.take_interrupt(resume)
    }

    fn memory_stage(&mut self, cpu: &mut Cpu) {
        if let Some(mut slot) = self.memory.take() {
            access(cpu, &mut slot);
            self.writeback = Some(slot);
        }
    }

    fn execute_stage(&mut self, cpu: &Cpu) {
        let mut resolved = None;
        for slot in self.units.slots_mut() {
            if slot.executed {
                continue;
            }
            execute(cpu, slot);
            if let Some(target) = slot.output.branch {
                let redirect = Self::redirect_for(cpu, slot, target);
                if resolved.is_none_or(|r: Redirect| redirect.branch_id < r.branch_id) {
                    resolved = Some(redirect);
                }
            }
        }
        if let Some(redirect) = resolved {
            self.record_redirect(redirect);
        }
        self.units.advance();
        if self.memory.is_none() {
            self.memory = self.units.retire_oldest();
        }
    }

    fn decode_stage(&mut self, cpu: &mut Cpu) {
        let Some(mut slot) = self.decode.take() else {
            return;
        };
        let in_delay_slot =
            cpu.delay_slots && self.delay_owner.is_some_and(|owner| owner + 1 == slot.id);
        decode(cpu, &mut slot, in_delay_slot);

        let resolve_here = self.branch_on_decode && slot.ctrl.control_transfer;
        let class = if slot.fault.is_some() {
            OpClass::Integer
        } else {
            match self.operands(cpu, &slot, resolve_here) {
                Operands::Ready(values) => slot.operands = values,
                Operands::Stall => {
                    slot.stalls_data += 1;
                    self.decode = Some(slot);
                    return;
                }
            }
            slot.ctrl.class
        };
        let Some(unit) = self.units.free_for(class) else {
            slot.stalls_structural += 1;
            self.decode = Some(slot);
            return;
        };

        if resolve_here && slot.fault.is_none() {
            execute(cpu, &mut slot);
            if let Some(target) = slot.output.branch {
                let redirect = Self::redirect_for(cpu, &slot, target);
                self.record_redirect(redirect);
            }
        }
        if slot.ctrl.has_delay_slot() {
            self.delay_owner = Some(slot.id);
        }
        self.units.issue(unit, slot);
    }

    /// Fetches into the IF/ID latch when it is free.
    ///
    /// # Returns
    ///
    /// The sequence number of the fetched slot.
    fn fetch_stage(&mut self, cpu: &mut Cpu) -> Option<u64> {
        if self.decode.is_some() {
            return None;
        }
        let pc = cpu.regs.pc();
        if cpu.fetch_exhausted(pc) {
            // The delay slot lies past the text: skip it.
            if let Some(pending) = self.pending.take() {
                cpu.regs.set_pc(pending.target);
            }
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.decode = Some(fetch(cpu, id, pc));
        cpu.regs.set_pc(pc.wrapping_add(INSTRUCTION_SIZE));
        if self.pending.is_some_and(|p| p.delay_slot_id == id) {
            if let Some(pending) = self.pending.take() {
                cpu.regs.set_pc(pending.target);
            }
        }
        Some(id)
    }

    /// Collects the older in-flight slots with their forwarding availability.
    fn operands(&self, cpu: &Cpu, slot: &PipelineSlot, branch_in_decode: bool) -> Operands {
        let forwarding = self.forwarding;
        let mut producers = Vec::with_capacity(self.units.units().len() + 2);
        if let Some(p) = &self.writeback {
            producers.push(Producer {
                slot: p,
                available: forwarding,
            });
        }
        if let Some(p) = &self.memory {
            producers.push(Producer {
                slot: p,
                available: forwarding && !branch_in_decode && !p.ctrl.mem.is_load(),
            });
        }
        for (p, complete) in self.units.slots() {
            producers.push(Producer {
                slot: p,
                available: forwarding
                    && !branch_in_decode
                    && p.executed
                    && complete
                    && !p.ctrl.mem.is_load(),
            });
        }
        resolve_operands(&cpu.regs, slot, &producers)
    }

    fn redirect_for(cpu: &Cpu, slot: &PipelineSlot, target: u32) -> Redirect {
        Redirect {
            branch_id: slot.id,
            target,
            keep_delay_slot: cpu.delay_slots && slot.ctrl.has_delay_slot(),
        }
    }

    /// Keeps the oldest redirect of the clock; it discards any younger one.
    fn record_redirect(&mut self, redirect: Redirect) {
        if self
            .redirect
            .is_none_or(|current| redirect.branch_id < current.branch_id)
        {
            self.redirect = Some(redirect);
        }
    }

    /// Discards the wrong-path slots and steers fetch to the target.
    ///
    /// # Returns
    ///
    /// The sequence number of the youngest slot kept.
    fn apply_redirect(&mut self, cpu: &mut Cpu, redirect: Redirect) -> u64 {
        let cutoff = redirect.branch_id + u64::from(redirect.keep_delay_slot);
        let flushed = self.decode.flush_younger(cutoff)
            + self.units.flush_younger(cutoff)
            + self.memory.flush_younger(cutoff)
            + self.writeback.flush_younger(cutoff);
        cpu.stats.flushed_slots += flushed as u64;
        if self.delay_owner.is_some_and(|owner| owner > cutoff) {
            self.delay_owner = None;
        }
        if redirect.keep_delay_slot && self.next_id <= cutoff {
            self.pending = Some(PendingTarget {
                delay_slot_id: cutoff,
                target: redirect.target,
            });
        } else {
            self.pending = None;
            cpu.regs.set_pc(redirect.target);
        }
        debug!(
            branch = redirect.branch_id,
            target = format_args!("{:#010x}", redirect.target),
            flushed,
            "control transfer redirect"
        );
        cutoff
    }

    /// Discards every in-flight slot after an exception, `eret` or serializing commit.
    fn discard_all(&mut self, cpu: &mut Cpu) {
        let flushed =
            self.decode.flush() + self.units.flush() + self.memory.flush() + self.writeback.flush();
        cpu.stats.flushed_slots += flushed as u64;
        self.delay_owner = None;
        self.redirect = None;
        self.pending = None;
        if flushed > 0 {
            debug!(flushed, "pipeline flushed at commit");
        }
    }

    fn oldest_in_flight(&self) -> Option<&PipelineSlot> {
        self.writeback
            .iter()
            .chain(self.memory.iter())
            .chain(self.units.slots().map(|(slot, _)| slot))
            .chain(self.decode.iter())
            .min_by_key(|slot| slot.id)
    }

    /// Stage and address of every in-flight instruction, oldest first.
    pub fn view(&self) -> Vec<(Stage, u32)> {
        let mut view: Vec<(u64, Stage, u32)> = Vec::new();
        let mut push = |stage, slot: &PipelineSlot| view.push((slot.id, stage, slot.pc));
        if let Some(slot) = &self.writeback {
            push(Stage::Writeback, slot);
        }
        if let Some(slot) = &self.memory {
            push(Stage::Memory, slot);
        }
        for (slot, _) in self.units.slots() {
            push(Stage::Execute, slot);
        }
        if let Some(slot) = &self.decode {
            push(Stage::Decode, slot);
        }
        view.sort_by_key(|(id, _, _)| *id);
        view.into_iter().map(|(_, stage, pc)| (stage, pc)).collect()
    }

    /// Whether no instruction is in flight.
    pub fn is_drained(&self) -> bool {
        self.decode.is_empty()
            && PipelineLatch::is_empty(&self.units)
            && self.memory.is_empty()
            && self.writeback.is_empty()
    }
}
