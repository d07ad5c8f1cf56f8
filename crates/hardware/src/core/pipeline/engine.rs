//! Execution engine dispatch.
//!
//! This module ties the topologies together:
//! 1. **`Engine`:** Enum dispatch over the single-cycle, multi-cycle and pipelined engines.
//! 2. **`Tick`:** What happened during one clock.
//! 3. **Sequential Commit:** Next-PC selection shared by the non-overlapping engines,
//!    including delayed branches and interrupt acceptance between instructions.

use std::collections::BTreeSet;

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::SimError;
use crate::core::Cpu;
use crate::core::pipeline::latches::{PipelineSlot, Stage};
use crate::core::pipeline::multi_cycle::MultiCycleEngine;
use crate::core::pipeline::pipelined::PipelinedEngine;
use crate::core::pipeline::single_cycle::SingleCycleEngine;
use crate::core::pipeline::stages::Commit;
use crate::core::pipeline::topology::Topology;
use crate::config::TopologyKind;

/// Result of one engine clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    /// The clock ran. False when the engine refused to start the cycle.
    pub consumed: bool,
    /// A breakpoint was hit at this address.
    pub breakpoint: Option<u32>,
    /// The program finished with this exit code.
    pub exit: Option<i32>,
}

impl Tick {
    /// A clock that ran.
    pub const fn ran() -> Self {
        Self {
            consumed: true,
            breakpoint: None,
            exit: None,
        }
    }

    /// A clock refused because fetch would hit a breakpoint.
    pub const fn blocked(pc: u32) -> Self {
        Self {
            consumed: false,
            breakpoint: Some(pc),
            exit: None,
        }
    }

    /// A clock refused because the program already ran off its text.
    pub const fn drained() -> Self {
        Self {
            consumed: false,
            breakpoint: None,
            exit: Some(0),
        }
    }
}

/// Breakpoint addresses consulted by fetch, if any.
pub type Breakpoints<'a> = Option<&'a BTreeSet<u32>>;

/// The execution engine selected by the topology.
#[derive(Clone, Debug)]
pub enum Engine {
    /// One instruction per clock, all stages at once.
    SingleCycle(SingleCycleEngine),
    /// One instruction in flight, one stage per clock.
    MultiCycle(MultiCycleEngine),
    /// Overlapped five-stage pipeline with one or more execute units.
    Pipelined(Box<PipelinedEngine>),
}

impl Engine {
    /// Builds an idle engine.
    pub fn new(topology: &Topology) -> Self {
        match topology.kind {
            TopologyKind::SingleCycle => Self::SingleCycle(SingleCycleEngine::default()),
            TopologyKind::MultiCycle => Self::MultiCycle(MultiCycleEngine::default()),
            TopologyKind::Pipelined | TopologyKind::MultiAluPipelined => {
                Self::Pipelined(Box::new(PipelinedEngine::new(topology)))
            }
        }
    }

    /// Advances one clock.
    pub fn tick(&mut self, cpu: &mut Cpu, breakpoints: Breakpoints<'_>) -> Result<Tick, SimError> {
        match self {
            Self::SingleCycle(engine) => engine.tick(cpu, breakpoints),
            Self::MultiCycle(engine) => engine.tick(cpu, breakpoints),
            Self::Pipelined(engine) => engine.tick(cpu, breakpoints),
        }
    }

    /// Whether breakpoints stop a run after the breakpointed fetch rather than before it.
    pub const fn breaks_after_fetch(&self) -> bool {
        matches!(self, Self::Pipelined(_))
    }

    /// Stage the multi-cycle engine will run next.
    pub const fn current_stage(&self) -> Option<Stage> {
        match self {
            Self::MultiCycle(engine) => Some(engine.current_stage()),
            _ => None,
        }
    }

    /// Stage and address of every in-flight instruction.
    pub fn pipeline_view(&self) -> Vec<(Stage, u32)> {
        match self {
            Self::SingleCycle(_) => Vec::new(),
            Self::MultiCycle(engine) => engine.view(),
            Self::Pipelined(engine) => engine.view(),
        }
    }

    /// Whether no instruction is in flight.
    pub fn is_drained(&self) -> bool {
        match self {
            Self::SingleCycle(engine) => engine.is_drained(),
            Self::MultiCycle(engine) => engine.is_drained(),
            Self::Pipelined(engine) => engine.is_drained(),
        }
    }
}

/// A delayed control transfer waiting for its delay slot to commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingDelay {
    /// Branch target, or `None` when the branch was not taken.
    pub target: Option<u32>,
}

/// Applies a commit outcome in an engine that runs one instruction at a time.
///
/// Moves the program counter to the next instruction, honouring delayed
/// branches, and reports whether the program finished.
pub fn sequential_commit(
    cpu: &mut Cpu,
    delay: &mut Option<PendingDelay>,
    slot: &PipelineSlot,
    outcome: Commit,
) -> Tick {
    let mut tick = Tick::ran();
    match outcome {
        Commit::Exit(code) => {
            *delay = None;
            tick.exit = Some(code);
            return tick;
        }
        Commit::Redirected => *delay = None,
        Commit::Retired | Commit::Serialized => {
            let fallthrough = slot.pc.wrapping_add(INSTRUCTION_SIZE);
            let next = if let Some(pending) = delay.take() {
                pending.target.unwrap_or(fallthrough)
            } else if cpu.delay_slots && slot.ctrl.has_delay_slot() {
                *delay = Some(PendingDelay {
                    target: slot.output.branch,
                });
                fallthrough
            } else {
                slot.output.branch.unwrap_or(fallthrough)
            };
            cpu.regs.set_pc(next);
        }
    }
    if delay.is_none() && cpu.fetch_exhausted(cpu.regs.pc()) {
        tick.exit = Some(0);
    }
    tick
}

/// Takes a pending interrupt in front of `pc` in an engine that runs one
/// instruction at a time. Delay slots are never interrupted.
///
/// # Returns
///
/// The clock that accepted the interrupt, or `None` when none was taken.
pub fn sequential_interrupt(cpu: &mut Cpu, delay: &mut Option<PendingDelay>, pc: u32) -> Option<Tick> {
    if delay.is_some() || !cpu.regs.interrupt_pending() {
        return None;
    }
    let mut tick = Tick::ran();
    tick.exit = cpu.take_interrupt(pc);
    Some(tick)
}

/// Start-of-clock completion check for the non-overlapping engines.
///
/// # Returns
///
/// The address to fetch, or `None` when the program ran off its text. A
/// pending delayed branch whose delay slot lies past the text skips the slot.
pub fn next_fetch(cpu: &mut Cpu, delay: &mut Option<PendingDelay>) -> Option<u32> {
    let pc = cpu.regs.pc();
    if !cpu.fetch_exhausted(pc) {
        return Some(pc);
    }
    let target = delay.take().and_then(|pending| pending.target)?;
    if cpu.fetch_exhausted(target) {
        return None;
    }
    cpu.regs.set_pc(target);
    Some(target)
}
