//! Simulator: owns the CPU and the execution engine side-by-side.
//!
//! This module drives the engine and provides the user-facing control
//! operations. It performs:
//! 1. **Stepping:** One clock per `step`, with cycle, privilege and Count bookkeeping.
//! 2. **Running:** Repeated clocks until a breakpoint, completion, a fatal error or a stop request.
//! 3. **History:** Bounded undo of whole clocks and reset to the freshly loaded program.
//! 4. **Observation:** Breakpoints, event subscriptions and state accessors.
//! 5. **Interrupts:** Hardware interrupt requests from outside the guest.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use crate::common::constants::{INTERNAL_ERROR_EXIT_CODE, MAX_UNDO_LIMIT, SYSCALL_FAILURE_EXIT_CODE};
use crate::common::error::SimError;
use crate::common::reg::RegisterFile;
use crate::config::Config;
use crate::core::Cpu;
use crate::core::pipeline::{Engine, Stage, Tick, Topology};
use crate::isa::catalog;
use crate::isa::set::InstructionSet;
use crate::memory::Memory;
use crate::memory::cache::CacheHierarchy;
use crate::sim::events::{EventSink, ForwardToSink, SimEvent};
use crate::sim::program::Program;
use crate::sim::syscall::SyscallTable;
use crate::stats::SimStats;

/// Result of a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The program can continue.
    Running,
    /// The program has finished.
    Finished {
        /// Exit code.
        exit_code: i32,
    },
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Fetch reached a breakpoint.
    Breakpoint(u32),
    /// A stop was requested.
    Stopped,
    /// The program finished with an exit code.
    Finished(i32),
}

/// Cooperative stop flag shared between a run and its controllers.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Creates a cleared token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the run to stop before its next clock.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clears a previous request.
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    Ready,
    Finished { exit_code: i32 },
    Faulted { exit_code: i32 },
}

#[derive(Clone, Debug)]
struct Snapshot {
    regs: RegisterFile,
    memory: Memory,
    caches: CacheHierarchy,
    stats: SimStats,
    engine: Engine,
    cycles: u64,
    state: RunState,
}

/// Top-level simulator: CPU architectural state + execution engine.
pub struct Simulator {
    /// CPU architectural state (registers, memory, stats).
    pub cpu: Cpu,
    engine: Engine,
    topology: Topology,
    breakpoints: BTreeSet<u32>,
    cycles: u64,
    state: RunState,
    history: VecDeque<Snapshot>,
    initial: Snapshot,
    undo_enabled: bool,
    undo_limit: usize,
    stop: StopToken,
}

impl Simulator {
    /// Creates a simulator with the given program, instruction set and syscalls.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulator configuration.
    /// * `program` - Assembled program; loaded immediately.
    /// * `isa` - Instruction set consulted by decode.
    /// * `syscalls` - Services dispatched by `syscall`.
    pub fn new(
        config: &Config,
        program: &Program,
        isa: Arc<dyn InstructionSet>,
        syscalls: SyscallTable,
    ) -> Result<Self, SimError> {
        let topology = Topology::from_config(&config.pipeline)?;
        let mut cpu = Cpu::new(config, isa, Arc::new(syscalls))?;
        cpu.bounds = program.load_into(&mut cpu.memory)?;
        cpu.regs.set_pc(program.entry_point());
        let engine = Engine::new(&topology);
        let initial = Snapshot {
            regs: cpu.regs.clone(),
            memory: cpu.memory.clone(),
            caches: cpu.caches.clone(),
            stats: cpu.stats.clone(),
            engine: engine.clone(),
            cycles: 0,
            state: RunState::Ready,
        };
        debug!(
            topology = ?topology.kind,
            entry = format_args!("{:#010x}", program.entry_point()),
            isa = cpu.isa().name(),
            "simulator created"
        );
        Ok(Self {
            cpu,
            engine,
            topology,
            breakpoints: BTreeSet::new(),
            cycles: 0,
            state: RunState::Ready,
            history: VecDeque::new(),
            initial,
            undo_enabled: config.general.undo_enabled,
            undo_limit: config.general.undo_limit.min(MAX_UNDO_LIMIT),
            stop: StopToken::new(),
        })
    }

    /// Creates a simulator with the reference MIPS32 catalog and the built-in syscalls.
    pub fn with_defaults(config: &Config, program: &Program) -> Result<Self, SimError> {
        Self::new(
            config,
            program,
            Arc::new(catalog::mips32()),
            SyscallTable::with_builtins(),
        )
    }

    /// Advances exactly one clock. Breakpoints are ignored.
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        self.ensure_runnable()?;
        if let RunState::Finished { exit_code } = self.state {
            return Ok(StepOutcome::Finished { exit_code });
        }
        let tick = self.cycle(false)?;
        Ok(match tick.exit {
            Some(exit_code) => StepOutcome::Finished { exit_code },
            None => StepOutcome::Running,
        })
    }

    /// Steps until a breakpoint, program completion, a fatal error or a stop request.
    ///
    /// The first clock ignores breakpoints so a run can resume from one.
    pub fn run(&mut self) -> Result<RunOutcome, SimError> {
        self.stop.clear();
        let mut first = true;
        loop {
            if let Some(outcome) = self.run_cycle(first)? {
                return Ok(outcome);
            }
            first = false;
        }
    }

    /// One clock of a run.
    ///
    /// # Returns
    ///
    /// `Some(outcome)` when the run is over.
    pub(crate) fn run_cycle(&mut self, first: bool) -> Result<Option<RunOutcome>, SimError> {
        self.ensure_runnable()?;
        if let RunState::Finished { exit_code } = self.state {
            return Ok(Some(RunOutcome::Finished(exit_code)));
        }
        if self.stop.is_stopped() {
            debug!(cycles = self.cycles, "run stopped on request");
            return Ok(Some(RunOutcome::Stopped));
        }
        let check_breakpoints = !first || self.engine.breaks_after_fetch();
        let tick = self.cycle(check_breakpoints)?;
        if let Some(code) = tick.exit {
            return Ok(Some(RunOutcome::Finished(code)));
        }
        if let Some(pc) = tick.breakpoint {
            debug!(pc = format_args!("{pc:#010x}"), "run stopped at breakpoint");
            return Ok(Some(RunOutcome::Breakpoint(pc)));
        }
        Ok(None)
    }

    /// Requests a running `run` to stop before its next clock.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// The token polled by `run`.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Reverts the most recent clock.
    ///
    /// # Returns
    ///
    /// `false` when undo is disabled, the history is empty or the simulator
    /// was halted by a fatal error.
    pub fn undo_step(&mut self) -> bool {
        if !self.undo_enabled || matches!(self.state, RunState::Faulted { .. }) {
            return false;
        }
        let Some(snapshot) = self.history.pop_back() else {
            warn!("undo requested with an empty history");
            return false;
        };
        self.restore(&snapshot);
        true
    }

    /// Number of clocks that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Restores the freshly loaded program and clears history and engine state.
    pub fn reset(&mut self) {
        let initial = self.initial.clone();
        self.restore(&initial);
        self.engine = Engine::new(&self.topology);
        self.history.clear();
        debug!("simulator reset");
    }

    /// Raises hardware interrupt `line` (0 to 5, wired to Cause.IP2 to IP7).
    ///
    /// The request stays pending until it is cleared, either here or by the
    /// handler writing Cause. It is accepted at the next instruction boundary
    /// once Status enables it.
    ///
    /// # Returns
    ///
    /// `false` if the line does not exist.
    pub fn request_interrupt(&mut self, line: u8) -> bool {
        let known = self.cpu.regs.set_interrupt_line(line, true);
        if known {
            debug!(line, cycles = self.cycles, "interrupt requested");
        }
        known
    }

    /// Withdraws a request made with `request_interrupt`.
    pub fn clear_interrupt(&mut self, line: u8) -> bool {
        self.cpu.regs.set_interrupt_line(line, false)
    }

    /// Adds a breakpoint. Returns `false` if it already existed.
    pub fn add_breakpoint(&mut self, pc: u32) -> bool {
        self.breakpoints.insert(pc)
    }

    /// Removes a breakpoint. Returns `false` if it did not exist.
    pub fn remove_breakpoint(&mut self, pc: u32) -> bool {
        self.breakpoints.remove(&pc)
    }

    /// Toggles a breakpoint. Returns whether it is now set.
    pub fn toggle_breakpoint(&mut self, pc: u32) -> bool {
        if self.breakpoints.remove(&pc) {
            false
        } else {
            self.breakpoints.insert(pc)
        }
    }

    /// Current breakpoints.
    pub const fn breakpoints(&self) -> &BTreeSet<u32> {
        &self.breakpoints
    }

    /// Installs an event sink and forwards register and memory changes to it.
    pub fn subscribe(&mut self, sink: Arc<dyn EventSink>) {
        self.cpu.events.add(Arc::clone(&sink));
        self.cpu.regs.add_listener(Arc::new(ForwardToSink(Arc::clone(&sink))));
        self.cpu.memory.add_listener(Arc::new(ForwardToSink(sink)));
    }

    /// Architectural registers.
    pub const fn registers(&self) -> &RegisterFile {
        &self.cpu.regs
    }

    /// Guest memory.
    pub const fn memory(&self) -> &Memory {
        &self.cpu.memory
    }

    /// Guest memory, for installing guards or patching data.
    pub const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.cpu.memory
    }

    /// Cache levels in front of memory.
    pub const fn caches(&self) -> &CacheHierarchy {
        &self.cpu.caches
    }

    /// Performance counters.
    pub const fn stats(&self) -> &SimStats {
        &self.cpu.stats
    }

    /// Clocks executed since construction or reset.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Exit code once the program finished or was halted.
    pub const fn exit_code(&self) -> Option<i32> {
        match self.state {
            RunState::Ready => None,
            RunState::Finished { exit_code } | RunState::Faulted { exit_code } => Some(exit_code),
        }
    }

    /// Whether the program finished normally.
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, RunState::Finished { .. })
    }

    /// Stage the multi-cycle engine runs next.
    pub const fn current_stage(&self) -> Option<Stage> {
        self.engine.current_stage()
    }

    /// Stage and address of every in-flight instruction.
    pub fn pipeline_view(&self) -> Vec<(Stage, u32)> {
        self.engine.pipeline_view()
    }

    /// Engine topology.
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    fn ensure_runnable(&self) -> Result<(), SimError> {
        match self.state {
            RunState::Faulted { .. } => Err(SimError::Halted),
            _ => Ok(()),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            regs: self.cpu.regs.clone(),
            memory: self.cpu.memory.clone(),
            caches: self.cpu.caches.clone(),
            stats: self.cpu.stats.clone(),
            engine: self.engine.clone(),
            cycles: self.cycles,
            state: self.state,
        }
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        self.cpu.regs.restore_from(&snapshot.regs);
        self.cpu.memory.restore_from(&snapshot.memory);
        self.cpu.caches.clone_from(&snapshot.caches);
        self.cpu.stats.clone_from(&snapshot.stats);
        self.engine.clone_from(&snapshot.engine);
        self.cycles = snapshot.cycles;
        self.state = snapshot.state;
        let (cycles, pc) = (self.cycles, self.cpu.regs.pc());
        self.cpu.emit(|| SimEvent::Restored { cycles, pc });
    }

    fn remember(&mut self, snapshot: Snapshot) {
        if self.undo_limit == 0 {
            return;
        }
        if self.history.len() >= self.undo_limit {
            let _ = self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }

    /// Runs one engine clock and does the bookkeeping around it.
    fn cycle(&mut self, check_breakpoints: bool) -> Result<Tick, SimError> {
        let before = self.undo_enabled.then(|| self.snapshot());
        let kernel = self.cpu.regs.kernel_mode();
        let breakpoints = check_breakpoints.then_some(&self.breakpoints);

        let tick = match self.engine.tick(&mut self.cpu, breakpoints) {
            Ok(tick) => tick,
            Err(err) => {
                self.poison(&err);
                return Err(err);
            }
        };

        if tick.consumed {
            self.cycles += 1;
            self.cpu.stats.cycles += 1;
            if kernel {
                self.cpu.stats.cycles_kernel += 1;
            } else {
                self.cpu.stats.cycles_user += 1;
            }
            self.cpu.regs.tick_count();
        }
        if let Some(exit_code) = tick.exit {
            self.state = RunState::Finished { exit_code };
            info!(exit_code, cycles = self.cycles, "program finished");
            self.cpu.emit(|| SimEvent::Finished { exit_code });
        }
        if let Some(pc) = tick.breakpoint {
            self.cpu.emit(|| SimEvent::BreakpointHit { pc });
        }
        if let Some(snapshot) = before.filter(|_| tick.consumed || tick.exit.is_some()) {
            self.remember(snapshot);
        }
        Ok(tick)
    }

    fn poison(&mut self, err: &SimError) {
        let exit_code = match err {
            SimError::SyscallFailed { .. } => SYSCALL_FAILURE_EXIT_CODE,
            _ => INTERNAL_ERROR_EXIT_CODE,
        };
        error!(%err, exit_code, "simulation halted");
        self.state = RunState::Faulted { exit_code };
        self.cpu.emit(|| SimEvent::Finished { exit_code });
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("cpu", &self.cpu)
            .field("topology", &self.topology.kind)
            .field("cycles", &self.cycles)
            .field("state", &self.state)
            .field("breakpoints", &self.breakpoints.len())
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}
