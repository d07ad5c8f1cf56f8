//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, which serves as the container for the
//! architectural state shared by every execution engine. It coordinates the following:
//! 1. **State Management:** Registers, program counter and the derived privilege mode.
//! 2. **Memory:** The sectioned guest address space and the caches in front of it.
//! 3. **Pluggable Semantics:** The instruction set and syscall table supplied at construction.
//! 4. **Observation:** Statistics, tracing and event subscribers.

/// Exception raising and return.
pub mod trap;

use std::sync::Arc;

use crate::common::RegisterFile;
use crate::common::error::{ConfigError, SimError};
use crate::config::Config;
use crate::isa::set::{InstructionHandler, InstructionSet};
use crate::memory::Memory;
use crate::memory::cache::{CacheHierarchy, CacheStats};
use crate::sim::events::{EventBus, SimEvent};
use crate::sim::syscall::SyscallTable;
use crate::stats::SimStats;

/// End of the loaded text in user and kernel space.
///
/// Fetching stops once the program counter reaches the end of the text of
/// the current privilege level, which lets a program finish by running off
/// its last instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBounds {
    /// One past the last user text word, if any was loaded.
    pub user_end: Option<u32>,
    /// One past the last kernel text word, if any was loaded.
    pub kernel_end: Option<u32>,
}

/// Architectural state and collaborators of the simulated processor.
pub struct Cpu {
    /// General purpose, COP0 and FPU registers plus the program counter.
    pub regs: RegisterFile,
    /// Guest memory.
    pub memory: Memory,
    /// Caches consulted by fetches, loads and stores.
    pub caches: CacheHierarchy,
    /// Performance counters.
    pub stats: SimStats,
    /// Emit a `trace!` line for every stage of every instruction.
    pub trace: bool,
    /// Delay slots are architecturally visible.
    pub delay_slots: bool,
    /// Ends of the loaded text.
    pub bounds: TextBounds,
    /// Subscribers to simulation events.
    pub events: EventBus,
    isa: Arc<dyn InstructionSet>,
    syscalls: Arc<SyscallTable>,
}

impl Cpu {
    /// Creates a CPU with reset registers and empty memory.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulator configuration (memory layout, tracing, delay slots).
    /// * `isa` - Instruction set consulted by decode.
    /// * `syscalls` - Services dispatched by `syscall`.
    pub fn new(
        config: &Config,
        isa: Arc<dyn InstructionSet>,
        syscalls: Arc<SyscallTable>,
    ) -> Result<Self, SimError> {
        let cell_size = config.memory.cell_size;
        if cell_size < 4 || !cell_size.is_power_of_two() {
            return Err(ConfigError::CellSize(cell_size).into());
        }
        let caches = CacheHierarchy::new(&config.memory.caches)?;
        let stats = SimStats {
            caches: vec![CacheStats::default(); caches.len()],
            ..SimStats::default()
        };
        Ok(Self {
            regs: RegisterFile::new(),
            memory: Memory::from_config(&config.memory)?,
            caches,
            stats,
            trace: config.general.trace_instructions || cfg!(feature = "always-trace"),
            delay_slots: config.pipeline.delay_slots,
            bounds: TextBounds::default(),
            events: EventBus::default(),
            isa,
            syscalls,
        })
    }

    /// Finds the handler implementing `word`.
    pub fn lookup(&self, word: u32) -> Option<Arc<dyn InstructionHandler>> {
        self.isa.lookup(word)
    }

    /// Instruction set in use.
    pub fn isa(&self) -> &Arc<dyn InstructionSet> {
        &self.isa
    }

    /// Syscall services in use.
    pub fn syscalls(&self) -> &Arc<SyscallTable> {
        &self.syscalls
    }

    /// Whether fetching at `pc` would run past the loaded text.
    pub const fn fetch_exhausted(&self, pc: u32) -> bool {
        let end = if self.regs.kernel_mode() {
            self.bounds.kernel_end
        } else {
            self.bounds.user_end
        };
        match end {
            Some(end) => pc >= end,
            None => true,
        }
    }

    /// Runs a completed memory access through the caches.
    ///
    /// Counts the hits and misses of every level reached and reports each of
    /// them as a [`SimEvent::CacheAccessed`].
    pub fn access_cache(&mut self, address: u32, write: bool) {
        if self.caches.is_empty() {
            return;
        }
        let stats = &mut self.stats.caches;
        let events = &self.events;
        self.caches.access(address, write, &mut |access| {
            if let Some(level) = stats.get_mut(access.level) {
                level.record(&access);
            }
            events.emit_with(|| SimEvent::CacheAccessed(access));
        });
    }

    /// Sends an event to every subscriber.
    pub fn emit(&self, event: impl FnOnce() -> SimEvent) {
        self.events.emit_with(event);
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("pc", &format_args!("{:#010x}", self.regs.pc()))
            .field("kernel_mode", &self.regs.kernel_mode())
            .field("isa", &self.isa.name())
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}
