//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the MIPS simulator. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived metrics (CPI, IPC).
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch, system, FP).
//! 3. **Control flow:** Taken branches and slots discarded on redirects.
//! 4. **Stalls:** Data and structural hazard stall counts.
//! 5. **Caches:** Hits, misses and writebacks of every cache level.

use std::time::Instant;

use crate::core::pipeline::signals::{ControlSignals, OpClass, RegRef};
use crate::memory::cache::CacheStats;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    pub(crate) start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of branch/jump instructions retired.
    pub inst_branch: u64,
    /// Count of ALU (non-load/store/branch/system) instructions retired.
    pub inst_alu: u64,
    /// Count of system (COP0, syscall, eret, break) instructions retired.
    pub inst_system: u64,
    /// Count of FP arithmetic instructions retired.
    pub inst_fp_arith: u64,

    /// Number of control transfers that were taken.
    pub branches_taken: u64,
    /// Number of in-flight slots discarded by redirects and exceptions.
    pub flushed_slots: u64,

    /// Cycles spent in user mode.
    pub cycles_user: u64,
    /// Cycles spent in kernel mode.
    pub cycles_kernel: u64,

    /// Stall cycles due to data hazards (RAW dependencies).
    pub stalls_data: u64,
    /// Stall cycles due to busy functional units.
    pub stalls_structural: u64,

    /// Number of exceptions taken, interrupts included.
    pub traps_taken: u64,
    /// Number of interrupts accepted.
    pub interrupts_taken: u64,

    /// Counters of each cache level, nearest the processor first.
    pub caches: Vec<CacheStats>,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_alu: 0,
            inst_system: 0,
            inst_fp_arith: 0,
            branches_taken: 0,
            flushed_slots: 0,
            cycles_user: 0,
            cycles_kernel: 0,
            stalls_data: 0,
            stalls_structural: 0,
            traps_taken: 0,
            interrupts_taken: 0,
            caches: Vec::new(),
        }
    }
}

impl PartialEq for SimStats {
    fn eq(&self, other: &Self) -> bool {
        self.counters() == other.counters() && self.caches == other.caches
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"core"`, `"instruction_mix"`, `"control"`,
/// `"memory"`. Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "core", "instruction_mix", "control", "memory"];

impl SimStats {
    fn counters(&self) -> [u64; 16] {
        [
            self.cycles,
            self.instructions_retired,
            self.inst_load,
            self.inst_store,
            self.inst_branch,
            self.inst_alu,
            self.inst_system,
            self.inst_fp_arith,
            self.branches_taken,
            self.flushed_slots,
            self.cycles_user,
            self.cycles_kernel,
            self.stalls_data,
            self.stalls_structural,
            self.traps_taken,
            self.interrupts_taken,
        ]
    }

    /// Records a retired instruction in the mix counters.
    pub fn record_retired(&mut self, ctrl: &ControlSignals) {
        self.instructions_retired += 1;
        let touches_cop0 = ctrl
            .sources
            .iter()
            .chain(std::iter::once(&ctrl.dest))
            .any(|reg| matches!(reg, Some(RegRef::Cop0 { .. })));
        if ctrl.mem.is_load() {
            self.inst_load += 1;
        } else if ctrl.mem.is_store() {
            self.inst_store += 1;
        } else if ctrl.control_transfer {
            self.inst_branch += 1;
        } else if ctrl.is_serializing() || touches_cop0 {
            self.inst_system += 1;
        } else if ctrl.class == OpClass::FloatingPoint {
            self.inst_fp_arith += 1;
        } else {
            self.inst_alu += 1;
        }
    }

    /// Instructions per cycle.
    pub fn ipc(&self) -> f64 {
        self.instructions_retired as f64 / self.cycles.max(1) as f64
    }

    /// Cycles per instruction.
    pub fn cpi(&self) -> f64 {
        self.cycles as f64 / self.instructions_retired.max(1) as f64
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1) as f64;
        let total_inst = self.instructions_retired.max(1) as f64;
        let pct = |n: u64, of: f64| (n as f64 / of) * 100.0;

        if want("summary") {
            let khz = (self.cycles as f64 / seconds) / 1000.0;
            println!("\n==========================================================");
            println!("MIPS SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {khz:.2} kHz");
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_ipc                  {:.4}", self.ipc());
            println!("sim_cpi                  {:.4}", self.cpi());
            println!("----------------------------------------------------------");
        }
        if want("core") {
            println!("CORE BREAKDOWN");
            println!("  cycles.user            {} ({:.2}%)", self.cycles_user, pct(self.cycles_user, cyc));
            println!("  cycles.kernel          {} ({:.2}%)", self.cycles_kernel, pct(self.cycles_kernel, cyc));
            println!("  stalls.data            {} ({:.2}%)", self.stalls_data, pct(self.stalls_data, cyc));
            println!(
                "  stalls.structural      {} ({:.2}%)",
                self.stalls_structural,
                pct(self.stalls_structural, cyc)
            );
            println!("  traps                  {}", self.traps_taken);
            println!("  interrupts             {}", self.interrupts_taken);
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            println!("INSTRUCTION MIX");
            for (name, count) in [
                ("op.alu", self.inst_alu),
                ("op.load", self.inst_load),
                ("op.store", self.inst_store),
                ("op.branch", self.inst_branch),
                ("op.system", self.inst_system),
                ("op.fp_arith", self.inst_fp_arith),
            ] {
                println!("  {name:<22} {count} ({:.2}%)", pct(count, total_inst));
            }
            println!("----------------------------------------------------------");
        }
        if want("control") {
            println!("CONTROL FLOW");
            println!("  branches.taken         {}", self.branches_taken);
            println!("  slots.flushed          {}", self.flushed_slots);
            println!("----------------------------------------------------------");
        }
        if want("memory") {
            println!("MEMORY HIERARCHY");
            if self.caches.is_empty() {
                println!("  no caches");
            }
            for (level, cache) in self.caches.iter().enumerate() {
                println!(
                    "  L{:<5} accesses: {:<10} | hits: {:<10} | miss_rate: {:.2}% | writebacks: {}",
                    level + 1,
                    cache.accesses(),
                    cache.hits,
                    pct(cache.misses, cache.accesses().max(1) as f64),
                    cache.writebacks
                );
            }
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
