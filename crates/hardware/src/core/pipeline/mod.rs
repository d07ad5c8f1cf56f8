//! Instruction pipeline implementation.
//!
//! This module contains the execution engines and the pieces they share.
//! It includes the following components:
//! 1. **Engines:** Single-cycle, multi-cycle and overlapped pipelined execution.
//! 2. **Hazards:** Detection and resolution of data and structural hazards.
//! 3. **Latches:** Pipeline slots and inter-stage buffers.
//! 4. **Signals:** Control signals generated during instruction decoding.
//! 5. **Stages:** Fetch, Decode, Execute, Memory, and Writeback stage functions.
//! 6. **Topology:** The validated engine shape built from configuration.

/// Engine enum, clock results and shared sequential commit logic.
pub mod engine;

/// Pipeline hazard detection and forwarding logic.
pub mod hazards;

/// Pipeline slots and stage identifiers.
pub mod latches;

/// One instruction in flight, one stage per clock.
pub mod multi_cycle;

/// Overlapped five-stage pipeline with one or more execute units.
pub mod pipelined;

/// Control signals generated during instruction decode.
pub mod signals;

/// All stages of one instruction per clock.
pub mod single_cycle;

/// Pipeline stage implementations (fetch, decode, execute, memory, writeback).
pub mod stages;

/// Validated engine topology.
pub mod topology;

/// Traits for pipeline latches.
pub mod traits;

/// Execute-stage functional units.
pub mod units;

pub use engine::{Engine, Tick};
pub use latches::{PipelineSlot, Stage};
pub use topology::Topology;
