/// Data hazards, forwarding and stall accounting.
pub mod forwarding;

/// Branches, jumps, flushes and delay slots.
pub mod control_hazards;


/// Multi-unit execute stage.
pub mod multi_alu;
