//! Execute-stage functional units.
//!
//! Each unit holds at most one instruction for `latency` cycles. Issue picks
//! any free unit compatible with the instruction class, while completion is
//! in program order: only the oldest instruction may leave the stage.

use crate::config::{UnitConfig, UnitKind};
use crate::core::pipeline::latches::PipelineSlot;
use crate::core::pipeline::signals::OpClass;
use crate::core::pipeline::topology::accepts;
use crate::core::pipeline::traits::PipelineLatch;

/// One functional unit.
#[derive(Clone, Debug)]
pub struct FunctionalUnit {
    kind: UnitKind,
    latency: u32,
    slot: Option<PipelineSlot>,
    remaining: u32,
}

impl FunctionalUnit {
    /// Creates an idle unit.
    pub const fn new(config: UnitConfig) -> Self {
        Self {
            kind: config.kind,
            latency: config.latency,
            slot: None,
            remaining: 0,
        }
    }

    /// Unit kind.
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Instruction currently held.
    pub const fn slot(&self) -> Option<&PipelineSlot> {
        self.slot.as_ref()
    }

    /// Whether the held instruction has spent its latency in the unit.
    pub const fn is_complete(&self) -> bool {
        self.slot.is_some() && self.remaining == 0
    }
}

/// The bank of functional units forming the execute stage.
#[derive(Clone, Debug)]
pub struct ExecuteUnits {
    units: Vec<FunctionalUnit>,
}

impl ExecuteUnits {
    /// Builds idle units from their configuration.
    pub fn new(configs: &[UnitConfig]) -> Self {
        Self {
            units: configs.iter().copied().map(FunctionalUnit::new).collect(),
        }
    }

    /// All units.
    pub fn units(&self) -> &[FunctionalUnit] {
        &self.units
    }

    /// Occupied slots, in unit order.
    pub fn slots(&self) -> impl Iterator<Item = (&PipelineSlot, bool)> {
        self.units
            .iter()
            .filter_map(|u| u.slot.as_ref().map(|slot| (slot, u.remaining == 0)))
    }

    /// Mutable access to occupied slots.
    pub fn slots_mut(&mut self) -> impl Iterator<Item = &mut PipelineSlot> {
        self.units.iter_mut().filter_map(|u| u.slot.as_mut())
    }

    /// Index of a free unit accepting `class`.
    pub fn free_for(&self, class: OpClass) -> Option<usize> {
        self.units
            .iter()
            .position(|u| u.slot.is_none() && accepts(u.kind, class))
    }

    /// Places `slot` in unit `idx`.
    pub fn issue(&mut self, idx: usize, slot: PipelineSlot) {
        let unit = &mut self.units[idx];
        unit.remaining = unit.latency;
        unit.slot = Some(slot);
    }

    /// Counts one cycle of work in every occupied unit.
    pub fn advance(&mut self) {
        for unit in &mut self.units {
            if unit.slot.is_some() {
                unit.remaining = unit.remaining.saturating_sub(1);
            }
        }
    }

    /// Removes the oldest instruction if it has completed.
    pub fn retire_oldest(&mut self) -> Option<PipelineSlot> {
        let unit = self
            .units
            .iter_mut()
            .filter(|u| u.slot.is_some())
            .min_by_key(|u| u.slot.as_ref().map_or(u64::MAX, |s| s.id))?;
        if unit.remaining > 0 {
            return None;
        }
        unit.slot.take()
    }
}

impl PipelineLatch for ExecuteUnits {
    fn flush(&mut self) -> usize {
        self.units.iter_mut().map(|u| u.slot.flush()).sum()
    }

    fn flush_younger(&mut self, id: u64) -> usize {
        self.units.iter_mut().map(|u| u.slot.flush_younger(id)).sum()
    }

    fn is_empty(&self) -> bool {
        self.units.iter().all(|u| u.slot.is_none())
    }

    fn has_trap(&self) -> bool {
        self.units.iter().any(|u| u.slot.has_trap())
    }
}
