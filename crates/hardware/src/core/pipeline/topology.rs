//! Engine topology descriptor.
//!
//! A [`Topology`] is the validated form of the pipeline configuration. The
//! plain five-stage pipeline is expressed as the multi-unit pipeline with a
//! single unit that accepts every instruction class.

use crate::common::error::ConfigError;
use crate::config::{PipelineConfig, TopologyKind, UnitConfig, UnitKind};
use crate::core::pipeline::signals::OpClass;

/// Validated engine shape and hazard policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    /// Engine topology.
    pub kind: TopologyKind,
    /// Forward results to decode instead of waiting for writeback.
    pub forwarding: bool,
    /// Resolve branches in decode.
    pub branch_on_decode: bool,
    /// Execute the instruction after a non-compact control transfer.
    pub delay_slots: bool,
    /// Functional units of the execute stage.
    pub units: Vec<UnitConfig>,
}

impl Topology {
    /// Validates a pipeline configuration.
    ///
    /// # Returns
    ///
    /// The topology, or a `ConfigError` when the multi-unit execute stage has
    /// no units, a zero-latency unit, or no unit for some instruction class.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let units = match config.topology {
            TopologyKind::MultiAluPipelined => {
                if config.units.is_empty() {
                    return Err(ConfigError::NoUnits);
                }
                if let Some(index) = config.units.iter().position(|u| u.latency == 0) {
                    return Err(ConfigError::ZeroLatency { index });
                }
                for class in [OpClass::Integer, OpClass::FloatingPoint] {
                    if !config.units.iter().any(|u| accepts(u.kind, class)) {
                        return Err(ConfigError::NoUnitFor(class.name()));
                    }
                }
                config.units.clone()
            }
            _ => vec![UnitConfig {
                kind: UnitKind::Any,
                latency: 1,
            }],
        };
        Ok(Self {
            kind: config.topology,
            forwarding: config.forwarding,
            branch_on_decode: config.branch_on_decode,
            delay_slots: config.delay_slots,
            units,
        })
    }

    /// Whether the topology overlaps instructions.
    pub const fn is_pipelined(&self) -> bool {
        matches!(
            self.kind,
            TopologyKind::Pipelined | TopologyKind::MultiAluPipelined
        )
    }
}

/// Whether a unit of `kind` may execute instructions of `class`.
pub const fn accepts(kind: UnitKind, class: OpClass) -> bool {
    matches!(
        (kind, class),
        (UnitKind::Any, _)
            | (UnitKind::Integer, OpClass::Integer)
            | (UnitKind::FloatingPoint, OpClass::FloatingPoint)
    )
}
