//! Configuration system for the MIPS simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline constants (memory layout, undo depth, unit latencies).
//! 2. **Structures:** Hierarchical config for general, memory and pipeline settings.
//! 3. **Enums:** Execution topology, functional-unit kinds and cache policies.
//!
//! Configuration is supplied as JSON or built with `Config::default()`.

use serde::Deserialize;

use crate::common::constants;
use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
mod defaults {
    use crate::common::constants;

    /// Number of undo snapshots kept.
    pub const UNDO_LIMIT: usize = constants::DEFAULT_UNDO_LIMIT;

    /// Allocation granule of memory sections.
    pub const CELL_SIZE: u32 = constants::DEFAULT_CELL_SIZE;

    /// Latency of integer functional units in cycles.
    pub const INTEGER_LATENCY: u32 = 1;

    /// Latency of floating-point functional units in cycles.
    pub const FP_LATENCY: u32 = 4;

    /// Cache size in bytes.
    pub const CACHE_SIZE: u32 = 4096;

    /// Cache line size in bytes.
    pub const CACHE_LINE: u32 = 32;

    /// Cache associativity.
    pub const CACHE_WAYS: u32 = 4;
}

/// Execution engine topology.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum TopologyKind {
    /// Every instruction completes all five stages in one cycle.
    #[default]
    SingleCycle,

    /// One instruction in flight, one stage per cycle.
    MultiCycle,

    /// Classic five-stage pipeline.
    Pipelined,

    /// Five-stage pipeline with several execute units.
    #[serde(alias = "MultiALUPipelined")]
    MultiAluPipelined,
}

/// Kind of functional unit in the execute stage.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub enum UnitKind {
    /// Accepts integer instructions only.
    Integer,

    /// Accepts floating-point instructions only.
    FloatingPoint,

    /// Accepts every instruction.
    Any,
}

/// One functional unit of the execute stage.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct UnitConfig {
    /// Instruction classes accepted.
    pub kind: UnitKind,

    /// Cycles an instruction spends in the unit.
    #[serde(default = "UnitConfig::default_latency")]
    pub latency: u32,
}

impl UnitConfig {
    fn default_latency() -> u32 {
        defaults::INTEGER_LATENCY
    }
}

/// Cache replacement policy algorithms.
///
/// Selects which line of a full set is evicted to make room for a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Evicts the line accessed least recently.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Evicts the line filled first, ignoring hits.
    #[serde(alias = "Fifo")]
    Fifo,
    /// Approximates LRU with one bit per way.
    #[serde(alias = "Plru")]
    Plru,
    /// Evicts a pseudo-random line; the sequence is the same on every run.
    #[serde(alias = "Random")]
    Random,
    /// Evicts the line accessed most recently.
    #[serde(alias = "Mru")]
    Mru,
}

/// How a cache propagates writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum WritePolicy {
    /// Writes mark the line dirty; dirty lines reach the next level on eviction.
    #[default]
    WriteBack,
    /// Every write is also sent to the next level.
    WriteThrough,
}

/// One cache level.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Total size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: u32,

    /// Line size in bytes
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: u32,

    /// Associativity (lines per set)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: u32,

    /// Replacement policy
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Write policy
    #[serde(default)]
    pub write_policy: WritePolicy,
}

impl CacheConfig {
    fn default_size() -> u32 {
        defaults::CACHE_SIZE
    }

    fn default_line() -> u32 {
        defaults::CACHE_LINE
    }

    fn default_ways() -> u32 {
        defaults::CACHE_WAYS
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            policy: ReplacementPolicy::default(),
            write_policy: WritePolicy::default(),
        }
    }
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use mipsim_core::config::{Config, TopologyKind};
///
/// let json = r#"{
///     "general": { "undo_limit": 64 },
///     "pipeline": { "topology": "Pipelined", "forwarding": false }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.general.undo_limit, 64);
/// assert_eq!(config.pipeline.topology, TopologyKind::Pipelined);
/// assert!(!config.pipeline.forwarding);
/// assert!(config.general.undo_enabled);
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General simulation settings
    pub general: GeneralConfig,
    /// Address space layout
    pub memory: MemoryConfig,
    /// Execution engine settings
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Parses a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Returns this configuration with another topology.
    pub fn with_topology(mut self, topology: TopologyKind) -> Self {
        self.pipeline.topology = topology;
        self
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Emit a trace event for every stage of every instruction
    #[serde(default)]
    pub trace_instructions: bool,

    /// Keep a snapshot before each step so it can be undone
    #[serde(default = "GeneralConfig::default_undo_enabled")]
    pub undo_enabled: bool,

    /// Maximum number of undo snapshots kept
    #[serde(default = "GeneralConfig::default_undo_limit")]
    pub undo_limit: usize,
}

impl GeneralConfig {
    fn default_undo_enabled() -> bool {
        true
    }

    fn default_undo_limit() -> usize {
        defaults::UNDO_LIMIT
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_instructions: false,
            undo_enabled: true,
            undo_limit: defaults::UNDO_LIMIT,
        }
    }
}

/// A section of the address space.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SectionConfig {
    /// Section name
    pub name: String,
    /// First address
    pub first: u32,
    /// Length in bytes
    pub length: u32,
}

impl SectionConfig {
    fn new(name: &str, first: u32, length: u32) -> Self {
        Self {
            name: name.to_owned(),
            first,
            length,
        }
    }
}

/// Address space configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Store multi-byte values big-endian
    #[serde(default)]
    pub big_endian: bool,

    /// Allocation granule of every section
    #[serde(default = "MemoryConfig::default_cell_size")]
    pub cell_size: u32,

    /// Sections of the address space
    #[serde(default = "MemoryConfig::default_sections")]
    pub sections: Vec<SectionConfig>,

    /// Unified cache levels, nearest the processor first; empty for none
    #[serde(default)]
    pub caches: Vec<CacheConfig>,
}

impl MemoryConfig {
    fn default_cell_size() -> u32 {
        defaults::CELL_SIZE
    }

    /// The standard MIPS32 layout.
    pub fn default_sections() -> Vec<SectionConfig> {
        vec![
            SectionConfig::new("Text", constants::TEXT_START, constants::TEXT_LENGTH),
            SectionConfig::new("Data", constants::DATA_START, constants::DATA_LENGTH),
            SectionConfig::new("KernelText", constants::KERNEL_TEXT_START, constants::KERNEL_TEXT_LENGTH),
            SectionConfig::new("KernelData", constants::KERNEL_DATA_START, constants::KERNEL_DATA_LENGTH),
            SectionConfig::new("External", constants::EXTERNAL_START, constants::EXTERNAL_LENGTH),
        ]
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            big_endian: false,
            cell_size: defaults::CELL_SIZE,
            sections: Self::default_sections(),
            caches: Vec::new(),
        }
    }
}

/// Execution engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Engine topology
    #[serde(default)]
    pub topology: TopologyKind,

    /// Forward results from later stages to decode
    #[serde(default = "PipelineConfig::default_forwarding")]
    pub forwarding: bool,

    /// Resolve branches in decode instead of execute
    #[serde(default)]
    pub branch_on_decode: bool,

    /// Execute the instruction after a non-compact control transfer
    #[serde(default)]
    pub delay_slots: bool,

    /// Functional units of the multi-ALU topology
    #[serde(default = "PipelineConfig::default_units")]
    pub units: Vec<UnitConfig>,
}

impl PipelineConfig {
    fn default_forwarding() -> bool {
        true
    }

    fn default_units() -> Vec<UnitConfig> {
        vec![
            UnitConfig {
                kind: UnitKind::Integer,
                latency: defaults::INTEGER_LATENCY,
            },
            UnitConfig {
                kind: UnitKind::Integer,
                latency: defaults::INTEGER_LATENCY,
            },
            UnitConfig {
                kind: UnitKind::FloatingPoint,
                latency: defaults::FP_LATENCY,
            },
        ]
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topology: TopologyKind::SingleCycle,
            forwarding: true,
            branch_on_decode: false,
            delay_slots: false,
            units: Self::default_units(),
        }
    }
}
