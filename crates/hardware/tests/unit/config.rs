use mipsim_core::common::error::{ConfigError, SimError};
use mipsim_core::config::{Config, TopologyKind, UnitConfig, UnitKind};
use mipsim_core::sim::{Program, Simulator};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::asm;

fn build(config: &Config) -> Result<Simulator, SimError> {
    Simulator::with_defaults(config, &Program::from_words(&[asm::nop()]))
}

#[test]
fn defaults_describe_the_standard_machine() {
    let config = Config::default();
    assert_eq!(config.pipeline.topology, TopologyKind::SingleCycle);
    assert!(config.pipeline.forwarding);
    assert!(!config.pipeline.branch_on_decode);
    assert!(!config.pipeline.delay_slots);
    assert!(config.general.undo_enabled);
    assert!(!config.memory.big_endian);
    assert_eq!(config.pipeline.units.len(), 3);
    assert_eq!(config.memory.sections.len(), 5);
}

#[rstest]
#[case("SingleCycle", TopologyKind::SingleCycle)]
#[case("MultiCycle", TopologyKind::MultiCycle)]
#[case("Pipelined", TopologyKind::Pipelined)]
#[case("MultiAluPipelined", TopologyKind::MultiAluPipelined)]
#[case("MultiALUPipelined", TopologyKind::MultiAluPipelined)]
fn topology_names_parse(#[case] name: &str, #[case] expected: TopologyKind) {
    let config = Config::from_json(&format!(r#"{{ "pipeline": {{ "topology": "{name}" }} }}"#)).unwrap();
    assert_eq!(config.pipeline.topology, expected);
}

#[test]
fn partial_documents_keep_the_remaining_defaults() {
    let config = Config::from_json(
        r#"{
            "memory": { "big_endian": true, "cell_size": 16 },
            "pipeline": { "units": [ { "kind": "Any" } ] }
        }"#,
    )
    .unwrap();
    assert!(config.memory.big_endian);
    assert_eq!(config.memory.cell_size, 16);
    assert_eq!(config.memory.sections.len(), 5);
    assert_eq!(config.pipeline.units, vec![UnitConfig { kind: UnitKind::Any, latency: 1 }]);
    assert!(config.pipeline.forwarding);
}

#[test]
fn unknown_topology_is_a_parse_error() {
    let err = Config::from_json(r#"{ "pipeline": { "topology": "Superscalar" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)), "{err}");
}

fn multi_alu(units: Vec<UnitConfig>) -> Config {
    let mut config = Config::default().with_topology(TopologyKind::MultiAluPipelined);
    config.pipeline.units = units;
    config
}

#[rstest]
#[case::no_units(multi_alu(vec![]), ConfigError::NoUnits)]
#[case::zero_latency(
    multi_alu(vec![UnitConfig { kind: UnitKind::Any, latency: 0 }]),
    ConfigError::ZeroLatency { index: 0 }
)]
#[case::no_fp_unit(
    multi_alu(vec![UnitConfig { kind: UnitKind::Integer, latency: 1 }]),
    ConfigError::NoUnitFor("floating-point")
)]
fn invalid_unit_sets_are_rejected(#[case] config: Config, #[case] expected: ConfigError) {
    match build(&config) {
        Err(SimError::Config(err)) => assert_eq!(err, expected),
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[rstest]
fn cell_size_must_be_a_word_power_of_two(#[values(0, 2, 6, 12)] cell_size: u32) {
    let mut config = Config::default();
    config.memory.cell_size = cell_size;
    assert!(matches!(build(&config), Err(SimError::Config(ConfigError::CellSize(size))) if size == cell_size));
}

#[test]
fn unit_sets_only_matter_to_the_multi_unit_engine() {
    let mut config = Config::default().with_topology(TopologyKind::Pipelined);
    config.pipeline.units.clear();
    assert!(build(&config).is_ok());
}
