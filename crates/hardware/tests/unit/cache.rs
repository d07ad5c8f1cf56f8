use std::sync::Arc;
use std::sync::mpsc;

use mipsim_core::common::constants::{STATIC_DATA_START as DATA, TEXT_START};
use mipsim_core::common::error::{ConfigError, SimError};
use mipsim_core::config::{CacheConfig, Config, ReplacementPolicy, TopologyKind, WritePolicy};
use mipsim_core::memory::cache::{Cache, CacheAccess, CacheHierarchy, CacheStats};
use mipsim_core::sim::{ChannelSink, Program, SimEvent, Simulator};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::TestContext;
use crate::common::asm::{self, S0, T0, T1};

fn cache(size_bytes: u32, ways: u32, policy: ReplacementPolicy, write_policy: WritePolicy) -> CacheConfig {
    CacheConfig {
        size_bytes,
        line_bytes: 16,
        ways,
        policy,
        write_policy,
    }
}

#[test]
fn lines_are_placed_by_set_and_matched_by_tag() {
    // Two sets of two ways.
    let mut l1 = Cache::new(0, &cache(64, 2, ReplacementPolicy::Lru, WritePolicy::WriteBack)).unwrap();
    assert_eq!(l1.sets(), 2);

    assert!(!l1.access(0x00, false).hit);
    assert!(l1.access(0x0C, false).hit, "same line");
    assert!(!l1.access(0x20, false).hit, "set 0, second tag");
    assert!(l1.access(0x00, false).hit, "both tags fit in set 0");
    assert!(!l1.access(0x10, false).hit, "set 1 was empty");
    assert_eq!(l1.occupancy(), 3);
}

#[rstest]
#[case::lru(ReplacementPolicy::Lru, 0x100)]
#[case::fifo(ReplacementPolicy::Fifo, 0x000)]
#[case::mru(ReplacementPolicy::Mru, 0x000)]
fn full_sets_evict_the_policy_victim(#[case] policy: ReplacementPolicy, #[case] evicted: u32) {
    let mut l1 = Cache::new(0, &cache(32, 2, policy, WritePolicy::WriteBack)).unwrap();
    let _ = l1.access(0x000, false);
    let _ = l1.access(0x100, false);
    assert!(l1.access(0x000, false).hit);

    let _ = l1.access(0x200, false);
    assert!(!l1.contains(evicted));
    assert!(l1.contains(0x200));
    assert_eq!(l1.occupancy(), 2);
}

/// Runs `(address, write)` accesses through a one-line L1 in front of a
/// roomy L2 and returns the counters of both plus the writes L2 received.
fn two_levels(write_policy: WritePolicy, accesses: &[(u32, bool)]) -> (CacheStats, CacheStats, usize) {
    let mut caches = CacheHierarchy::new(&[
        cache(16, 1, ReplacementPolicy::Lru, write_policy),
        cache(1024, 4, ReplacementPolicy::Lru, WritePolicy::WriteBack),
    ])
    .unwrap();
    let mut stats = [CacheStats::default(); 2];
    let mut l2_writes = 0;
    for &(address, write) in accesses {
        caches.access(address, write, &mut |access: CacheAccess| {
            stats[access.level].record(&access);
            if access.level == 1 && access.write {
                l2_writes += 1;
            }
        });
    }
    (stats[0], stats[1], l2_writes)
}

#[test]
fn write_back_defers_writes_until_eviction() {
    let (l1, l2, l2_writes) = two_levels(WritePolicy::WriteBack, &[(0x100, true), (0x100, true), (0x200, false)]);
    assert_eq!(l1, CacheStats { hits: 1, misses: 2, writebacks: 1 });
    assert_eq!(l2_writes, 1);
    assert_eq!(l2, CacheStats { hits: 1, misses: 2, writebacks: 0 });
}

#[test]
fn write_through_forwards_every_write() {
    let (l1, l2, l2_writes) = two_levels(WritePolicy::WriteThrough, &[(0x100, true), (0x100, true), (0x200, false)]);
    assert_eq!(l1, CacheStats { hits: 1, misses: 2, writebacks: 0 });
    assert_eq!(l2_writes, 2);
    assert_eq!(l2, CacheStats { hits: 2, misses: 2, writebacks: 0 });
}

#[test]
fn write_back_lines_turn_dirty_and_write_through_lines_stay_clean() {
    for (write_policy, dirty) in [(WritePolicy::WriteBack, true), (WritePolicy::WriteThrough, false)] {
        let mut l1 = Cache::new(0, &cache(64, 2, ReplacementPolicy::Lru, write_policy)).unwrap();
        let _ = l1.access(0x40, true);
        assert!(l1.contains(0x40));
        assert_eq!(l1.is_dirty(0x40), dirty, "{write_policy:?}");
    }
}

#[rstest]
#[case::line_below_a_word(CacheConfig { line_bytes: 2, ..CacheConfig::default() })]
#[case::line_not_a_power_of_two(CacheConfig { line_bytes: 24, ..CacheConfig::default() })]
#[case::no_ways(CacheConfig { ways: 0, ..CacheConfig::default() })]
#[case::too_many_ways(CacheConfig { ways: 128, line_bytes: 4, size_bytes: 1024, ..CacheConfig::default() })]
#[case::smaller_than_a_set(CacheConfig { size_bytes: 64, ..CacheConfig::default() })]
#[case::size_not_a_power_of_two(CacheConfig { size_bytes: 3000, ..CacheConfig::default() })]
fn impossible_geometries_are_rejected(#[case] bad: CacheConfig) {
    let mut config = Config::default();
    config.memory.caches = vec![CacheConfig::default(), bad];
    match Simulator::with_defaults(&config, &Program::from_words(&[asm::nop()])) {
        Err(SimError::Config(ConfigError::InvalidCache { level, .. })) => assert_eq!(level, 1),
        other => panic!("expected a cache configuration error, got {other:?}"),
    }
}

#[test]
fn cache_levels_parse_with_defaults() {
    let config = Config::from_json(
        r#"{ "memory": { "caches": [
            { "size_bytes": 1024, "policy": "FIFO", "write_policy": "WriteThrough" },
            { "policy": "Plru" }
        ] } }"#,
    )
    .unwrap();
    let caches = &config.memory.caches;
    assert_eq!(caches.len(), 2);
    assert_eq!(caches[0].size_bytes, 1024);
    assert_eq!(caches[0].policy, ReplacementPolicy::Fifo);
    assert_eq!(caches[0].write_policy, WritePolicy::WriteThrough);
    assert_eq!(caches[1], CacheConfig { policy: ReplacementPolicy::Plru, ..CacheConfig::default() });
    assert!(Config::default().memory.caches.is_empty());
}

fn store_then_load() -> Vec<u32> {
    let mut words = vec![asm::lui(S0, 0x1001), asm::li(T0, 5), asm::sw(T0, 0, S0), asm::lw(T1, 0, S0)];
    words.extend(asm::exit());
    words
}

fn cached(topology: TopologyKind) -> TestContext {
    let mut config = Config::default().with_topology(topology);
    config.memory.caches = vec![CacheConfig::default()];
    TestContext::with_program(&config, &Program::from_words(&store_then_load()))
}

#[test]
fn fetches_loads_and_stores_go_through_the_cache() {
    let mut ctx = cached(TopologyKind::SingleCycle);
    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!(ctx.reg(T1), 5);

    let stats = ctx.sim.stats();
    let l1 = stats.caches[0];
    // Every word is fetched once, plus the store and the load.
    assert_eq!(l1.accesses(), store_then_load().len() as u64 + 2);
    // One line of text and one line of data.
    assert_eq!(l1.misses, 2);
    assert_eq!(l1.writebacks, 0);
    let caches = ctx.sim.caches();
    assert!(caches.level(0).unwrap().contains(TEXT_START));
    assert!(caches.level(0).unwrap().is_dirty(DATA));
}

#[test]
fn cache_accesses_are_reported_as_events() {
    let mut ctx = cached(TopologyKind::SingleCycle);
    let (tx, rx) = mpsc::channel();
    ctx.sim.subscribe(Arc::new(ChannelSink::new(tx)));
    let _ = ctx.run_to_exit();

    let data: Vec<CacheAccess> = rx
        .try_iter()
        .filter_map(|event| match event {
            SimEvent::CacheAccessed(access) if access.address >= DATA => Some(access),
            _ => None,
        })
        .collect();
    assert_eq!(
        data,
        vec![
            CacheAccess { level: 0, address: DATA, write: true, hit: false, writeback: false },
            CacheAccess { level: 0, address: DATA, write: false, hit: true, writeback: false },
        ]
    );
}

#[rstest]
fn caches_do_not_change_results(
    #[values(TopologyKind::MultiCycle, TopologyKind::Pipelined, TopologyKind::MultiAluPipelined)] topology: TopologyKind,
) {
    let mut ctx = cached(topology);
    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!(ctx.reg(T1), 5);
    assert!(ctx.sim.stats().caches[0].hits > 0);
}

#[test]
fn undo_and_reset_restore_the_cache_state() {
    let mut ctx = cached(TopologyKind::SingleCycle);
    for _ in 0..2 {
        let _ = ctx.sim.step().unwrap();
    }
    let before = ctx.sim.stats().caches.clone();
    let _ = ctx.sim.step().unwrap();
    assert_ne!(ctx.sim.stats().caches, before);
    assert!(ctx.sim.caches().level(0).unwrap().is_dirty(DATA));

    assert!(ctx.sim.undo_step());
    assert_eq!(ctx.sim.stats().caches, before);
    assert!(!ctx.sim.caches().level(0).unwrap().contains(DATA));

    ctx.sim.reset();
    assert_eq!(ctx.sim.stats().caches, vec![CacheStats::default()]);
    assert_eq!(ctx.sim.caches().level(0).unwrap().occupancy(), 0);
}
