//! Set-Associative Cache Model.
//!
//! Caches sit between the processor and [`Memory`](super::Memory). They track
//! tags and dirty bits only: the bytes always live in memory, so a cache
//! changes what a run costs, never what it computes. This module provides:
//! 1. **Lookup:** Set-associative placement with a configurable replacement policy.
//! 2. **Write policies:** Write-back lines turn dirty and are written to the next
//!    level on eviction; write-through forwards every write.
//! 3. **Hierarchy:** Unified levels chained in order, level 0 nearest the processor.
//!    A miss at one level fills from the next.

/// Replacement policy implementations (LRU, FIFO, PLRU, Random, MRU).
pub mod policies;

use self::policies::ReplacementPolicy;
use crate::common::error::ConfigError;
use crate::config::{CacheConfig, WritePolicy};

/// Largest associativity a cache may have.
pub const MAX_WAYS: u32 = 64;

/// Tag, validity and dirty bit of one line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CacheLine {
    tag: u32,
    valid: bool,
    dirty: bool,
}

/// One access seen by one cache level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheAccess {
    /// Level that was accessed, 0 nearest the processor.
    pub level: usize,
    /// Address accessed.
    pub address: u32,
    /// The access was a write.
    pub write: bool,
    /// The line was present.
    pub hit: bool,
    /// A dirty line was evicted to make room.
    pub writeback: bool,
}

/// Counters of one cache level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Accesses that found their line.
    pub hits: u64,
    /// Accesses that had to fill their line.
    pub misses: u64,
    /// Dirty lines written to the next level on eviction.
    pub writebacks: u64,
}

impl CacheStats {
    /// Counts one access.
    pub const fn record(&mut self, access: &CacheAccess) {
        if access.hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        if access.writeback {
            self.writebacks += 1;
        }
    }

    /// Total accesses.
    pub const fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses that hit, 0 when there were none.
    pub fn hit_rate(&self) -> f64 {
        if self.accesses() == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses() as f64
        }
    }
}

/// Result of a lookup in a single cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lookup {
    /// The line was present.
    pub hit: bool,
    /// First address of the dirty line evicted by the fill, if any.
    pub evicted: Option<u32>,
}

/// A set-associative cache.
#[derive(Clone, Debug)]
pub struct Cache {
    lines: Vec<CacheLine>,
    sets: u32,
    ways: usize,
    line_bytes: u32,
    write_policy: WritePolicy,
    policy: Box<dyn ReplacementPolicy>,
}

impl Cache {
    /// Creates an empty cache.
    ///
    /// # Arguments
    ///
    /// * `level` - Position in the hierarchy, used in error reports.
    /// * `config` - Geometry and policies.
    ///
    /// # Returns
    ///
    /// The cache, or `ConfigError::InvalidCache` when the geometry is not made
    /// of powers of two, lines are smaller than a word, or the size cannot
    /// hold one set.
    pub fn new(level: usize, config: &CacheConfig) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidCache { level, reason };
        if config.line_bytes < 4 || !config.line_bytes.is_power_of_two() {
            return Err(invalid("line size must be a power of two of at least 4 bytes"));
        }
        if !config.ways.is_power_of_two() || config.ways > MAX_WAYS {
            return Err(invalid("associativity must be a power of two no larger than 64"));
        }
        if !config.size_bytes.is_power_of_two() {
            return Err(invalid("size must be a power of two"));
        }
        let set_bytes = config.line_bytes * config.ways;
        if config.size_bytes < set_bytes {
            return Err(invalid("size is smaller than one set"));
        }
        let sets = config.size_bytes / set_bytes;
        let ways = config.ways as usize;
        Ok(Self {
            lines: vec![CacheLine::default(); sets as usize * ways],
            sets,
            ways,
            line_bytes: config.line_bytes,
            write_policy: config.write_policy,
            policy: policies::build(config.policy, sets as usize, ways),
        })
    }

    /// Number of sets.
    pub const fn sets(&self) -> u32 {
        self.sets
    }

    /// Lines per set.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Bytes per line.
    pub const fn line_bytes(&self) -> u32 {
        self.line_bytes
    }

    /// How writes reach the next level.
    pub const fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    const fn locate(&self, address: u32) -> (usize, u32) {
        let line = address / self.line_bytes;
        ((line % self.sets) as usize, line / self.sets)
    }

    const fn line_address(&self, set: usize, tag: u32) -> u32 {
        (tag * self.sets + set as u32) * self.line_bytes
    }

    fn find(&self, set: usize, tag: u32) -> Option<usize> {
        let base = set * self.ways;
        self.lines[base..base + self.ways]
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Whether the line holding `address` is present.
    pub fn contains(&self, address: u32) -> bool {
        let (set, tag) = self.locate(address);
        self.find(set, tag).is_some()
    }

    /// Whether the line holding `address` is present and dirty.
    pub fn is_dirty(&self, address: u32) -> bool {
        let (set, tag) = self.locate(address);
        self.find(set, tag)
            .is_some_and(|way| self.lines[set * self.ways + way].dirty)
    }

    /// Looks up `address`, filling its line on a miss.
    ///
    /// Empty ways are filled before the replacement policy picks a victim.
    /// Writes mark the line dirty under write-back.
    pub fn access(&mut self, address: u32, write: bool) -> Lookup {
        let (set, tag) = self.locate(address);
        let base = set * self.ways;
        let dirty = write && self.write_policy == WritePolicy::WriteBack;

        if let Some(way) = self.find(set, tag) {
            self.lines[base + way].dirty |= dirty;
            self.policy.update(set, way);
            return Lookup { hit: true, evicted: None };
        }

        let way = match self.lines[base..base + self.ways].iter().position(|line| !line.valid) {
            Some(way) => way,
            None => self.policy.victim(set) % self.ways,
        };
        let victim = self.lines[base + way];
        let evicted = (victim.valid && victim.dirty).then(|| self.line_address(set, victim.tag));
        self.lines[base + way] = CacheLine {
            tag,
            valid: true,
            dirty,
        };
        self.policy.insert(set, way);
        Lookup { hit: false, evicted }
    }

    /// Number of valid lines.
    pub fn occupancy(&self) -> usize {
        self.lines.iter().filter(|line| line.valid).count()
    }
}

/// Cache levels between the processor and memory.
#[derive(Clone, Debug, Default)]
pub struct CacheHierarchy {
    levels: Vec<Cache>,
}

impl CacheHierarchy {
    /// Builds the levels described by `configs`, nearest first.
    pub fn new(configs: &[CacheConfig]) -> Result<Self, ConfigError> {
        let levels = configs
            .iter()
            .enumerate()
            .map(|(level, config)| Cache::new(level, config))
            .collect::<Result<_, _>>()?;
        Ok(Self { levels })
    }

    /// Whether no cache is configured.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// The cache at `level`.
    pub fn level(&self, level: usize) -> Option<&Cache> {
        self.levels.get(level)
    }

    /// Sends an access from the processor through the hierarchy.
    ///
    /// `observe` is called once for every level the access, its fill, its
    /// forwarded write or an evicted line reaches.
    pub fn access(&mut self, address: u32, write: bool, observe: &mut impl FnMut(CacheAccess)) {
        self.access_level(0, address, write, observe);
    }

    fn access_level(
        &mut self,
        level: usize,
        address: u32,
        write: bool,
        observe: &mut impl FnMut(CacheAccess),
    ) {
        let Some(cache) = self.levels.get_mut(level) else {
            return;
        };
        let lookup = cache.access(address, write);
        let forward = write && cache.write_policy == WritePolicy::WriteThrough;
        observe(CacheAccess {
            level,
            address,
            write,
            hit: lookup.hit,
            writeback: lookup.evicted.is_some(),
        });
        if let Some(victim) = lookup.evicted {
            self.access_level(level + 1, victim, true, observe);
        }
        if !lookup.hit {
            self.access_level(level + 1, address, false, observe);
        }
        if forward {
            self.access_level(level + 1, address, true, observe);
        }
    }
}
