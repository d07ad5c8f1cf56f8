//! Cache Replacement Policies.
//!
//! Victim selection for full sets of a set-associative cache. Invalid ways
//! are filled before a policy is consulted.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used.
//! - `Fifo`: First-In, First-Out.
//! - `Plru`: Pseudo-LRU with one bit per way.
//! - `Random`: xorshift selection with a fixed seed.
//! - `Mru`: Most Recently Used.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

/// Most Recently Used replacement policy.
pub mod mru;

/// Pseudo-LRU replacement policy.
pub mod plru;

/// Random replacement policy.
pub mod random;

use std::fmt;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use plru::PlruPolicy;
pub use random::RandomPolicy;

use crate::config::ReplacementPolicy as PolicyKind;

/// Usage tracking and victim selection for every set of one cache.
///
/// Policies are part of the simulated state: undo snapshots clone them, so
/// a restored cache evicts exactly as it would have before.
pub trait ReplacementPolicy: Send + Sync + fmt::Debug {
    /// Records a hit on `way` in `set`.
    fn update(&mut self, set: usize, way: usize);

    /// Records that a new line was placed in `way` of `set`.
    fn insert(&mut self, set: usize, way: usize) {
        self.update(set, way);
    }

    /// Picks the way of a full `set` to evict.
    fn victim(&mut self, set: usize) -> usize;

    /// Clones the policy behind a box.
    fn clone_box(&self) -> Box<dyn ReplacementPolicy>;
}

impl Clone for Box<dyn ReplacementPolicy> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Builds the policy named by a cache configuration.
pub fn build(kind: PolicyKind, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match kind {
        PolicyKind::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyKind::Fifo => Box::new(FifoPolicy::new(sets, ways)),
        PolicyKind::Plru => Box::new(PlruPolicy::new(sets, ways)),
        PolicyKind::Random => Box::new(RandomPolicy::new(ways)),
        PolicyKind::Mru => Box::new(MruPolicy::new(sets, ways)),
    }
}

/// Per-set recency order, most recent first.
pub(super) fn recency_stacks(sets: usize, ways: usize) -> Vec<Vec<usize>> {
    (0..sets).map(|_| (0..ways).collect()).collect()
}

/// Moves `way` to the front of `stack`.
pub(super) fn touch(stack: &mut Vec<usize>, way: usize) {
    if let Some(pos) = stack.iter().position(|&w| w == way) {
        let _ = stack.remove(pos);
    }
    stack.insert(0, way);
}
