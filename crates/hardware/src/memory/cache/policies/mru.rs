//! Most Recently Used (MRU) Replacement Policy.
//!
//! Evicts the way touched last. Suits loops over data slightly larger than
//! the cache, where the newest line is the one needed furthest in the future.

use super::{ReplacementPolicy, recency_stacks, touch};

/// MRU state: one recency stack per set.
#[derive(Clone, Debug)]
pub struct MruPolicy {
    usage: Vec<Vec<usize>>,
}

impl MruPolicy {
    /// Creates the policy for `sets` sets of `ways` ways.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: recency_stacks(sets, ways),
        }
    }
}

impl ReplacementPolicy for MruPolicy {
    fn update(&mut self, set: usize, way: usize) {
        touch(&mut self.usage[set], way);
    }

    fn victim(&mut self, set: usize) -> usize {
        self.usage[set].first().copied().unwrap_or(0)
    }

    fn clone_box(&self) -> Box<dyn ReplacementPolicy> {
        Box::new(self.clone())
    }
}
