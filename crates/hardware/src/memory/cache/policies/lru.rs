//! Least Recently Used (LRU) Replacement Policy.
//!
//! Keeps a recency stack per set. Hits and fills move a way to the top; the
//! victim is the way at the bottom.

use super::{ReplacementPolicy, recency_stacks, touch};

/// LRU state: one recency stack per set.
#[derive(Clone, Debug)]
pub struct LruPolicy {
    usage: Vec<Vec<usize>>,
}

impl LruPolicy {
    /// Creates the policy for `sets` sets of `ways` ways.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: recency_stacks(sets, ways),
        }
    }
}

impl ReplacementPolicy for LruPolicy {
    fn update(&mut self, set: usize, way: usize) {
        touch(&mut self.usage[set], way);
    }

    fn victim(&mut self, set: usize) -> usize {
        self.usage[set].last().copied().unwrap_or(0)
    }

    fn clone_box(&self) -> Box<dyn ReplacementPolicy> {
        Box::new(self.clone())
    }
}
