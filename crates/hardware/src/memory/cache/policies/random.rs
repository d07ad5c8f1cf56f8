//! Random Replacement Policy.
//!
//! Draws victims from a xorshift generator with a fixed seed, so a run
//! evicts the same lines every time it is repeated.

use super::ReplacementPolicy;

const SEED: u64 = 123_456_789;

/// Random state: the generator shared by all sets.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    ways: usize,
    state: u64,
}

impl RandomPolicy {
    /// Creates the policy for a cache of `ways` ways.
    pub const fn new(ways: usize) -> Self {
        Self { ways, state: SEED }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn update(&mut self, _set: usize, _way: usize) {}

    fn victim(&mut self, _set: usize) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x % self.ways as u64) as usize
    }

    fn clone_box(&self) -> Box<dyn ReplacementPolicy> {
        Box::new(self.clone())
    }
}
