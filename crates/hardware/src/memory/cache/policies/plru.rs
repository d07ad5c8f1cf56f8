//! Pseudo-LRU (PLRU) Replacement Policy.
//!
//! One "recently used" bit per way. Touching a way sets its bit; when every
//! bit of a set would be set, the set restarts with only that way marked.
//! The victim is the lowest way whose bit is clear.

use super::ReplacementPolicy;

/// PLRU state: a used-bit mask per set.
#[derive(Clone, Debug)]
pub struct PlruPolicy {
    used: Vec<u64>,
    all: u64,
}

impl PlruPolicy {
    /// Creates the policy for `sets` sets of `ways` ways (at most 64).
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            used: vec![0; sets],
            all: u64::MAX >> (64 - ways.clamp(1, 64)),
        }
    }
}

impl ReplacementPolicy for PlruPolicy {
    fn update(&mut self, set: usize, way: usize) {
        let bit = 1u64 << way;
        let used = &mut self.used[set];
        *used |= bit;
        if *used & self.all == self.all {
            *used = bit;
        }
    }

    fn victim(&mut self, set: usize) -> usize {
        (!self.used[set] & self.all).trailing_zeros() as usize % 64
    }

    fn clone_box(&self) -> Box<dyn ReplacementPolicy> {
        Box::new(self.clone())
    }
}
