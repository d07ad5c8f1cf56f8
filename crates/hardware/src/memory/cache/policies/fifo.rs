//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! A round-robin pointer per set. Hits do not reorder anything; the pointer
//! only advances past a way when that way is filled.

use super::ReplacementPolicy;

/// FIFO state: next way to evict in each set.
#[derive(Clone, Debug)]
pub struct FifoPolicy {
    next_way: Vec<usize>,
    ways: usize,
}

impl FifoPolicy {
    /// Creates the policy for `sets` sets of `ways` ways.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_way: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn update(&mut self, _set: usize, _way: usize) {}

    fn insert(&mut self, set: usize, way: usize) {
        let next = &mut self.next_way[set];
        if *next == way {
            *next = (way + 1) % self.ways;
        }
    }

    fn victim(&mut self, set: usize) -> usize {
        self.next_way[set]
    }

    fn clone_box(&self) -> Box<dyn ReplacementPolicy> {
        Box::new(self.clone())
    }
}
