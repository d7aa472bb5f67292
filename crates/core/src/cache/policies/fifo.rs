//! First-in-first-out replacement.
//!
//! Genuine install-order state is needed here — last-use and access-count
//! both get rewritten on the winning block every time it is touched, so
//! neither can recover "which block was installed first." A per-set queue
//! of way indices, oldest at the front, is kept instead.

use std::collections::VecDeque;

use super::ReplacementPolicy;
use crate::cache::CacheBlock;

/// FIFO policy: one installation-order queue per set.
#[derive(Debug)]
pub struct FifoPolicy {
    queues: Vec<VecDeque<usize>>,
}

impl FifoPolicy {
    /// Creates a FIFO policy for a layer with `sets` sets.
    #[must_use]
    pub fn new(sets: usize) -> Self {
        Self {
            queues: (0..sets).map(|_| VecDeque::new()).collect(),
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn select_victim(&mut self, set: usize, _blocks: &[CacheBlock]) -> usize {
        // Edge case: at the very start of a simulation the queue can be
        // empty even though the invalid-first rule normally intercepts
        // this — fall back to way 0.
        self.queues[set].pop_front().unwrap_or(0)
    }

    fn notify_install(&mut self, set: usize, way: usize) {
        self.queues[set].push_back(way);
    }
}
