//! Set-associative cache layer.
//!
//! A [`CacheLayer`] resolves an address into hit/miss against its own sets,
//! maintains per-block recency/frequency metadata, and selects a victim
//! under one of four replacement disciplines on a miss. It does not call
//! into a downstream layer itself — ownership of the hierarchy is a tree
//! rooted at [`crate::system::MemorySystem`], so the downstream link is a
//! non-owning identifier the owning system interprets, not a pointer a
//! layer could follow on its own.

pub mod policies;

use policies::{FifoPolicy, LfuPolicy, LruPolicy, RandomPolicy, ReplacementPolicy};

use crate::access::AccessKind;
use crate::config::{CacheLayerConfig, ReplacementPolicy as PolicyKind};
use crate::error::SimError;

/// Identifies a layer as another layer's downstream target.
///
/// Interpreted only by the owning [`crate::system::MemorySystem`]; a
/// `CacheLayer` never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerId {
    /// The shared-memory scratchpad layer.
    SharedMemory,
    /// The L1 cache layer.
    L1,
    /// The L2 cache layer.
    L2,
}

/// The outcome of resolving one address against a single layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The line was already resident.
    Hit,
    /// The line was not resident; a downstream layer (if any) was consulted
    /// and a victim installed.
    Miss,
}

/// A single line slot within a [`CacheSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheBlock {
    /// High-order portion of the block address.
    pub tag: u64,
    /// Whether this slot currently holds a line.
    pub valid: bool,
    /// Whether the line has been written since install; owes a writeback.
    pub dirty: bool,
    /// Tick at which this block was last touched (hit or install).
    pub last_use: u32,
    /// Number of times this block has been touched since install.
    pub access_count: u32,
}

/// One set of `A` ways, plus the monotone tick this layer's timestamps are
/// drawn from.
#[derive(Debug)]
struct CacheSet {
    blocks: Vec<CacheBlock>,
    tick: u32,
}

/// A generic set-associative cache: lookup, victim selection, install, and
/// stat accounting.
#[derive(Debug)]
pub struct CacheLayer {
    name: &'static str,
    size_bytes: usize,
    line_bytes: usize,
    ways: usize,
    latency: u64,
    next: Option<LayerId>,
    sets: Vec<CacheSet>,
    policy: Box<dyn ReplacementPolicy>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheLayer {
    /// Builds a layer from `config`, wiring `next` as its downstream target.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if associativity or line size is
    /// zero, or size is too small to hold even one line per way.
    pub fn new(
        name: &'static str,
        config: &CacheLayerConfig,
        rng_seed: u64,
        next: Option<LayerId>,
    ) -> Result<Self, SimError> {
        if config.ways == 0 {
            return Err(SimError::Configuration {
                layer: name.to_string(),
                reason: "associativity must be at least 1".to_string(),
            });
        }
        if config.line_bytes == 0 {
            return Err(SimError::Configuration {
                layer: name.to_string(),
                reason: "line size must be at least 1 byte".to_string(),
            });
        }
        if config.size_bytes < config.line_bytes * config.ways {
            return Err(SimError::Configuration {
                layer: name.to_string(),
                reason: "size must hold at least one line per way".to_string(),
            });
        }
        let num_lines = config.size_bytes / config.line_bytes;
        let num_sets = (num_lines / config.ways).max(1);

        let policy: Box<dyn ReplacementPolicy> = match config.policy {
            PolicyKind::Lru => Box::new(LruPolicy),
            PolicyKind::Lfu => Box::new(LfuPolicy),
            PolicyKind::Fifo => Box::new(FifoPolicy::new(num_sets)),
            PolicyKind::Random => Box::new(RandomPolicy::new(config.ways, rng_seed)),
        };

        let sets = (0..num_sets)
            .map(|_| CacheSet {
                blocks: vec![CacheBlock::default(); config.ways],
                tick: 0,
            })
            .collect();

        Ok(Self {
            name,
            size_bytes: config.size_bytes,
            line_bytes: config.line_bytes,
            ways: config.ways,
            latency: config.latency,
            next,
            sets,
            policy,
            hits: 0,
            misses: 0,
            evictions: 0,
        })
    }

    /// Display name, e.g. for stats output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Associativity.
    #[must_use]
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Number of sets.
    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    /// Access latency in cycles.
    #[must_use]
    pub fn latency(&self) -> u64 {
        self.latency
    }

    /// This layer's configured downstream target, if any.
    #[must_use]
    pub fn next(&self) -> Option<LayerId> {
        self.next
    }

    /// Hits recorded so far.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Misses recorded so far.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Dirty evictions recorded so far.
    #[must_use]
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Fraction of accesses that hit, in `[0, 1]`; `0.0` if there have been
    /// no accesses yet.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Fraction of accesses that missed, in `[0, 1]`; `0.0` if there have
    /// been no accesses yet.
    #[must_use]
    pub fn miss_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.misses as f64 / total as f64
        }
    }

    /// Decomposes a byte address into `(set_index, tag)`.
    #[must_use]
    pub fn decompose(&self, address: u64) -> (usize, u64) {
        let block_addr = address / self.line_bytes as u64;
        let num_sets = self.sets.len() as u64;
        let set_index = (block_addr % num_sets) as usize;
        let tag = block_addr / num_sets;
        (set_index, tag)
    }

    /// Looks up `tag` in `set_index`. On hit, updates the block's
    /// timestamp/access-count/dirty bit and the layer's hit counter. On
    /// miss, increments the miss counter. Returns the outcome; a `Miss`
    /// still needs [`CacheLayer::install_after_miss`] called once any
    /// downstream recursion has completed.
    pub fn lookup(&mut self, set_index: usize, tag: u64, kind: AccessKind) -> AccessOutcome {
        let set = &mut self.sets[set_index];
        let hit_way = set
            .blocks
            .iter()
            .position(|block| block.valid && block.tag == tag);

        if let Some(way) = hit_way {
            self.hits += 1;
            let set = &mut self.sets[set_index];
            let block = &mut set.blocks[way];
            block.last_use = set.tick;
            set.tick += 1;
            block.access_count += 1;
            if kind == AccessKind::Write {
                block.dirty = true;
            }
            AccessOutcome::Hit
        } else {
            self.misses += 1;
            AccessOutcome::Miss
        }
    }

    /// Selects a victim, counts a dirty eviction if one occurs, and installs
    /// the new line. Must run as one call with no early return between
    /// victim selection and install, or FIFO's dequeue/enqueue pairing
    /// would desync.
    pub fn install_after_miss(&mut self, set_index: usize, tag: u64, kind: AccessKind) {
        let invalid_way = self.sets[set_index]
            .blocks
            .iter()
            .position(|block| !block.valid);
        let way = invalid_way.unwrap_or_else(|| {
            self.policy
                .select_victim(set_index, &self.sets[set_index].blocks)
        });

        let was_dirty = {
            let victim = &self.sets[set_index].blocks[way];
            victim.valid && victim.dirty
        };
        if was_dirty {
            self.evictions += 1;
        }

        let set = &mut self.sets[set_index];
        let tick = set.tick;
        set.tick += 1;
        set.blocks[way] = CacheBlock {
            tag,
            valid: true,
            dirty: kind == AccessKind::Write,
            last_use: tick,
            access_count: 1,
        };

        self.policy.notify_install(set_index, way);
    }
}
