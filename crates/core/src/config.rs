//! Hierarchy configuration: per-layer geometry, replacement policy choice,
//! and the fixed defaults for the register / shared-memory / L1 / L2 /
//! global-memory hierarchy.

use serde::Deserialize;

/// Default configuration constants for the memory hierarchy.
///
/// These are the fixed geometry fixed by the reference implementation;
/// `MemorySystemConfig::default()` is built entirely from this module so the
/// numbers are named once rather than scattered as inline literals.
pub mod defaults {
    /// Registers per thread (each register is 4 bytes).
    pub const REGISTERS_PER_THREAD: u32 = 256;
    /// Bytes per register.
    pub const REGISTER_BYTES: u32 = 4;
    /// Register-file access latency in cycles.
    pub const REGISTER_LATENCY: u64 = 1;

    /// Upper bound on distinct thread ids; ids are reduced modulo this.
    pub const MAX_THREADS: u32 = 1024;
    /// Upper bound on distinct thread-block ids; ids are reduced modulo this.
    pub const MAX_BLOCKS: u32 = 32;

    /// Cache line size shared by shared memory, L1, and L2 (bytes).
    pub const CACHE_LINE_BYTES: usize = 128;

    /// Shared-memory (scratchpad) total size in bytes.
    pub const SHARED_MEMORY_SIZE: usize = 64 * 1024;
    /// Shared-memory associativity (direct-mapped).
    pub const SHARED_MEMORY_WAYS: usize = 1;
    /// Shared-memory access latency in cycles.
    pub const SHARED_MEMORY_LATENCY: u64 = 20;

    /// L1 cache total size in bytes.
    pub const L1_SIZE: usize = 64 * 1024;
    /// L1 associativity.
    pub const L1_WAYS: usize = 4;
    /// L1 access latency in cycles.
    pub const L1_LATENCY: u64 = 30;

    /// L2 cache total size in bytes.
    pub const L2_SIZE: usize = 4 * 1024 * 1024;
    /// L2 associativity.
    pub const L2_WAYS: usize = 16;
    /// L2 access latency in cycles.
    pub const L2_LATENCY: u64 = 200;

    /// Global memory size in bytes (an address bound only; contents are
    /// never observed, so no buffer of this size is allocated).
    pub const GLOBAL_MEMORY_SIZE: u64 = 1024 * 1024 * 1024;
    /// Global memory access latency in cycles.
    pub const GLOBAL_MEMORY_LATENCY: u64 = 400;

    /// Seed for the deterministic pseudo-random source backing `RANDOM`
    /// replacement.
    pub const RNG_SEED: u64 = 123_456_789;
}

/// Cache replacement policy.
///
/// `Deserialize` is derived for forward compatibility with a configuration
/// file even though the CLI only ever constructs `MemorySystemConfig::default()`
/// — the hierarchy geometry itself takes no command-line flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Least-recently-used: evict the block with the smallest last-use
    /// timestamp, ties broken by lowest index.
    #[default]
    Lru,
    /// First-in-first-out: evict the block installed earliest among those
    /// not yet evicted.
    Fifo,
    /// Least-frequently-used: evict the block with the smallest access
    /// count, ties broken by lowest index.
    Lfu,
    /// Uniformly random, drawn from a deterministic seeded source.
    Random,
}

/// Geometry and policy for one cache layer.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheLayerConfig {
    /// Total size in bytes.
    pub size_bytes: usize,
    /// Line size in bytes.
    pub line_bytes: usize,
    /// Associativity (ways per set).
    pub ways: usize,
    /// Replacement policy.
    pub policy: ReplacementPolicy,
    /// Access latency in cycles.
    pub latency: u64,
}

/// Root configuration for the fixed memory hierarchy.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::MemorySystemConfig;
///
/// let config = MemorySystemConfig::default();
/// assert_eq!(config.l1.ways, 4);
/// assert_eq!(config.l2.latency, 200);
/// ```
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MemorySystemConfig {
    /// Registers per thread.
    pub registers_per_thread: u32,
    /// Bytes per register.
    pub register_bytes: u32,
    /// Register-file access latency.
    pub register_latency: u64,
    /// Thread id modulus.
    pub max_threads: u32,
    /// Thread-block id modulus.
    pub max_blocks: u32,
    /// Shared-memory (scratchpad) layer geometry.
    pub shared_memory: CacheLayerConfig,
    /// L1 cache geometry.
    pub l1: CacheLayerConfig,
    /// L2 cache geometry.
    pub l2: CacheLayerConfig,
    /// Global-memory address bound.
    pub global_memory_size: u64,
    /// Global-memory access latency.
    pub global_memory_latency: u64,
    /// Seed for the deterministic pseudo-random source.
    pub rng_seed: u64,
}

impl Default for MemorySystemConfig {
    fn default() -> Self {
        Self {
            registers_per_thread: defaults::REGISTERS_PER_THREAD,
            register_bytes: defaults::REGISTER_BYTES,
            register_latency: defaults::REGISTER_LATENCY,
            max_threads: defaults::MAX_THREADS,
            max_blocks: defaults::MAX_BLOCKS,
            shared_memory: CacheLayerConfig {
                size_bytes: defaults::SHARED_MEMORY_SIZE,
                line_bytes: defaults::CACHE_LINE_BYTES,
                ways: defaults::SHARED_MEMORY_WAYS,
                policy: ReplacementPolicy::Random,
                latency: defaults::SHARED_MEMORY_LATENCY,
            },
            l1: CacheLayerConfig {
                size_bytes: defaults::L1_SIZE,
                line_bytes: defaults::CACHE_LINE_BYTES,
                ways: defaults::L1_WAYS,
                policy: ReplacementPolicy::Lru,
                latency: defaults::L1_LATENCY,
            },
            l2: CacheLayerConfig {
                size_bytes: defaults::L2_SIZE,
                line_bytes: defaults::CACHE_LINE_BYTES,
                ways: defaults::L2_WAYS,
                policy: ReplacementPolicy::Lru,
                latency: defaults::L2_LATENCY,
            },
            global_memory_size: defaults::GLOBAL_MEMORY_SIZE,
            global_memory_latency: defaults::GLOBAL_MEMORY_LATENCY,
            rng_seed: defaults::RNG_SEED,
        }
    }
}
