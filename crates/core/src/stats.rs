//! Human-readable reporting of trace and hierarchy statistics.

use crate::cache::CacheLayer;
use crate::system::MemorySystem;
use crate::trace::TraceSummary;

/// Prints the post-load trace summary: counts, read/write split, address
/// range.
pub fn print_trace_summary(summary: &TraceSummary) {
    println!("Memory Trace Summary:");
    println!("  Total Accesses: {}", summary.total);
    println!(
        "  Reads: {} ({:.1}%)",
        summary.reads,
        summary.reads as f64 / summary.total as f64 * 100.0
    );
    println!(
        "  Writes: {} ({:.1}%)",
        summary.writes,
        summary.writes as f64 / summary.total as f64 * 100.0
    );
    println!(
        "  Address Range: {:#x} - {:#x}",
        summary.min_address, summary.max_address
    );
    println!();
}

/// Prints one cache layer's statistics block.
pub fn print_layer_stats(layer: &CacheLayer) {
    println!("{} Statistics:", layer.name());
    println!(
        "  Size: {} KiB, Associativity: {}, Sets: {}",
        layer.size_bytes() / 1024,
        layer.ways(),
        layer.num_sets()
    );
    println!("  Hits: {}, Misses: {}", layer.hits(), layer.misses());
    println!("  Hit Rate:  {:.2}%", layer.hit_rate() * 100.0);
    println!("  Miss Rate: {:.2}%", layer.miss_rate() * 100.0);
    println!("  Evictions: {}", layer.evictions());
    println!("  Latency: {} cycles", layer.latency());
    println!();
}

/// Prints the full hierarchy report: totals followed by a block per layer.
pub fn print_system_stats(system: &MemorySystem) {
    println!();
    println!("GPU Cache & Memory Hierarchy Statistics");
    println!("=======================================");
    println!("Total Memory Accesses: {}", system.total_accesses());
    println!("Total Simulation Cycles: {}", system.cycles());
    println!("Register Hits: {}", system.register_hits());
    println!(
        "Global Memory Accesses (L2 Misses): {}",
        system.global_memory_accesses()
    );
    println!();

    print_layer_stats(system.shared_memory());
    print_layer_stats(system.l1());
    print_layer_stats(system.l2());

    if system.total_accesses() > 0 {
        let avg = system.cycles() as f64 / system.total_accesses() as f64;
        println!("Average Memory Access Time: {avg:.2} cycles");
    }
}
