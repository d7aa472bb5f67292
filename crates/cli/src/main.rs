//! Trace-driven GPU memory-hierarchy simulator CLI.
//!
//! Takes a single positional argument — the path to a trace file — loads
//! it, replays it against the default hierarchy, and prints a summary and
//! final statistics. No flags beyond the trace path; verbosity is
//! controlled by `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use cachesim_core::config::MemorySystemConfig;
use cachesim_core::error::SimError;
use cachesim_core::stats::{print_system_stats, print_trace_summary};
use cachesim_core::system::MemorySystem;
use cachesim_core::trace::load_trace;
use cachesim_core::MemoryAccess;

/// Trace-driven simulator for GPU-style memory hierarchies.
#[derive(Parser, Debug)]
#[command(name = "cachesim", author, version, about)]
struct Cli {
    /// Path to the trace file to replay.
    trace_path: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(&cli.trace_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(trace_path: &std::path::Path) -> Result<(), SimError> {
    println!("GPU Cache & Memory Hierarchy Simulator");
    println!("======================================\n");

    let (records, summary) = load_trace(trace_path)?;

    println!(
        "Loaded {} memory accesses from {}",
        summary.total,
        trace_path.display()
    );
    print_trace_summary(&summary);

    let mut system = MemorySystem::new(MemorySystemConfig::default())?;

    println!("Running simulation...");

    for (i, record) in records.iter().enumerate() {
        let access = MemoryAccess {
            address: record.address,
            kind: record.kind,
            thread_id: record.thread_id,
            block_id: record.block_id,
        };
        let _ = system.access(access);

        if (i + 1) % 100 == 0 {
            info!(processed = i + 1, total = records.len(), "progress");
        }
    }

    println!("\nSimulation completed\n");
    print_system_stats(&system);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn empty_trace_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing but a comment").unwrap();
        let err = run(file.path()).unwrap_err();
        assert!(matches!(err, SimError::EmptyTrace { .. }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = run(std::path::Path::new("/nonexistent/trace.txt")).unwrap_err();
        assert!(matches!(err, SimError::Io { .. }));
    }

    #[test]
    fn small_trace_runs_to_completion() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "R 0 4 0 0").unwrap();
        writeln!(file, "W 40 4 0 0").unwrap();
        run(file.path()).unwrap();
    }
}
