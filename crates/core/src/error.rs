//! Error taxonomy for the simulator.
//!
//! Configuration and I/O failures are fatal and surfaced as [`SimError`].
//! Malformed trace lines are not: they are reported as `tracing` warnings
//! and otherwise skipped, never raised as an error, since a simulator that
//! aborted on one bad line in a million-line trace would not match the
//! reference's behaviour.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that can prevent a simulation from starting or completing.
#[derive(Debug, Error)]
pub enum SimError {
    /// A cache layer was configured with impossible geometry (zero
    /// associativity, zero line size, or a size that cannot hold at least
    /// one line per way).
    #[error("invalid geometry for cache layer `{layer}`: {reason}")]
    Configuration {
        /// The layer's display name.
        layer: String,
        /// What about the geometry was invalid.
        reason: String,
    },

    /// The trace file could not be opened or read.
    #[error("failed to read trace file `{path}`: {source}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The trace file contained no lines that parsed as a valid access.
    #[error("trace file `{path}` contains no valid access lines")]
    EmptyTrace {
        /// Path of the offending file.
        path: PathBuf,
    },
}
