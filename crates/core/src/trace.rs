//! Trace file loading.
//!
//! Format: ASCII, one access per line, `#`-prefixed or empty lines ignored.
//! A data line is `<op> <hex-address> <decimal-size> <decimal-thread-id>
//! <decimal-block-id>`, `<op>` being a single `R` or `W`. A line that
//! doesn't parse as all five fields is skipped with a warning; it does not
//! abort loading.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::access::AccessKind;
use crate::error::SimError;

/// One parsed trace line, prior to thread/block id reduction (the owning
/// [`crate::system::MemorySystem`] reduces those modulo its configured
/// bounds at access time).
#[derive(Debug, Clone, Copy)]
pub struct TraceRecord {
    /// Read or write.
    pub kind: AccessKind,
    /// Byte address.
    pub address: u64,
    /// Access size in bytes, as recorded in the trace. Unused by routing —
    /// the hierarchy operates on fixed-size lines, not per-access sizes.
    pub size: u32,
    /// Raw thread id, not yet reduced.
    pub thread_id: u32,
    /// Raw block id, not yet reduced.
    pub block_id: u32,
}

/// Summary statistics over a loaded trace.
#[derive(Debug, Clone, Copy)]
pub struct TraceSummary {
    /// Number of valid records.
    pub total: usize,
    /// Number of reads.
    pub reads: usize,
    /// Number of writes.
    pub writes: usize,
    /// Lowest address seen.
    pub min_address: u64,
    /// Highest address seen.
    pub max_address: u64,
}

impl TraceSummary {
    fn from_records(records: &[TraceRecord]) -> Option<Self> {
        let first = records.first()?;
        let mut reads = 0;
        let mut writes = 0;
        let mut min_address = first.address;
        let mut max_address = first.address;

        for record in records {
            match record.kind {
                AccessKind::Read => reads += 1,
                AccessKind::Write => writes += 1,
            }
            min_address = min_address.min(record.address);
            max_address = max_address.max(record.address);
        }

        Some(Self {
            total: records.len(),
            reads,
            writes,
            min_address,
            max_address,
        })
    }
}

/// Loads and parses a trace file.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be read, or
/// [`SimError::EmptyTrace`] if it contains no lines that parse as a valid
/// access.
pub fn load_trace(path: &Path) -> Result<(Vec<TraceRecord>, TraceSummary), SimError> {
    let contents = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Some(record) => records.push(record),
            None => warn!(line = line_no + 1, %line, "skipped malformed trace line"),
        }
    }

    let summary = TraceSummary::from_records(&records).ok_or_else(|| SimError::EmptyTrace {
        path: path.to_path_buf(),
    })?;

    Ok((records, summary))
}

fn parse_line(line: &str) -> Option<TraceRecord> {
    let mut fields = line.split_whitespace();

    let op = fields.next()?;
    let kind = match op {
        "R" => AccessKind::Read,
        "W" => AccessKind::Write,
        _ => return None,
    };

    let address_field = fields.next()?;
    let address_digits = address_field
        .strip_prefix("0x")
        .or_else(|| address_field.strip_prefix("0X"))
        .unwrap_or(address_field);
    let address = u64::from_str_radix(address_digits, 16).ok()?;
    let size = fields.next()?.parse().ok()?;
    let thread_id = fields.next()?.parse().ok()?;
    let block_id = fields.next()?.parse().ok()?;

    if fields.next().is_some() {
        return None;
    }

    Some(TraceRecord {
        kind,
        address,
        size,
        thread_id,
        block_id,
    })
}
