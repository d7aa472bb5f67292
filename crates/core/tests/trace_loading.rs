//! Trace file parsing tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write as _;

use cachesim_core::access::AccessKind;
use cachesim_core::error::SimError;
use cachesim_core::trace::load_trace;

fn write_trace(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn parses_reads_and_writes() {
    let file = write_trace("R 0x10 4 0 0\nW 0x20 4 1 0\n");
    let (records, summary) = load_trace(file.path()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kind, AccessKind::Read);
    assert_eq!(records[0].address, 0x10);
    assert_eq!(records[1].kind, AccessKind::Write);
    assert_eq!(records[1].address, 0x20);

    assert_eq!(summary.total, 2);
    assert_eq!(summary.reads, 1);
    assert_eq!(summary.writes, 1);
    assert_eq!(summary.min_address, 0x10);
    assert_eq!(summary.max_address, 0x20);
}

#[test]
fn blank_lines_and_comments_are_ignored() {
    let file = write_trace("# a header comment\n\nR 0x0 4 0 0\n\n# trailing comment\n");
    let (records, summary) = load_trace(file.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(summary.total, 1);
}

#[test]
fn malformed_lines_are_skipped_not_fatal() {
    // `garbage line` has no valid op, `X 0x1 4 0 0` uses an op other than
    // `R`/`W` (rejected, not treated as a read), and the last line carries
    // a trailing extra field. Only the plain `R 0x0 4 0 0` line is
    // well-formed.
    let file = write_trace("garbage line\nR 0x0 4 0 0\nX 0x1 4 0 0\nR 0x4 4 0 0 extra_field\n");
    let (records, summary) = load_trace(file.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(summary.total, 1);
}

#[test]
fn empty_trace_is_an_error() {
    let file = write_trace("# nothing here\n\n");
    let err = load_trace(file.path()).unwrap_err();
    assert!(matches!(err, SimError::EmptyTrace { .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_trace(std::path::Path::new("/no/such/trace/file.txt")).unwrap_err();
    assert!(matches!(err, SimError::Io { .. }));
}

#[test]
fn address_range_spans_min_and_max() {
    let file = write_trace("R 0x100 4 0 0\nR 0x10 4 0 0\nW 0x1000 4 0 0\n");
    let (_, summary) = load_trace(file.path()).unwrap();
    assert_eq!(summary.min_address, 0x10);
    assert_eq!(summary.max_address, 0x1000);
}
