/// Scan progress reporting — lightweight messages sent from the scan
/// thread to the caller via a crossbeam channel.
use crate::error::SkippedEntry;
use std::time::Duration;

/// Progress updates sent from a background scan.
///
/// The finished result is returned by `ScanHandle::wait`; these messages
/// carry only counters and status flags.
#[derive(Debug)]
pub enum ScanProgress {
    /// Periodic update with running totals.
    Update {
        entries_found: u64,
        bytes_found: u64,
        current_path: String,
    },
    /// A child was left out (e.g. permission denied on one file).
    Skipped(SkippedEntry),
    /// Scanning completed successfully.
    Complete {
        total_count: usize,
        total_size: u64,
        skipped: usize,
        duration: Duration,
    },
    /// Scan was cancelled through its handle.
    Cancelled,
    /// The root could not be scanned.
    Failed { message: String },
}
