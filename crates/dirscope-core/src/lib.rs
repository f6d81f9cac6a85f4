/// dirscope Core — directory scanning, classification, and aggregation.
///
/// This crate contains all scanning logic with zero UI dependencies. The
/// folder picker and the table renderer live with the caller; they hand in a
/// path and format the returned [`model::ScanResult`].
///
/// # Modules
///
/// - [`model`] — Entry records, the aggregated scan result, display formatting.
/// - [`scanner`] — Failure-tolerant parallel walk, blocking and background.
/// - [`analysis`] — Extension classifier and per-category breakdown.
/// - [`error`] — Fatal scan errors and non-fatal skipped entries.
pub mod analysis;
pub mod error;
pub mod model;
pub mod scanner;

pub use error::{ScanError, SkipReason, SkippedEntry};
pub use model::{Entry, ScanResult};
pub use scanner::{scan, scan_directory, scan_with, start_scan, ScanOptions, ScanOutcome};
