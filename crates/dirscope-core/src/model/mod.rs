/// Data model for dirscope scans.
///
/// Re-exports the entry record, the aggregated scan result, and the display
/// formatting helpers.
pub mod entry;
pub mod scan_result;
pub mod size;

pub use entry::Entry;
pub use scan_result::{Aggregator, ScanResult};
