/// The immutable snapshot produced by one scan, and the single-pass fold that
/// builds it.
use super::entry::Entry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Aggregated output of one directory scan.
///
/// `total_count == files.len()` and `total_size` is the sum of `size` over
/// non-directory entries. Construct through [`Aggregator`] or `collect()` so
/// the totals always agree with `files`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Every object under the root, excluding the root itself.
    pub files: Vec<Entry>,
    pub total_count: usize,
    pub total_size: u64,
}

impl ScanResult {
    /// Number of directory entries.
    pub fn directory_count(&self) -> usize {
        self.files.iter().filter(|e| e.is_directory).count()
    }

    /// Number of non-directory entries.
    pub fn file_count(&self) -> usize {
        self.total_count - self.directory_count()
    }

    /// Entries in display order: directories first, then case-insensitive
    /// by name, full path as the final tie-break.
    pub fn sorted_for_display(&self) -> Vec<&Entry> {
        let mut sorted: Vec<&Entry> = self.files.iter().collect();
        sorted.sort_by(|a, b| display_order(a, b));
        sorted
    }
}

fn display_order(a: &Entry, b: &Entry) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.path.cmp(&b.path))
}

/// One-pass fold of classified entries into a [`ScanResult`].
///
/// Count and size are plain sums, so the order entries arrive in has no
/// effect on the totals.
#[derive(Debug, Default)]
pub struct Aggregator {
    files: Vec<Entry>,
    total_size: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            files: Vec::with_capacity(capacity),
            total_size: 0,
        }
    }

    #[inline]
    pub fn add(&mut self, entry: Entry) {
        if !entry.is_directory {
            self.total_size += entry.size;
        }
        self.files.push(entry);
    }

    pub fn finish(self) -> ScanResult {
        ScanResult {
            total_count: self.files.len(),
            total_size: self.total_size,
            files: self.files,
        }
    }
}

impl Extend<Entry> for Aggregator {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        for entry in iter {
            self.add(entry);
        }
    }
}

impl FromIterator<Entry> for ScanResult {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut agg = Aggregator::with_capacity(iter.size_hint().0);
        agg.extend(iter);
        agg.finish()
    }
}
