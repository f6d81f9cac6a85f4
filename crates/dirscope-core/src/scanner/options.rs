/// Tunables for a single scan.

/// How a scan walks the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Descend through symlinks to directories. Off by default: links are
    /// then listed as plain entries with their own metadata.
    pub follow_links: bool,

    /// Worker threads in jwalk's private rayon pool. Clamped to at least 1.
    pub threads: usize,

    /// Emit a progress update every this many entries (background scans only).
    pub progress_interval: u64,

    /// Capacity of the background scan's progress channel. Zero makes every
    /// send a rendezvous with the reader.
    pub progress_capacity: usize,
}

/// Progress cadence used by [`ScanOptions::default`].
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000;

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_links: false,
            threads: num_cpus::get(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            progress_capacity: crate::scanner::PROGRESS_CHANNEL_CAPACITY,
        }
    }
}

impl ScanOptions {
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn progress_interval(mut self, every: u64) -> Self {
        self.progress_interval = every;
        self
    }

    pub fn progress_capacity(mut self, capacity: usize) -> Self {
        self.progress_capacity = capacity;
        self
    }

    pub(crate) fn effective_threads(&self) -> usize {
        self.threads.max(1)
    }
}
