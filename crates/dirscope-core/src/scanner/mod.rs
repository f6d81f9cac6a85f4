/// Scanner module — turns a directory path into a [`ScanResult`].
///
/// Two ways in:
/// - **Blocking:** [`scan_directory`] / [`scan`] / [`scan_with`] walk the tree
///   on the calling thread's behalf and return one immutable snapshot.
/// - **Background:** [`start_scan`] runs the same walk on a named thread and
///   hands back a [`ScanHandle`] for progress, cancellation, and the result.
///
/// Either way directories are read by jwalk on a private rayon pool and the
/// totals are folded in as entries come back.
pub mod options;
pub mod progress;
mod walker;

pub use options::ScanOptions;
pub use progress::ScanProgress;

use crate::error::{ScanError, SkippedEntry};
use crate::model::ScanResult;
use crossbeam_channel::{Receiver, Sender};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;
use walker::Walker;

/// Default number of progress messages that may queue up in the channel.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// How long the scan thread waits on a full progress channel before dropping
/// the message. A consumer that stops reading, or keeps a cloned receiver
/// alive after [`ScanHandle::wait`], only loses progress detail and slows the
/// scan down; it can never hang it.
pub const PROGRESS_SEND_TIMEOUT: Duration = Duration::from_millis(100);

/// Everything a scan produces: the result plus what had to be left out.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub result: ScanResult,
    /// Children that could not be read, sorted by path.
    pub skipped: Vec<SkippedEntry>,
    pub duration: Duration,
}

/// Scan the directory at `path` with default options.
///
/// This is the boundary the surrounding application calls.
pub fn scan_directory(path: &str) -> Result<ScanResult, ScanError> {
    scan(Path::new(path))
}

/// Scan `root` with default options and no way to cancel.
pub fn scan(root: &Path) -> Result<ScanResult, ScanError> {
    let cancel_flag = AtomicBool::new(false);
    scan_with(root, &ScanOptions::default(), &cancel_flag).map(|outcome| outcome.result)
}

/// Scan `root` with explicit options.
///
/// Setting `cancel_flag` from another thread stops the walk; the call then
/// returns [`ScanError::Cancelled`] and no partial result.
pub fn scan_with(
    root: &Path,
    options: &ScanOptions,
    cancel_flag: &AtomicBool,
) -> Result<ScanOutcome, ScanError> {
    run_scan(root, options, cancel_flag, None)
}

fn run_scan(
    root: &Path,
    options: &ScanOptions,
    cancel_flag: &AtomicBool,
    progress_tx: Option<&Sender<ScanProgress>>,
) -> Result<ScanOutcome, ScanError> {
    let start = Instant::now();
    let root = resolve_root(root)?;
    info!("Starting scan of {}", root.display());

    let mut walker = Walker::new(options, cancel_flag, progress_tx);
    let result = match walker.walk(&root) {
        Ok(result) => result,
        Err(err) => {
            info!("Scan of {} stopped: {err}", root.display());
            return Err(err);
        }
    };

    let skipped = walker.into_skipped();
    let duration = start.elapsed();
    info!(
        "Scan complete: {} entries, {} bytes, {} skipped in {:?}",
        result.total_count,
        result.total_size,
        skipped.len(),
        duration
    );

    Ok(ScanOutcome {
        result,
        skipped,
        duration,
    })
}

/// Make `root` absolute and check it names a directory.
fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let root = std::path::absolute(root).map_err(|err| ScanError::from_io(root, err))?;
    let meta = fs::metadata(&root).map_err(|err| ScanError::from_io(&root, err))?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory { path: root });
    }
    Ok(root)
}

/// Handle to a running or completed background scan. Allows cancellation,
/// receiving progress updates, and collecting the result.
pub struct ScanHandle {
    /// Receiver for progress updates from the scan thread.
    ///
    /// Clones may outlive [`ScanHandle::wait`]; sends into a channel nobody
    /// drains give up after [`PROGRESS_SEND_TIMEOUT`].
    pub progress_rx: Receiver<ScanProgress>,
    /// Flag to request cancellation.
    cancel_flag: Arc<AtomicBool>,
    thread: thread::JoinHandle<Result<ScanOutcome, ScanError>>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// Block until the scan finishes and return its outcome.
    ///
    /// Drops this handle's progress receiver first so pending sends fail
    /// at once instead of waiting out their timeout.
    pub fn wait(self) -> Result<ScanOutcome, ScanError> {
        let ScanHandle {
            progress_rx,
            thread,
            ..
        } = self;
        drop(progress_rx);
        match thread.join() {
            Ok(outcome) => outcome,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Start a new scan on a background thread.
///
/// Returns a `ScanHandle` for receiving progress, requesting cancellation,
/// and waiting for the outcome. Exactly one terminal message (`Complete`,
/// `Cancelled`, or `Failed`) is sent while a receiver is alive and has room
/// for it within [`PROGRESS_SEND_TIMEOUT`].
pub fn start_scan(root_path: PathBuf, options: ScanOptions) -> io::Result<ScanHandle> {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(options.progress_capacity);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();

    let thread = thread::Builder::new()
        .name("dirscope-scanner".into())
        .spawn(move || {
            let outcome = run_scan(&root_path, &options, &cancel_clone, Some(&progress_tx));
            let terminal = match &outcome {
                Ok(o) => ScanProgress::Complete {
                    total_count: o.result.total_count,
                    total_size: o.result.total_size,
                    skipped: o.skipped.len(),
                    duration: o.duration,
                },
                Err(ScanError::Cancelled) => ScanProgress::Cancelled,
                Err(err) => ScanProgress::Failed {
                    message: err.to_string(),
                },
            };
            let _ = progress_tx.send_timeout(terminal, PROGRESS_SEND_TIMEOUT);
            outcome
        })?;

    Ok(ScanHandle {
        progress_rx,
        cancel_flag,
        thread,
    })
}
