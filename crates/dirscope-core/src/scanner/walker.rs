/// Failure-tolerant parallel directory walker built on `jwalk`.
///
/// jwalk reads directories on a rayon pool and hands entries back in
/// depth-first order with every directory's children sorted by name, so the
/// output is the same for an unchanged tree no matter how the reads were
/// scheduled:
///
/// ```text
/// a.txt, b, b/inner, b/inner/y.rs, b/x.rs, c.txt, d, d/z.png
/// ```
///
/// A child that cannot be read is recorded as a [`SkippedEntry`] and left
/// out; it never fails the walk. Only the root listing and cancellation
/// produce an `Err`.
use crate::error::{ScanError, SkippedEntry};
use crate::model::{Aggregator, Entry, ScanResult};
use crate::scanner::options::ScanOptions;
use crate::scanner::progress::ScanProgress;
use crate::scanner::PROGRESS_SEND_TIMEOUT;
use crossbeam_channel::Sender;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Canonical directories on the current descent path. Only filled in when
/// links are followed; without following, the tree cannot loop.
type Ancestors = Vec<PathBuf>;

/// Set on a followed link whose target is one of its own ancestors.
type LinksToAncestor = bool;

type WalkState = (Ancestors, LinksToAncestor);
type WalkEntry = jwalk::DirEntry<WalkState>;

pub(crate) struct Walker<'a> {
    options: &'a ScanOptions,
    cancel_flag: &'a AtomicBool,
    progress_tx: Option<&'a Sender<ScanProgress>>,
    skipped: Vec<SkippedEntry>,
    entries_found: u64,
    bytes_found: u64,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        options: &'a ScanOptions,
        cancel_flag: &'a AtomicBool,
        progress_tx: Option<&'a Sender<ScanProgress>>,
    ) -> Self {
        Self {
            options,
            cancel_flag,
            progress_tx,
            skipped: Vec::new(),
            entries_found: 0,
            bytes_found: 0,
        }
    }

    /// Walk everything below `root` and fold it into a result. The root
    /// itself is not part of the output.
    pub(crate) fn walk(&mut self, root: &Path) -> Result<ScanResult, ScanError> {
        self.check_cancel()?;
        // jwalk reports an unreadable root as just another entry error; the
        // root is the one place where that has to be fatal.
        fs::read_dir(root).map_err(|err| ScanError::from_io(root, err))?;

        let follow_links = self.options.follow_links;
        let walk_dir = jwalk::WalkDirGeneric::<WalkState>::new(root)
            .sort(true)
            .skip_hidden(false)
            .follow_links(follow_links)
            .parallelism(jwalk::Parallelism::RayonNewPool(
                self.options.effective_threads(),
            ))
            .process_read_dir(move |depth, dir, ancestors, children| {
                prune_children(follow_links, depth, dir, ancestors, children);
            });

        let mut aggregator = Aggregator::new();
        for entry_result in walk_dir {
            self.check_cancel()?;

            let dir_entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    if self.skipped.iter().any(|s| s.path == path) {
                        continue;
                    }
                    match err.io_error() {
                        Some(io_err) => self.skip(SkippedEntry::from_io(&path, io_err)),
                        // Not an I/O failure: jwalk's own loop detection.
                        None => {
                            if let Some(entry) = self.visit_cycle(&path) {
                                aggregator.add(entry);
                            }
                        }
                    }
                    continue;
                }
            };

            // The root itself is not listed.
            if dir_entry.depth == 0 {
                continue;
            }
            if let Some(entry) = self.visit(&dir_entry) {
                aggregator.add(entry);
            }
        }

        Ok(aggregator.finish())
    }

    /// Skipped entries recorded during the walk, sorted by path.
    pub(crate) fn into_skipped(self) -> Vec<SkippedEntry> {
        let mut skipped = self.skipped;
        skipped.sort_by(|a, b| a.path.cmp(&b.path));
        skipped
    }

    fn check_cancel(&self) -> Result<(), ScanError> {
        if self.cancel_flag.load(Ordering::Relaxed) {
            Err(ScanError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Read one child's metadata. `None` when it has to be skipped.
    fn visit(&mut self, dir_entry: &WalkEntry) -> Option<Entry> {
        let path = dir_entry.path();
        let Some(name) = dir_entry.file_name.to_str() else {
            self.skip(SkippedEntry::invalid_name(&path));
            return None;
        };

        let entry = match self.read_entry(name, &path) {
            Ok(e) => e,
            Err(err) => {
                self.skip(SkippedEntry::from_io(&path, &err));
                return None;
            }
        };

        // The directory itself is listed; only its contents are lost.
        if let Some(io_err) = dir_entry
            .read_children_error
            .as_ref()
            .and_then(|err| err.io_error())
        {
            self.skip(SkippedEntry::from_io(&path, io_err));
        }
        if dir_entry.client_state {
            let target = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            self.skip(SkippedEntry::symlink_cycle(&path, &target));
        }
        self.record_progress(&entry);
        Some(entry)
    }

    /// A link jwalk refused to descend. It is still listed; only its
    /// contents are left out.
    fn visit_cycle(&mut self, path: &Path) -> Option<Entry> {
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.skip(SkippedEntry::symlink_cycle(path, &target));

        let name = path.file_name()?.to_str()?;
        let entry = self.read_entry(name, path).ok()?;
        self.record_progress(&entry);
        Some(entry)
    }

    fn read_entry(&self, name: &str, path: &Path) -> std::io::Result<Entry> {
        let meta = if self.options.follow_links {
            fs::metadata(path)
        } else {
            // Does not traverse symlinks.
            fs::symlink_metadata(path)
        }?;
        Entry::from_metadata(name, path, &meta)
    }

    fn skip(&mut self, skipped: SkippedEntry) {
        debug!(
            "Skipping {}: {:?} ({})",
            skipped.path.display(),
            skipped.reason,
            skipped.message
        );
        if let Some(tx) = self.progress_tx {
            let _ = tx.send_timeout(
                ScanProgress::Skipped(skipped.clone()),
                PROGRESS_SEND_TIMEOUT,
            );
        }
        self.skipped.push(skipped);
    }

    fn record_progress(&mut self, entry: &Entry) {
        self.entries_found += 1;
        if !entry.is_directory {
            self.bytes_found += entry.size;
        }

        let Some(tx) = self.progress_tx else {
            return;
        };
        let every = self.options.progress_interval;
        if every > 0 && self.entries_found.is_multiple_of(every) {
            // A full channel stalls the walk briefly; after the timeout the
            // update is dropped.
            let _ = tx.send_timeout(
                ScanProgress::Update {
                    entries_found: self.entries_found,
                    bytes_found: self.bytes_found,
                    current_path: entry.path.clone(),
                },
                PROGRESS_SEND_TIMEOUT,
            );
        }
    }
}

/// Runs on jwalk's workers once per directory read, before any child
/// directory is queued.
///
/// Children are never descended when their name is not valid UTF-8, since
/// every path below them would have to be rendered lossily. In follow mode a
/// child directory that resolves to a directory already on the descent path
/// is flagged and not descended; siblings sharing one target are both read.
fn prune_children(
    follow_links: bool,
    depth: Option<usize>,
    dir: &Path,
    ancestors: &mut Ancestors,
    children: &mut [Result<WalkEntry, jwalk::Error>],
) {
    // `None` is the synthetic read that yields the root entry itself.
    if follow_links && depth.is_some() {
        if let Ok(canonical) = fs::canonicalize(dir) {
            ancestors.push(canonical);
        }
    }

    for child in children.iter_mut().flatten() {
        // The root is always descended.
        if child.depth == 0 || child.read_children_path.is_none() {
            continue;
        }
        if child.file_name.to_str().is_none() {
            child.read_children_path = None;
            continue;
        }
        if follow_links {
            if let Ok(target) = fs::canonicalize(child.path()) {
                if ancestors.contains(&target) {
                    child.read_children_path = None;
                    child.client_state = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkipReason;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_bytes(path: &Path, n: usize) {
        let mut f = fs::File::create(path).unwrap();
        f.write_all(&vec![0u8; n]).unwrap();
    }

    fn walk(root: &Path, options: &ScanOptions) -> (Vec<Entry>, Vec<SkippedEntry>) {
        let cancel = AtomicBool::new(false);
        let mut walker = Walker::new(options, &cancel, None);
        let result = walker.walk(root).unwrap();
        (result.files, walker.into_skipped())
    }

    fn rel_paths(root: &Path, entries: &[Entry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| {
                Path::new(&e.path)
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    /// Depth first, each directory's children in name order.
    #[test]
    fn walks_depth_first_in_name_order() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::create_dir_all(root.join("d")).unwrap();
        write_bytes(&root.join("a.txt"), 1);
        write_bytes(&root.join("c.txt"), 1);
        write_bytes(&root.join("b/x.rs"), 1);
        write_bytes(&root.join("b/inner/y.rs"), 1);
        write_bytes(&root.join("d/z.png"), 1);

        let (entries, skipped) = walk(root, &ScanOptions::default());
        assert!(skipped.is_empty());
        assert_eq!(
            rel_paths(root, &entries),
            vec![
                "a.txt",
                "b",
                "b/inner",
                "b/inner/y.rs",
                "b/x.rs",
                "c.txt",
                "d",
                "d/z.png",
            ]
        );
    }

    #[test]
    fn single_thread_gives_same_order() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        for d in ["p", "q", "r"] {
            fs::create_dir(root.join(d)).unwrap();
            for f in ["1.txt", "2.txt"] {
                write_bytes(&root.join(d).join(f), 3);
            }
        }

        let (a, _) = walk(root, &ScanOptions::default().threads(1));
        let (b, _) = walk(root, &ScanOptions::default().threads(4));
        assert_eq!(rel_paths(root, &a), rel_paths(root, &b));
    }

    #[test]
    fn cancelled_flag_stops_walk() {
        let tmp = TempDir::new().unwrap();
        write_bytes(&tmp.path().join("a.txt"), 1);

        let cancel = AtomicBool::new(true);
        let opts = ScanOptions::default();
        let mut walker = Walker::new(&opts, &cancel, None);
        assert!(matches!(walker.walk(tmp.path()), Err(ScanError::Cancelled)));
    }

    /// The flag is raised after the walk has produced its first entry. A
    /// rendezvous channel keeps the walk from running ahead of the test.
    #[test]
    fn cancel_during_walk_discards_partial_result() {
        let tmp = TempDir::new().unwrap();
        for i in 0..40 {
            write_bytes(&tmp.path().join(format!("f{i:02}.txt")), 1);
        }

        let cancel = AtomicBool::new(false);
        let opts = ScanOptions::default().progress_interval(1);
        let (tx, rx) = crossbeam_channel::bounded(0);

        let outcome = std::thread::scope(|s| {
            let walk = s.spawn(|| {
                let mut walker = Walker::new(&opts, &cancel, Some(&tx));
                walker.walk(tmp.path())
            });

            let first = rx.recv().unwrap();
            assert!(matches!(first, ScanProgress::Update { .. }));
            cancel.store(true, Ordering::Relaxed);
            // Unblock any send still in flight.
            while !walk.is_finished() {
                let _ = rx.recv_timeout(std::time::Duration::from_millis(10));
            }
            walk.join().unwrap()
        });

        assert!(matches!(outcome, Err(ScanError::Cancelled)));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_is_listed_not_followed_by_default() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("real")).unwrap();
        write_bytes(&root.join("real/f.txt"), 5);
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

        let (entries, _) = walk(root, &ScanOptions::default());
        let link = entries.iter().find(|e| e.name == "link").unwrap();
        assert!(!link.is_directory);
        assert_eq!(
            rel_paths(root, &entries),
            vec!["link", "real", "real/f.txt"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn followed_cycle_is_cut_at_the_ancestor() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("a")).unwrap();
        write_bytes(&root.join("a/f.txt"), 5);
        std::os::unix::fs::symlink(root, root.join("a/up")).unwrap();

        let (entries, skipped) = walk(root, &ScanOptions::default().follow_links(true));
        assert_eq!(rel_paths(root, &entries), vec!["a", "a/f.txt", "a/up"]);
        assert!(entries.iter().find(|e| e.name == "up").unwrap().is_directory);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].reason, SkipReason::SymlinkCycle);
    }

    /// Siblings linking to the same target are both descended.
    #[cfg(unix)]
    #[test]
    fn shared_targets_are_not_globally_deduplicated() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let target = TempDir::new().unwrap();
        write_bytes(&target.path().join("t.txt"), 7);
        std::os::unix::fs::symlink(target.path(), root.join("l1")).unwrap();
        std::os::unix::fs::symlink(target.path(), root.join("l2")).unwrap();

        let (entries, skipped) = walk(root, &ScanOptions::default().follow_links(true));
        assert!(skipped.is_empty());
        assert_eq!(
            rel_paths(root, &entries),
            vec!["l1", "l1/t.txt", "l2", "l2/t.txt"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_is_skipped_only_when_following() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::os::unix::fs::symlink(root.join("missing"), root.join("dangling")).unwrap();

        let (entries, skipped) = walk(root, &ScanOptions::default());
        assert_eq!(entries.len(), 1);
        assert!(skipped.is_empty());

        let (entries, skipped) = walk(root, &ScanOptions::default().follow_links(true));
        assert!(entries.is_empty());
        assert_eq!(skipped[0].reason, SkipReason::NotFound);
    }

    /// Names that are not valid UTF-8 would collapse onto the same lossy
    /// path; they are skipped instead, along with anything below them.
    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_skipped_not_merged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write_bytes(&root.join(OsStr::from_bytes(b"a\xff.txt")), 1);
        write_bytes(&root.join(OsStr::from_bytes(b"a\xfe.txt")), 1);
        let bad_dir = root.join(OsStr::from_bytes(b"d\xff"));
        fs::create_dir(&bad_dir).unwrap();
        write_bytes(&bad_dir.join("inner.txt"), 1);
        write_bytes(&root.join("ok.txt"), 2);

        let (entries, skipped) = walk(root, &ScanOptions::default());
        assert_eq!(rel_paths(root, &entries), vec!["ok.txt"]);
        assert_eq!(skipped.len(), 3);
        assert!(skipped.iter().all(|s| s.reason == SkipReason::InvalidName));

        let mut paths: Vec<&PathBuf> = skipped.iter().map(|s| &s.path).collect();
        paths.dedup();
        assert_eq!(paths.len(), 3);
    }
}
