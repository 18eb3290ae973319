//! Size measurement for directories and the largest-files list.
//!
//! These run on background workers. Progress is published through
//! [`ScanCounters`], the only state shared with the render path.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use walkdir::WalkDir;

use crate::fs::entry::Entry;

/// Monotonic progress counters, incremented by scan workers and read by the UI.
#[derive(Debug, Default)]
pub struct ScanCounters {
    files: AtomicU64,
    bytes: AtomicU64,
    dirs_done: AtomicU64,
}

/// Point-in-time copy of [`ScanCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanProgress {
    pub files: u64,
    pub bytes: u64,
    pub dirs_done: u64,
}

impl ScanCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_file(&self, len: u64) {
        self.files.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(len, Ordering::Relaxed);
    }

    fn record_dir_done(&self) {
        self.dirs_done.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            files: self.files.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            dirs_done: self.dirs_done.load(Ordering::Relaxed),
        }
    }
}

/// Total byte size of all regular files under `path`.
///
/// Symlinks are not followed. Unreadable children are skipped, so the
/// result is a lower bound on permission-restricted trees.
pub fn dir_size(path: &Path, counters: &ScanCounters) -> u64 {
    let mut total = 0u64;
    for entry in WalkDir::new(path).follow_links(false).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(meta) = entry.metadata() {
            total = total.saturating_add(meta.len());
            counters.record_file(meta.len());
        }
    }
    counters.record_dir_done();
    total
}

/// The `limit` largest regular files under `root`, largest first.
pub fn largest_files(root: &Path, limit: usize, counters: &ScanCounters) -> Vec<Entry> {
    if limit == 0 {
        return Vec::new();
    }

    let mut files: Vec<Entry> = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        counters.record_file(meta.len());
        files.push(Entry::new(entry.into_path(), &meta));

        // Keep memory bounded on huge trees.
        if files.len() >= limit * 4 {
            trim_to_largest(&mut files, limit);
        }
    }
    trim_to_largest(&mut files, limit);
    files
}

fn trim_to_largest(files: &mut Vec<Entry>, limit: usize) {
    files.sort_by(|a, b| {
        b.size_or_zero()
            .cmp(&a.size_or_zero())
            .then_with(|| a.path().cmp(b.path()))
    });
    files.truncate(limit);
}
