//! Background units of work for filesystem-heavy operations.
//!
//! Each `spawn_*` function runs its work on tokio's blocking pool and reports
//! back through an unbounded mpsc channel. Workers never touch [`App`] state;
//! the main event loop applies every [`TaskMessage`] in arrival order.
//!
//! [`App`]: crate::app::App

use std::path::PathBuf;
use std::sync::Arc;

use mole_core::fs::scan::{dir_size, largest_files};
use mole_core::projects::discover;
use mole_core::{Entry, FocusList, ProjectIndex, ScanCounters, TrashTransaction, TrashVault};
use tokio::sync::mpsc::UnboundedSender;

/// Work the controller asks the event loop to start.
#[derive(Debug, Clone)]
pub enum Task {
    Trash(Vec<PathBuf>),
    Restore(TrashTransaction),
    Discover {
        root: PathBuf,
        focus: FocusList,
    },
    /// Size every pending directory and collect the largest files under `root`.
    Measure {
        root: PathBuf,
        pending: Vec<PathBuf>,
        large_files_limit: usize,
    },
}

/// Messages sent from background tasks to the main event loop.
#[derive(Debug)]
pub enum TaskMessage {
    TrashDone(Result<TrashTransaction, String>),
    RestoreDone {
        restored: usize,
        result: Result<(), String>,
    },
    DiscoveryDone(Result<ProjectIndex, String>),
    EntrySized {
        path: PathBuf,
        size: u64,
    },
    LargeFilesDone {
        root: PathBuf,
        files: Vec<Entry>,
    },
}

/// Starts `task` on the blocking pool.
pub fn spawn_task(
    task: Task,
    vault: &TrashVault,
    counters: &Arc<ScanCounters>,
    tx: &UnboundedSender<TaskMessage>,
) {
    match task {
        Task::Trash(paths) => spawn_trash(vault.clone(), paths, tx.clone()),
        Task::Restore(transaction) => spawn_restore(vault.clone(), transaction, tx.clone()),
        Task::Discover { root, focus } => spawn_discovery(root, focus, tx.clone()),
        Task::Measure {
            root,
            pending,
            large_files_limit,
        } => {
            for dir in pending {
                spawn_size_scan(dir, Arc::clone(counters), tx.clone());
            }
            spawn_large_files(root, large_files_limit, Arc::clone(counters), tx.clone());
        }
    }
}

pub fn spawn_trash(vault: TrashVault, paths: Vec<PathBuf>, tx: UnboundedSender<TaskMessage>) {
    tokio::task::spawn_blocking(move || {
        let result = vault.move_to_trash(&paths).map_err(|e| {
            tracing::error!("Trash failed: {e}");
            e.to_string()
        });
        let _ = tx.send(TaskMessage::TrashDone(result));
    });
}

/// Restores `transaction`. Runs to completion; there is no cancellation.
pub fn spawn_restore(
    vault: TrashVault,
    transaction: TrashTransaction,
    tx: UnboundedSender<TaskMessage>,
) {
    tokio::task::spawn_blocking(move || {
        let restored = transaction.len();
        let result = vault.restore(&transaction).map_err(|e| {
            tracing::error!("Restore failed: {e}");
            e.to_string()
        });
        let _ = tx.send(TaskMessage::RestoreDone { restored, result });
    });
}

pub fn spawn_discovery(root: PathBuf, focus: FocusList, tx: UnboundedSender<TaskMessage>) {
    tokio::task::spawn_blocking(move || {
        let result = discover(&root, &focus).map_err(|e| {
            tracing::error!("Discovery failed: {e}");
            e.to_string()
        });
        let _ = tx.send(TaskMessage::DiscoveryDone(result));
    });
}

pub fn spawn_size_scan(
    dir: PathBuf,
    counters: Arc<ScanCounters>,
    tx: UnboundedSender<TaskMessage>,
) {
    tokio::task::spawn_blocking(move || {
        let size = dir_size(&dir, &counters);
        let _ = tx.send(TaskMessage::EntrySized { path: dir, size });
    });
}

pub fn spawn_large_files(
    root: PathBuf,
    limit: usize,
    counters: Arc<ScanCounters>,
    tx: UnboundedSender<TaskMessage>,
) {
    tokio::task::spawn_blocking(move || {
        let files = largest_files(&root, limit, &counters);
        let _ = tx.send(TaskMessage::LargeFilesDone { root, files });
    });
}
