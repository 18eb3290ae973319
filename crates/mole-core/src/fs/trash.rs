//! Rename-based trash with single-shot restore.
//!
//! Each [`TrashVault::move_to_trash`] call creates its own timestamp-named
//! trash root under the vault base, so two transactions never share a
//! directory. Items keep their metadata because they are renamed, not
//! copied; the trash base and the working tree must therefore live on the
//! same filesystem.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};

/// One `(original, trashed)` pair inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashedItem {
    pub original: PathBuf,
    pub trashed: PathBuf,
}

/// Record of one move-to-trash call, sufficient to reverse it once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashTransaction {
    trash_root: PathBuf,
    items: Vec<TrashedItem>,
}

impl TrashTransaction {
    pub fn trash_root(&self) -> &Path {
        &self.trash_root
    }

    /// Items in the order they were trashed.
    pub fn items(&self) -> &[TrashedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Moves paths into per-transaction trash roots under a fixed base directory.
#[derive(Debug, Clone)]
pub struct TrashVault {
    base: PathBuf,
}

impl TrashVault {
    /// Creates a vault rooted at `base` (typically `~/.mole/trash`).
    ///
    /// The base directory is created lazily on the first trash call.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Renames every path in `paths`, in order, to `<trash_root>/<i>_<basename>`.
    ///
    /// If a rename fails, the partially created target for that item is
    /// removed and the error is returned. Items already moved by this call
    /// stay in the trash root; they are not moved back.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EmptyTrashRequest`] if `paths` is empty.
    /// - [`CoreError::NotFound`] / [`CoreError::Io`] for rename or mkdir failures.
    pub fn move_to_trash(&self, paths: &[PathBuf]) -> CoreResult<TrashTransaction> {
        if paths.is_empty() {
            return Err(CoreError::EmptyTrashRequest);
        }

        let trash_root = self.create_trash_root()?;
        let mut items = Vec::with_capacity(paths.len());

        for (i, original) in paths.iter().enumerate() {
            let base_name = original
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "item".to_string());
            let trashed = trash_root.join(format!("{i}_{base_name}"));

            if let Err(e) = std::fs::rename(original, &trashed) {
                remove_partial_target(&trashed);
                return Err(CoreError::from_io(original, e));
            }
            debug!(from = %original.display(), to = %trashed.display(), "trashed");
            items.push(TrashedItem {
                original: original.clone(),
                trashed,
            });
        }

        Ok(TrashTransaction { trash_root, items })
    }

    /// Renames each trashed item back to its original location, in order.
    ///
    /// Missing parent directories are recreated. An item whose original
    /// path exists again is never overwritten. Stops at the first failing
    /// item and returns its error; earlier items stay restored and later
    /// ones stay in the trash. On full success the trash root is removed
    /// (best-effort, logged on failure).
    ///
    /// Calling this twice on a fully restored transaction fails, because the
    /// originals are present again.
    pub fn restore(&self, transaction: &TrashTransaction) -> CoreResult<()> {
        for item in &transaction.items {
            if std::fs::symlink_metadata(&item.original).is_ok() {
                return Err(CoreError::RestoreTargetExists(item.original.clone()));
            }
            if let Some(parent) = item.original.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CoreError::from_io(parent, e))?;
            }
            std::fs::rename(&item.trashed, &item.original)
                .map_err(|e| CoreError::from_io(&item.trashed, e))?;
            debug!(path = %item.original.display(), "restored");
        }

        if let Err(e) = std::fs::remove_dir_all(&transaction.trash_root) {
            warn!(
                root = %transaction.trash_root.display(),
                error = %e,
                "failed to remove trash root after restore"
            );
        }
        Ok(())
    }

    /// Creates a fresh `YYYYMMDDTHHMMSS.mmm` directory under the base.
    ///
    /// A numeric suffix is appended when a root with that name exists.
    fn create_trash_root(&self) -> CoreResult<PathBuf> {
        std::fs::create_dir_all(&self.base).map_err(|e| CoreError::from_io(&self.base, e))?;

        let stamp = Local::now().format("%Y%m%dT%H%M%S%.3f").to_string();
        let mut candidate = self.base.join(&stamp);
        let mut suffix = 1u32;
        loop {
            match std::fs::create_dir(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    candidate = self.base.join(format!("{stamp}-{suffix}"));
                    suffix += 1;
                }
                Err(e) => return Err(CoreError::from_io(&candidate, e)),
            }
        }
    }
}

fn remove_partial_target(target: &Path) {
    let result = match std::fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(target),
        Ok(_) => std::fs::remove_file(target),
        Err(_) => return,
    };
    if let Err(e) = result {
        warn!(target = %target.display(), error = %e, "failed to clean partial trash target");
    }
}
