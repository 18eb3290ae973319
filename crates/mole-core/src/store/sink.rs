//! JSON document persistence with an authoritative primary path and
//! best-effort mirrors.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};

/// Writes pretty-printed JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CoreError::Io(e.into()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CoreError::from_io(parent, e))?;
    }
    std::fs::write(path, json).map_err(|e| CoreError::from_io(path, e))
}

/// Reads a JSON document.
///
/// Returns `Ok(None)` when the file does not exist. Any other read failure
/// is returned as-is; unparsable content is [`CoreError::Corrupt`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CoreResult<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CoreError::from_io(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| CoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// One authoritative location plus zero or more legacy mirrors.
///
/// Writes to the primary are reported to the caller; writes to mirrors are
/// logged and swallowed. Reads walk the locations in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualSink {
    primary: PathBuf,
    mirrors: Vec<PathBuf>,
}

impl DualSink {
    pub fn new(primary: impl Into<PathBuf>, mirrors: Vec<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            mirrors,
        }
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    /// Primary first, then mirrors in order.
    pub fn locations(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary.as_path()).chain(self.mirrors.iter().map(PathBuf::as_path))
    }

    /// Writes `value` to the primary, then mirrors it.
    ///
    /// # Errors
    ///
    /// Only a primary write failure is returned; mirrors are not attempted
    /// in that case.
    pub fn write<T: Serialize>(&self, value: &T) -> CoreResult<()> {
        write_json(&self.primary, value)?;
        debug!(path = %self.primary.display(), "wrote primary");

        for mirror in &self.mirrors {
            if let Err(e) = write_json(mirror, value) {
                warn!(path = %mirror.display(), error = %e, "legacy mirror write failed");
            }
        }
        Ok(())
    }

    /// Deletes every location, continuing past failures.
    ///
    /// Missing files are not errors. Returns the first real failure.
    pub fn remove_all(&self) -> CoreResult<()> {
        let mut first_err = None;
        for path in self.locations() {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to remove state file");
                    first_err.get_or_insert(CoreError::from_io(path, e));
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
