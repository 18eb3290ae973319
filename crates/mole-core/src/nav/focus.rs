//! Pinned project paths shared across tool instances.
//!
//! The focus list is a JSON document `{"pinned": [...]}` of paths relative
//! to whichever root last pinned them. It is always read and written as a
//! whole; there are no partial updates.

use tracing::{debug, warn};

use serde::{Deserialize, Serialize};

use crate::config::runtime::RuntimeConfig;
use crate::error::CoreResult;
use crate::store::sink::{read_json, DualSink};

/// Ordered list of pinned relative paths.
///
/// Duplicates are tolerated; nothing deduplicates them automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusList {
    #[serde(default)]
    pinned: Vec<String>,
}

impl FocusList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact string match against the pinned set.
    #[must_use]
    pub fn is_pinned(&self, rel: &str) -> bool {
        self.pinned.iter().any(|p| p == rel)
    }

    /// Returns a new list with `rel` appended.
    #[must_use]
    pub fn with_pinned(self, rel: impl Into<String>) -> Self {
        let mut pinned = self.pinned;
        pinned.push(rel.into());
        Self { pinned }
    }

    /// Returns a new list with the first occurrence of `rel` removed.
    ///
    /// The order of the remaining paths is preserved.
    #[must_use]
    pub fn without_pinned(self, rel: &str) -> Self {
        let mut pinned = self.pinned;
        if let Some(pos) = pinned.iter().position(|p| p == rel) {
            pinned.remove(pos);
        }
        Self { pinned }
    }

    pub fn paths(&self) -> &[String] {
        &self.pinned
    }

    pub fn len(&self) -> usize {
        self.pinned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty()
    }
}

/// Outcome of [`FocusStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinChange {
    Pinned,
    Unpinned,
}

/// Loads and saves the [`FocusList`] at the primary and legacy locations.
#[derive(Debug, Clone)]
pub struct FocusStore {
    sink: DualSink,
    enabled: bool,
}

impl FocusStore {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            sink: DualSink::new(config.focus_path(), vec![config.legacy_focus_path()]),
            enabled: config.projects_enabled(),
        }
    }

    /// Reads the primary location, then the legacy one.
    ///
    /// A location that is missing, unreadable or unparsable is skipped.
    /// When none yields a list, the result is empty; this never fails.
    pub fn load(&self) -> FocusList {
        for path in self.sink.locations() {
            match read_json::<FocusList>(path) {
                Ok(Some(list)) => return list,
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping focus file"),
            }
        }
        FocusList::new()
    }

    /// Writes the primary location and mirrors to the legacy one.
    pub fn save(&self, list: &FocusList) -> CoreResult<()> {
        self.sink.write(list)
    }

    /// Flips the pin state of `rel` and persists the new list.
    ///
    /// Returns `Ok(None)` without touching disk when projects mode is off.
    pub fn toggle(&self, rel: &str) -> CoreResult<Option<(FocusList, PinChange)>> {
        if !self.enabled {
            return Ok(None);
        }
        let current = self.load();
        let (next, change) = if current.is_pinned(rel) {
            (current.without_pinned(rel), PinChange::Unpinned)
        } else {
            (current.with_pinned(rel), PinChange::Pinned)
        };
        self.save(&next)?;
        debug!(path = rel, ?change, "focus list updated");
        Ok(Some((next, change)))
    }
}
