//! Time-bounded persistence of the UI snapshot between launches.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::runtime::RuntimeConfig;
use crate::error::CoreResult;
use crate::nav::view::ViewState;
use crate::store::sink::{read_json, DualSink};

/// Format version written into every session.
pub const SESSION_VERSION: &str = "1.0";

/// A point-in-time snapshot of the listing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub version: String,
    pub timestamp: DateTime<Local>,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search_query: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub search_mode: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub duplicates_mode: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub show_large_files: bool,
    #[serde(default)]
    pub selected: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub multi_selected: BTreeMap<String, bool>,
}

impl Session {
    /// Captures `view` as of now.
    pub fn capture(view: &ViewState) -> Self {
        Self {
            version: SESSION_VERSION.to_string(),
            timestamp: Local::now(),
            path: view.root().to_path_buf(),
            search_query: view.search_query().to_string(),
            search_mode: view.search_mode(),
            duplicates_mode: view.duplicates_mode(),
            show_large_files: view.show_large_files(),
            selected: i64::try_from(view.selected()).unwrap_or(i64::MAX),
            offset: i64::try_from(view.offset()).unwrap_or(i64::MAX),
            multi_selected: view
                .multi_selected()
                .iter()
                .map(|p| (p.to_string_lossy().into_owned(), true))
                .collect(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Local>, ttl: Duration) -> bool {
        now.signed_duration_since(self.timestamp) > ttl
    }

    /// Restores the snapshot into `view` when it was taken for the same root.
    ///
    /// Returns the view and whether anything was applied. The selection is
    /// restored only when it is inside the current listing and the offset
    /// only when non-negative. A saved multi-selection replaces the current
    /// one; an empty saved one leaves it untouched.
    pub fn apply(&self, view: ViewState) -> (ViewState, bool) {
        if self.path != view.root() {
            debug!(saved = %self.path.display(), "session root differs; not applied");
            return (view, false);
        }

        let mut view = view
            .with_search_query(self.search_query.clone())
            .with_search_mode(self.search_mode)
            .with_duplicates_mode(self.duplicates_mode)
            .with_show_large_files(self.show_large_files);

        if let Ok(selected) = usize::try_from(self.selected) {
            if selected < view.visible().len() {
                view = view.with_selection(selected);
            }
        }
        if let Ok(offset) = usize::try_from(self.offset) {
            view = view.with_offset(offset);
        }

        if !self.multi_selected.is_empty() {
            let multi: BTreeSet<PathBuf> = self
                .multi_selected
                .iter()
                .filter(|(_, on)| **on)
                .map(|(p, _)| PathBuf::from(p))
                .collect();
            view = view.with_multi_selected(multi);
        }
        (view, true)
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Saves, loads and clears [`Session`] files at the primary and legacy paths.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sink: DualSink,
    enabled: bool,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(config: &RuntimeConfig, ttl_hours: u32) -> Self {
        Self {
            sink: DualSink::new(config.session_path(), vec![config.legacy_session_path()]),
            enabled: config.projects_enabled(),
            ttl: Duration::hours(i64::from(ttl_hours)),
        }
    }

    /// Writes a snapshot of `view`. No-op when projects mode is off.
    pub fn save(&self, view: &ViewState) -> CoreResult<()> {
        if !self.enabled {
            return Ok(());
        }
        self.sink.write(&Session::capture(view))?;
        debug!(root = %view.root().display(), "session saved");
        Ok(())
    }

    /// Returns the first session found at the primary, then the legacy path.
    ///
    /// A missing file moves on to the next location. Any other read failure
    /// or unparsable content is returned as an error. An expired session is
    /// deleted and reported as `None`.
    pub fn load(&self) -> CoreResult<Option<Session>> {
        if !self.enabled {
            return Ok(None);
        }
        for path in self.sink.locations() {
            let Some(session) = read_json::<Session>(path)? else {
                continue;
            };
            if session.is_expired(Local::now(), self.ttl) {
                info!(path = %path.display(), "discarding expired session");
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove expired session");
                }
                return Ok(None);
            }
            return Ok(Some(session));
        }
        Ok(None)
    }

    /// Deletes both session files, continuing past individual failures.
    pub fn clear(&self) -> CoreResult<()> {
        self.sink.remove_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::fs::entry::Entry;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn view() -> ViewState {
        let entries = ["alpha", "beta", "gamma"]
            .iter()
            .enumerate()
            .map(|(i, n)| Entry::seeded_dir(PathBuf::from("/work").join(n), Some(10 - i as u64), None))
            .collect();
        ViewState::new("/work").with_entries(entries)
    }

    fn store(tmp: &TempDir, enabled: bool) -> (SessionStore, RuntimeConfig) {
        let config = RuntimeConfig::with_home(tmp.path(), enabled);
        (SessionStore::new(&config, 24), config)
    }

    #[test]
    fn save_load_apply() {
        let tmp = TempDir::new().unwrap();
        let (store, config) = store(&tmp, true);

        let saved = view()
            .with_search_query("a")
            .with_search_mode(true)
            .with_duplicates_mode(true)
            .move_down()
            .toggle_highlighted()
            .with_offset(1);
        store.save(&saved).unwrap();
        assert!(config.session_path().exists());
        assert!(config.legacy_session_path().exists());

        let session = store.load().unwrap().unwrap();
        assert_eq!(session.version, SESSION_VERSION);

        let (restored, applied) = session.apply(view());
        assert!(applied);
        assert_eq!(restored.search_query(), "a");
        assert!(restored.search_mode());
        assert!(restored.duplicates_mode());
        assert!(!restored.show_large_files());
        assert_eq!(restored.selected(), 1);
        assert_eq!(restored.offset(), 1);
        assert_eq!(restored.multi_selected(), saved.multi_selected());
    }

    #[test]
    fn expired_session_is_deleted() {
        let tmp = TempDir::new().unwrap();
        let (store, config) = store(&tmp, true);

        let mut session = Session::capture(&view());
        session.timestamp = Local::now() - Duration::hours(25);
        DualSink::new(config.session_path(), vec![]).write(&session).unwrap();

        assert!(store.load().unwrap().is_none());
        assert!(!config.session_path().exists());
    }

    #[test]
    fn fresh_session_within_ttl_loads() {
        let tmp = TempDir::new().unwrap();
        let (store, config) = store(&tmp, true);

        let mut session = Session::capture(&view());
        session.timestamp = Local::now() - Duration::hours(23);
        DualSink::new(config.session_path(), vec![]).write(&session).unwrap();

        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn legacy_session_used_when_primary_missing() {
        let tmp = TempDir::new().unwrap();
        let (store, config) = store(&tmp, true);
        DualSink::new(config.legacy_session_path(), vec![])
            .write(&Session::capture(&view()))
            .unwrap();

        let session = store.load().unwrap().unwrap();
        assert_eq!(session.path, Path::new("/work"));
    }

    #[test]
    fn path_mismatch_is_not_applied() {
        let session = Session::capture(&view().with_search_query("zzz"));
        let other = ViewState::new("/elsewhere");

        let (after, applied) = session.apply(other.clone());
        assert!(!applied);
        assert_eq!(after, other);
    }

    #[test]
    fn out_of_bounds_selection_is_ignored() {
        let mut session = Session::capture(&view());
        session.selected = 99;
        session.offset = -3;

        let (after, applied) = session.apply(view().with_offset(2));
        assert!(applied);
        assert_eq!(after.selected(), 0);
        assert_eq!(after.offset(), 2);
    }

    #[test]
    fn saved_multi_selection_replaces_current() {
        let saved = view().move_down().toggle_highlighted();
        let session = Session::capture(&saved);
        let current = view().toggle_highlighted();
        assert_ne!(current.multi_selected(), saved.multi_selected());

        let (after, _) = session.apply(current);
        assert_eq!(after.multi_selected(), saved.multi_selected());
    }

    #[test]
    fn empty_saved_multi_selection_keeps_current() {
        let session = Session::capture(&view());
        let current = view().toggle_highlighted();
        assert!(!current.multi_selected().is_empty());

        let (after, _) = session.apply(current.clone());
        assert_eq!(after.multi_selected(), current.multi_selected());
    }

    #[test]
    fn empty_fields_are_omitted() {
        let json = serde_json::to_value(Session::capture(&view())).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("search_query"));
        assert!(!obj.contains_key("search_mode"));
        assert!(!obj.contains_key("multi_selected"));
        assert_eq!(obj["selected"], 0);
        assert_eq!(obj["version"], "1.0");
    }

    #[test]
    fn disabled_store_is_noop() {
        let tmp = TempDir::new().unwrap();
        let (store, config) = store(&tmp, false);

        store.save(&view()).unwrap();
        assert!(!config.session_path().exists());

        DualSink::new(config.session_path(), vec![])
            .write(&Session::capture(&view()))
            .unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_session_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let (store, config) = store(&tmp, true);
        fs::create_dir_all(config.primary_dir()).unwrap();
        fs::write(config.session_path(), "{{{").unwrap();

        assert!(matches!(store.load().unwrap_err(), CoreError::Corrupt { .. }));
    }

    #[test]
    fn clear_removes_both_files() {
        let tmp = TempDir::new().unwrap();
        let (store, config) = store(&tmp, true);
        store.save(&view()).unwrap();

        store.clear().unwrap();
        assert!(!config.session_path().exists());
        assert!(!config.legacy_session_path().exists());
        store.clear().unwrap();
    }
}
