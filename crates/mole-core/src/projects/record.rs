//! Persisted project index types.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::store::sink::{read_json, write_json};

/// Format version written into every index.
pub const INDEX_VERSION: &str = "0.1";

/// How a project relates to its neighbours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    #[default]
    Standalone,
}

/// A detected project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Path relative to the index root.
    pub path: String,
    #[serde(default)]
    pub kind: ProjectKind,
    #[serde(default)]
    pub pinned: bool,
    /// Newest file modification time, Unix seconds.
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub latest_mtime: i64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub artifact_count: usize,
    #[serde(default)]
    pub has_git: bool,
    #[serde(default)]
    pub has_rust: bool,
    #[serde(default)]
    pub has_node: bool,
    #[serde(default)]
    pub has_python: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fingerprint: String,
}

impl ProjectRecord {
    /// First 8 fingerprint characters, for compact display.
    pub fn short_fingerprint(&self) -> Option<&str> {
        self.fingerprint.get(..8)
    }
}

/// Snapshot of one discovery run for a root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectIndex {
    pub version: String,
    pub root: PathBuf,
    pub generated_at: DateTime<Local>,
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
}

impl ProjectIndex {
    pub fn new(root: impl Into<PathBuf>, projects: Vec<ProjectRecord>) -> Self {
        Self {
            version: INDEX_VERSION.to_string(),
            root: root.into(),
            generated_at: Local::now(),
            projects,
        }
    }

    /// `<root>/.mole/projects.json`
    pub fn path_for(root: &Path) -> PathBuf {
        root.join(".mole").join("projects.json")
    }

    /// Reads the index for `root`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if no index has been written for `root`.
    /// - [`CoreError::Corrupt`] if the file is not a valid index.
    pub fn load(root: &Path) -> CoreResult<Self> {
        let path = Self::path_for(root);
        read_json(&path)?.ok_or(CoreError::NotFound(path))
    }

    /// Replaces any existing index file for this root.
    pub fn save(&self) -> CoreResult<()> {
        write_json(&Self::path_for(&self.root), self)
    }

    /// Looks up a record by its root-relative path.
    pub fn find(&self, rel: &str) -> Option<&ProjectRecord> {
        self.projects.iter().find(|p| p.path == rel)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

fn is_zero_i64(v: &i64) -> bool {
    *v == 0
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

fn is_zero_usize(v: &usize) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(path: &str) -> ProjectRecord {
        ProjectRecord {
            path: path.to_string(),
            kind: ProjectKind::Standalone,
            pinned: false,
            latest_mtime: 0,
            size_bytes: 0,
            artifact_count: 0,
            has_git: false,
            has_rust: true,
            has_node: false,
            has_python: false,
            fingerprint: String::new(),
        }
    }

    #[test]
    fn zero_fields_are_omitted() {
        let json = serde_json::to_value(record("app")).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["kind"], "standalone");
        assert!(!obj.contains_key("latest_mtime"));
        assert!(!obj.contains_key("size_bytes"));
        assert!(!obj.contains_key("artifact_count"));
        assert!(!obj.contains_key("fingerprint"));
        assert_eq!(obj["has_rust"], true);
    }

    #[test]
    fn missing_fields_default_on_read() {
        let rec: ProjectRecord = serde_json::from_str(r#"{"path":"x"}"#).unwrap();
        assert_eq!(rec.kind, ProjectKind::Standalone);
        assert_eq!(rec.size_bytes, 0);
        assert!(rec.fingerprint.is_empty());
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let index = ProjectIndex::new(tmp.path(), vec![record("a"), record("b")]);
        index.save().unwrap();

        let loaded = ProjectIndex::load(tmp.path()).unwrap();
        assert_eq!(loaded.version, INDEX_VERSION);
        assert_eq!(loaded.len(), 2);
        assert!(loaded.find("b").is_some());
        assert!(loaded.find("c").is_none());
    }

    #[test]
    fn load_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = ProjectIndex::load(tmp.path()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn load_garbage_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".mole")).unwrap();
        fs::write(ProjectIndex::path_for(tmp.path()), "[1,2").unwrap();

        let err = ProjectIndex::load(tmp.path()).unwrap_err();
        assert!(matches!(err, CoreError::Corrupt { .. }));
    }

    #[test]
    fn short_fingerprint_needs_eight_chars() {
        let mut rec = record("a");
        assert_eq!(rec.short_fingerprint(), None);
        rec.fingerprint = "0123456789abcdef".to_string();
        assert_eq!(rec.short_fingerprint(), Some("01234567"));
    }
}
