//! Read-only external project index used to seed a listing.
//!
//! Another tool may publish `{root, projects: [{path, size_bytes?, mtime?}]}`.
//! When its root is the directory being analysed, its projects become
//! directory entries before the first scan finishes.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

use crate::error::CoreResult;
use crate::fs::entry::Entry;
use crate::store::sink::read_json;

#[derive(Debug, Clone, Deserialize)]
struct ExternalProject {
    path: PathBuf,
    #[serde(default)]
    size_bytes: Option<i64>,
    #[serde(default)]
    mtime: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExternalIndex {
    root: PathBuf,
    #[serde(default)]
    projects: Vec<ExternalProject>,
}

/// Loads seed entries for `target` from the index at `index_path`.
///
/// A relative index root is resolved against `cwd`. Returns `Ok(None)` when
/// the file is absent or its root is a different directory. Unknown or
/// negative sizes leave the entry pending.
///
/// # Errors
///
/// [`crate::CoreError::Corrupt`] if the file exists but cannot be parsed.
pub fn load_seed_entries(
    index_path: &Path,
    target: &Path,
    cwd: &Path,
) -> CoreResult<Option<Vec<Entry>>> {
    let Some(index) = read_json::<ExternalIndex>(index_path)? else {
        return Ok(None);
    };

    let root = if index.root.is_absolute() {
        index.root
    } else {
        cwd.join(index.root)
    };
    if !same_dir(&root, target) {
        debug!(index_root = %root.display(), target = %target.display(), "external index ignored");
        return Ok(None);
    }

    let entries = index
        .projects
        .into_iter()
        .map(|p| {
            let path = if p.path.is_absolute() {
                p.path
            } else {
                target.join(p.path)
            };
            let size = p.size_bytes.and_then(|s| u64::try_from(s).ok());
            let last_access = p.mtime.as_deref().and_then(parse_mtime);
            Entry::seeded_dir(path, size, last_access)
        })
        .collect();
    Ok(Some(entries))
}

fn same_dir(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

fn parse_mtime(raw: &str) -> Option<SystemTime> {
    DateTime::parse_from_rfc3339(raw).ok().map(SystemTime::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_index(tmp: &TempDir, body: &str) -> PathBuf {
        let path = tmp.path().join(".orbit/index.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn absent_index_is_none() {
        let tmp = TempDir::new().unwrap();
        let result =
            load_seed_entries(&tmp.path().join("index.json"), tmp.path(), tmp.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn matching_root_seeds_directories() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("work");
        fs::create_dir(&target).unwrap();
        let body = format!(
            r#"{{"root": "{}", "projects": [
                {{"path": "api", "size_bytes": 2048, "mtime": "2024-05-01T10:00:00Z"}},
                {{"path": "web"}}
            ]}}"#,
            target.display()
        );
        let index = write_index(&tmp, &body);

        let entries = load_seed_entries(&index, &target, tmp.path()).unwrap().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path(), target.join("api"));
        assert!(entries[0].is_dir());
        assert_eq!(entries[0].size(), Some(2048));
        assert!(entries[0].last_access().is_some());
        assert!(entries[1].is_pending());
    }

    #[test]
    fn relative_root_resolves_against_cwd() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("work");
        fs::create_dir(&target).unwrap();
        let index = write_index(&tmp, r#"{"root": "work", "projects": [{"path": "a"}]}"#);

        let entries = load_seed_entries(&index, &target, tmp.path()).unwrap();
        assert_eq!(entries.map(|e| e.len()), Some(1));
    }

    #[test]
    fn other_root_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let index = write_index(&tmp, r#"{"root": "/somewhere/else", "projects": [{"path": "a"}]}"#);

        assert!(load_seed_entries(&index, tmp.path(), tmp.path()).unwrap().is_none());
    }

    #[test]
    fn negative_size_stays_pending() {
        let tmp = TempDir::new().unwrap();
        let body = format!(
            r#"{{"root": "{}", "projects": [{{"path": "a", "size_bytes": -1}}]}}"#,
            tmp.path().display()
        );
        let index = write_index(&tmp, &body);

        let entries = load_seed_entries(&index, tmp.path(), tmp.path()).unwrap().unwrap();
        assert!(entries[0].is_pending());
    }

    #[test]
    fn garbage_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let index = write_index(&tmp, "nope");
        assert!(load_seed_entries(&index, tmp.path(), tmp.path()).is_err());
    }
}
