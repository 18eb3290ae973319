//! Project discovery and metadata fingerprinting.
//!
//! A directory whose immediate children include a language or VCS marker
//! is a project root. Project roots are atomic: their size, newest mtime
//! and artifact count are measured, and discovery does not look inside
//! them for further projects.

use std::ffi::OsStr;
use std::path::Path;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{CoreError, CoreResult};
use crate::nav::focus::FocusList;
use crate::projects::record::{ProjectIndex, ProjectKind, ProjectRecord};

/// Deepest directory examined, counted as separators in the root-relative path.
pub const MAX_DEPTH: usize = 4;

/// Directory names whose subtrees are never examined.
const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "target",
    ".venv",
    "venv",
    ".next",
    "build",
    "dist",
    "Library",
    "Applications",
    ".Trash",
];

/// Case-insensitive file name fragments counted as artifacts.
const ARTIFACT_KEYWORDS: &[&str] = &["readme", "export", "plan"];

#[derive(Debug, Default, Clone, Copy)]
struct Markers {
    git: bool,
    rust: bool,
    node: bool,
    python: bool,
}

impl Markers {
    fn detect(dir: &Path) -> Self {
        let mut markers = Self::default();
        let Ok(read_dir) = std::fs::read_dir(dir) else {
            return markers;
        };
        for child in read_dir.flatten() {
            let Ok(ft) = child.file_type() else {
                continue;
            };
            let name = child.file_name();
            match (ft.is_dir(), name.to_str()) {
                (true, Some(".git")) => markers.git = true,
                (false, Some("Cargo.toml")) => markers.rust = true,
                (false, Some("package.json")) => markers.node = true,
                (false, Some("pyproject.toml" | "pytest.ini")) => markers.python = true,
                _ => {}
            }
        }
        markers
    }

    fn any(self) -> bool {
        self.git || self.rust || self.node || self.python
    }
}

#[derive(Debug, Default)]
struct ProjectStats {
    size_bytes: u64,
    latest_mtime: i64,
    artifact_count: usize,
}

fn measure(dir: &Path) -> ProjectStats {
    let mut stats = ProjectStats::default();
    for entry in WalkDir::new(dir).follow_links(false).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        stats.size_bytes = stats.size_bytes.saturating_add(meta.len());
        if let Some(secs) = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
        {
            stats.latest_mtime = stats.latest_mtime.max(secs);
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if ARTIFACT_KEYWORDS.iter().any(|k| name.contains(k)) {
            stats.artifact_count += 1;
        }
    }
    stats
}

/// Hex SHA-256 over `path` followed by `:{size}:{latest_mtime}`.
///
/// This is a metadata digest. Two trees with equal path, size and newest
/// mtime share a fingerprint regardless of content.
pub fn fingerprint(rel_path: &str, size_bytes: u64, latest_mtime: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rel_path.as_bytes());
    hasher.update(format!(":{size_bytes}:{latest_mtime}").as_bytes());
    format!("{:x}", hasher.finalize())
}

fn is_skipped(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| SKIP_DIRS.contains(&n))
}

/// Walks `root` and builds a fresh index without writing it.
///
/// Pin state is stamped from `focus` as it is now.
///
/// # Errors
///
/// [`CoreError::NotFound`] / [`CoreError::NotADirectory`] for a bad root.
pub fn scan_projects(root: &Path, focus: &FocusList) -> CoreResult<ProjectIndex> {
    let root = std::fs::canonicalize(root).map_err(|e| CoreError::from_io(root, e))?;
    if !root.is_dir() {
        return Err(CoreError::NotADirectory(root));
    }

    let mut projects = Vec::new();
    let mut walker = WalkDir::new(&root)
        .min_depth(1)
        .max_depth(MAX_DEPTH + 1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "discovery skipped unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if is_skipped(entry.file_name()) {
            walker.skip_current_dir();
            continue;
        }

        let markers = Markers::detect(entry.path());
        if !markers.any() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(&root)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stats = measure(entry.path());
        projects.push(ProjectRecord {
            fingerprint: fingerprint(&rel, stats.size_bytes, stats.latest_mtime),
            pinned: focus.is_pinned(&rel),
            kind: ProjectKind::Standalone,
            latest_mtime: stats.latest_mtime,
            size_bytes: stats.size_bytes,
            artifact_count: stats.artifact_count,
            has_git: markers.git,
            has_rust: markers.rust,
            has_node: markers.node,
            has_python: markers.python,
            path: rel,
        });

        walker.skip_current_dir();
    }

    Ok(ProjectIndex::new(root, projects))
}

/// Discovers projects under `root` and replaces the index file for it.
pub fn discover(root: &Path, focus: &FocusList) -> CoreResult<ProjectIndex> {
    let index = scan_projects(root, focus)?;
    index.save()?;
    info!(root = %index.root.display(), projects = index.len(), "project index written");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn cargo_project_with_readme() {
        let tmp = TempDir::new().unwrap();
        let proj = tmp.path().join("crate_a");
        fs::create_dir(&proj).unwrap();
        fs::write(proj.join("Cargo.toml"), "[package]\nname = \"a\"\n").unwrap();
        fs::write(proj.join("README.md"), "# a").unwrap();

        let index = discover(tmp.path(), &FocusList::new()).unwrap();

        assert_eq!(index.len(), 1);
        let rec = &index.projects[0];
        assert_eq!(rec.path, "crate_a");
        assert!(rec.has_rust);
        assert!(!rec.has_node);
        assert!(rec.artifact_count >= 1);
        assert!(rec.size_bytes > 0);
        assert_eq!(rec.fingerprint.len(), 64);
        assert_eq!(rec.kind, ProjectKind::Standalone);
        assert!(ProjectIndex::path_for(&index.root).exists());
    }

    #[test]
    fn discovery_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        for name in ["web", "api"] {
            let dir = tmp.path().join(name);
            fs::create_dir(&dir).unwrap();
            fs::write(dir.join("package.json"), "{}").unwrap();
        }

        let first = scan_projects(tmp.path(), &FocusList::new()).unwrap();
        let second = scan_projects(tmp.path(), &FocusList::new()).unwrap();

        let fps = |i: &ProjectIndex| {
            i.projects
                .iter()
                .map(|p| (p.path.clone(), p.fingerprint.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(fps(&first), fps(&second));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn project_roots_are_atomic() {
        let tmp = TempDir::new().unwrap();
        let outer = tmp.path().join("outer");
        let inner = outer.join("packages/inner");
        fs::create_dir_all(&inner).unwrap();
        fs::write(outer.join("package.json"), "{}").unwrap();
        fs::write(inner.join("Cargo.toml"), "").unwrap();

        let index = scan_projects(tmp.path(), &FocusList::new()).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.projects[0].path, "outer");
    }

    #[test]
    fn skip_set_subtrees_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let hidden = tmp.path().join("node_modules/lib");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("package.json"), "{}").unwrap();

        let index = scan_projects(tmp.path(), &FocusList::new()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn depth_bound_is_respected() {
        let tmp = TempDir::new().unwrap();
        let shallow = tmp.path().join("a/b/c/d/e");
        let deep = tmp.path().join("a/b/c/d/e/f");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("pyproject.toml"), "").unwrap();

        let index = scan_projects(tmp.path(), &FocusList::new()).unwrap();
        assert!(index.is_empty(), "depth-5 project must be out of range");

        fs::write(shallow.join("pytest.ini"), "").unwrap();
        let index = scan_projects(tmp.path(), &FocusList::new()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.projects[0].has_python);
    }

    #[test]
    fn git_directory_marks_a_project() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("repo/.git")).unwrap();

        let index = scan_projects(tmp.path(), &FocusList::new()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.projects[0].has_git);
    }

    #[test]
    fn pin_state_comes_from_focus_list() {
        let tmp = TempDir::new().unwrap();
        for name in ["one", "two"] {
            let dir = tmp.path().join(name);
            fs::create_dir(&dir).unwrap();
            fs::write(dir.join("Cargo.toml"), "").unwrap();
        }

        let focus = FocusList::new().with_pinned("two");
        let index = scan_projects(tmp.path(), &focus).unwrap();

        assert!(!index.find("one").unwrap().pinned);
        assert!(index.find("two").unwrap().pinned);
    }

    #[test]
    fn rediscovery_replaces_index() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("gone");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("Cargo.toml"), "").unwrap();
        discover(tmp.path(), &FocusList::new()).unwrap();

        fs::remove_dir_all(&dir).unwrap();
        discover(tmp.path(), &FocusList::new()).unwrap();

        let canonical = fs::canonicalize(tmp.path()).unwrap();
        assert!(ProjectIndex::load(&canonical).unwrap().is_empty());
    }

    #[test]
    fn fingerprint_covers_path_size_and_mtime() {
        let base = fingerprint("a", 10, 100);
        assert_eq!(base, fingerprint("a", 10, 100));
        assert_ne!(base, fingerprint("b", 10, 100));
        assert_ne!(base, fingerprint("a", 11, 100));
        assert_ne!(base, fingerprint("a", 10, 101));
    }

    #[test]
    fn missing_root_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = scan_projects(&tmp.path().join("nope"), &FocusList::new()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
