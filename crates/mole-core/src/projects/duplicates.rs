//! Grouping live entries by project fingerprint.

use std::collections::BTreeMap;
use std::path::Path;

use crate::fs::entry::Entry;
use crate::projects::record::ProjectIndex;
use crate::projects::relative_path;

/// Live entries that share one fingerprint. Always two or more members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub fingerprint: String,
    pub entries: Vec<Entry>,
    /// Sum of resolved member sizes; pending sizes count as zero.
    pub total_size: u64,
}

impl DuplicateGroup {
    pub fn short_fingerprint(&self) -> &str {
        self.fingerprint.get(..8).unwrap_or(&self.fingerprint)
    }
}

/// Matches `entries` against `index` by root-relative path and returns every
/// fingerprint with at least two matches.
///
/// Recomputed on every call from the arguments; nothing is cached. Returns
/// an empty list when projects mode is off. Groups are ordered by total
/// size descending, then fingerprint.
pub fn group_duplicates(
    index: &ProjectIndex,
    entries: &[Entry],
    root: &Path,
    enabled: bool,
) -> Vec<DuplicateGroup> {
    if !enabled {
        return Vec::new();
    }

    let mut by_fingerprint: BTreeMap<&str, Vec<Entry>> = BTreeMap::new();
    for project in &index.projects {
        if project.fingerprint.is_empty() {
            continue;
        }
        for entry in entries {
            let Ok(rel) = relative_path(root, entry.path()) else {
                continue;
            };
            if rel == project.path {
                by_fingerprint
                    .entry(project.fingerprint.as_str())
                    .or_default()
                    .push(entry.clone());
            }
        }
    }

    let mut groups: Vec<DuplicateGroup> = by_fingerprint
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(fingerprint, members)| DuplicateGroup {
            fingerprint: fingerprint.to_string(),
            total_size: members.iter().map(Entry::size_or_zero).sum(),
            entries: members,
        })
        .collect();

    groups.sort_by(|a, b| {
        b.total_size
            .cmp(&a.total_size)
            .then_with(|| a.fingerprint.cmp(&b.fingerprint))
    });
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::record::{ProjectKind, ProjectRecord};
    use std::path::PathBuf;

    fn record(path: &str, fingerprint: &str) -> ProjectRecord {
        ProjectRecord {
            path: path.to_string(),
            kind: ProjectKind::Standalone,
            pinned: false,
            latest_mtime: 1,
            size_bytes: 1,
            artifact_count: 0,
            has_git: false,
            has_rust: true,
            has_node: false,
            has_python: false,
            fingerprint: fingerprint.to_string(),
        }
    }

    fn entry(name: &str, size: u64) -> Entry {
        Entry::seeded_dir(PathBuf::from("/root").join(name), Some(size), None)
    }

    #[test]
    fn groups_need_two_members() {
        let index = ProjectIndex::new(
            "/root",
            vec![
                record("a", "aaaaaaaa11"),
                record("a", "aaaaaaaa11"),
                record("b", "bbbbbbbb22"),
            ],
        );
        let entries = vec![entry("a", 100), entry("b", 50)];

        let groups = group_duplicates(&index, &entries, Path::new("/root"), true);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].fingerprint, "aaaaaaaa11");
        assert_eq!(groups[0].entries.len(), 2);
        assert_eq!(groups[0].total_size, 200);
        assert_eq!(groups[0].short_fingerprint(), "aaaaaaaa");
    }

    #[test]
    fn distinct_paths_with_shared_fingerprint_group_together() {
        let index = ProjectIndex::new(
            "/root",
            vec![record("x", "samefp"), record("y", "samefp")],
        );
        let entries = vec![entry("x", 3), entry("y", 4), entry("z", 5)];

        let groups = group_duplicates(&index, &entries, Path::new("/root"), true);

        assert_eq!(groups.len(), 1);
        let names: Vec<&str> = groups[0].entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(groups[0].total_size, 7);
    }

    #[test]
    fn reflects_current_entries_only() {
        let index = ProjectIndex::new(
            "/root",
            vec![record("x", "fp"), record("y", "fp")],
        );

        let groups = group_duplicates(&index, &[entry("x", 1)], Path::new("/root"), true);
        assert!(groups.is_empty());
    }

    #[test]
    fn disabled_returns_nothing() {
        let index = ProjectIndex::new(
            "/root",
            vec![record("x", "fp"), record("y", "fp")],
        );
        let entries = vec![entry("x", 1), entry("y", 1)];

        assert!(group_duplicates(&index, &entries, Path::new("/root"), false).is_empty());
    }

    #[test]
    fn empty_fingerprints_never_group() {
        let index = ProjectIndex::new("/root", vec![record("x", ""), record("y", "")]);
        let entries = vec![entry("x", 1), entry("y", 1)];

        assert!(group_duplicates(&index, &entries, Path::new("/root"), true).is_empty());
    }

    #[test]
    fn groups_ordered_by_total_size() {
        let index = ProjectIndex::new(
            "/root",
            vec![
                record("s1", "small"),
                record("s2", "small"),
                record("b1", "big"),
                record("b2", "big"),
            ],
        );
        let entries = vec![entry("s1", 1), entry("s2", 1), entry("b1", 90), entry("b2", 90)];

        let groups = group_duplicates(&index, &entries, Path::new("/root"), true);
        assert_eq!(groups[0].fingerprint, "big");
        assert_eq!(groups[1].fingerprint, "small");
    }
}
