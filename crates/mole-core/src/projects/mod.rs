//! Project discovery, the persisted fingerprint index, and duplicate grouping.

pub mod discover;
pub mod duplicates;
pub mod external;
pub mod record;

use std::path::Path;

use crate::error::{CoreError, CoreResult};

pub use discover::{discover, fingerprint, scan_projects};
pub use duplicates::{group_duplicates, DuplicateGroup};
pub use external::load_seed_entries;
pub use record::{ProjectIndex, ProjectKind, ProjectRecord, INDEX_VERSION};

/// `path` relative to `root`, as stored in the index and focus list.
///
/// # Errors
///
/// [`CoreError::OutsideRoot`] if `path` is not under `root`.
pub fn relative_path(root: &Path, path: &Path) -> CoreResult<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| CoreError::OutsideRoot(path.to_path_buf()))?;
    if rel.as_os_str().is_empty() {
        return Ok(".".to_string());
    }
    Ok(rel.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_inside_root() {
        assert_eq!(
            relative_path(Path::new("/r"), Path::new("/r/a/b")).unwrap(),
            "a/b"
        );
        assert_eq!(relative_path(Path::new("/r"), Path::new("/r")).unwrap(), ".");
    }

    #[test]
    fn relative_path_outside_root() {
        let err = relative_path(Path::new("/r"), Path::new("/other/x")).unwrap_err();
        assert!(matches!(err, CoreError::OutsideRoot(_)));
    }
}
