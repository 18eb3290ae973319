//! Listing entry representation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use unicode_normalization::UnicodeNormalization;

/// A single file or directory in the current listing.
///
/// `Entry` is immutable; size resolution produces a new instance via
/// [`Entry::with_size`]. Directory sizes start out pending (`None`) until
/// the background scanner reports a total. File sizes come from metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    path: PathBuf,
    name: String,
    size: Option<u64>,
    is_dir: bool,
    is_hidden: bool,
    last_access: Option<SystemTime>,
}

impl Entry {
    /// Creates a new `Entry` from a path and its metadata.
    ///
    /// Hidden entries are detected by a leading `.` in the name.
    pub fn new(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let name = display_name(&path);
        let is_dir = metadata.is_dir();
        Self {
            is_hidden: name.starts_with('.'),
            name,
            size: if is_dir { None } else { Some(metadata.len()) },
            is_dir,
            last_access: metadata.accessed().ok(),
            path,
        }
    }

    /// Creates a directory entry whose size is taken from an external source.
    ///
    /// `size` of `None` leaves the entry pending until a scan resolves it.
    pub fn seeded_dir(path: PathBuf, size: Option<u64>, last_access: Option<SystemTime>) -> Self {
        let name = display_name(&path);
        Self {
            is_hidden: name.starts_with('.'),
            name,
            size,
            is_dir: true,
            last_access,
            path,
        }
    }

    /// Returns a copy with the size resolved.
    ///
    /// Only a pending size is replaced; an already resolved size is kept so
    /// resolution happens at most once per listing.
    #[must_use]
    pub fn with_size(self, size: u64) -> Self {
        if self.size.is_some() {
            return self;
        }
        Self {
            size: Some(size),
            ..self
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the size in bytes, or `None` while it is still being measured.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Size used for ranking and totals; pending counts as zero.
    pub fn size_or_zero(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    pub fn is_pending(&self) -> bool {
        self.size.is_none()
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    pub fn last_access(&self) -> Option<SystemTime> {
        self.last_access
    }
}

/// Last path component, NFC-normalised (macOS stores names decomposed).
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().nfc().collect::<String>())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn entry_from_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("test.txt");
        fs::write(&file_path, "hello").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = Entry::new(file_path.clone(), &metadata);

        assert_eq!(entry.name(), "test.txt");
        assert_eq!(entry.size(), Some(5));
        assert!(!entry.is_dir());
        assert!(!entry.is_hidden());
        assert!(!entry.is_pending());
        assert_eq!(entry.path(), file_path);
    }

    #[test]
    fn directory_starts_pending() {
        let tmp = TempDir::new().unwrap();
        let dir_path = tmp.path().join("subdir");
        fs::create_dir(&dir_path).unwrap();
        fs::write(dir_path.join("a.txt"), "data").unwrap();

        let metadata = fs::metadata(&dir_path).unwrap();
        let entry = Entry::new(dir_path, &metadata);

        assert!(entry.is_dir());
        assert!(entry.is_pending());
        assert_eq!(entry.size_or_zero(), 0);
    }

    #[test]
    fn with_size_resolves_pending_once() {
        let entry = Entry::seeded_dir(PathBuf::from("/r/proj"), None, None);
        let resolved = entry.with_size(42);
        assert_eq!(resolved.size(), Some(42));

        let again = resolved.with_size(7);
        assert_eq!(again.size(), Some(42), "resolved size must not change");
    }

    #[test]
    fn seeded_dir_with_declared_size() {
        let entry = Entry::seeded_dir(PathBuf::from("/r/app"), Some(1024), None);
        assert_eq!(entry.name(), "app");
        assert!(entry.is_dir());
        assert_eq!(entry.size(), Some(1024));
    }

    #[test]
    fn hidden_entry_detected() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join(".hidden");
        fs::write(&file_path, "secret").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = Entry::new(file_path, &metadata);

        assert!(entry.is_hidden());
        assert_eq!(entry.size(), Some(6));
    }

    #[test]
    fn unicode_name_preserved() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("한글파일.txt");
        fs::write(&file_path, "내용").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = Entry::new(file_path, &metadata);

        assert_eq!(entry.name(), "한글파일.txt");
    }
}
