//! Error types for `mole-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. Absence of optional state
//! (no index, no session, no focus list) is never an error; see the
//! individual stores for how they report it.

use std::path::PathBuf;

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the caller to render a
/// short status message.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A persisted JSON document exists but cannot be parsed.
    #[error("corrupt state file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// `move_to_trash` was called with no paths.
    #[error("no paths to trash")]
    EmptyTrashRequest,

    /// Restoring would overwrite something created at the original path.
    #[error("refusing to overwrite existing path: {0}")]
    RestoreTargetExists(PathBuf),

    /// The home directory could not be resolved.
    #[error("could not determine home directory")]
    HomeUnavailable,

    /// A path is not located under the current root.
    #[error("path is outside the current root: {0}")]
    OutsideRoot(PathBuf),

    /// Writing an export file failed for a non-I/O reason.
    #[error("export error: {0}")]
    Export(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `mole-core`.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Maps an I/O error on `path` to the most specific variant.
    pub fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }

    /// Returns `true` for the "file is simply not there" case.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn not_found_displays_path() {
        let err = CoreError::NotFound(PathBuf::from("/missing/file"));
        assert_eq!(err.to_string(), "path not found: /missing/file");
    }

    #[test]
    fn corrupt_displays_path_and_reason() {
        let err = CoreError::Corrupt {
            path: PathBuf::from("/x/session.json"),
            reason: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt state file /x/session.json: expected value"
        );
    }

    #[test]
    fn empty_trash_request_message() {
        assert_eq!(CoreError::EmptyTrashRequest.to_string(), "no paths to trash");
    }

    #[test]
    fn from_io_maps_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = CoreError::from_io(Path::new("/a"), io);
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn from_io_maps_permission_denied() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = CoreError::from_io(Path::new("/secret"), io);
        assert_eq!(err.to_string(), "permission denied: /secret");
        assert!(!err.is_not_found());
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
        assert!(core_err.to_string().contains("boom"));
    }
}
