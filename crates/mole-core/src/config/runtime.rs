//! Process-wide locations and feature toggles, resolved once at startup.
//!
//! Every store in this crate takes a [`RuntimeConfig`] (or paths derived from
//! it) in its constructor instead of consulting the environment itself.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// Environment variable enabling projects mode (sessions, duplicates, pins).
pub const PROJECTS_FLAG_VAR: &str = "MO_FEATURE_PROJECTS";

/// Resolved file locations plus the projects-mode capability flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    home: PathBuf,
    projects_enabled: bool,
}

impl RuntimeConfig {
    /// Resolves the home directory and reads [`PROJECTS_FLAG_VAR`].
    ///
    /// # Errors
    ///
    /// [`CoreError::HomeUnavailable`] if no home directory can be determined.
    pub fn from_env() -> CoreResult<Self> {
        let home = dirs::home_dir().ok_or(CoreError::HomeUnavailable)?;
        let flag = std::env::var(PROJECTS_FLAG_VAR).ok();
        Ok(Self::with_home(home, parse_flag(flag.as_deref())))
    }

    /// Builds a config rooted at an explicit home directory.
    pub fn with_home(home: impl Into<PathBuf>, projects_enabled: bool) -> Self {
        Self {
            home: home.into(),
            projects_enabled,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Whether projects mode (sessions, duplicate grouping, pins) is on.
    pub fn projects_enabled(&self) -> bool {
        self.projects_enabled
    }

    /// Shared directory (`~/.orbit`) holding the authoritative focus and session files.
    pub fn primary_dir(&self) -> PathBuf {
        self.home.join(".orbit")
    }

    /// Legacy state directory (`~/.mole`).
    pub fn legacy_dir(&self) -> PathBuf {
        self.home.join(".mole")
    }

    /// Legacy configuration directory (`~/.config/mole`).
    pub fn config_dir(&self) -> PathBuf {
        self.home.join(".config").join("mole")
    }

    pub fn focus_path(&self) -> PathBuf {
        self.primary_dir().join("focus.json")
    }

    pub fn legacy_focus_path(&self) -> PathBuf {
        self.config_dir().join("focus.json")
    }

    pub fn session_path(&self) -> PathBuf {
        self.primary_dir().join("session.json")
    }

    pub fn legacy_session_path(&self) -> PathBuf {
        self.legacy_dir().join("session.json")
    }

    /// Base directory under which each trash transaction gets its own root.
    pub fn trash_base(&self) -> PathBuf {
        self.legacy_dir().join("trash")
    }

    /// Read-only external index that may seed the listing.
    pub fn external_index_path(&self) -> PathBuf {
        self.primary_dir().join("index.json")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir().join("config.toml")
    }

    pub fn keymap_path(&self) -> PathBuf {
        self.config_dir().join("keymap.toml")
    }

    /// Default directory offered as an export destination.
    pub fn export_dir(&self) -> PathBuf {
        self.home.join("Desktop")
    }
}

/// Interprets an environment-style boolean. Unset or unrecognised means off.
pub fn parse_flag(value: Option<&str>) -> bool {
    match value {
        Some(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        ),
        None => false,
    }
}
