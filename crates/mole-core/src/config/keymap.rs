//! Key binding configuration.
//!
//! Key names (`"j"`, `"gg"`, `"Space"`, ...) map to [`Action`] values. A user
//! `keymap.toml` is layered over the vim-style defaults:
//!
//! ```toml
//! [bindings]
//! x = "delete"     # add a binding
//! d = "none"       # remove a default
//! ```
//!
//! Action ids are resolved through [`ActionRegistry::find_by_id`].

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::action::{Action, ActionRegistry};
use crate::error::{CoreError, CoreResult};

/// Action id that removes a binding instead of adding one.
const UNBIND: &str = "none";

const DEFAULT_BINDINGS: &[(&str, Action)] = &[
    ("j", Action::CursorDown),
    ("k", Action::CursorUp),
    ("h", Action::GoParent),
    ("l", Action::EnterDir),
    ("gg", Action::CursorTop),
    ("G", Action::CursorBottom),
    ("Enter", Action::EnterDir),
    ("r", Action::Refresh),
    ("Space", Action::ToggleSelect),
    ("d", Action::Delete),
    ("u", Action::Undo),
    ("e", Action::Export),
    ("/", Action::Search),
    ("D", Action::Duplicates),
    ("L", Action::LargeFiles),
    ("p", Action::Pin),
    ("I", Action::Discover),
    ("q", Action::Quit),
    ("?", Action::Help),
];

#[derive(Debug, Default, Deserialize)]
struct KeymapFile {
    #[serde(default)]
    bindings: HashMap<String, String>,
}

/// Resolved key bindings plus the reverse index used by the help overlay.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<String, Action>,
    keys_by_action: HashMap<Action, Vec<String>>,
}

impl Default for Keymap {
    fn default() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .map(|(key, action)| ((*key).to_string(), *action))
            .collect();
        Self::from_bindings(bindings)
    }
}

impl Keymap {
    fn from_bindings(bindings: HashMap<String, Action>) -> Self {
        let mut keys_by_action: HashMap<Action, Vec<String>> = HashMap::new();
        for (key, action) in &bindings {
            keys_by_action.entry(*action).or_default().push(key.clone());
        }
        for keys in keys_by_action.values_mut() {
            keys.sort();
        }
        Self {
            bindings,
            keys_by_action,
        }
    }

    /// Loads `path` and layers its bindings over the defaults.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(path, e))?;
        let file: KeymapFile =
            toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        Ok(Self::default().overlay(file))
    }

    fn overlay(self, file: KeymapFile) -> Self {
        let registry = ActionRegistry::new();
        let mut bindings = self.bindings;
        for (key, id) in file.bindings {
            if id == UNBIND {
                bindings.remove(&key);
                continue;
            }
            match registry.find_by_id(&id) {
                Some(action) => {
                    bindings.insert(key, action);
                }
                None => tracing::warn!(key = %key, id = %id, "ignoring unknown action in keymap"),
            }
        }
        Self::from_bindings(bindings)
    }

    pub fn action_for_key(&self, key: &str) -> Option<Action> {
        self.bindings.get(key).copied()
    }

    /// Keys bound to `action`, sorted, or `None` if it is unbound.
    pub fn keys_for_action(&self, action: Action) -> Option<&[String]> {
        self.keys_by_action.get(&action).map(Vec::as_slice)
    }
}
