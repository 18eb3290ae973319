//! Unified action system for Mole.
//!
//! Every user-triggerable action is represented by the [`Action`] enum.
//! [`ActionRegistry`] provides metadata (id, name, description, category)
//! used to resolve keymap files and to render the help overlay.

/// Every user-triggerable action in Mole.
///
/// Variants carry no parameters; context is determined at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Navigation
    CursorUp,
    CursorDown,
    CursorTop,
    CursorBottom,
    EnterDir,
    GoParent,
    Refresh,
    // Selection and file operations
    ToggleSelect,
    Delete,
    Undo,
    Export,
    // Modes
    Search,
    Duplicates,
    LargeFiles,
    // Projects
    Pin,
    Discover,
    // System
    Help,
    Quit,
}

/// Broad category for grouping actions in the help overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Navigation,
    FileOps,
    View,
    Projects,
    System,
}

impl ActionCategory {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::FileOps => "File",
            Self::View => "View",
            Self::Projects => "Projects",
            Self::System => "System",
        }
    }
}

/// Metadata for a single action.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    pub action: Action,
    /// Snake-case identifier used in `keymap.toml` (e.g. `"cursor_up"`).
    pub id: &'static str,
    /// Human-readable name (e.g. `"Cursor Up"`).
    pub name: &'static str,
    pub description: &'static str,
    pub category: ActionCategory,
}

/// Registry of all available actions.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    descriptors: Vec<ActionDescriptor>,
}

macro_rules! descriptor {
    ($action:ident, $id:literal, $name:literal, $desc:literal, $cat:ident) => {
        ActionDescriptor {
            action: Action::$action,
            id: $id,
            name: $name,
            description: $desc,
            category: ActionCategory::$cat,
        }
    };
}

impl ActionRegistry {
    /// Builds the registry containing every known action.
    pub fn new() -> Self {
        let descriptors = vec![
            descriptor!(CursorUp, "cursor_up", "Cursor Up", "Move cursor up one entry", Navigation),
            descriptor!(CursorDown, "cursor_down", "Cursor Down", "Move cursor down one entry", Navigation),
            descriptor!(CursorTop, "go_first", "Go to First", "Jump to the first entry", Navigation),
            descriptor!(CursorBottom, "go_last", "Go to Last", "Jump to the last entry", Navigation),
            descriptor!(EnterDir, "enter_dir", "Enter Directory", "Analyze the selected directory", Navigation),
            descriptor!(GoParent, "go_parent", "Go Parent", "Analyze the parent directory", Navigation),
            descriptor!(Refresh, "refresh", "Refresh", "Re-read and re-measure the current directory", Navigation),
            descriptor!(ToggleSelect, "toggle_select", "Toggle Select", "Add or remove the entry from the multi-selection", FileOps),
            descriptor!(Delete, "delete", "Delete", "Move selected entries to trash", FileOps),
            descriptor!(Undo, "undo", "Undo", "Restore the last trashed entries", FileOps),
            descriptor!(Export, "export", "Export", "Export entries as JSON or CSV", FileOps),
            descriptor!(Search, "search", "Search", "Filter entries by name or path", View),
            descriptor!(Duplicates, "duplicates", "Duplicates", "Group projects sharing a fingerprint", View),
            descriptor!(LargeFiles, "large_files", "Large Files", "Show the largest files under the root", View),
            descriptor!(Pin, "pin", "Pin/Unpin", "Toggle the entry in the focus list", Projects),
            descriptor!(Discover, "discover", "Index Projects", "Discover projects and rebuild the index", Projects),
            descriptor!(Help, "help", "Help", "Show key bindings", System),
            descriptor!(Quit, "quit", "Quit", "Save the session and exit", System),
        ];
        Self { descriptors }
    }

    /// Returns every descriptor in registration order.
    pub fn all(&self) -> &[ActionDescriptor] {
        &self.descriptors
    }

    /// Looks up an action by its keymap identifier.
    pub fn find_by_id(&self, id: &str) -> Option<Action> {
        self.descriptors
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.action)
    }

    /// Returns the descriptor for a given action.
    pub fn descriptor(&self, action: Action) -> Option<&ActionDescriptor> {
        self.descriptors.iter().find(|d| d.action == action)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
