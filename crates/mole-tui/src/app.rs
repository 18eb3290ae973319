use std::path::{Path, PathBuf};
use std::sync::Arc;

use mole_core::projects::{group_duplicates, load_seed_entries, relative_path};
use mole_core::{
    export_entries, read_directory, Action, ActionRegistry, Config, CoreResult, DuplicateGroup,
    Entry, ExportFormat, FocusList, FocusStore, Keymap, PinChange, ProjectIndex, ProjectRecord,
    RuntimeConfig, ScanCounters, Session, SessionStore, TrashTransaction, TrashVault, ViewState,
};

use crate::background::{Task, TaskMessage};
use crate::input::InputAction;

/// Top-level listing mode shown in the header badge.
///
/// Search, duplicates and large-files are independent flags on the view;
/// when several are on, the first in that order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
    Duplicates,
    LargeFiles,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Browse => "BROWSE",
            Self::Search => "SEARCH",
            Self::Duplicates => "DUPLICATES",
            Self::LargeFiles => "LARGE",
        }
    }
}

/// Modal layer drawn over the listing. While one is open it receives all input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    ConfirmDelete(Vec<PathBuf>),
    Export(ExportModal),
    Help,
}

/// State of the export dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportModal {
    format: ExportFormat,
    destination: Option<PathBuf>,
}

impl ExportModal {
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    pub fn preview(&self) -> String {
        match &self.destination {
            None => "No destination set".to_string(),
            Some(dest) => format!("Will write {} to {}", self.format.label(), dest.display()),
        }
    }
}

/// Which input handler receives the next key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    SearchTyping,
    Confirm,
    Export,
    Help,
}

/// Builds the starting listing for `root`.
///
/// Entries from the external index are used when it declares the same root;
/// otherwise the directory is read.
pub fn initial_entries(
    runtime: &RuntimeConfig,
    root: &Path,
    cwd: &Path,
    show_hidden: bool,
) -> CoreResult<Vec<Entry>> {
    match load_seed_entries(&runtime.external_index_path(), root, cwd) {
        Ok(Some(entries)) => {
            tracing::info!(count = entries.len(), "listing seeded from external index");
            return Ok(entries);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Ignoring external index: {e}"),
    }
    read_directory(root, show_hidden)
}

/// The application controller.
///
/// The single writer of UI state. Key presses and background completions
/// each produce a new `App`; work that must leave the event loop is returned
/// as a [`Task`] for the caller to spawn.
#[derive(Debug, Clone)]
pub struct App {
    view: ViewState,
    overlay: Overlay,
    search_typing: bool,
    should_quit: bool,
    status_message: Option<String>,
    /// The only restorable delete. A newer delete overwrites it.
    pending_undo: Option<TrashTransaction>,
    /// Loaded session waiting for the initial sizes to settle.
    deferred_session: Option<Session>,
    delete_in_flight: bool,
    restore_in_flight: bool,
    discovery_in_flight: bool,
    index: Option<ProjectIndex>,
    focus: FocusList,
    counters: Arc<ScanCounters>,
    runtime: RuntimeConfig,
    config: Config,
    keymap: Keymap,
    action_registry: ActionRegistry,
    vault: TrashVault,
    focus_store: FocusStore,
    session_store: SessionStore,
}

impl App {
    pub fn new(
        root: PathBuf,
        entries: Vec<Entry>,
        runtime: RuntimeConfig,
        config: Config,
        keymap: Keymap,
    ) -> Self {
        let focus_store = FocusStore::new(&runtime);
        let session_store = SessionStore::new(&runtime, config.session.ttl_hours);
        let index = load_index(&runtime, &root);
        Self {
            view: ViewState::new(root.clone()).with_root(root, entries),
            overlay: Overlay::None,
            search_typing: false,
            should_quit: false,
            status_message: None,
            pending_undo: None,
            deferred_session: None,
            delete_in_flight: false,
            restore_in_flight: false,
            discovery_in_flight: false,
            index,
            focus: focus_store.load(),
            counters: Arc::new(ScanCounters::new()),
            vault: TrashVault::new(runtime.trash_base()),
            action_registry: ActionRegistry::new(),
            focus_store,
            session_store,
            runtime,
            config,
            keymap,
        }
    }

    // --- Accessors ---

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn pending_undo(&self) -> Option<&TrashTransaction> {
        self.pending_undo.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.delete_in_flight || self.restore_in_flight
    }

    pub fn is_discovering(&self) -> bool {
        self.discovery_in_flight
    }

    pub fn index(&self) -> Option<&ProjectIndex> {
        self.index.as_ref()
    }

    pub fn focus(&self) -> &FocusList {
        &self.focus
    }

    pub fn counters(&self) -> &Arc<ScanCounters> {
        &self.counters
    }

    pub fn vault(&self) -> &TrashVault {
        &self.vault
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn action_registry(&self) -> &ActionRegistry {
        &self.action_registry
    }

    pub fn projects_enabled(&self) -> bool {
        self.runtime.projects_enabled()
    }

    pub fn mode(&self) -> Mode {
        if self.view.search_mode() {
            Mode::Search
        } else if self.view.duplicates_mode() {
            Mode::Duplicates
        } else if self.view.show_large_files() {
            Mode::LargeFiles
        } else {
            Mode::Browse
        }
    }

    pub fn input_mode(&self) -> InputMode {
        match self.overlay {
            Overlay::Export(_) => InputMode::Export,
            Overlay::ConfirmDelete(_) => InputMode::Confirm,
            Overlay::Help => InputMode::Help,
            Overlay::None if self.search_typing => InputMode::SearchTyping,
            Overlay::None => InputMode::Normal,
        }
    }

    pub fn is_search_typing(&self) -> bool {
        self.search_typing
    }

    /// Duplicate groups over the current listing, recomputed on every call.
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        match &self.index {
            Some(index) => group_duplicates(
                index,
                self.view.entries(),
                self.view.root(),
                self.projects_enabled(),
            ),
            None => Vec::new(),
        }
    }

    /// Index record for the highlighted entry, if it is a known project.
    pub fn highlighted_record(&self) -> Option<&ProjectRecord> {
        let rel = self.highlighted_rel()?;
        self.index.as_ref()?.find(&rel)
    }

    pub fn is_highlighted_pinned(&self) -> bool {
        self.view.highlighted().is_some_and(|e| self.is_pinned(e))
    }

    pub fn is_pinned(&self, entry: &Entry) -> bool {
        relative_path(self.view.root(), entry.path()).is_ok_and(|rel| self.focus.is_pinned(&rel))
    }

    fn highlighted_rel(&self) -> Option<String> {
        let entry = self.view.highlighted()?;
        relative_path(self.view.root(), entry.path()).ok()
    }

    // --- Simple transitions ---

    pub fn with_status(self, msg: impl Into<String>) -> Self {
        Self {
            status_message: Some(msg.into()),
            ..self
        }
    }

    pub fn with_clear_status(self) -> Self {
        Self {
            status_message: None,
            ..self
        }
    }

    pub fn with_view(self, view: ViewState) -> Self {
        Self { view, ..self }
    }

    pub fn with_quit(self) -> Self {
        Self {
            should_quit: true,
            ..self
        }
    }

    /// Keeps the cursor inside a list area of `height` rows.
    pub fn with_viewport(self, height: usize) -> Self {
        let view = self.view.clone().scroll_into_view(height);
        self.with_view(view)
    }

    fn with_overlay(self, overlay: Overlay) -> Self {
        Self { overlay, ..self }
    }

    /// Background work for the current listing: pending directory sizes and
    /// the large-files list.
    pub fn measure_task(&self) -> Task {
        Task::Measure {
            root: self.view.root().to_path_buf(),
            pending: self
                .view
                .entries()
                .iter()
                .filter(|e| e.is_pending() && e.is_dir())
                .map(|e| e.path().to_path_buf())
                .collect(),
            large_files_limit: self.config.scan.large_files_limit,
        }
    }

    // --- Input dispatch ---

    /// Applies one decoded key press.
    pub fn dispatch(self, input: InputAction) -> (Self, Option<Task>) {
        match input {
            InputAction::Run(action) => self.run_action(action),
            InputAction::Quit => (self.with_quit(), None),
            InputAction::ClearSearch => {
                let view = self.view.clone().clear_search();
                (self.with_view(view), None)
            }
            InputAction::ConfirmApproved => self.confirm_delete(),
            InputAction::ConfirmCancelled => (self.with_overlay(Overlay::None), None),
            InputAction::SearchChar(c) => {
                let view = self.view.clone().push_query_char(c);
                (self.with_view(view), None)
            }
            InputAction::SearchBackspace => {
                let view = self.view.clone().pop_query_char();
                (self.with_view(view), None)
            }
            InputAction::SearchConfirm => (
                Self {
                    search_typing: false,
                    ..self
                },
                None,
            ),
            InputAction::SearchCancel => {
                let view = self.view.clone().clear_search();
                (
                    Self {
                        search_typing: false,
                        ..self
                    }
                    .with_view(view),
                    None,
                )
            }
            InputAction::SearchDown => {
                let view = self.view.clone().move_down();
                (self.with_view(view), None)
            }
            InputAction::SearchUp => {
                let view = self.view.clone().move_up();
                (self.with_view(view), None)
            }
            InputAction::ExportFormat(format) => (self.with_export_format(format), None),
            InputAction::ExportCycleFormat => (self.with_next_export_format(), None),
            InputAction::ExportSetDestination => (self.with_default_export_destination(), None),
            InputAction::ExportConfirm => (self.perform_export(), None),
            InputAction::ExportCancel | InputAction::CloseHelp => {
                (self.with_overlay(Overlay::None), None)
            }
            InputAction::None => (self, None),
        }
    }

    fn run_action(self, action: Action) -> (Self, Option<Task>) {
        match action {
            Action::CursorUp => {
                let view = self.view.clone().move_up();
                (self.with_view(view), None)
            }
            Action::CursorDown => {
                let view = self.view.clone().move_down();
                (self.with_view(view), None)
            }
            Action::CursorTop => {
                let view = self.view.clone().go_to_first();
                (self.with_view(view), None)
            }
            Action::CursorBottom => {
                let view = self.view.clone().go_to_last();
                (self.with_view(view), None)
            }
            Action::EnterDir => self.enter_dir(),
            Action::GoParent => self.go_parent(),
            Action::Refresh => self.refresh(),
            Action::ToggleSelect => {
                let view = self.view.clone().toggle_highlighted();
                (self.with_view(view), None)
            }
            Action::Delete => self.begin_delete(),
            Action::Undo => self.begin_undo(),
            Action::Export => (self.begin_export(), None),
            Action::Search => (self.begin_search(), None),
            Action::Duplicates => (self.toggle_duplicates(), None),
            Action::LargeFiles => {
                let on = !self.view.show_large_files();
                let view = self.view.clone().with_show_large_files(on);
                (self.with_view(view), None)
            }
            Action::Pin => (self.toggle_pin(), None),
            Action::Discover => self.begin_discover(),
            Action::Help => (self.with_overlay(Overlay::Help), None),
            Action::Quit => (self.with_quit(), None),
        }
    }

    // --- Navigation ---

    /// Switches the listing to `path`, reading it from disk.
    pub fn navigate_to(self, path: &Path) -> (Self, Option<Task>) {
        match read_directory(path, self.config.general.show_hidden) {
            Ok(entries) => {
                let index = load_index(&self.runtime, path);
                let view = self.view.clone().with_root(path.to_path_buf(), entries);
                let app = Self {
                    index,
                    search_typing: false,
                    ..self
                }
                .with_view(view);
                let task = app.measure_task();
                (app, Some(task))
            }
            Err(e) => (self.with_status(format!("Error: {e}")), None),
        }
    }

    fn enter_dir(self) -> (Self, Option<Task>) {
        let target = self
            .view
            .highlighted()
            .filter(|e| e.is_dir())
            .map(|e| e.path().to_path_buf());
        match target {
            Some(path) => self.navigate_to(&path),
            None => (self, None),
        }
    }

    fn go_parent(self) -> (Self, Option<Task>) {
        match self.view.root().parent().map(Path::to_path_buf) {
            Some(parent) => self.navigate_to(&parent),
            None => (self, None),
        }
    }

    /// Re-reads the current directory, keeping the cursor where possible.
    pub fn refresh(self) -> (Self, Option<Task>) {
        match read_directory(self.view.root(), self.config.general.show_hidden) {
            Ok(entries) => {
                let view = self.view.clone().with_entries(entries);
                let app = self.with_view(view);
                let task = app.measure_task();
                (app, Some(task))
            }
            Err(e) => (self.with_status(format!("Error: {e}")), None),
        }
    }

    fn begin_search(self) -> Self {
        let view = self.view.clone().with_search_mode(true);
        Self {
            search_typing: true,
            ..self
        }
        .with_view(view)
    }

    fn toggle_duplicates(self) -> Self {
        if !self.projects_enabled() {
            return self.with_status("Duplicates require projects mode");
        }
        let on = !self.view.duplicates_mode();
        let view = self.view.clone().with_duplicates_mode(on);
        self.with_view(view)
    }

    // --- Delete / undo ---

    /// Starts a delete of the multi-selection, or the highlighted entry.
    ///
    /// Refused while another delete or restore is still running.
    pub fn begin_delete(self) -> (Self, Option<Task>) {
        if self.is_busy() {
            return (self.with_status("A delete or restore is already running"), None);
        }
        let targets = self.view.delete_targets();
        if targets.is_empty() {
            return (self, None);
        }
        if self.config.general.confirm_delete {
            return (self.with_overlay(Overlay::ConfirmDelete(targets)), None);
        }
        self.start_trash(targets)
    }

    fn confirm_delete(self) -> (Self, Option<Task>) {
        match self.overlay.clone() {
            Overlay::ConfirmDelete(targets) => self.with_overlay(Overlay::None).start_trash(targets),
            _ => (self, None),
        }
    }

    fn start_trash(self, targets: Vec<PathBuf>) -> (Self, Option<Task>) {
        if self.is_busy() {
            return (self.with_status("A delete or restore is already running"), None);
        }
        let status = format!("Moving {} item(s) to trash...", targets.len());
        let app = Self {
            delete_in_flight: true,
            ..self
        }
        .with_status(status);
        (app, Some(Task::Trash(targets)))
    }

    /// Applies a finished move-to-trash.
    ///
    /// On success the transaction replaces any earlier undo slot. On failure
    /// some items may already be in the trash, so the listing is re-read.
    pub fn on_trash_complete(
        self,
        result: Result<TrashTransaction, String>,
    ) -> (Self, Option<Task>) {
        let app = Self {
            delete_in_flight: false,
            ..self
        };
        match result {
            Ok(transaction) => {
                let removed: Vec<PathBuf> = transaction
                    .items()
                    .iter()
                    .map(|item| item.original.clone())
                    .collect();
                let view = app.view.clone().without_paths(&removed);
                let status = format!("Moved {} item(s) to trash (u to undo)", removed.len());
                let app = Self {
                    pending_undo: Some(transaction),
                    ..app
                }
                .with_view(view)
                .with_status(status);
                (app, None)
            }
            Err(e) => {
                let (app, task) = app.refresh();
                (app.with_status(format!("Delete failed: {e}")), task)
            }
        }
    }

    /// Restores the last delete. The undo slot is emptied immediately.
    pub fn begin_undo(self) -> (Self, Option<Task>) {
        if self.is_busy() {
            return (self.with_status("A delete or restore is already running"), None);
        }
        match self.pending_undo.clone() {
            Some(transaction) => {
                let app = Self {
                    pending_undo: None,
                    restore_in_flight: true,
                    ..self
                }
                .with_status("Restoring...");
                (app, Some(Task::Restore(transaction)))
            }
            None => (self.with_status("Nothing to undo"), None),
        }
    }

    /// Applies a finished restore. A failed restore is not retried.
    pub fn on_restore_complete(
        self,
        restored: usize,
        result: Result<(), String>,
    ) -> (Self, Option<Task>) {
        let app = Self {
            restore_in_flight: false,
            ..self
        };
        let (app, task) = app.refresh();
        match result {
            Ok(()) => (app.with_status(format!("Restored {restored} item(s)")), task),
            Err(e) => (app.with_status(format!("Undo failed: {e}")), task),
        }
    }

    /// Routes a background completion to its handler.
    pub fn on_message(self, msg: TaskMessage) -> (Self, Option<Task>) {
        match msg {
            TaskMessage::TrashDone(result) => self.on_trash_complete(result),
            TaskMessage::RestoreDone { restored, result } => {
                self.on_restore_complete(restored, result)
            }
            TaskMessage::DiscoveryDone(result) => (self.on_discovery_complete(result), None),
            TaskMessage::EntrySized { path, size } => (self.on_entry_sized(&path, size), None),
            TaskMessage::LargeFilesDone { root, files } => {
                (self.on_large_files(&root, files), None)
            }
        }
    }

    // --- Scan completions ---

    pub fn on_entry_sized(self, path: &Path, size: u64) -> Self {
        let view = self.view.clone().with_entry_size(path, size);
        let app = self.with_view(view);
        if app.view.pending_count() > 0 {
            return app;
        }
        match app.deferred_session.clone() {
            Some(session) => Self {
                deferred_session: None,
                ..app
            }
            .apply_session(&session),
            None => app,
        }
    }

    /// Stores the large-files list unless the listing has moved elsewhere.
    pub fn on_large_files(self, root: &Path, files: Vec<Entry>) -> Self {
        if root != self.view.root() {
            return self;
        }
        let view = self.view.clone().with_large_files(files);
        self.with_view(view)
    }

    // --- Projects ---

    pub fn begin_discover(self) -> (Self, Option<Task>) {
        if !self.projects_enabled() {
            return (self.with_status("Project indexing requires projects mode"), None);
        }
        if self.discovery_in_flight {
            return (self, None);
        }
        let task = Task::Discover {
            root: self.view.root().to_path_buf(),
            focus: self.focus.clone(),
        };
        let app = Self {
            discovery_in_flight: true,
            ..self
        }
        .with_status("Indexing projects...");
        (app, Some(task))
    }

    pub fn on_discovery_complete(self, result: Result<ProjectIndex, String>) -> Self {
        let app = Self {
            discovery_in_flight: false,
            ..self
        };
        match result {
            Ok(index) => {
                let status = format!("Indexed {} project(s)", index.len());
                let same_root = index.root == app.view.root();
                let app = app.with_status(status);
                if same_root {
                    Self {
                        index: Some(index),
                        ..app
                    }
                } else {
                    app
                }
            }
            Err(e) => app.with_status(format!("Discovery failed: {e}")),
        }
    }

    /// Pins or unpins the highlighted entry. Entries outside the root are skipped.
    pub fn toggle_pin(self) -> Self {
        let Some(entry) = self.view.highlighted() else {
            return self;
        };
        let name = entry.name().to_string();
        let Ok(rel) = relative_path(self.view.root(), entry.path()) else {
            return self;
        };
        match self.focus_store.toggle(&rel) {
            Ok(Some((focus, change))) => {
                let status = match change {
                    PinChange::Pinned => format!("Pinned {name}"),
                    PinChange::Unpinned => format!("Unpinned {name}"),
                };
                Self { focus, ..self }.with_status(status)
            }
            Ok(None) => self,
            Err(e) => self.with_status(format!("Pin failed: {e}")),
        }
    }

    // --- Export ---

    fn begin_export(self) -> Self {
        self.with_overlay(Overlay::Export(ExportModal::default()))
    }

    fn with_next_export_format(self) -> Self {
        match &self.overlay {
            Overlay::Export(modal) => {
                let format = modal.format.next();
                self.with_export_format(format)
            }
            _ => self,
        }
    }

    fn with_export_format(self, format: ExportFormat) -> Self {
        match self.overlay.clone() {
            Overlay::Export(modal) => self.with_overlay(Overlay::Export(ExportModal {
                format,
                ..modal
            })),
            _ => self,
        }
    }

    fn with_default_export_destination(self) -> Self {
        match self.overlay.clone() {
            Overlay::Export(modal) => {
                let destination = modal.format.default_destination(&self.runtime.export_dir());
                self.with_overlay(Overlay::Export(ExportModal {
                    destination: Some(destination),
                    ..modal
                }))
            }
            _ => self,
        }
    }

    /// Writes the export and closes the dialog, reporting the outcome.
    fn perform_export(self) -> Self {
        let Overlay::Export(modal) = self.overlay.clone() else {
            return self;
        };
        let app = self.with_overlay(Overlay::None);
        let Some(dest) = modal.destination else {
            return app.with_status("Export failed: no destination");
        };
        let entries = app.view.export_targets();
        match export_entries(&entries, modal.format, &dest) {
            Ok(()) => {
                tracing::info!(count = entries.len(), dest = %dest.display(), "export written");
                app.with_status(format!("Exported to {}", dest.display()))
            }
            Err(e) => app.with_status(format!("Export failed: {e}")),
        }
    }

    // --- Session ---

    /// Loads the saved session for the current root.
    ///
    /// The saved cursor index refers to the size-ranked listing, so while
    /// any size is pending the session is held back and applied by
    /// [`App::on_entry_sized`] once the last one arrives.
    pub fn restore_session(self) -> Self {
        match self.session_store.load() {
            Ok(Some(session)) if self.view.pending_count() > 0 => Self {
                deferred_session: Some(session),
                ..self
            },
            Ok(Some(session)) => self.apply_session(&session),
            Ok(None) => self,
            Err(e) => {
                tracing::warn!("Session load failed: {e}");
                self.with_status(format!("Session load failed: {e}"))
            }
        }
    }

    fn apply_session(self, session: &Session) -> Self {
        let (view, applied) = session.apply(self.view.clone());
        if applied {
            self.with_view(view).with_status("Session restored")
        } else {
            self
        }
    }

    pub fn save_session(&self) {
        if let Err(e) = self.session_store.save(&self.view) {
            tracing::warn!("Session save failed: {e}");
        }
    }
}

fn load_index(runtime: &RuntimeConfig, root: &Path) -> Option<ProjectIndex> {
    if !runtime.projects_enabled() {
        return None;
    }
    match ProjectIndex::load(root) {
        Ok(index) => Some(index),
        Err(e) if e.is_not_found() => None,
        Err(e) => {
            tracing::warn!("Ignoring project index: {e}");
            None
        }
    }
}
