use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mole_core::{Action, ExportFormat, Keymap};

use crate::app::InputMode;

/// Actions that can result from a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// A keymap action.
    Run(Action),
    /// Quit the application (Ctrl+C).
    Quit,
    /// Leave search mode and drop the query.
    ClearSearch,
    /// User confirmed the pending delete.
    ConfirmApproved,
    ConfirmCancelled,
    /// Append a character to the search query.
    SearchChar(char),
    /// Remove the last character from the search query.
    SearchBackspace,
    /// Stop typing and keep the query.
    SearchConfirm,
    /// Stop typing and clear the query.
    SearchCancel,
    SearchDown,
    SearchUp,
    ExportFormat(ExportFormat),
    /// Switch to the other export format.
    ExportCycleFormat,
    /// Fill the destination with the default export path.
    ExportSetDestination,
    ExportConfirm,
    ExportCancel,
    CloseHelp,
    /// No action for this key.
    None,
}

/// Tracks state for multi-key sequences like "gg".
#[derive(Debug, Default)]
pub struct InputState {
    pending_g: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self { pending_g: false }
    }
}

/// Maps a key event to an InputAction based on the current input mode.
/// Returns the action and a new InputState (immutable pattern).
///
/// In Normal mode, character keys are resolved through the `Keymap`;
/// arrow keys, Ctrl+C, Ctrl+Z, Esc, and the `gg` sequence are hardcoded.
/// Modal modes (Export, Confirm, Search typing, Help) are hardcoded.
pub fn handle_key(
    key: KeyEvent,
    mode: InputMode,
    state: &InputState,
    keymap: &Keymap,
) -> (InputAction, InputState) {
    match mode {
        InputMode::Export => handle_export_key(key),
        InputMode::Confirm => handle_confirm_key(key),
        InputMode::SearchTyping => handle_search_key(key),
        InputMode::Help => handle_help_key(key),
        InputMode::Normal => handle_normal_key(key, state, keymap),
    }
}

/// Key name used in keymap files for `code`, when it has one.
fn key_name(code: KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(' ') => Some("Space".to_string()),
        KeyCode::Char(c) => Some(c.to_string()),
        KeyCode::Enter => Some("Enter".to_string()),
        KeyCode::Tab => Some("Tab".to_string()),
        KeyCode::Backspace => Some("Backspace".to_string()),
        KeyCode::Delete => Some("Delete".to_string()),
        _ => None,
    }
}

fn handle_normal_key(
    key: KeyEvent,
    state: &InputState,
    keymap: &Keymap,
) -> (InputAction, InputState) {
    // Handle "gg" sequence
    if state.pending_g {
        let new_state = InputState { pending_g: false };
        return match key.code {
            KeyCode::Char('g') => (InputAction::Run(Action::CursorTop), new_state),
            _ => (InputAction::None, new_state),
        };
    }

    let new_state = InputState { pending_g: false };
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Hardcoded keys: arrows, Esc, Ctrl+C, Ctrl+Z (not remappable)
    let action = match key.code {
        KeyCode::Char('c') if ctrl => InputAction::Quit,
        KeyCode::Char('z') if ctrl => InputAction::Run(Action::Undo),
        KeyCode::Down => InputAction::Run(Action::CursorDown),
        KeyCode::Up => InputAction::Run(Action::CursorUp),
        KeyCode::Left => InputAction::Run(Action::GoParent),
        KeyCode::Right => InputAction::Run(Action::EnterDir),
        KeyCode::Home => InputAction::Run(Action::CursorTop),
        KeyCode::End => InputAction::Run(Action::CursorBottom),
        KeyCode::Esc => InputAction::ClearSearch,
        KeyCode::Char('g') if keymap.action_for_key("g").is_none() => {
            return (InputAction::None, InputState { pending_g: true });
        }
        code => key_name(code)
            .and_then(|name| keymap.action_for_key(&name))
            .map_or(InputAction::None, InputAction::Run),
    };

    (action, new_state)
}

fn handle_search_key(key: KeyEvent) -> (InputAction, InputState) {
    let new_state = InputState::new();
    let action = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
        KeyCode::Esc => InputAction::SearchCancel,
        KeyCode::Enter => InputAction::SearchConfirm,
        KeyCode::Backspace => InputAction::SearchBackspace,
        KeyCode::Down => InputAction::SearchDown,
        KeyCode::Up => InputAction::SearchUp,
        KeyCode::Char(c) => InputAction::SearchChar(c),
        _ => InputAction::None,
    };
    (action, new_state)
}

fn handle_confirm_key(key: KeyEvent) -> (InputAction, InputState) {
    let new_state = InputState::new();
    let action = match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => InputAction::ConfirmApproved,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => InputAction::ConfirmCancelled,
        _ => InputAction::None,
    };
    (action, new_state)
}

fn handle_export_key(key: KeyEvent) -> (InputAction, InputState) {
    let new_state = InputState::new();
    let action = match key.code {
        KeyCode::Char('j') => InputAction::ExportFormat(ExportFormat::Json),
        KeyCode::Char('k') => InputAction::ExportFormat(ExportFormat::Csv),
        KeyCode::Tab => InputAction::ExportCycleFormat,
        KeyCode::Char('d') => InputAction::ExportSetDestination,
        KeyCode::Enter => InputAction::ExportConfirm,
        KeyCode::Esc => InputAction::ExportCancel,
        _ => InputAction::None,
    };
    (action, new_state)
}

fn handle_help_key(key: KeyEvent) -> (InputAction, InputState) {
    let new_state = InputState::new();
    let action = match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => InputAction::CloseHelp,
        _ => InputAction::None,
    };
    (action, new_state)
}
