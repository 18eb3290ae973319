//! Mole: an interactive disk usage analyser built with ratatui.
//!
//! This binary initialises the terminal, runs the main event loop,
//! and restores the terminal on exit or panic.

mod app;
mod background;
mod input;
mod render;
mod ui;

use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mole_core::{Config, Keymap, RuntimeConfig};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::app::{initial_entries, App};
use crate::background::{spawn_task, Task, TaskMessage};
use crate::input::{handle_key, InputState};
use crate::render::{list_height, render};

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Installs a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_tracing() {
    let log_path = std::env::temp_dir().join("mole.log");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(move || {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        })
        .init();
}

/// Loads `config.toml` and `keymap.toml`, falling back to defaults on error.
fn load_settings(runtime: &RuntimeConfig) -> (Config, Keymap) {
    let config = Config::load_or_default(&runtime.settings_path()).unwrap_or_else(|e| {
        tracing::error!("Invalid config, using defaults: {e}");
        Config::default()
    });
    let keymap = match Keymap::load(&runtime.keymap_path()) {
        Ok(keymap) => keymap,
        Err(e) if e.is_not_found() => Keymap::default(),
        Err(e) => {
            tracing::error!("Invalid keymap, using defaults: {e}");
            Keymap::default()
        }
    };
    (config, keymap)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let runtime = RuntimeConfig::from_env().context("cannot resolve home directory")?;
    let (config, keymap) = load_settings(&runtime);

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let start_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| cwd.clone());
    let root = start_dir
        .canonicalize()
        .with_context(|| format!("cannot open {}", start_dir.display()))?;
    let entries = initial_entries(&runtime, &root, &cwd, config.general.show_hidden)
        .with_context(|| format!("cannot read {}", root.display()))?;

    tracing::info!(
        root = %root.display(),
        projects = runtime.projects_enabled(),
        "starting"
    );
    let app = App::new(root, entries, runtime, config, keymap);

    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let result = run_app(&mut terminal, app).await;

    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<TaskMessage>();

    let mut app = app.restore_session();
    let start = app.measure_task();
    spawn(&app, start, &tx);

    let mut input_state = InputState::new();

    loop {
        // 1. Drain background completions
        while let Ok(msg) = rx.try_recv() {
            let (next, task) = app.on_message(msg);
            app = next;
            if let Some(task) = task {
                spawn(&app, task, &tx);
            }
        }

        // 2. Render
        let height = list_height(terminal.size()?.height, app.view().search_mode());
        app = app.with_viewport(height);
        terminal.draw(|f| render(f, &app))?;

        if app.should_quit() {
            break;
        }

        // 3. Poll for crossterm events
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let (action, new_input_state) =
                    handle_key(key, app.input_mode(), &input_state, app.keymap());
                input_state = new_input_state;

                let (next, task) = app.with_clear_status().dispatch(action);
                app = next;
                if let Some(task) = task {
                    spawn(&app, task, &tx);
                }
            }
        }
    }

    app.save_session();
    Ok(())
}

fn spawn(app: &App, task: Task, tx: &mpsc::UnboundedSender<TaskMessage>) {
    tracing::debug!(?task, "spawning background task");
    spawn_task(task, app.vault(), app.counters(), tx);
}
