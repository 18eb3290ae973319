//! Mole core library: the stateful backend behind the disk analyser.
//!
//! `mole-core` holds everything that carries invariants across destructive
//! or long-running operations, decoupled from any terminal frontend.
//!
//! # Modules
//!
//! - [`fs`]: listing entries, directory reads, size scanning, the trash vault.
//! - [`projects`]: project discovery, the fingerprint index, duplicate grouping.
//! - [`nav`]: the listing view model, search filter, and pinned focus list.
//! - [`store`]: session persistence and the primary/legacy dual-sink writer.
//! - [`export`]: JSON and CSV export of entries.
//! - [`config`]: runtime paths and capability flag, TOML settings, keymaps.
//! - [`error`]: unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod action;
pub mod config;
pub mod error;
pub mod export;
pub mod fs;
pub mod nav;
pub mod projects;
pub mod store;

pub use error::{CoreError, CoreResult};
pub use fs::entry::Entry;
pub use fs::ops::{rank_by_size, read_directory};
pub use fs::{ScanCounters, ScanProgress, TrashTransaction, TrashVault};
pub use nav::focus::{FocusList, FocusStore, PinChange};
pub use nav::view::ViewState;
pub use projects::{DuplicateGroup, ProjectIndex, ProjectRecord};
pub use store::{Session, SessionStore};

pub use action::{Action, ActionCategory, ActionDescriptor, ActionRegistry};
pub use config::keymap::Keymap;
pub use config::runtime::RuntimeConfig;
pub use config::settings::Config;
pub use export::{export_entries, ExportFormat};
