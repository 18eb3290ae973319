//! File system abstractions for Mole.
//!
//! Entries ([`entry::Entry`]), directory reads ([`ops::read_directory`]),
//! the size scanner ([`scan`]) and the rename-based trash ([`trash`]).

pub mod entry;
pub mod ops;
pub mod scan;
pub mod trash;

pub use scan::{ScanCounters, ScanProgress};
pub use trash::{TrashTransaction, TrashVault, TrashedItem};
