//! Directory reading and ranking.

use std::cmp::Ordering;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::Entry;

/// Reads the immediate contents of a directory and returns them as [`Entry`] values.
///
/// Hidden entries are dropped unless `show_hidden` is set. The returned
/// entries are **unsorted**; use [`rank_by_size`] for the listing order.
/// Children whose metadata cannot be read are skipped.
///
/// # Errors
///
/// - [`CoreError::NotFound`]: the path does not exist.
/// - [`CoreError::NotADirectory`]: the path is not a directory.
/// - [`CoreError::PermissionDenied`]: read access is denied.
/// - [`CoreError::Io`]: any other I/O error.
pub fn read_directory(path: &Path, show_hidden: bool) -> CoreResult<Vec<Entry>> {
    if !path.exists() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(CoreError::NotADirectory(path.to_path_buf()));
    }

    let entries = std::fs::read_dir(path)
        .map_err(|e| CoreError::from_io(path, e))?
        .filter_map(Result::ok)
        .filter_map(|child| {
            let metadata = child.metadata().ok()?;
            Some(Entry::new(child.path(), &metadata))
        })
        .filter(|entry| show_hidden || !entry.is_hidden())
        .collect();

    Ok(entries)
}

/// Returns the entries ordered largest first.
///
/// Pending sizes sort after every resolved size; ties break on
/// case-insensitive name so the order is stable between refreshes.
/// The input slice is never mutated.
pub fn rank_by_size(entries: &[Entry]) -> Vec<Entry> {
    let mut ranked = entries.to_vec();
    ranked.sort_by(compare_by_size);
    ranked
}

fn compare_by_size(a: &Entry, b: &Entry) -> Ordering {
    match (a.size(), b.size()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
}
