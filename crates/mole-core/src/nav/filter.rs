//! Search filtering for listing entries.

use crate::fs::entry::Entry;

/// Case-insensitive substring match against the entry name or full path.
///
/// An empty query matches everything.
pub fn matches_query(entry: &Entry, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    entry.name().to_lowercase().contains(&q)
        || entry.path().to_string_lossy().to_lowercase().contains(&q)
}

/// Returns references to the entries matching `query`, in input order.
pub fn filter_by_query<'a>(entries: &'a [Entry], query: &str) -> Vec<&'a Entry> {
    entries.iter().filter(|e| matches_query(e, query)).collect()
}
