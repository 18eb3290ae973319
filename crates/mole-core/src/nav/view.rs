//! The in-memory listing model and its mode flags.
//!
//! [`ViewState`] is immutable: every transition consumes `self` and returns
//! a new value. Search, duplicates and large-files are independent flags;
//! which one wins on screen is decided by the renderer.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::fs::entry::Entry;
use crate::fs::ops::rank_by_size;
use crate::nav::filter::{filter_by_query, matches_query};

/// Listing, cursor and mode flags for the directory being analysed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    root: PathBuf,
    entries: Vec<Entry>,
    large_files: Vec<Entry>,
    selected: usize,
    offset: usize,
    search_query: String,
    search_mode: bool,
    duplicates_mode: bool,
    show_large_files: bool,
    multi_selected: BTreeSet<PathBuf>,
}

impl ViewState {
    /// An empty view for `root`. The cursor starts at `0`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
            large_files: Vec::new(),
            selected: 0,
            offset: 0,
            search_query: String::new(),
            search_mode: false,
            duplicates_mode: false,
            show_large_files: false,
            multi_selected: BTreeSet::new(),
        }
    }

    // --- Accessors ---

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every entry of the current directory, ranked by size.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn large_files(&self) -> &[Entry] {
        &self.large_files
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn search_mode(&self) -> bool {
        self.search_mode
    }

    pub fn duplicates_mode(&self) -> bool {
        self.duplicates_mode
    }

    pub fn show_large_files(&self) -> bool {
        self.show_large_files
    }

    pub fn multi_selected(&self) -> &BTreeSet<PathBuf> {
        &self.multi_selected
    }

    pub fn is_multi_selected(&self, path: &Path) -> bool {
        self.multi_selected.contains(path)
    }

    /// Entries the cursor moves over: the large-files list when that view
    /// is on, otherwise the listing, filtered by the search query either way.
    pub fn visible(&self) -> Vec<&Entry> {
        let source = if self.show_large_files {
            &self.large_files
        } else {
            &self.entries
        };
        filter_by_query(source, &self.search_query)
    }

    /// Listing entries matching the search query.
    pub fn filtered_entries(&self) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|e| matches_query(e, &self.search_query))
            .cloned()
            .collect()
    }

    pub fn highlighted(&self) -> Option<&Entry> {
        self.visible().get(self.selected).copied()
    }

    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(Entry::size_or_zero).sum()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pending()).count()
    }

    /// Paths a delete acts on: the multi-selection, else the highlighted entry.
    pub fn delete_targets(&self) -> Vec<PathBuf> {
        if !self.multi_selected.is_empty() {
            return self.multi_selected.iter().cloned().collect();
        }
        self.highlighted()
            .map(|e| vec![e.path().to_path_buf()])
            .unwrap_or_default()
    }

    /// Entries an export writes: the multi-selected ones, else the filtered listing.
    pub fn export_targets(&self) -> Vec<Entry> {
        if self.multi_selected.is_empty() {
            return self.filtered_entries();
        }
        self.entries
            .iter()
            .chain(self.large_files.iter())
            .filter(|e| self.multi_selected.contains(e.path()))
            .cloned()
            .collect()
    }

    // --- Listing transitions ---

    /// Replaces the listing, ranking it by size and clamping the cursor.
    #[must_use]
    pub fn with_entries(self, entries: Vec<Entry>) -> Self {
        let entries = rank_by_size(&entries);
        Self { entries, ..self }.clamped()
    }

    /// Switches to a new root with a fresh listing.
    ///
    /// The cursor, offset and multi-selection reset; mode flags are kept.
    #[must_use]
    pub fn with_root(self, root: PathBuf, entries: Vec<Entry>) -> Self {
        Self {
            root,
            entries: rank_by_size(&entries),
            large_files: Vec::new(),
            selected: 0,
            offset: 0,
            multi_selected: BTreeSet::new(),
            ..self
        }
    }

    /// Resolves the pending size of the entry at `path`.
    ///
    /// The listing is re-ranked once no entry is pending; the cursor follows
    /// the entry it was on.
    #[must_use]
    pub fn with_entry_size(self, path: &Path, size: u64) -> Self {
        let entries: Vec<Entry> = self
            .entries
            .iter()
            .cloned()
            .map(|e| if e.path() == path { e.with_size(size) } else { e })
            .collect();
        let still_pending = entries.iter().any(Entry::is_pending);
        let next = Self { entries, ..self };
        if still_pending {
            return next;
        }
        let current = next.highlighted().map(|e| e.path().to_path_buf());
        let entries = rank_by_size(&next.entries);
        let next = Self { entries, ..next };
        match current {
            Some(p) => next.with_cursor_on(&p),
            None => next,
        }
    }

    #[must_use]
    pub fn with_large_files(self, large_files: Vec<Entry>) -> Self {
        Self {
            large_files,
            ..self
        }
        .clamped()
    }

    /// Drops entries whose paths were removed and clears the multi-selection.
    #[must_use]
    pub fn without_paths(self, removed: &[PathBuf]) -> Self {
        let keep = |e: &Entry| !removed.iter().any(|r| r == e.path());
        let entries = self.entries.iter().filter(|&e| keep(e)).cloned().collect();
        let large_files = self.large_files.iter().filter(|&e| keep(e)).cloned().collect();
        Self {
            entries,
            large_files,
            multi_selected: BTreeSet::new(),
            ..self
        }
        .clamped()
    }

    // --- Cursor ---

    /// Moves the cursor to `index`, clamped to the visible list.
    #[must_use]
    pub fn with_selection(self, index: usize) -> Self {
        Self {
            selected: index,
            ..self
        }
        .clamped()
    }

    #[must_use]
    pub fn with_offset(self, offset: usize) -> Self {
        Self { offset, ..self }
    }

    #[must_use]
    pub fn move_up(self) -> Self {
        let index = self.selected.saturating_sub(1);
        self.with_selection(index)
    }

    #[must_use]
    pub fn move_down(self) -> Self {
        let index = self.selected.saturating_add(1);
        self.with_selection(index)
    }

    #[must_use]
    pub fn go_to_first(self) -> Self {
        self.with_selection(0)
    }

    #[must_use]
    pub fn go_to_last(self) -> Self {
        let last = self.visible().len().saturating_sub(1);
        self.with_selection(last)
    }

    /// Adjusts the offset so the cursor is inside a window of `height` rows.
    #[must_use]
    pub fn scroll_into_view(self, height: usize) -> Self {
        if height == 0 {
            return self;
        }
        let offset = if self.selected < self.offset {
            self.selected
        } else if self.selected >= self.offset + height {
            self.selected + 1 - height
        } else {
            self.offset
        };
        Self { offset, ..self }
    }

    fn with_cursor_on(self, path: &Path) -> Self {
        let index = self.visible().iter().position(|e| e.path() == path);
        match index {
            Some(i) => self.with_selection(i),
            None => self,
        }
    }

    fn clamped(self) -> Self {
        let len = self.visible().len();
        let selected = if len == 0 { 0 } else { self.selected.min(len - 1) };
        Self { selected, ..self }
    }

    // --- Multi-selection ---

    /// Adds or removes the highlighted entry from the multi-selection.
    #[must_use]
    pub fn toggle_highlighted(self) -> Self {
        let Some(path) = self.highlighted().map(|e| e.path().to_path_buf()) else {
            return self;
        };
        let mut multi_selected = self.multi_selected;
        if !multi_selected.remove(&path) {
            multi_selected.insert(path);
        }
        Self {
            multi_selected,
            ..self
        }
    }

    /// Replaces the multi-selection wholesale.
    #[must_use]
    pub fn with_multi_selected(self, multi_selected: BTreeSet<PathBuf>) -> Self {
        Self {
            multi_selected,
            ..self
        }
    }

    // --- Modes ---

    #[must_use]
    pub fn with_search_mode(self, search_mode: bool) -> Self {
        Self {
            search_mode,
            ..self
        }
    }

    #[must_use]
    pub fn with_search_query(self, query: impl Into<String>) -> Self {
        Self {
            search_query: query.into(),
            selected: 0,
            offset: 0,
            ..self
        }
        .clamped()
    }

    #[must_use]
    pub fn push_query_char(self, c: char) -> Self {
        let mut query = self.search_query.clone();
        query.push(c);
        self.with_search_query(query)
    }

    #[must_use]
    pub fn pop_query_char(self) -> Self {
        let mut query = self.search_query.clone();
        query.pop();
        self.with_search_query(query)
    }

    /// Leaves search mode and drops the query.
    #[must_use]
    pub fn clear_search(self) -> Self {
        self.with_search_query(String::new()).with_search_mode(false)
    }

    #[must_use]
    pub fn with_duplicates_mode(self, duplicates_mode: bool) -> Self {
        Self {
            duplicates_mode,
            ..self
        }
    }

    #[must_use]
    pub fn with_show_large_files(self, show_large_files: bool) -> Self {
        Self {
            show_large_files,
            ..self
        }
        .clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(name: &str, size: Option<u64>) -> Entry {
        Entry::seeded_dir(PathBuf::from("/r").join(name), size, None)
    }

    fn view() -> ViewState {
        ViewState::new("/r").with_entries(vec![
            dir("small", Some(1)),
            dir("big", Some(100)),
            dir("mid", Some(10)),
        ])
    }

    fn names(v: &ViewState) -> Vec<String> {
        v.visible().iter().map(|e| e.name().to_string()).collect()
    }

    #[test]
    fn entries_ranked_by_size() {
        assert_eq!(names(&view()), vec!["big", "mid", "small"]);
    }

    #[test]
    fn cursor_moves_and_clamps() {
        let v = view().move_down().move_down().move_down();
        assert_eq!(v.selected(), 2);
        let v = v.move_up();
        assert_eq!(v.selected(), 1);
        let v = v.go_to_first().move_up();
        assert_eq!(v.selected(), 0);
        assert_eq!(v.go_to_last().selected(), 2);
    }

    #[test]
    fn search_filters_visible_and_resets_cursor() {
        let v = view().with_selection(2).with_search_query("mi");
        assert_eq!(names(&v), vec!["mid"]);
        assert_eq!(v.selected(), 0);
        assert_eq!(v.highlighted().unwrap().name(), "mid");
    }

    #[test]
    fn clear_search_restores_listing() {
        let v = view()
            .with_search_mode(true)
            .push_query_char('b')
            .clear_search();
        assert!(!v.search_mode());
        assert!(v.search_query().is_empty());
        assert_eq!(v.visible().len(), 3);
    }

    #[test]
    fn pop_query_char_widens_filter() {
        let v = view().push_query_char('m').push_query_char('x');
        assert!(v.visible().is_empty());
        let v = v.pop_query_char();
        assert_eq!(names(&v), vec!["mid", "small"]);
    }

    #[test]
    fn toggle_highlighted_adds_and_removes() {
        let v = view().toggle_highlighted();
        assert!(v.is_multi_selected(Path::new("/r/big")));
        let v = v.toggle_highlighted();
        assert!(v.multi_selected().is_empty());
    }

    #[test]
    fn delete_targets_prefer_multi_selection() {
        let v = view();
        assert_eq!(v.delete_targets(), vec![PathBuf::from("/r/big")]);

        let v = v.move_down().toggle_highlighted().move_down().toggle_highlighted();
        assert_eq!(
            v.delete_targets(),
            vec![PathBuf::from("/r/mid"), PathBuf::from("/r/small")]
        );
    }

    #[test]
    fn export_targets_follow_query_without_selection() {
        let v = view().with_search_query("s");
        let names: Vec<String> = v.export_targets().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, vec!["small"]);

        let v = v.with_search_query("").move_down().toggle_highlighted();
        let names: Vec<String> = v.export_targets().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, vec!["mid"]);
    }

    #[test]
    fn pending_sizes_resolve_then_rerank() {
        let v = ViewState::new("/r").with_entries(vec![dir("a", None), dir("b", None)]);
        assert_eq!(v.pending_count(), 2);

        let v = v.with_entry_size(Path::new("/r/a"), 5);
        assert_eq!(v.pending_count(), 1);

        let v = v.move_down();
        let v = v.with_entry_size(Path::new("/r/b"), 50);
        assert_eq!(v.pending_count(), 0);
        assert_eq!(names(&v), vec!["b", "a"]);
        assert_eq!(v.highlighted().unwrap().name(), "b", "cursor follows its entry");
        assert_eq!(v.total_size(), 55);
    }

    #[test]
    fn without_paths_removes_and_clears_selection() {
        let v = view().toggle_highlighted();
        let v = v.without_paths(&[PathBuf::from("/r/big")]);
        assert_eq!(names(&v), vec!["mid", "small"]);
        assert!(v.multi_selected().is_empty());
    }

    #[test]
    fn large_files_view_switches_cursor_source() {
        let files = vec![Entry::seeded_dir(PathBuf::from("/r/x/huge"), Some(999), None)];
        let v = view().with_large_files(files).with_show_large_files(true);
        assert_eq!(names(&v), vec!["huge"]);
        assert_eq!(v.go_to_last().selected(), 0);
    }

    #[test]
    fn scroll_into_view_tracks_cursor() {
        let entries = (0..20).map(|i| dir(&format!("e{i:02}"), Some(i))).collect();
        let v = ViewState::new("/r").with_entries(entries);

        let v = v.with_selection(12).scroll_into_view(5);
        assert_eq!(v.offset(), 8);
        let v = v.with_selection(3).scroll_into_view(5);
        assert_eq!(v.offset(), 3);
        let v = v.with_selection(5).scroll_into_view(5);
        assert_eq!(v.offset(), 3);
    }

    #[test]
    fn with_root_resets_cursor_and_selection() {
        let v = view().move_down().toggle_highlighted().with_duplicates_mode(true);
        let v = v.with_root(PathBuf::from("/r/big"), vec![]);
        assert_eq!(v.root(), Path::new("/r/big"));
        assert_eq!(v.selected(), 0);
        assert!(v.multi_selected().is_empty());
        assert!(v.duplicates_mode());
    }
}
