//! Size-ranked listing and duplicate-group panels.
//!
//! The listing is a scrollable `List` with a multi-selection marker, an
//! optional pin marker, and a right-aligned size column. Entries whose size
//! is still being computed show an ellipsis.

use mole_core::{DuplicateGroup, Entry};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::ui::statusbar::format_size;

/// Per-row flags the listing cannot derive from the entry itself.
pub struct RowMarks {
    pub selected: bool,
    /// `None` when pins are not shown.
    pub pinned: Option<bool>,
}

/// Renders the listing with the cursor on `selected`, scrolled to `offset`.
pub fn render_listing<F>(
    f: &mut Frame,
    area: Rect,
    entries: &[&Entry],
    selected: usize,
    offset: usize,
    title: &str,
    marks: F,
) where
    F: Fn(&Entry) -> RowMarks,
{
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| ListItem::new(entry_line(entry, &marks(entry))))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_owned())
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(Color::Cyan),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_offset(offset);
    if !entries.is_empty() {
        state.select(Some(selected));
    }

    f.render_stateful_widget(list, area, &mut state);
}

fn entry_line(entry: &Entry, marks: &RowMarks) -> Line<'static> {
    let select_mark = if marks.selected { "[x] " } else { "[ ] " };
    let pin_mark = match marks.pinned {
        Some(true) => "★ ",
        Some(false) => "  ",
        None => "",
    };
    let name = if entry.is_dir() {
        format!("{}/", entry.name())
    } else {
        entry.name().to_string()
    };

    Line::from(vec![
        Span::styled(select_mark, Style::default().fg(Color::Magenta)),
        Span::styled(pin_mark, Style::default().fg(Color::Yellow)),
        Span::styled(format!("{:>10}  ", size_label(entry)), size_style(entry)),
        Span::styled(name, entry_style(entry)),
    ])
}

/// Human-readable size, or `...` while pending.
pub fn size_label(entry: &Entry) -> String {
    match entry.size() {
        Some(size) => format_size(size),
        None => "...".to_string(),
    }
}

fn size_style(entry: &Entry) -> Style {
    if entry.is_pending() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green)
    }
}

fn entry_style(entry: &Entry) -> Style {
    if entry.is_dir() {
        Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD)
    } else if entry.is_hidden() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

/// Lines of the duplicates view: a summary, then each group and its members.
pub fn duplicate_lines(groups: &[DuplicateGroup]) -> Vec<Line<'static>> {
    if groups.is_empty() {
        return vec![Line::from(Span::styled(
            "No duplicates found.",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))];
    }

    let total: u64 = groups.iter().map(|g| g.total_size).sum();
    let mut lines = vec![Line::from(Span::styled(
        format!("Duplicates ({} groups, {})", groups.len(), format_size(total)),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for group in groups {
        lines.push(Line::from(Span::styled(
            format!(
                "Group {}... ({} items, {})",
                group.short_fingerprint(),
                group.entries.len(),
                format_size(group.total_size)
            ),
            Style::default().fg(Color::Yellow),
        )));
        for entry in &group.entries {
            lines.push(Line::from(format!(
                "    {:>10}  {}",
                size_label(entry),
                entry.path().display()
            )));
        }
    }
    lines
}

pub fn render_duplicates(f: &mut Frame, area: Rect, groups: &[DuplicateGroup]) {
    let paragraph = Paragraph::new(duplicate_lines(groups)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Duplicates")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dir(path: &str, size: Option<u64>) -> Entry {
        Entry::seeded_dir(PathBuf::from(path), size, None)
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn pending_size_shows_ellipsis() {
        assert_eq!(size_label(&dir("/r/a", None)), "...");
        assert_eq!(size_label(&dir("/r/a", Some(2048))), "2.0 KB");
    }

    #[test]
    fn entry_line_marks() {
        let entry = dir("/r/app", Some(10));
        let line = entry_line(
            &entry,
            &RowMarks {
                selected: true,
                pinned: Some(true),
            },
        );
        let text = line_text(&line);
        assert!(text.starts_with("[x] ★ "));
        assert!(text.ends_with("app/"));
    }

    #[test]
    fn entry_line_without_pins() {
        let entry = dir("/r/app", Some(10));
        let line = entry_line(
            &entry,
            &RowMarks {
                selected: false,
                pinned: None,
            },
        );
        assert!(line_text(&line).starts_with("[ ] "));
        assert!(!line_text(&line).contains('★'));
    }

    #[test]
    fn duplicates_empty_message() {
        let lines = duplicate_lines(&[]);
        assert_eq!(line_text(&lines[0]), "No duplicates found.");
    }

    #[test]
    fn duplicates_summary_and_groups() {
        let group = DuplicateGroup {
            fingerprint: "0123456789abcdef".to_string(),
            entries: vec![dir("/r/a", Some(1024)), dir("/r/b", Some(1024))],
            total_size: 2048,
        };
        let lines = duplicate_lines(&[group]);
        assert_eq!(line_text(&lines[0]), "Duplicates (1 groups, 2.0 KB)");
        assert_eq!(line_text(&lines[1]), "Group 01234567... (2 items, 2.0 KB)");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn directory_style_is_bold_blue() {
        let style = entry_style(&dir("/r/a", None));
        assert_eq!(style.fg, Some(Color::Blue));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }
}
