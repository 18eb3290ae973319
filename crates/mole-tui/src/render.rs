use std::path::PathBuf;

use mole_core::{ActionCategory, ExportFormat};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, ExportModal, Overlay};
use crate::ui::panel::{render_duplicates, render_listing, RowMarks};
use crate::ui::popup::render_popup;
use crate::ui::sidebar::{render_sidebar, ProjectInfo, SidebarProps};
use crate::ui::statusbar::{format_size, render_statusbar, StatusBarProps};

/// Rows taken by everything except the listing body (header, borders, status bar).
const CHROME_ROWS: u16 = 4;

/// Height available to the listing for a terminal of `height` rows.
pub fn list_height(height: u16, search_visible: bool) -> usize {
    let search_rows = if search_visible { 3 } else { 0 };
    usize::from(height.saturating_sub(CHROME_ROWS + search_rows))
}

/// Composes the full UI layout each frame.
///
/// Body precedence: search (filtered listing plus query box), then the
/// duplicates view, then the plain listing. The export dialog, the delete
/// confirmation and help are drawn on top.
pub fn render(f: &mut Frame, app: &App) {
    let view = app.view();
    let search_visible = view.search_mode();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(if search_visible { 3 } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, chunks[0], app);
    if search_visible {
        render_search_box(f, chunks[1], app);
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[2]);

    if !search_visible && view.duplicates_mode() {
        render_duplicates(f, body[0], &app.duplicate_groups());
    } else {
        render_body_listing(f, body[0], app);
    }

    let project = app.projects_enabled().then(|| ProjectInfo {
        pinned: app.is_highlighted_pinned(),
        record: app.highlighted_record(),
    });
    render_sidebar(
        f,
        body[1],
        &SidebarProps {
            entry: view.highlighted(),
            project,
        },
    );

    render_statusbar(
        f,
        chunks[3],
        &StatusBarProps {
            entry_count: view.visible().len(),
            selected_index: view.selected(),
            total_size: view.total_size(),
            pending: view.pending_count(),
            progress: app.counters().snapshot(),
            can_undo: app.pending_undo().is_some(),
            status_message: app.status_message(),
        },
    );

    match app.overlay() {
        Overlay::Export(modal) => render_export_popup(f, modal),
        Overlay::ConfirmDelete(paths) => render_confirm_popup(f, paths),
        Overlay::Help => render_help_popup(f, app),
        Overlay::None => {}
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            " Mole ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" [{}] ", app.mode().label()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(app.view().root().display().to_string()),
    ];

    let selected = app.view().multi_selected().len();
    if selected > 0 {
        spans.push(Span::styled(
            format!("  {selected} selected"),
            Style::default().fg(Color::Magenta),
        ));
    }

    if app.projects_enabled() {
        let banner = if app.is_discovering() {
            "  Projects: indexing...".to_string()
        } else {
            match app.index() {
                Some(index) => format!("  Projects: {} indexed", index.len()),
                None => "  Projects: on (I to index)".to_string(),
            }
        };
        spans.push(Span::styled(banner, Style::default().fg(Color::Green)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_search_box(f: &mut Frame, area: Rect, app: &App) {
    let cursor = if app.is_search_typing() { "_" } else { "" };
    let text = format!("/{}{cursor}", app.view().search_query());
    let border = if app.is_search_typing() {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let search = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(search, area);
}

fn render_body_listing(f: &mut Frame, area: Rect, app: &App) {
    let view = app.view();
    let visible = view.visible();
    let title = if view.show_large_files() {
        format!("Largest files ({})", visible.len())
    } else {
        format!("{} ({})", view.root().display(), format_size(view.total_size()))
    };

    let projects = app.projects_enabled();
    render_listing(
        f,
        area,
        &visible,
        view.selected(),
        view.offset(),
        &title,
        |entry| RowMarks {
            selected: view.is_multi_selected(entry.path()),
            pinned: projects.then(|| app.is_pinned(entry)),
        },
    );
}

fn render_export_popup(f: &mut Frame, modal: &ExportModal) {
    let active = |format: ExportFormat| {
        if modal.format() == format {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };
    let destination = modal
        .destination()
        .map(|d| d.display().to_string())
        .unwrap_or_default();

    let lines = vec![
        Line::from(vec![
            Span::styled("Format: ", Style::default().fg(Color::DarkGray)),
            Span::styled(" JSON ", active(ExportFormat::Json)),
            Span::raw(" "),
            Span::styled(" CSV ", active(ExportFormat::Csv)),
        ]),
        Line::from(vec![
            Span::styled("Destination: ", Style::default().fg(Color::DarkGray)),
            Span::raw(destination),
        ]),
        Line::from(vec![
            Span::styled("Preview: ", Style::default().fg(Color::DarkGray)),
            Span::raw(modal.preview()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Tab or j/k format, d set destination, Enter export, Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(f, "Export", lines, (60, 30));
}

fn render_confirm_popup(f: &mut Frame, paths: &[PathBuf]) {
    const SHOWN: usize = 5;

    let mut lines = vec![
        Line::from(format!("Move {} item(s) to trash?", paths.len())),
        Line::from(""),
    ];
    for path in paths.iter().take(SHOWN) {
        lines.push(Line::from(format!("  {}", path.display())));
    }
    if paths.len() > SHOWN {
        lines.push(Line::from(format!("  ... and {} more", paths.len() - SHOWN)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "y/Enter confirm, n/Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));
    render_popup(f, "Delete", lines, (50, 40));
}

fn render_help_popup(f: &mut Frame, app: &App) {
    let categories = [
        ActionCategory::Navigation,
        ActionCategory::FileOps,
        ActionCategory::View,
        ActionCategory::Projects,
        ActionCategory::System,
    ];

    let mut lines = Vec::new();
    for category in categories {
        lines.push(Line::from(Span::styled(
            category.label().to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for desc in app
            .action_registry()
            .all()
            .iter()
            .filter(|d| d.category == category)
        {
            let keys = app
                .keymap()
                .keys_for_action(desc.action)
                .map(|k| k.join(", "))
                .unwrap_or_else(|| "-".to_string());
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<10}"), Style::default().fg(Color::Yellow)),
                Span::raw(desc.description.to_string()),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Ctrl+Z undo, Ctrl+C quit, Esc clear search"));
    render_popup(f, "Help", lines, (60, 80));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_height_subtracts_chrome() {
        assert_eq!(list_height(24, false), 20);
        assert_eq!(list_height(24, true), 17);
        assert_eq!(list_height(2, true), 0);
    }
}
