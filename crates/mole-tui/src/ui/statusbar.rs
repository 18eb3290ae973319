//! Bottom status row: cursor position, listing total, scan counters and
//! the latest status message.

use mole_core::ScanProgress;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct StatusBarProps<'a> {
    pub entry_count: usize,
    pub selected_index: usize,
    pub total_size: u64,
    pub pending: usize,
    pub progress: ScanProgress,
    pub can_undo: bool,
    pub status_message: Option<&'a str>,
}

/// Renders the bottom status bar.
pub fn render_statusbar(f: &mut Frame, area: Rect, props: &StatusBarProps<'_>) {
    let bg = Color::DarkGray;
    let bar = Paragraph::new(status_line(props, bg)).style(Style::default().bg(bg));
    f.render_widget(bar, area);
}

fn status_line(props: &StatusBarProps<'_>, bg: Color) -> Line<'static> {
    let position = if props.entry_count > 0 {
        format!(" {}/{}", props.selected_index + 1, props.entry_count)
    } else {
        " 0/0".to_owned()
    };

    let totals = format!("  Total {}", format_size(props.total_size));

    let scan = if props.pending > 0 {
        format!(
            "  Scanning {} dir(s): {} files, {}",
            props.pending,
            props.progress.files,
            format_size(props.progress.bytes)
        )
    } else {
        String::new()
    };

    let undo = if props.can_undo { "  [undo]" } else { "" };

    let status_span = props
        .status_message
        .map(|msg| {
            Span::styled(
                format!("  {msg}"),
                Style::default()
                    .fg(Color::White)
                    .bg(bg)
                    .add_modifier(Modifier::ITALIC),
            )
        })
        .unwrap_or_default();

    Line::from(vec![
        Span::styled(
            position,
            Style::default()
                .fg(Color::Cyan)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(totals, Style::default().fg(Color::Green).bg(bg)),
        Span::styled(scan, Style::default().fg(Color::Yellow).bg(bg)),
        Span::styled(
            undo.to_owned(),
            Style::default()
                .fg(Color::Magenta)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        status_span,
    ])
}

/// Formats a byte count using binary units (`1.5 KB`, `2.0 GB`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
