//! Details for the highlighted entry.

use std::time::SystemTime;

use chrono::{DateTime, Local};
use mole_core::{Entry, ProjectRecord};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::ui::panel::size_label;

/// Data needed to render the sidebar.
pub struct SidebarProps<'a> {
    pub entry: Option<&'a Entry>,
    /// Pin state and index record; `None` when projects mode is off.
    pub project: Option<ProjectInfo<'a>>,
}

pub struct ProjectInfo<'a> {
    pub pinned: bool,
    pub record: Option<&'a ProjectRecord>,
}

pub fn render_sidebar(f: &mut Frame, area: Rect, props: &SidebarProps<'_>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Info")
        .border_style(Style::default().fg(Color::DarkGray));
    let paragraph = Paragraph::new(sidebar_lines(props))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn sidebar_lines(props: &SidebarProps<'_>) -> Vec<Line<'static>> {
    let Some(entry) = props.entry else {
        return vec![Line::from(Span::styled(
            "Nothing selected",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))];
    };

    let kind = if entry.is_dir() { "Directory" } else { "File" };
    let accessed = entry
        .last_access()
        .map(format_time)
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        field("Name", entry.name().to_string()),
        field("Path", entry.path().display().to_string()),
        field("Size", size_label(entry)),
        field("Type", kind.to_string()),
        field("Accessed", accessed),
    ];

    if let Some(project) = &props.project {
        lines.push(Line::from(""));
        let pin = if project.pinned {
            "[★] Pinned"
        } else {
            "[ ] Not pinned"
        };
        lines.push(Line::from(Span::styled(
            pin,
            Style::default().fg(Color::Yellow),
        )));
        if let Some(fp) = project.record.and_then(ProjectRecord::short_fingerprint) {
            lines.push(field("Fingerprint", format!("{fp}...")));
        }
        if let Some(record) = project.record {
            lines.push(field("Markers", markers(record)));
        }
    }
    lines
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn markers(record: &ProjectRecord) -> String {
    let names: Vec<&str> = [
        (record.has_git, "git"),
        (record.has_rust, "rust"),
        (record.has_node, "node"),
        (record.has_python, "python"),
    ]
    .iter()
    .filter(|(on, _)| *on)
    .map(|(_, name)| *name)
    .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mole_core::projects::ProjectKind;
    use std::path::PathBuf;

    fn text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn record(fingerprint: &str) -> ProjectRecord {
        ProjectRecord {
            path: "app".to_string(),
            kind: ProjectKind::Standalone,
            pinned: false,
            latest_mtime: 0,
            size_bytes: 1,
            artifact_count: 0,
            has_git: false,
            has_rust: true,
            has_node: false,
            has_python: false,
            fingerprint: fingerprint.to_string(),
        }
    }

    #[test]
    fn empty_sidebar() {
        let props = SidebarProps {
            entry: None,
            project: None,
        };
        assert_eq!(text(&sidebar_lines(&props)), "Nothing selected");
    }

    #[test]
    fn basic_fields_without_projects() {
        let entry = Entry::seeded_dir(PathBuf::from("/r/app"), Some(1024), None);
        let props = SidebarProps {
            entry: Some(&entry),
            project: None,
        };
        let t = text(&sidebar_lines(&props));
        assert!(t.contains("Name: app"));
        assert!(t.contains("Size: 1.0 KB"));
        assert!(t.contains("Type: Directory"));
        assert!(t.contains("Accessed: -"));
        assert!(!t.contains("Pinned"));
    }

    #[test]
    fn project_fields_when_enabled() {
        let entry = Entry::seeded_dir(PathBuf::from("/r/app"), Some(1), None);
        let rec = record("abcdef0123456789");
        let props = SidebarProps {
            entry: Some(&entry),
            project: Some(ProjectInfo {
                pinned: true,
                record: Some(&rec),
            }),
        };
        let t = text(&sidebar_lines(&props));
        assert!(t.contains("[★] Pinned"));
        assert!(t.contains("Fingerprint: abcdef01..."));
        assert!(t.contains("Markers: rust"));
    }
}
