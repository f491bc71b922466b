//! Past quizzes, oldest first.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::app::App;
use crate::data::Storage;
use crate::models::HistoryEntry;

use super::{Palette, render_controls, scroll_offset};

pub fn render<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(2)])
        .margin(1)
        .split(area);

    let entries = &app.ui.history;
    let lines: Vec<Line> = if entries.is_empty() {
        vec![Line::from(Span::styled(
            "No quizzes yet. Completed quizzes show up here.",
            Style::default().fg(palette.muted),
        ))]
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| entry_line(entry, i == app.ui.history_cursor, palette))
            .collect()
    };

    let inner_height = chunks[0].height.saturating_sub(2);
    let widget = Paragraph::new(lines)
        .scroll((scroll_offset(app.ui.history_cursor, inner_height), 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted))
                .title(format!(" History ({}) ", entries.len()))
                .title_style(Style::default().fg(palette.accent))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, chunks[0]);

    render_controls(
        frame,
        chunks[1],
        "j/k move  ·  Enter replay  ·  c clear history  ·  Esc back  ·  q quit",
        palette,
    );
}

fn entry_line<'a>(entry: &'a HistoryEntry, under_cursor: bool, palette: &Palette) -> Line<'a> {
    let style = if under_cursor {
        Style::default().fg(palette.highlight).bold()
    } else {
        Style::default().fg(palette.text)
    };
    let prefix = if under_cursor { "> " } else { "  " };

    let outcome = match &entry.result {
        Some(result) => Span::styled(
            format!("{}/{} ({}%)", result.score, result.total, result.percentage),
            Style::default().fg(palette.grade(result.percentage)),
        ),
        None => Span::styled("not scored", Style::default().fg(palette.muted)),
    };

    Line::from(vec![
        Span::styled(prefix, style),
        Span::styled(format!("{:<20}", short_timestamp(&entry.timestamp)), Style::default().fg(palette.muted)),
        Span::styled(format!("{:<28} ", entry.topic), style),
        Span::styled(format!("{:<7}", entry.difficulty), Style::default().fg(palette.muted)),
        Span::styled(format!("{:>3} questions  ", entry.mcqs.len()), Style::default().fg(palette.muted)),
        outcome,
    ])
}

/// `2024-05-01T10:00:42.000Z` as `2024-05-01 10:00`. Unparseable values are shown as stored.
fn short_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
