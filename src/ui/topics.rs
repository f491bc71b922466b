//! Topic selection screen.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::app::App;
use crate::data::Storage;
use crate::protocol::topic_field;

use super::{Palette, render_controls, scroll_offset};

pub fn render<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let view = app.session().view();

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    let heading = vec![
        Line::from(Span::styled(
            format!("{} topics found", view.topics.len()),
            Style::default().fg(palette.accent).bold(),
        )),
        Line::from(vec![
            Span::styled("Covering: ", Style::default().fg(palette.muted)),
            Span::styled(topic_field(view.selected_topics), Style::default().fg(palette.text)),
            Span::styled(
                format!(
                    "  ·  {} {} questions",
                    view.options.question_count, view.options.difficulty
                ),
                Style::default().fg(palette.muted),
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(heading).alignment(Alignment::Center), chunks[0]);

    let lines: Vec<Line> = view
        .topics
        .iter()
        .enumerate()
        .map(|(i, topic)| {
            let under_cursor = i == app.ui.topic_cursor;
            let selected = view.selected_topics.contains(topic);
            let prefix = if under_cursor { "> " } else { "  " };
            let mark = if selected { "[x] " } else { "[ ] " };

            let style = if under_cursor {
                Style::default().fg(palette.highlight).bold()
            } else if selected {
                Style::default().fg(palette.good)
            } else {
                Style::default().fg(palette.text)
            };

            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(mark, style),
                Span::styled(topic.as_str(), style),
            ])
        })
        .collect();

    let inner_height = chunks[1].height.saturating_sub(2);
    let widget = Paragraph::new(lines)
        .scroll((scroll_offset(app.ui.topic_cursor, inner_height), 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted))
                .title(" Topics ")
                .title_style(Style::default().fg(palette.accent))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, chunks[1]);

    render_controls(
        frame,
        chunks[2],
        "j/k move  ·  Space toggle  ·  a all topics  ·  +/- d p options  ·  Enter generate  ·  u new file  ·  q quit",
        palette,
    );
}
