//! Document and options screen.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::app::{App, Focus};
use crate::data::Storage;

use super::{Palette, render_controls};

pub fn render<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    let columns = |rect: Rect| {
        Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Max(70),
            Constraint::Fill(1),
        ])
        .split(rect)[1]
    };

    render_path(frame, columns(chunks[1]), app, palette);
    render_options(frame, columns(chunks[2]), app, palette);

    let controls = match app.ui.focus {
        Focus::Path => "type a path  ·  Enter stage  ·  Tab options  ·  Esc clear",
        Focus::Options => {
            "Enter start  ·  +/- count  ·  d difficulty  ·  p provider  ·  h history  ·  t theme  ·  Tab path  ·  q quit"
        }
    };
    render_controls(frame, chunks[4], controls, palette);
}

fn render_path<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let focused = app.ui.focus == Focus::Path;
    let border = if focused { palette.accent } else { palette.muted };

    let mut input = vec![Span::styled(
        app.ui.path_input.as_str(),
        Style::default().fg(palette.highlight),
    )];
    if focused {
        input.push(Span::styled("_", Style::default().fg(palette.highlight)));
    }

    let staged = match app.session().file() {
        Some(file) => Line::from(vec![
            Span::styled("Staged: ", Style::default().fg(palette.muted)),
            Span::styled(
                format!("{} ({} KB)", file.name, file.len().div_ceil(1024)),
                Style::default().fg(palette.good),
            ),
        ]),
        None => Line::from(Span::styled("No document staged", Style::default().fg(palette.muted))),
    };

    let widget = Paragraph::new(vec![Line::from(input), Line::from(""), staged]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" PDF file ")
            .title_style(Style::default().fg(palette.accent))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_options<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let focused = app.ui.focus == Focus::Options;
    let border = if focused { palette.accent } else { palette.muted };
    let options = app.session().options();
    let config = app.session().config();

    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<12}", label), Style::default().fg(palette.muted)),
            Span::styled(value, Style::default().fg(palette.text).bold()),
        ])
    };

    let flow = if config.topic_extraction {
        "Topics are extracted first, then you pick which to cover"
    } else {
        "Questions are generated from the whole document"
    };

    let content = vec![
        row("Questions", options.question_count.to_string()),
        row("Difficulty", options.difficulty.to_string()),
        row(
            "Provider",
            options.provider.clone().unwrap_or_else(|| "service default".to_string()),
        ),
        row("History", if config.history { "on" } else { "off" }.to_string()),
        Line::from(Span::styled(flow, Style::default().fg(palette.muted).italic())),
    ];

    let widget = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Options ")
            .title_style(Style::default().fg(palette.accent))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}
