//! Answering screen, plus the summary tab shared with the results screen.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::app::{App, QuizTab};
use crate::data::Storage;
use crate::export::{option_label, strip_html};
use crate::models::Question;

use super::{Palette, render_controls};

pub fn render<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let view = app.session().view();
    let Some(set) = view.questions else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    let submit_hint = if view.can_submit {
        Span::styled("ready to submit", Style::default().fg(palette.good).bold())
    } else {
        Span::styled(
            format!("{} / {} answered", view.selections.len(), set.len()),
            Style::default().fg(palette.muted),
        )
    };
    let progress = Line::from(vec![
        Span::styled(
            format!("Question {} of {}", app.ui.question_cursor + 1, set.len()),
            Style::default().fg(palette.accent).bold(),
        ),
        Span::styled("  ·  ", Style::default().fg(palette.muted)),
        submit_hint,
    ]);
    frame.render_widget(Paragraph::new(progress).alignment(Alignment::Center), chunks[0]);

    match app.ui.tab {
        QuizTab::Summary => render_summary(frame, chunks[1], set.summary(), palette),
        QuizTab::Questions => {
            if let Some(question) = app.current_question() {
                render_question(frame, chunks[1], question, app, palette);
            }
        }
    }

    render_controls(
        frame,
        chunks[2],
        "←/→ question  ·  j/k option  ·  Enter or 1-9 answer  ·  s submit  ·  Tab summary  ·  r restart  ·  e export  ·  g regenerate  ·  q quit",
        palette,
    );
}

fn render_question<S: Storage>(frame: &mut Frame, area: Rect, question: &Question, app: &App<S>, palette: &Palette) {
    let chunks = Layout::vertical([Constraint::Length(7), Constraint::Min(6)]).split(area);

    let title = match &question.topic {
        Some(topic) => format!(" {} ", topic),
        None => " Question ".to_string(),
    };
    let text = Paragraph::new(question.question.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(palette.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted))
                .title(title)
                .title_style(Style::default().fg(palette.accent))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(text, chunks[0]);

    let chosen = app.session().selections().get(question.id);
    let lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let under_cursor = i == app.ui.option_cursor;
            let is_chosen = chosen == Some(i);
            let prefix = if under_cursor { "> " } else { "  " };
            let mark = if is_chosen { "● " } else { "○ " };

            let style = if is_chosen {
                Style::default().fg(palette.good).bold()
            } else if under_cursor {
                Style::default().fg(palette.highlight).bold()
            } else {
                Style::default().fg(palette.text)
            };

            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(mark, style),
                Span::styled(format!("{}) ", option_label(i)), style),
                Span::styled(option.as_str(), style),
            ])
        })
        .collect();

    let options = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.muted))
            .title(" Options ")
            .title_style(Style::default().fg(palette.accent))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(options, chunks[1]);
}

pub(super) fn render_summary(frame: &mut Frame, area: Rect, summary: &str, palette: &Palette) {
    let text = strip_html(summary);
    let body = if text.is_empty() {
        "The service did not send a summary for this document.".to_string()
    } else {
        text
    };

    let widget = Paragraph::new(body)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(palette.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted))
                .title(" Summary ")
                .title_style(Style::default().fg(palette.accent))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}
