use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::{App, QuizTab};
use crate::data::Storage;
use crate::export::option_label;
use crate::models::{AnswerSelections, Question, QuestionSet, Score};
use crate::timer::format_hms;

use super::quiz::render_summary;
use super::{Palette, render_controls, scroll_offset};

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let view = app.session().view();
    let (Some(set), Some(score)) = (view.questions, view.score) else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], score, format_hms(view.elapsed), palette);

    match app.ui.tab {
        QuizTab::Summary => render_summary(frame, chunks[1], set.summary(), palette),
        QuizTab::Questions => {
            let columns = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(chunks[1]);
            render_question_breakdown(frame, columns[0], set, view.selections, app.ui.question_cursor, palette);
            if let Some(question) = app.current_question() {
                render_review(frame, columns[1], question, view.selections.get(question.id), palette);
            }
        }
    }

    render_controls(
        frame,
        chunks[2],
        "j/k browse  ·  Tab summary  ·  r retry  ·  e export  ·  g regenerate  ·  u new file  ·  h history  ·  q quit",
        palette,
    );
}

fn render_score_summary(frame: &mut Frame, area: Rect, score: Score, elapsed: String, palette: &Palette) {
    let percentage = score.percentage().unwrap_or(0);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("RESULTS", Style::default().fg(palette.accent).bold())),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}  ({}%)", score.correct, score.total, percentage),
            Style::default().fg(palette.grade(percentage)).bold(),
        )),
        Line::from(Span::styled(
            format!("completed in {}", elapsed),
            Style::default().fg(palette.muted),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(palette.muted),
    );
    frame.render_widget(widget, area);
}

fn render_question_breakdown(
    frame: &mut Frame,
    area: Rect,
    set: &QuestionSet,
    selections: &AnswerSelections,
    cursor: usize,
    palette: &Palette,
) {
    let lines: Vec<Line> = set
        .questions()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let is_correct = selections
                .get(question.id)
                .is_some_and(|chosen| question.is_correct(chosen));
            let (symbol, color) = if is_correct {
                ("+", palette.good)
            } else {
                ("-", palette.bad)
            };
            let text_style = if index == cursor {
                Style::default().fg(palette.highlight).bold()
            } else {
                Style::default().fg(palette.text)
            };

            Line::from(vec![
                Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                Span::styled(format!("{:2}. ", index + 1), Style::default().fg(palette.muted)),
                Span::styled(truncate_question(&question.question), text_style),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((scroll_offset(cursor, area.height), 0));
    frame.render_widget(widget, area);
}

fn render_review(frame: &mut Frame, area: Rect, question: &Question, chosen: Option<usize>, palette: &Palette) {
    let answer_line = |label: &'static str, index: usize, color: Color| {
        let text = question.options.get(index).map(String::as_str).unwrap_or("");
        Line::from(vec![
            Span::styled(label, Style::default().fg(palette.muted)),
            Span::styled(format!("{}. {}", option_label(index), text), Style::default().fg(color)),
        ])
    };

    let mut content = vec![
        Line::from(Span::styled(question.question.as_str(), Style::default().fg(palette.text).bold())),
        Line::from(""),
    ];

    match chosen {
        Some(index) if question.is_correct(index) => {
            content.push(answer_line("Your answer:    ", index, palette.good));
        }
        Some(index) => {
            content.push(answer_line("Your answer:    ", index, palette.bad));
            content.push(answer_line("Correct answer: ", question.correct_answer, palette.good));
        }
        None => content.push(answer_line("Correct answer: ", question.correct_answer, palette.good)),
    }

    if !question.explanation.is_empty() {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            question.explanation.as_str(),
            Style::default().fg(palette.text),
        )));
    }

    let widget = Paragraph::new(content).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(palette.muted))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
