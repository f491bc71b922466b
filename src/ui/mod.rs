mod history;
mod quiz;
mod result;
mod topics;
mod upload;

use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};
use crate::data::Storage;
use crate::models::{SessionState, Theme};
use crate::timer::format_hms;

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub highlight: Color,
    pub good: Color,
    pub bad: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::Reset,
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                highlight: Color::Yellow,
                good: Color::Green,
                bad: Color::Red,
            },
            Theme::Light => Self {
                background: Color::White,
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                highlight: Color::Magenta,
                good: Color::Green,
                bad: Color::Red,
            },
        }
    }

    fn grade(&self, percentage: u32) -> Color {
        match percentage {
            90..=100 => self.good,
            70..=89 => self.accent,
            50..=69 => self.highlight,
            _ => self.bad,
        }
    }
}

pub fn render<S: Storage>(frame: &mut Frame, app: &App<S>) {
    let palette = Palette::for_theme(app.ui.theme);
    let area = frame.area();
    frame.render_widget(Block::default().bg(palette.background), area);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_header(frame, chunks[0], app, &palette);

    match app.ui.screen {
        Screen::History => history::render(frame, chunks[1], app, &palette),
        Screen::Main => match app.session().state() {
            SessionState::Idle => upload::render(frame, chunks[1], app, &palette),
            SessionState::ExtractingTopics => {
                render_waiting(frame, chunks[1], "Extracting topics from the document...", &palette)
            }
            SessionState::TopicsReady => topics::render(frame, chunks[1], app, &palette),
            SessionState::Generating => {
                let message = format!(
                    "Generating {} {} questions...",
                    app.session().options().question_count,
                    app.session().options().difficulty
                );
                render_waiting(frame, chunks[1], &message, &palette)
            }
            SessionState::Active => quiz::render(frame, chunks[1], app, &palette),
            SessionState::Submitted => result::render(frame, chunks[1], app, &palette),
        },
    }

    render_status(frame, chunks[2], app, &palette);
}

fn render_header<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let view = app.session().view();

    let mut spans = vec![Span::styled(" PDF QUIZ ", Style::default().fg(palette.accent).bold())];
    if let Some(name) = view.file_name {
        spans.push(Span::styled(format!(" {} ", name), Style::default().fg(palette.muted)));
    }
    spans.push(Span::styled(
        format!(" {} ", view.state),
        Style::default().fg(palette.muted).italic(),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    if view.questions.is_some() {
        let clock_style = if view.timer_running {
            Style::default().fg(palette.highlight).bold()
        } else {
            Style::default().fg(palette.muted)
        };
        let clock = Paragraph::new(format!("{} ", format_hms(view.elapsed)))
            .alignment(Alignment::Right)
            .style(clock_style);
        frame.render_widget(clock, area);
    }
}

fn render_status<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let session = app.session();

    let line = if let Some(status) = &app.ui.status {
        let color = if status.is_error { palette.bad } else { palette.good };
        Line::from(Span::styled(format!(" {}", status.text), Style::default().fg(color)))
    } else if let Some(error) = session.last_error() {
        Line::from(Span::styled(
            format!(" {}  ·  Esc to dismiss", error),
            Style::default().fg(palette.bad),
        ))
    } else if let Some(notice) = session.notice() {
        Line::from(Span::styled(format!(" {}", notice), Style::default().fg(palette.highlight)))
    } else {
        Line::from("")
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_waiting(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(5),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(palette.highlight))),
        Line::from(""),
        Line::from(Span::styled("[Q] to quit", Style::default().fg(palette.muted))),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}

/// Key hint line at the bottom of a screen.
fn render_controls(frame: &mut Frame, area: Rect, text: &str, palette: &Palette) {
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(palette.muted);
    frame.render_widget(widget, area);
}

/// Scroll offset that keeps `cursor` inside a window of `height` rows.
fn scroll_offset(cursor: usize, height: u16) -> u16 {
    let visible = usize::from(height.max(1));
    u16::try_from(cursor.saturating_sub(visible - 1)).unwrap_or(u16::MAX)
}
