//! Application controller.
//!
//! Turns key presses into session intents, runs service requests on spawned
//! tasks and feeds their results back in through [`AppEvent`]s.

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::client::{Generated, GenerationClient, GenerationError};
use crate::data::{Preferences, Storage};
use crate::export;
use crate::models::{HistoryEntry, Question, QuestionSet, QuizOptions, SessionState, Theme};
use crate::session::{Session, SessionError, read_upload};

const TICK_PERIOD: Duration = Duration::from_millis(250);

/// Everything that reaches the loop besides key presses.
#[derive(Debug)]
pub enum AppEvent {
    Tick,
    TopicsLoaded(Result<Generated<Vec<String>>, GenerationError>),
    QuestionsLoaded(Result<Generated<QuestionSet>, GenerationError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Main,
    History,
}

/// Which part of the upload screen takes key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Path,
    Options,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizTab {
    #[default]
    Questions,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Cursor and screen state. Never read by the session.
#[derive(Debug, Default)]
pub struct UiState {
    pub screen: Screen,
    pub focus: Focus,
    pub path_input: String,
    pub topic_cursor: usize,
    pub question_cursor: usize,
    pub option_cursor: usize,
    pub history: Vec<HistoryEntry>,
    pub history_cursor: usize,
    pub tab: QuizTab,
    pub status: Option<Status>,
    pub theme: Theme,
}

/// Sends [`AppEvent::Tick`] while the quiz clock runs.
struct Ticker {
    events: UnboundedSender<AppEvent>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    fn sync(&mut self, running: bool) {
        match (running, self.handle.is_some()) {
            (true, false) => {
                let events = self.events.clone();
                self.handle = Some(tokio::spawn(async move {
                    let mut interval = tokio::time::interval(TICK_PERIOD);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    loop {
                        interval.tick().await;
                        if events.send(AppEvent::Tick).is_err() {
                            break;
                        }
                    }
                }));
            }
            (false, true) => self.stop(),
            _ => {}
        }
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct App<S: Storage> {
    session: Session<S>,
    client: GenerationClient,
    preferences: Preferences<S>,
    events: UnboundedSender<AppEvent>,
    ticker: Ticker,
    export_dir: PathBuf,
    pub ui: UiState,
    pub should_quit: bool,
}

impl<S: Storage> App<S> {
    pub fn new(
        session: Session<S>,
        client: GenerationClient,
        preferences: Preferences<S>,
        events: UnboundedSender<AppEvent>,
        export_dir: PathBuf,
    ) -> Self {
        let ui = UiState {
            theme: preferences.theme(),
            focus: if session.file().is_some() {
                Focus::Options
            } else {
                Focus::Path
            },
            ..UiState::default()
        };

        Self {
            session,
            client,
            preferences,
            ticker: Ticker {
                events: events.clone(),
                handle: None,
            },
            events,
            export_dir,
            ui,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn ticking(&self) -> bool {
        self.ticker.handle.is_some()
    }

    /// The question under the cursor in the active or submitted quiz.
    pub fn current_question(&self) -> Option<&Question> {
        self.session.questions()?.questions().get(self.ui.question_cursor)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        self.ui.status = None;
        match self.ui.screen {
            Screen::History => self.handle_history_key(key.code),
            Screen::Main => match self.session.state() {
                SessionState::Idle => match self.ui.focus {
                    Focus::Path => self.handle_path_key(key.code),
                    Focus::Options => self.handle_options_key(key.code),
                },
                SessionState::TopicsReady => self.handle_topics_key(key.code),
                SessionState::ExtractingTopics | SessionState::Generating => {
                    if key.code == KeyCode::Char('q') {
                        self.should_quit = true;
                    }
                }
                SessionState::Active => self.handle_quiz_key(key.code),
                SessionState::Submitted => self.handle_result_key(key.code),
            },
        }
        self.ticker.sync(self.session.timer_running());
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => {}
            AppEvent::TopicsLoaded(result) => match self.session.topics_received(result) {
                Ok(()) => self.ui.topic_cursor = 0,
                Err(e) => debug!(error = %e, "dropped topics response"),
            },
            AppEvent::QuestionsLoaded(result) => match self.session.questions_received(result) {
                Ok(()) if self.session.state() == SessionState::Active => self.reset_quiz_cursors(),
                Ok(()) => {}
                Err(e) => debug!(error = %e, "dropped questions response"),
            },
        }
        self.ticker.sync(self.session.timer_running());
    }

    fn handle_path_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => self.stage_path(),
            KeyCode::Tab => self.ui.focus = Focus::Options,
            KeyCode::Esc => self.ui.path_input.clear(),
            KeyCode::Backspace => {
                self.ui.path_input.pop();
            }
            KeyCode::Char(c) => self.ui.path_input.push(c),
            _ => {}
        }
    }

    fn handle_options_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                if self.session.config().topic_extraction {
                    self.extract_topics();
                } else {
                    self.generate();
                }
            }
            KeyCode::Tab => self.ui.focus = Focus::Path,
            KeyCode::Char('h') => self.open_history(),
            KeyCode::Char('u') => self.new_upload(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.session.dismiss_messages(),
            other => self.handle_option_change(other),
        }
    }

    fn handle_topics_key(&mut self, key: KeyCode) {
        let count = self.session.topics().len();
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.ui.topic_cursor = self.ui.topic_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.ui.topic_cursor + 1 < count {
                    self.ui.topic_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(topic) = self.session.topics().get(self.ui.topic_cursor).cloned() {
                    let result = self.session.toggle_topic(&topic);
                    self.report(result);
                }
            }
            KeyCode::Char('a') => {
                let result = self.session.clear_topics();
                self.report(result);
            }
            KeyCode::Enter | KeyCode::Char('g') => self.generate(),
            KeyCode::Char('u') => self.new_upload(),
            KeyCode::Char('h') => self.open_history(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.session.dismiss_messages(),
            other => self.handle_option_change(other),
        }
    }

    fn handle_quiz_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Left => self.move_question(-1),
            KeyCode::Right => self.move_question(1),
            KeyCode::Up | KeyCode::Char('k') => {
                self.ui.option_cursor = self.ui.option_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let options = self.current_question().map_or(0, |q| q.options.len());
                if self.ui.option_cursor + 1 < options {
                    self.ui.option_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.select_option(self.ui.option_cursor),
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(digit) = c.to_digit(10) {
                    self.select_option(digit as usize - 1);
                }
            }
            KeyCode::Char('s') => self.submit(),
            _ => self.handle_quiz_common(key),
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Left | KeyCode::Up | KeyCode::Char('k') => self.move_question(-1),
            KeyCode::Right | KeyCode::Down | KeyCode::Char('j') => self.move_question(1),
            _ => self.handle_quiz_common(key),
        }
    }

    /// Keys shared by the answering and review screens.
    fn handle_quiz_common(&mut self, key: KeyCode) {
        match key {
            KeyCode::Tab => {
                self.ui.tab = match self.ui.tab {
                    QuizTab::Questions => QuizTab::Summary,
                    QuizTab::Summary => QuizTab::Questions,
                };
            }
            KeyCode::Char('r') => {
                let result = self.session.reset();
                if self.report(result).is_some() {
                    self.reset_quiz_cursors();
                }
            }
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('g') => self.generate(),
            KeyCode::Char('u') => self.new_upload(),
            KeyCode::Char('h') => self.open_history(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.session.dismiss_messages(),
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.ui.history_cursor = self.ui.history_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.ui.history_cursor + 1 < self.ui.history.len() {
                    self.ui.history_cursor += 1;
                }
            }
            KeyCode::Enter => self.load_history_entry(),
            KeyCode::Char('c') => {
                let result = self.session.clear_history();
                if self.report(result).is_some() {
                    self.ui.history.clear();
                    self.ui.history_cursor = 0;
                    self.ui.status = Some(Status::info("History cleared"));
                }
            }
            KeyCode::Esc | KeyCode::Char('h') => self.ui.screen = Screen::Main,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_option_change(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Right | KeyCode::Char('+') => {
                self.change_options(QuizOptions::increase_count)
            }
            KeyCode::Down | KeyCode::Left | KeyCode::Char('-') => {
                self.change_options(QuizOptions::decrease_count)
            }
            KeyCode::Char('d') => self.change_options(|o| o.difficulty = o.difficulty.next()),
            KeyCode::Char('p') => self.change_options(QuizOptions::cycle_provider),
            _ => {}
        }
    }

    fn change_options(&mut self, change: impl FnOnce(&mut QuizOptions)) {
        let mut options = self.session.options().clone();
        change(&mut options);
        let result = self.session.set_options(options);
        self.report(result);
    }

    fn stage_path(&mut self) {
        let result = read_upload(&self.ui.path_input).and_then(|file| self.session.stage_file(file));
        if self.report(result).is_some() {
            self.ui.focus = Focus::Options;
            if let Some(file) = self.session.file() {
                self.ui.status = Some(Status::info(format!("Staged {}", file.name)));
            }
        }
    }

    fn extract_topics(&mut self) {
        let result = self.session.begin_topic_extraction();
        let Some(request) = self.report(result) else {
            return;
        };

        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.extract_topics(&request).await;
            let _ = events.send(AppEvent::TopicsLoaded(result));
        });
    }

    fn generate(&mut self) {
        let result = self.session.begin_generation();
        let Some(request) = self.report(result) else {
            return;
        };

        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.generate_questions(&request).await;
            let _ = events.send(AppEvent::QuestionsLoaded(result));
        });
    }

    fn move_question(&mut self, delta: isize) {
        let total = self.session.questions().map_or(0, QuestionSet::len);
        let next = self.ui.question_cursor.saturating_add_signed(delta);
        if next < total {
            self.ui.question_cursor = next;
            self.ui.option_cursor = self
                .current_question()
                .and_then(|q| self.session.selections().get(q.id))
                .unwrap_or(0);
        }
    }

    fn select_option(&mut self, option: usize) {
        let Some(id) = self.current_question().map(|q| q.id) else {
            return;
        };
        let result = self.session.select_answer(id, option);
        if self.report(result).is_some() {
            self.ui.option_cursor = option;
        }
    }

    fn submit(&mut self) {
        if !self.session.can_submit() {
            let total = self.session.questions().map_or(0, QuestionSet::len);
            let remaining = total.saturating_sub(self.session.selections().len());
            self.ui.status = Some(Status::info(format!(
                "Answer every question before submitting ({} left)",
                remaining
            )));
            return;
        }

        let result = self.session.submit();
        if let Some(score) = self.report(result) {
            self.ui.question_cursor = 0;
            self.ui.status = Some(Status::info(format!("Scored {} / {}", score.correct, score.total)));
        }
    }

    fn export(&mut self) {
        let Some(set) = self.session.questions() else {
            return;
        };
        let selections =
            (self.session.state() == SessionState::Submitted).then(|| self.session.selections());

        self.ui.status = Some(match export::write_text(&self.export_dir, set, selections) {
            Ok(path) => Status::info(format!("Exported to {}", path.display())),
            Err(e) => {
                warn!(error = %e, "export failed");
                Status::error(format!("Export failed: {}", e))
            }
        });
    }

    fn new_upload(&mut self) {
        let result = self.session.new_upload();
        if self.report(result).is_some() {
            self.ui.path_input.clear();
            self.ui.focus = Focus::Path;
            self.ui.topic_cursor = 0;
            self.reset_quiz_cursors();
        }
    }

    fn open_history(&mut self) {
        match self.session.history() {
            Ok(entries) => {
                self.ui.history_cursor = entries.len().saturating_sub(1);
                self.ui.history = entries;
                self.ui.screen = Screen::History;
            }
            Err(e) => self.ui.status = Some(Status::error(e.to_string())),
        }
    }

    fn load_history_entry(&mut self) {
        if self.ui.history.is_empty() {
            return;
        }
        let result = self.session.load_history_entry(self.ui.history_cursor);
        if self.report(result).is_some() {
            self.ui.screen = Screen::Main;
            self.reset_quiz_cursors();
        }
    }

    fn toggle_theme(&mut self) {
        self.ui.theme = self.ui.theme.toggled();
        info!(theme = ?self.ui.theme, "switched theme");
        if let Err(e) = self.preferences.set_theme(self.ui.theme) {
            warn!(error = %e, "could not save theme");
            self.ui.status = Some(Status::error(e.to_string()));
        }
    }

    fn reset_quiz_cursors(&mut self) {
        self.ui.question_cursor = 0;
        self.ui.option_cursor = 0;
        self.ui.tab = QuizTab::Questions;
    }

    /// Show user-facing errors. Rejected intents are already logged by the session.
    fn report<T>(&mut self, result: Result<T, SessionError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(SessionError::InvalidStateTransition { .. }) => None,
            Err(e) => {
                self.ui.status = Some(Status::error(e.to_string()));
                None
            }
        }
    }
}
