//! Quiz session controller.
//!
//! Owns the quiz lifecycle: idle → extracting topics → topics ready →
//! generating → active → submitted. Every mutation goes through an intent
//! method that checks the current state first; illegal intents are logged
//! and returned as [`SessionError::InvalidStateTransition`].

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, info, warn};

use crate::client::{Generated, GenerationError, QuestionsRequest, TopicsRequest};
use crate::data::{HistoryError, HistoryStore, Storage, StorageError};
use crate::models::{
    AnswerSelections, AttemptResult, HistoryEntry, QuestionSet, QuizOptions, Score, SessionState,
    UploadedFile, has_pdf_extension,
};
use crate::protocol::topic_field;
use crate::timer::{Clock, Timer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no PDF file selected")]
    NoFileSelected,
    #[error("'{0}' is not a PDF file")]
    InvalidFileType(String),
    #[error("could not read '{path}': {reason}")]
    FileUnreadable { path: String, reason: String },
    #[error("cannot {action} while {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: SessionState,
    },
    #[error("{0} is switched off")]
    CapabilityDisabled(&'static str),
    #[error("question {0} is not part of the current quiz")]
    UnknownQuestion(u32),
    #[error("question {question} has no option {option}")]
    InvalidOption { question: u32, option: usize },
    #[error("topic '{0}' was not extracted from this document")]
    UnknownTopic(String),
    #[error("history entry {0} not found")]
    HistoryEntryNotFound(usize),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<HistoryError> for SessionError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::NotFound(index) => Self::HistoryEntryNotFound(index),
            HistoryError::Storage(e) => Self::Storage(e),
        }
    }
}

/// Optional capabilities of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Ask the service for topics before generating questions.
    pub topic_extraction: bool,
    /// Record completed quizzes in the history store.
    pub history: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            topic_extraction: true,
            history: true,
        }
    }
}

/// Labels recorded with a quiz when it enters history.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QuizOrigin {
    topic: String,
    difficulty: String,
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub state: SessionState,
    pub file_name: Option<&'a str>,
    pub options: &'a QuizOptions,
    pub topics: &'a [String],
    pub selected_topics: &'a [String],
    pub questions: Option<&'a QuestionSet>,
    pub selections: &'a AnswerSelections,
    pub score: Option<Score>,
    pub elapsed: Duration,
    pub timer_running: bool,
    pub can_submit: bool,
    pub topic_extraction: bool,
    pub last_error: Option<&'a GenerationError>,
    pub notice: Option<&'a str>,
}

pub struct Session<S: Storage> {
    config: SessionConfig,
    state: SessionState,
    /// State to fall back to if the in-flight request fails.
    resume_state: SessionState,
    file: Option<UploadedFile>,
    options: QuizOptions,
    topics: Vec<String>,
    selected_topics: Vec<String>,
    questions: Option<QuestionSet>,
    origin: Option<QuizOrigin>,
    selections: AnswerSelections,
    score: Option<Score>,
    timer: Timer,
    clock: Arc<dyn Clock>,
    history: HistoryStore<S>,
    last_error: Option<GenerationError>,
    notice: Option<String>,
}

/// Read a PDF from disk for staging.
pub fn read_upload(path: &str) -> Result<UploadedFile, SessionError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(SessionError::NoFileSelected);
    }
    if !has_pdf_extension(path) {
        return Err(SessionError::InvalidFileType(path.to_string()));
    }

    let bytes = fs::read(path).map_err(|e| SessionError::FileUnreadable {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    Ok(UploadedFile::new(name, bytes))
}

impl<S: Storage> Session<S> {
    pub fn new(config: SessionConfig, options: QuizOptions, history: HistoryStore<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            resume_state: SessionState::Idle,
            file: None,
            options,
            topics: Vec::new(),
            selected_topics: Vec::new(),
            questions: None,
            origin: None,
            selections: AnswerSelections::new(),
            score: None,
            timer: Timer::new(Arc::clone(&clock)),
            clock,
            history,
            last_error: None,
            notice: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn options(&self) -> &QuizOptions {
        &self.options
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn selected_topics(&self) -> &[String] {
        &self.selected_topics
    }

    pub fn questions(&self) -> Option<&QuestionSet> {
        self.questions.as_ref()
    }

    pub fn selections(&self) -> &AnswerSelections {
        &self.selections
    }

    pub fn score(&self) -> Option<Score> {
        self.score
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn last_error(&self) -> Option<&GenerationError> {
        self.last_error.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_messages(&mut self) {
        self.last_error = None;
        self.notice = None;
    }

    pub fn can_submit(&self) -> bool {
        self.state == SessionState::Active
            && self
                .questions
                .as_ref()
                .is_some_and(|set| self.selections.is_complete_for(set))
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            state: self.state,
            file_name: self.file.as_ref().map(|f| f.name.as_str()),
            options: &self.options,
            topics: &self.topics,
            selected_topics: &self.selected_topics,
            questions: self.questions.as_ref(),
            selections: &self.selections,
            score: self.score,
            elapsed: self.timer.elapsed(),
            timer_running: self.timer.is_running(),
            can_submit: self.can_submit(),
            topic_extraction: self.config.topic_extraction,
            last_error: self.last_error.as_ref(),
            notice: self.notice.as_deref(),
        }
    }

    /// Stage a document. Discards topics extracted from a previous one.
    pub fn stage_file(&mut self, file: UploadedFile) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Idle | SessionState::TopicsReady) {
            return Err(self.reject("stage a file"));
        }
        if !file.is_pdf() {
            return Err(SessionError::InvalidFileType(file.name));
        }

        info!(file = %file.name, bytes = file.len(), "staged document");
        self.file = Some(file);
        self.topics.clear();
        self.selected_topics.clear();
        self.state = SessionState::Idle;
        self.dismiss_messages();
        Ok(())
    }

    pub fn set_options(&mut self, options: QuizOptions) -> Result<(), SessionError> {
        if self.state.is_in_flight() {
            return Err(self.reject("change options"));
        }
        self.options = options;
        Ok(())
    }

    pub fn begin_topic_extraction(&mut self) -> Result<TopicsRequest, SessionError> {
        if !self.config.topic_extraction {
            return Err(SessionError::CapabilityDisabled("topic extraction"));
        }
        if self.state != SessionState::Idle {
            return Err(self.reject("extract topics"));
        }
        let file = self.file.clone().ok_or(SessionError::NoFileSelected)?;

        self.resume_state = self.state;
        self.state = SessionState::ExtractingTopics;
        self.dismiss_messages();

        Ok(TopicsRequest {
            file,
            options: self.options.clone(),
        })
    }

    pub fn topics_received(&mut self, result: Result<Generated<Vec<String>>, GenerationError>) -> Result<(), SessionError> {
        if self.state != SessionState::ExtractingTopics {
            return Err(self.reject("receive topics"));
        }

        match result {
            Ok(generated) => {
                if let Some(reason) = &generated.fallback_reason {
                    self.notice = Some(format!("Showing demonstration topics: {}", reason));
                }
                self.topics = generated.value;
                self.selected_topics.clear();
                self.state = SessionState::TopicsReady;
            }
            Err(e) => {
                self.last_error = Some(e);
                self.state = self.resume_state;
            }
        }
        Ok(())
    }

    /// Flip a topic in or out of the selection. Returns whether it is now selected.
    pub fn toggle_topic(&mut self, topic: &str) -> Result<bool, SessionError> {
        if self.state != SessionState::TopicsReady {
            return Err(self.reject("choose topics"));
        }
        if !self.topics.iter().any(|t| t == topic) {
            return Err(SessionError::UnknownTopic(topic.to_string()));
        }

        let now_selected = if let Some(pos) = self.selected_topics.iter().position(|t| t == topic) {
            self.selected_topics.remove(pos);
            false
        } else {
            self.selected_topics.push(topic.to_string());
            true
        };

        // Keep selection in extraction order.
        let topics = &self.topics;
        self.selected_topics
            .sort_by_key(|t| topics.iter().position(|x| x == t).unwrap_or(usize::MAX));

        Ok(now_selected)
    }

    /// Select nothing, which means all topics.
    pub fn clear_topics(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::TopicsReady {
            return Err(self.reject("choose topics"));
        }
        self.selected_topics.clear();
        Ok(())
    }

    pub fn begin_generation(&mut self) -> Result<QuestionsRequest, SessionError> {
        let allowed = match self.state {
            SessionState::TopicsReady | SessionState::Active | SessionState::Submitted => true,
            SessionState::Idle => !self.config.topic_extraction,
            SessionState::ExtractingTopics | SessionState::Generating => false,
        };
        if !allowed {
            return Err(self.reject("generate questions"));
        }
        let file = self.file.clone().ok_or(SessionError::NoFileSelected)?;

        self.resume_state = self.state;
        self.state = SessionState::Generating;
        self.dismiss_messages();

        Ok(QuestionsRequest {
            file,
            options: self.options.clone(),
            topics: self.selected_topics.clone(),
        })
    }

    /// Install a freshly generated set, or return to where generation started.
    pub fn questions_received(&mut self, result: Result<Generated<QuestionSet>, GenerationError>) -> Result<(), SessionError> {
        if self.state != SessionState::Generating {
            return Err(self.reject("receive questions"));
        }

        match result {
            Ok(generated) => {
                if let Some(reason) = &generated.fallback_reason {
                    self.notice = Some(format!("Showing demonstration questions: {}", reason));
                }
                self.origin = Some(QuizOrigin {
                    topic: topic_field(&self.selected_topics),
                    difficulty: self.options.difficulty.as_str().to_string(),
                });
                self.activate(generated.value);
            }
            Err(e) => {
                self.last_error = Some(e);
                self.state = self.resume_state;
            }
        }
        Ok(())
    }

    /// Record an answer, returning the selection it replaced.
    pub fn select_answer(&mut self, question_id: u32, option: usize) -> Result<Option<usize>, SessionError> {
        if self.state != SessionState::Active {
            return Err(self.reject("select an answer"));
        }
        let question = self
            .questions
            .as_ref()
            .and_then(|set| set.get(question_id))
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        if option >= question.options.len() {
            return Err(SessionError::InvalidOption {
                question: question_id,
                option,
            });
        }

        Ok(self.selections.select(question_id, option))
    }

    /// Lock answers, score them and record the attempt.
    pub fn submit(&mut self) -> Result<Score, SessionError> {
        if self.state != SessionState::Active {
            return Err(self.reject("submit"));
        }
        if !self.can_submit() {
            return Err(self.reject("submit with unanswered questions"));
        }
        let Some(set) = self.questions.as_ref() else {
            return Err(self.reject("submit"));
        };

        self.timer.stop();
        let score = Score::calculate(set, &self.selections);
        let elapsed_ms = self.timer.elapsed().as_millis() as u64;

        info!(
            correct = score.correct,
            total = score.total,
            percentage = ?score.percentage(),
            elapsed_ms,
            "quiz submitted"
        );

        if self.config.history {
            let (topic, difficulty) = match &self.origin {
                Some(origin) => (origin.topic.clone(), origin.difficulty.clone()),
                None => (topic_field(&[]), self.options.difficulty.as_str().to_string()),
            };
            let entry = HistoryEntry::new(self.timestamp(), topic, difficulty, set)
                .with_result(AttemptResult::new(score, elapsed_ms));

            if let Err(e) = self.history.append(entry) {
                error!(error = %e, "could not save quiz to history");
                self.notice = Some(format!("Quiz could not be saved to history: {}", e));
            }
        }

        self.score = Some(score);
        self.state = SessionState::Submitted;
        Ok(score)
    }

    /// Clear answers and start a fresh attempt at the same questions.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Active | SessionState::Submitted) {
            return Err(self.reject("reset the quiz"));
        }
        self.selections.clear();
        self.score = None;
        self.timer.reset();
        self.timer.start();
        self.state = SessionState::Active;
        self.dismiss_messages();
        Ok(())
    }

    /// Drop the document and everything derived from it.
    pub fn new_upload(&mut self) -> Result<(), SessionError> {
        if self.state.is_in_flight() {
            return Err(self.reject("start over"));
        }
        self.file = None;
        self.topics.clear();
        self.selected_topics.clear();
        self.questions = None;
        self.origin = None;
        self.selections.clear();
        self.score = None;
        self.timer.reset();
        self.state = SessionState::Idle;
        self.dismiss_messages();
        Ok(())
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        self.history.list()
    }

    pub fn clear_history(&mut self) -> Result<(), SessionError> {
        self.history.clear()?;
        Ok(())
    }

    /// Replay a past quiz. The timer starts from zero.
    pub fn load_history_entry(&mut self, index: usize) -> Result<(), SessionError> {
        if self.state.is_in_flight() {
            return Err(self.reject("load a past quiz"));
        }
        let entry = self.history.get(index)?;
        let set = entry
            .question_set()
            .map_err(|e| StorageError::Corrupt {
                key: format!("history entry {}", index),
                reason: e.to_string(),
            })?;

        info!(index, topic = %entry.topic, questions = set.len(), "loaded quiz from history");
        self.origin = Some(QuizOrigin {
            topic: entry.topic,
            difficulty: entry.difficulty,
        });
        self.dismiss_messages();
        self.activate(set);
        Ok(())
    }

    fn activate(&mut self, set: QuestionSet) {
        self.questions = Some(set);
        self.selections.clear();
        self.score = None;
        self.timer.reset();
        self.timer.start();
        self.state = SessionState::Active;
    }

    fn timestamp(&self) -> String {
        let millis = i64::try_from(self.clock.now_ms()).unwrap_or(i64::MAX);
        DateTime::<Utc>::from_timestamp_millis(millis)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn reject(&self, action: &'static str) -> SessionError {
        warn!(action, state = %self.state, "ignoring intent");
        SessionError::InvalidStateTransition {
            action,
            state: self.state,
        }
    }
}
