//! # pdf-quiz
//!
//! A terminal client that turns a PDF into a multiple-choice quiz. The
//! document is sent to a remote generation service; the returned questions
//! are answered, scored and kept in a local history.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use clap::Parser;
//! use pdf_quiz::{Config, QuizError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let config = Config::parse();
//!     pdf_quiz::run(config).await
//! }
//! ```
//!
//! The [`Session`] state machine can also be driven without a terminal:
//!
//! ```rust
//! use std::sync::Arc;
//! use pdf_quiz::{HistoryStore, MemoryStorage, QuizOptions, Session, SessionConfig, SessionState, SystemClock};
//!
//! let session = Session::new(
//!     SessionConfig::default(),
//!     QuizOptions::default(),
//!     HistoryStore::new(MemoryStorage::new()),
//!     Arc::new(SystemClock),
//! );
//! assert_eq!(session.state(), SessionState::Idle);
//! ```

mod app;
pub mod client;
mod config;
mod data;
pub mod export;
mod models;
pub mod protocol;
mod session;
pub mod terminal;
mod timer;
mod ui;

use std::io;
use std::sync::Arc;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

pub use app::{App, AppEvent};
pub use client::{Generated, GenerationClient, GenerationError, QuestionsRequest, TopicsRequest};
pub use config::Config;
pub use data::{
    FileStorage, HISTORY_KEY, HistoryError, HistoryStore, MemoryStorage, Preferences, Storage,
    StorageError, THEME_KEY,
};
pub use models::{
    AnswerSelections, AttemptResult, Difficulty, HistoryEntry, Question, QuestionSet, QuestionSetError,
    QuizOptions, Score, SessionState, Theme, UploadedFile,
};
pub use session::{Session, SessionConfig, SessionError, SessionView, read_upload};
pub use timer::{Clock, ManualClock, SystemClock, Timer, TimerState, format_hms};

/// Errors that end the program.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("could not build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Build every component from `config` and run the TUI until the user quits.
pub async fn run(config: Config) -> Result<(), QuizError> {
    let storage = FileStorage::new(&config.data_dir);
    let mut session = Session::new(
        config.session_config(),
        config.quiz_options(),
        HistoryStore::new(storage.clone()),
        Arc::new(SystemClock),
    );

    if let Some(pdf) = &config.pdf {
        let file = read_upload(&pdf.to_string_lossy())?;
        session.stage_file(file)?;
    }

    let client = GenerationClient::new(config.service_url.clone(), config.request_timeout())?
        .with_demo_fallback(config.demo_fallback);

    info!(
        endpoint = client.endpoint(),
        data_dir = %config.data_dir.display(),
        topic_extraction = !config.skip_topics,
        history = !config.no_history,
        demo_fallback = config.demo_fallback,
        "starting"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(session, client, Preferences::new(storage), tx, config.data_dir.clone());

    let mut term = terminal::init()?;
    let result = run_event_loop(&mut term, &mut app, rx).await;
    terminal::restore()?;
    info!("exiting");
    result
}

async fn run_event_loop<S: Storage>(
    terminal: &mut terminal::Tui,
    app: &mut App<S>,
    mut events: UnboundedReceiver<AppEvent>,
) -> Result<(), QuizError> {
    let mut input = EventStream::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(event) = events.recv() => app.handle_event(event),
        }
    }

    Ok(())
}
