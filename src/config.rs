use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::models::{Difficulty, QuizOptions};
use crate::session::SessionConfig;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000/";
pub const DEFAULT_DATA_DIR: &str = ".pdf-quiz";
pub const LOG_FILE_NAME: &str = "pdf-quiz.log";

/// Turn a PDF into a multiple-choice quiz using a remote generation service.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// PDF to stage on startup
    pub pdf: Option<PathBuf>,

    /// Generation service endpoint
    #[arg(long, env = "QUIZ_SERVICE_URL", default_value = DEFAULT_SERVICE_URL)]
    pub service_url: String,

    /// Directory for history, preferences, exports and logs
    #[arg(long, env = "QUIZ_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Seconds to wait for the service before giving up
    #[arg(long, env = "QUIZ_REQUEST_TIMEOUT_SECS", default_value_t = 300)]
    pub request_timeout_secs: u64,

    /// Show demonstration questions when the service fails
    #[arg(long, env = "QUIZ_DEMO_FALLBACK")]
    pub demo_fallback: bool,

    /// Generate straight from the document without the topic step
    #[arg(long)]
    pub skip_topics: bool,

    /// Do not record completed quizzes
    #[arg(long)]
    pub no_history: bool,

    /// Number of questions to request
    #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub question_count: u32,

    /// easy, medium or hard
    #[arg(short, long, default_value = "medium")]
    pub difficulty: Difficulty,

    /// Model provider to ask the service for
    #[arg(long, env = "QUIZ_PROVIDER")]
    pub provider: Option<String>,

    /// Log file (defaults to <data-dir>/pdf-quiz.log)
    #[arg(long, env = "QUIZ_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(LOG_FILE_NAME))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            topic_extraction: !self.skip_topics,
            history: !self.no_history,
        }
    }

    pub fn quiz_options(&self) -> QuizOptions {
        QuizOptions {
            question_count: self.question_count,
            difficulty: self.difficulty,
            provider: self.provider.clone().filter(|p| !p.trim().is_empty()),
        }
    }
}
