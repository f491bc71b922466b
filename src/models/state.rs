use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the quiz session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No request in flight; a file may be staged.
    #[default]
    Idle,
    /// Waiting for the service to return topics.
    ExtractingTopics,
    /// Topics are available for selection.
    TopicsReady,
    /// Waiting for the service to return questions.
    Generating,
    /// Answering questions.
    Active,
    /// Answers are locked and scored.
    Submitted,
}

impl SessionState {
    /// True while a network request is outstanding.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::ExtractingTopics | Self::Generating)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ExtractingTopics => "extracting topics",
            Self::TopicsReady => "choosing topics",
            Self::Generating => "generating",
            Self::Active => "answering",
            Self::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty '{}', expected easy, medium or hard", other)),
        }
    }
}

/// Providers the generation service is known to accept.
pub const PROVIDERS: [&str; 2] = ["gemini", "mistral"];

pub const MIN_QUESTION_COUNT: u32 = 1;
pub const MAX_QUESTION_COUNT: u32 = 100;

/// Parameters sent along with every generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOptions {
    pub question_count: u32,
    pub difficulty: Difficulty,
    /// `None` lets the service pick its default model.
    pub provider: Option<String>,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            question_count: 5,
            difficulty: Difficulty::Medium,
            provider: None,
        }
    }
}

impl QuizOptions {
    pub fn increase_count(&mut self) {
        self.question_count = (self.question_count + 1).min(MAX_QUESTION_COUNT);
    }

    pub fn decrease_count(&mut self) {
        self.question_count = self.question_count.saturating_sub(1).max(MIN_QUESTION_COUNT);
    }

    /// Cycle through service default, then each known provider.
    pub fn cycle_provider(&mut self) {
        let position = self
            .provider
            .as_deref()
            .and_then(|current| PROVIDERS.iter().position(|p| *p == current));

        self.provider = match position {
            None => Some(PROVIDERS[0].to_string()),
            Some(i) if i + 1 < PROVIDERS.len() => Some(PROVIDERS[i + 1].to_string()),
            Some(_) => None,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}
