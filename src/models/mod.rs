mod history;
mod question;
mod score;
mod state;
mod upload;

pub use history::{AttemptResult, HistoryEntry};
pub use question::{AnswerSelections, Question, QuestionSet, QuestionSetError};
pub use score::Score;
pub use state::{Difficulty, QuizOptions, SessionState, Theme};
pub use upload::{UploadedFile, has_pdf_extension};

#[cfg(test)]
pub(crate) use question::sample_question;
