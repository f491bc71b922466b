use serde::{Deserialize, Serialize};

use super::question::{AnswerSelections, QuestionSet};

/// Result of scoring a submitted quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    pub fn calculate(set: &QuestionSet, selections: &AnswerSelections) -> Self {
        let correct = set
            .questions()
            .iter()
            .filter(|q| selections.get(q.id) == Some(q.correct_answer))
            .count();

        Self {
            correct,
            total: set.len(),
        }
    }

    /// Whole-number percentage, rounded half up. `None` for an empty quiz.
    pub fn percentage(&self) -> Option<u32> {
        if self.total == 0 {
            return None;
        }
        let rounded = (200 * self.correct + self.total) / (2 * self.total);
        Some(rounded as u32)
    }
}
