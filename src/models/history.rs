use serde::{Deserialize, Serialize};

use super::question::{Question, QuestionSet, QuestionSetError};
use super::score::Score;

/// Outcome of a completed attempt, stored alongside the questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub elapsed_ms: u64,
}

impl AttemptResult {
    pub fn new(score: Score, elapsed_ms: u64) -> Self {
        Self {
            score: score.correct,
            total: score.total,
            percentage: score.percentage().unwrap_or(0),
            elapsed_ms,
        }
    }
}

/// A persisted record of one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// RFC 3339 / ISO-8601 timestamp.
    pub timestamp: String,
    pub topic: String,
    pub difficulty: String,
    pub mcqs: Vec<Question>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AttemptResult>,
}

impl HistoryEntry {
    pub fn new(
        timestamp: impl Into<String>,
        topic: impl Into<String>,
        difficulty: impl Into<String>,
        set: &QuestionSet,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            topic: topic.into(),
            difficulty: difficulty.into(),
            mcqs: set.questions().to_vec(),
            summary: set.summary().to_string(),
            result: None,
        }
    }

    pub fn with_result(mut self, result: AttemptResult) -> Self {
        self.result = Some(result);
        self
    }

    /// Rebuild the question set, re-checking its invariants.
    pub fn question_set(&self) -> Result<QuestionSet, QuestionSetError> {
        QuestionSet::new(self.mcqs.clone(), self.summary.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::sample_question;

    #[test]
    fn test_entry_without_result_parses() {
        let json = r#"{
            "timestamp": "2024-05-01T10:00:00.000Z",
            "topic": "All",
            "difficulty": "medium",
            "mcqs": [{"id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": 1, "explanation": "e"}],
            "summary": "s"
        }"#;

        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.result, None);
        assert_eq!(entry.question_set().unwrap().len(), 1);
    }

    #[test]
    fn test_entry_keeps_questions_and_summary() {
        let set = QuestionSet::new(vec![sample_question(1, 0)], "summary text").unwrap();
        let entry = HistoryEntry::new("2024-05-01T10:00:00Z", "Cells", "hard", &set)
            .with_result(AttemptResult::new(Score { correct: 1, total: 1 }, 4_200));

        assert_eq!(entry.question_set().unwrap(), set);
        assert_eq!(entry.result.as_ref().map(|r| r.percentage), Some(100));
    }
}
