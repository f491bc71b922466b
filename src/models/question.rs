use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// A single multiple-choice question as returned by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Question {
    pub fn is_correct(&self, option: usize) -> bool {
        self.correct_answer == option
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer).map(String::as_str)
    }
}

/// Reasons a batch of questions cannot form a quiz.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestionSetError {
    #[error("the question set is empty")]
    Empty,
    #[error("question {0} has fewer than two options")]
    TooFewOptions(u32),
    #[error("question {id} marks option {answer} as correct but has {options} options")]
    AnswerOutOfRange { id: u32, answer: usize, options: usize },
    #[error("question id {0} appears more than once")]
    DuplicateId(u32),
}

/// An ordered set of questions plus the document summary that came with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
    summary: String,
}

impl QuestionSet {
    /// Build a set, checking that every question is answerable and ids are unique.
    pub fn new(questions: Vec<Question>, summary: impl Into<String>) -> Result<Self, QuestionSetError> {
        Self::check(&questions)?;
        Ok(Self::from_checked(questions, summary))
    }

    /// Build a set from questions already known to pass [`QuestionSet::new`]'s checks.
    pub(crate) fn from_checked(questions: Vec<Question>, summary: impl Into<String>) -> Self {
        Self {
            questions,
            summary: summary.into(),
        }
    }

    fn check(questions: &[Question]) -> Result<(), QuestionSetError> {
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in questions {
            if question.options.len() < 2 {
                return Err(QuestionSetError::TooFewOptions(question.id));
            }
            if question.correct_answer >= question.options.len() {
                return Err(QuestionSetError::AnswerOutOfRange {
                    id: question.id,
                    answer: question.correct_answer,
                    options: question.options.len(),
                });
            }
            if !seen.insert(question.id) {
                return Err(QuestionSetError::DuplicateId(question.id));
            }
        }

        Ok(())
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn position(&self, id: u32) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    /// Distinct topic labels in question order.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = Vec::new();
        for topic in self.questions.iter().filter_map(|q| q.topic.as_ref()) {
            if !topics.contains(topic) {
                topics.push(topic.clone());
            }
        }
        topics
    }
}

/// Chosen option per question id. An absent key means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSelections {
    chosen: BTreeMap<u32, usize>,
}

impl AnswerSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: u32) -> Option<usize> {
        self.chosen.get(&question_id).copied()
    }

    /// Record a selection, returning the one it replaced.
    pub fn select(&mut self, question_id: u32, option: usize) -> Option<usize> {
        self.chosen.insert(question_id, option)
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }

    pub fn is_complete_for(&self, set: &QuestionSet) -> bool {
        set.questions().iter().all(|q| self.chosen.contains_key(&q.id))
    }
}

#[cfg(test)]
pub(crate) fn sample_question(id: u32, correct_answer: usize) -> Question {
    Question {
        id,
        question: format!("Question {}", id),
        options: vec![
            "Option A".to_string(),
            "Option B".to_string(),
            "Option C".to_string(),
            "Option D".to_string(),
        ],
        correct_answer,
        explanation: format!("Because of reason {}", id),
        topic: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_set_validation() {
        assert_eq!(QuestionSet::new(vec![], ""), Err(QuestionSetError::Empty));

        let mut short = sample_question(1, 0);
        short.options.truncate(1);
        assert_eq!(
            QuestionSet::new(vec![short], ""),
            Err(QuestionSetError::TooFewOptions(1))
        );

        assert_eq!(
            QuestionSet::new(vec![sample_question(1, 4)], ""),
            Err(QuestionSetError::AnswerOutOfRange {
                id: 1,
                answer: 4,
                options: 4
            })
        );

        assert_eq!(
            QuestionSet::new(vec![sample_question(2, 0), sample_question(2, 1)], ""),
            Err(QuestionSetError::DuplicateId(2))
        );

        let set = QuestionSet::new(vec![sample_question(1, 0), sample_question(2, 3)], "sum").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.summary(), "sum");
        assert_eq!(set.position(2), Some(1));
        assert_eq!(set.get(2).and_then(|q| q.correct_option()), Some("Option D"));
    }

    #[test]
    fn test_selection_overwrites() {
        let set = QuestionSet::new(vec![sample_question(1, 0), sample_question(2, 1)], "").unwrap();
        let mut selections = AnswerSelections::new();

        assert_eq!(selections.select(1, 2), None);
        assert_eq!(selections.select(1, 3), Some(2));
        assert_eq!(selections.get(1), Some(3));
        assert!(!selections.is_complete_for(&set));

        selections.select(2, 0);
        assert!(selections.is_complete_for(&set));
        assert_eq!(selections.len(), 2);
    }

    #[test]
    fn test_topics_are_distinct_and_ordered() {
        let mut a = sample_question(1, 0);
        a.topic = Some("Cells".to_string());
        let mut b = sample_question(2, 0);
        b.topic = Some("Algorithms".to_string());
        let mut c = sample_question(3, 0);
        c.topic = Some("Cells".to_string());

        let set = QuestionSet::new(vec![a, b, c], "").unwrap();
        assert_eq!(set.topics(), vec!["Cells".to_string(), "Algorithms".to_string()]);
    }

    #[test]
    fn test_question_serializes_camel_case() {
        let json = serde_json::to_string(&sample_question(7, 2)).unwrap();
        assert!(json.contains("\"correctAnswer\":2"));
        assert!(!json.contains("topic"));
    }
}
