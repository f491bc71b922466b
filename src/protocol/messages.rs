//! Wire format of the generation service.
//!
//! Requests are multipart forms; responses are JSON objects whose payload
//! fields may arrive either as structured JSON or as a JSON document
//! serialized into a string.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::models::{Question, QuestionSet, QuestionSetError};

/// Multipart field names.
pub mod fields {
    pub const PDF_FILE: &str = "pdf_file";
    pub const QUESTION_COUNT: &str = "question_count";
    pub const DIFFICULTY: &str = "difficulty";
    pub const CHAPTER: &str = "chapter";
    pub const TOPIC: &str = "topic";
    pub const PROVIDER: &str = "provider";
    pub const TOPICS_EXTRACTED: &str = "topicsExtracted";
}

/// Topic value sent when the user has not narrowed the selection.
pub const ALL_TOPICS: &str = "All";

pub const PDF_MIME: &str = "application/pdf";

/// Join selected topics for the `chapter`/`topic` fields.
pub fn topic_field(selected: &[String]) -> String {
    if selected.is_empty() {
        ALL_TOPICS.to_string()
    } else {
        selected.join(",")
    }
}

/// A payload that is either structured JSON or that JSON serialized into a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Encoded<T> {
    Structured(T),
    StringEncoded(String),
}

impl<T: DeserializeOwned> Encoded<T> {
    /// Collapse both representations into `T`.
    pub fn resolve(self) -> Result<T, serde_json::Error> {
        match self {
            Self::Structured(value) => Ok(value),
            Self::StringEncoded(text) => serde_json::from_str(&text),
        }
    }
}

/// Body of a topic extraction response.
#[derive(Debug, Deserialize)]
pub struct TopicsResponse {
    pub topics: Option<Encoded<Vec<String>>>,
}

/// Body of a question generation response.
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    pub mcqs: Option<Encoded<Vec<WireQuestion>>>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Echo of the request parameters. Informational only, so kept untyped.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub timing: Option<serde_json::Value>,
}

/// Body of a non-2xx response, when the service sends one.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `correctAnswer` as sent: usually a number, sometimes a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnswerIndex {
    Number(usize),
    Text(String),
}

impl AnswerIndex {
    pub fn value(&self) -> Option<usize> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireQuestion {
    #[serde(default)]
    pub id: Option<u32>,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: AnswerIndex,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("question {position} has a non-numeric correctAnswer")]
    BadAnswerIndex { position: usize },
    #[error(transparent)]
    Invalid(#[from] QuestionSetError),
}

/// Turn wire questions into a validated set. Missing ids become 1-based positions.
pub fn into_question_set(wire: Vec<WireQuestion>, summary: String) -> Result<QuestionSet, WireError> {
    let questions = wire
        .into_iter()
        .enumerate()
        .map(|(index, q)| {
            let correct_answer = q
                .correct_answer
                .value()
                .ok_or(WireError::BadAnswerIndex { position: index + 1 })?;

            Ok(Question {
                id: q.id.unwrap_or(index as u32 + 1),
                question: q.question,
                options: q.options,
                correct_answer,
                explanation: q.explanation,
                topic: q.topic.filter(|t| !t.trim().is_empty()),
            })
        })
        .collect::<Result<Vec<_>, WireError>>()?;

    Ok(QuestionSet::new(questions, summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_field() {
        assert_eq!(topic_field(&[]), "All");
        assert_eq!(
            topic_field(&["Cells".to_string(), "Algorithms".to_string()]),
            "Cells,Algorithms"
        );
    }

    #[test]
    fn test_string_encoded_topics() {
        let body: TopicsResponse = serde_json::from_str(r#"{"topics": "[\"Cells\", \"Algorithms\"]"}"#).unwrap();
        let topics = body.topics.unwrap().resolve().unwrap();
        assert_eq!(topics, vec!["Cells".to_string(), "Algorithms".to_string()]);

        let body: TopicsResponse = serde_json::from_str(r#"{"topics": ["Cells"]}"#).unwrap();
        assert_eq!(body.topics.unwrap().resolve().unwrap(), vec!["Cells".to_string()]);
    }

    #[test]
    fn test_broken_string_encoding_is_an_error() {
        let body: GenerationResponse = serde_json::from_str(r#"{"mcqs": "[{\"question\": ", "summary": "s"}"#).unwrap();
        assert!(body.mcqs.unwrap().resolve().is_err());
    }

    #[test]
    fn test_wire_questions_coerce_answer_and_assign_ids() {
        let raw = r#"[
            {"question": "Q1", "options": ["a", "b", "c"], "correctAnswer": "2", "explanation": "e1", "topic": "Cells"},
            {"question": "Q2", "options": ["a", "b"], "correctAnswer": 0, "explanation": "e2", "topic": ""}
        ]"#;
        let wire: Vec<WireQuestion> = serde_json::from_str(raw).unwrap();
        let set = into_question_set(wire, "summary".to_string()).unwrap();

        assert_eq!(set.questions()[0].id, 1);
        assert_eq!(set.questions()[0].correct_answer, 2);
        assert_eq!(set.questions()[1].id, 2);
        assert_eq!(set.questions()[1].topic, None);
    }

    #[test]
    fn test_generation_response_keeps_metadata_untyped() {
        let raw = r#"{
            "mcqs": [{"question": "Q1", "options": ["a", "b"], "correctAnswer": 1}],
            "metadata": {"question_count": "1", "difficulty": 3},
            "timing": {"total": 2.5}
        }"#;
        let response: GenerationResponse = serde_json::from_str(raw).unwrap();

        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["question_count"], "1");
        assert_eq!(metadata["difficulty"], 3);
        assert_eq!(response.mcqs.unwrap().resolve().unwrap().len(), 1);
    }

    #[test]
    fn test_wire_questions_reject_bad_answers() {
        let raw = r#"[{"question": "Q1", "options": ["a", "b"], "correctAnswer": "two"}]"#;
        let wire: Vec<WireQuestion> = serde_json::from_str(raw).unwrap();
        assert_eq!(
            into_question_set(wire, String::new()),
            Err(WireError::BadAnswerIndex { position: 1 })
        );

        let raw = r#"[{"question": "Q1", "options": ["a", "b"], "correctAnswer": 5}]"#;
        let wire: Vec<WireQuestion> = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            into_question_set(wire, String::new()),
            Err(WireError::Invalid(QuestionSetError::AnswerOutOfRange { .. }))
        ));
    }
}
