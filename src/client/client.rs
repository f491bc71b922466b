//! HTTP client for the generation service.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::{debug, error, info, warn};

use crate::models::{QuestionSet, QuizOptions, UploadedFile};
use crate::protocol::{
    ErrorBody, GenerationResponse, PDF_MIME, TopicsResponse, fields, into_question_set, topic_field,
};

use super::demo;

/// Why a generation request produced no usable result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("could not reach the generation service: {0}")]
    NetworkFailure(String),
    #[error("generation service returned {status}: {message}")]
    BackendError { status: u16, message: String },
    #[error("generation service sent an unusable response: {0}")]
    MalformedResponse(String),
}

/// Topic extraction request, built by the session.
#[derive(Debug, Clone)]
pub struct TopicsRequest {
    pub file: UploadedFile,
    pub options: QuizOptions,
}

/// Question generation request, built by the session.
#[derive(Debug, Clone)]
pub struct QuestionsRequest {
    pub file: UploadedFile,
    pub options: QuizOptions,
    /// Empty means all topics.
    pub topics: Vec<String>,
}

/// A successful result. `fallback_reason` is set when demo content stands in
/// for a failed request.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub fallback_reason: Option<GenerationError>,
}

impl<T> Generated<T> {
    pub fn from_service(value: T) -> Self {
        Self {
            value,
            fallback_reason: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    endpoint: String,
    demo_fallback: bool,
}

impl GenerationClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            demo_fallback: false,
        })
    }

    /// Substitute demonstration content instead of returning errors.
    pub fn with_demo_fallback(mut self, enabled: bool) -> Self {
        self.demo_fallback = enabled;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn extract_topics(&self, request: &TopicsRequest) -> Result<Generated<Vec<String>>, GenerationError> {
        info!(file = %request.file.name, "requesting topic extraction");
        let result = self.request_topics(request).await;
        self.settle("topic extraction", result, demo::topics)
    }

    pub async fn generate_questions(&self, request: &QuestionsRequest) -> Result<Generated<QuestionSet>, GenerationError> {
        info!(
            file = %request.file.name,
            count = request.options.question_count,
            difficulty = %request.options.difficulty,
            topics = %topic_field(&request.topics),
            "requesting question generation"
        );
        let result = self.request_questions(request).await;
        self.settle("question generation", result, demo::question_set)
    }

    fn settle<T>(
        &self,
        phase: &str,
        result: Result<T, GenerationError>,
        fallback: impl FnOnce() -> T,
    ) -> Result<Generated<T>, GenerationError> {
        match result {
            Ok(value) => Ok(Generated::from_service(value)),
            Err(e) if self.demo_fallback => {
                warn!(phase, error = %e, "substituting demonstration content");
                Ok(Generated {
                    value: fallback(),
                    fallback_reason: Some(e),
                })
            }
            Err(e) => {
                error!(phase, error = %e, "generation request failed");
                Err(e)
            }
        }
    }

    async fn request_topics(&self, request: &TopicsRequest) -> Result<Vec<String>, GenerationError> {
        let form = build_form(&request.file, &request.options, &[], false)?;
        let body = self.post(form).await?;

        let response: TopicsResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON body: {}", e)))?;

        let topics = response
            .topics
            .ok_or_else(|| GenerationError::MalformedResponse("response has no topics".to_string()))?
            .resolve()
            .map_err(|e| GenerationError::MalformedResponse(format!("topics could not be parsed: {}", e)))?;

        let mut unique: Vec<String> = Vec::with_capacity(topics.len());
        for topic in topics.into_iter().map(|t| t.trim().to_string()) {
            if !topic.is_empty() && !unique.contains(&topic) {
                unique.push(topic);
            }
        }

        info!(topics = unique.len(), "received topics");
        Ok(unique)
    }

    async fn request_questions(&self, request: &QuestionsRequest) -> Result<QuestionSet, GenerationError> {
        let form = build_form(&request.file, &request.options, &request.topics, true)?;
        let body = self.post(form).await?;

        let response: GenerationResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON body: {}", e)))?;

        if let Some(metadata) = &response.metadata {
            debug!(%metadata, "generation metadata");
        }
        if let Some(timing) = &response.timing {
            debug!(%timing, "generation timing");
        }

        let wire = response
            .mcqs
            .ok_or_else(|| GenerationError::MalformedResponse("response has no mcqs".to_string()))?
            .resolve()
            .map_err(|e| GenerationError::MalformedResponse(format!("mcqs could not be parsed: {}", e)))?;

        let set = into_question_set(wire, response.summary.unwrap_or_default())
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        info!(questions = set.len(), "received questions");
        Ok(set)
    }

    /// One round trip. Returns the body of a 2xx response.
    async fn post(&self, form: Form) -> Result<String, GenerationError> {
        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GenerationError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::NetworkFailure(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::BackendError {
                status: status.as_u16(),
                message: backend_message(&body, status),
            });
        }

        Ok(body)
    }
}

fn build_form(
    file: &UploadedFile,
    options: &QuizOptions,
    topics: &[String],
    topics_extracted: bool,
) -> Result<Form, GenerationError> {
    let part = Part::bytes(file.bytes.to_vec())
        .file_name(file.name.clone())
        .mime_str(PDF_MIME)
        .map_err(|e| GenerationError::NetworkFailure(e.to_string()))?;

    let topic = topic_field(topics);
    let mut form = Form::new()
        .part(fields::PDF_FILE, part)
        .text(fields::QUESTION_COUNT, options.question_count.to_string())
        .text(fields::DIFFICULTY, options.difficulty.as_str())
        .text(fields::CHAPTER, topic.clone())
        .text(fields::TOPIC, topic)
        .text(fields::TOPICS_EXTRACTED, topics_extracted.to_string());

    if let Some(provider) = &options.provider {
        form = form.text(fields::PROVIDER, provider.clone());
    }

    Ok(form)
}

/// Prefer the service's `{"error": ...}` message, then the raw body, then the status text.
fn backend_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
