mod common;

use std::time::Duration;

use axum::http::StatusCode;
use pdf_quiz::client::demo;
use pdf_quiz::{
    Difficulty, GenerationClient, GenerationError, QuestionsRequest, QuizOptions, TopicsRequest, UploadedFile,
};
use serde_json::json;

use common::{closed_port_url, spawn_quiz_service, spawn_service};

fn client(url: &str) -> GenerationClient {
    GenerationClient::new(url, Duration::from_secs(5)).unwrap()
}

fn pdf() -> UploadedFile {
    UploadedFile::new("notes.pdf", b"%PDF-1.4 body".to_vec())
}

fn questions_request(topics: &[&str]) -> QuestionsRequest {
    QuestionsRequest {
        file: pdf(),
        options: QuizOptions::default(),
        topics: topics.iter().map(|t| t.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_topic_phase_sends_form_fields() {
    let service = spawn_quiz_service().await;
    let request = TopicsRequest {
        file: pdf(),
        options: QuizOptions::default(),
    };

    let generated = client(&service.url).extract_topics(&request).await.unwrap();
    assert_eq!(generated.value, vec!["Cells", "Algorithms"]);
    assert!(!generated.is_fallback());

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    let fields = &requests[0];
    assert_eq!(fields["pdf_file"], "%PDF-1.4 body");
    assert_eq!(fields["pdf_file.name"], "notes.pdf");
    assert_eq!(fields["pdf_file.content_type"], "application/pdf");
    assert_eq!(fields["question_count"], "5");
    assert_eq!(fields["difficulty"], "medium");
    assert_eq!(fields["chapter"], "All");
    assert_eq!(fields["topic"], "All");
    assert_eq!(fields["topicsExtracted"], "false");
    assert!(!fields.contains_key("provider"));
}

#[tokio::test]
async fn test_generation_phase_sends_selected_topics_and_provider() {
    let service = spawn_quiz_service().await;
    let mut request = questions_request(&["Cells", "Algorithms"]);
    request.options = QuizOptions {
        question_count: 3,
        difficulty: Difficulty::Hard,
        provider: Some("mistral".to_string()),
    };

    let set = client(&service.url).generate_questions(&request).await.unwrap().value;
    assert_eq!(set.len(), 3);
    assert_eq!(set.summary(), "<h2>Summary</h2><p>Generated</p>");

    let fields = &service.requests()[0];
    assert_eq!(fields["topicsExtracted"], "true");
    assert_eq!(fields["chapter"], "Cells,Algorithms");
    assert_eq!(fields["topic"], "Cells,Algorithms");
    assert_eq!(fields["difficulty"], "hard");
    assert_eq!(fields["question_count"], "3");
    assert_eq!(fields["provider"], "mistral");
}

#[tokio::test]
async fn test_string_encoded_mcqs_are_parsed() {
    let mcqs = json!([
        { "question": "Q1", "options": ["a", "b"], "correctAnswer": "1", "explanation": "e1" },
        { "question": "Q2", "options": ["a", "b", "c"], "correctAnswer": 2 }
    ])
    .to_string();
    let body = json!({ "mcqs": mcqs, "summary": "s" }).to_string();
    let service = spawn_service(move |_| (StatusCode::OK, body.clone())).await;

    let set = client(&service.url)
        .generate_questions(&questions_request(&[]))
        .await
        .unwrap()
        .value;

    let ids: Vec<u32> = set.questions().iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(set.questions()[0].correct_answer, 1);
    assert_eq!(set.questions()[1].correct_answer, 2);
    assert_eq!(set.questions()[1].explanation, "");
}

#[tokio::test]
async fn test_unexpected_metadata_types_do_not_reject_questions() {
    let body = json!({
        "mcqs": [{ "id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": 0 }],
        "summary": "s",
        "metadata": {
            "question_count": "1",
            "difficulty": 2,
            "chapter": ["Cells"],
            "extraction_method": null
        },
        "timing": "slow"
    })
    .to_string();
    let service = spawn_service(move |_| (StatusCode::OK, body.clone())).await;

    let generated = client(&service.url)
        .generate_questions(&questions_request(&[]))
        .await
        .unwrap();
    assert!(!generated.is_fallback());
    assert_eq!(generated.value.len(), 1);
    assert_eq!(generated.value.questions()[0].question, "Q");
}

#[tokio::test]
async fn test_unparseable_mcqs_are_malformed() {
    let service = spawn_service(|_| (StatusCode::OK, r#"{"mcqs":"not json["}"#.to_string())).await;

    let err = client(&service.url)
        .generate_questions(&questions_request(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_missing_or_empty_payloads_are_malformed() {
    let service = spawn_service(|fields| {
        if fields["topicsExtracted"] == "false" {
            (StatusCode::OK, r#"{"status":"ok"}"#.to_string())
        } else {
            (StatusCode::OK, r#"{"mcqs":[],"summary":"nothing"}"#.to_string())
        }
    })
    .await;
    let client = client(&service.url);

    let topics = client
        .extract_topics(&TopicsRequest {
            file: pdf(),
            options: QuizOptions::default(),
        })
        .await;
    assert!(matches!(topics, Err(GenerationError::MalformedResponse(_))));

    let questions = client.generate_questions(&questions_request(&[])).await;
    assert!(matches!(questions, Err(GenerationError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_out_of_range_answer_is_malformed() {
    let body = json!({
        "mcqs": [{ "id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": 5 }]
    })
    .to_string();
    let service = spawn_service(move |_| (StatusCode::OK, body.clone())).await;

    let err = client(&service.url)
        .generate_questions(&questions_request(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_error_status_becomes_backend_error() {
    let service = spawn_service(|_| {
        (
            StatusCode::BAD_REQUEST,
            json!({ "error": "No PDF file provided" }).to_string(),
        )
    })
    .await;

    let err = client(&service.url)
        .generate_questions(&questions_request(&[]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GenerationError::BackendError {
            status: 400,
            message: "No PDF file provided".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreachable_service_is_network_failure() {
    let url = closed_port_url().await;

    let err = client(&url)
        .generate_questions(&questions_request(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::NetworkFailure(_)));
}

#[tokio::test]
async fn test_demo_fallback_reports_reason() {
    let service = spawn_service(|_| (StatusCode::INTERNAL_SERVER_ERROR, String::new())).await;
    let client = client(&service.url).with_demo_fallback(true);

    let generated = client.generate_questions(&questions_request(&[])).await.unwrap();
    assert!(generated.is_fallback());
    assert_eq!(generated.value, demo::question_set());
    assert!(matches!(
        generated.fallback_reason,
        Some(GenerationError::BackendError { status: 500, .. })
    ));

    let topics = client
        .extract_topics(&TopicsRequest {
            file: pdf(),
            options: QuizOptions::default(),
        })
        .await
        .unwrap();
    assert!(topics.is_fallback());
    assert_eq!(topics.value, demo::topics());
}
