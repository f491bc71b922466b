//! Mock generation service for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;

pub type Fields = HashMap<String, String>;
type Reply = Arc<dyn Fn(&Fields) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    recorded: Arc<Mutex<Vec<Fields>>>,
    reply: Reply,
}

pub struct MockService {
    pub url: String,
    recorded: Arc<Mutex<Vec<Fields>>>,
}

impl MockService {
    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Fields> {
        self.recorded.lock().unwrap().clone()
    }
}

/// Serve `reply` on a random local port.
pub async fn spawn_service<F>(reply: F) -> MockService
where
    F: Fn(&Fields) -> (StatusCode, String) + Send + Sync + 'static,
{
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        recorded: Arc::clone(&recorded),
        reply: Arc::new(reply),
    };

    let app = Router::new().route("/", post(handle)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockService {
        url: format!("http://{}/", addr),
        recorded,
    }
}

/// Answers like the real service: topics for the first phase, questions for the second.
pub async fn spawn_quiz_service() -> MockService {
    spawn_service(|fields| {
        if fields.get("topicsExtracted").map(String::as_str) == Some("false") {
            (StatusCode::OK, json!({ "topics": ["Cells", "Algorithms"] }).to_string())
        } else {
            (StatusCode::OK, generation_body(fields))
        }
    })
    .await
}

fn generation_body(fields: &Fields) -> String {
    let count: usize = fields
        .get("question_count")
        .and_then(|c| c.parse().ok())
        .unwrap_or(1);
    let topic = fields.get("topic").cloned().unwrap_or_default();

    let mcqs: Vec<_> = (1..=count)
        .map(|i| {
            json!({
                "id": i,
                "question": format!("{} question {}", topic, i),
                "options": ["w", "x", "y", "z"],
                "correctAnswer": i % 4,
                "explanation": format!("Explanation {}", i),
                "topic": topic,
            })
        })
        .collect();

    json!({
        "mcqs": mcqs,
        "summary": "<h2>Summary</h2><p>Generated</p>",
        "metadata": { "chapter": topic, "difficulty": fields.get("difficulty"), "question_count": count },
        "timing": { "total": 1.5 }
    })
    .to_string()
}

async fn handle(State(state): State<MockState>, mut multipart: Multipart) -> Response {
    let mut fields = Fields::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "pdf_file" {
            fields.insert(
                "pdf_file.name".to_string(),
                field.file_name().unwrap_or_default().to_string(),
            );
            fields.insert(
                "pdf_file.content_type".to_string(),
                field.content_type().unwrap_or_default().to_string(),
            );
            let bytes = field.bytes().await.unwrap_or_default();
            fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
        } else {
            let value = field.text().await.unwrap_or_default();
            fields.insert(name, value);
        }
    }

    let (status, body) = (state.reply)(&fields);
    state.recorded.lock().unwrap().push(fields);

    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Fresh directory under the system temp dir.
pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("pdf-quiz-it-{}", uuid::Uuid::new_v4()))
}

/// Write a small PDF into a fresh directory and return its path.
pub fn write_pdf(name: &str) -> PathBuf {
    let dir = scratch_dir();
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4 test document").unwrap();
    path
}

/// A local URL nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}
