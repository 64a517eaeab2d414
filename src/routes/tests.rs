use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use crate::llm::{CompletionProvider, EmbeddingProvider};
use crate::models::{AppState, Event};
use crate::routes::create_router;
use crate::types::{AppError, AppResult};
use crate::vector_store::{StoredRecord, VectorStore};

struct FixedEmbedder {
    fail: bool,
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
        if self.fail {
            return Err(AppError::Provider("embedding backend down".to_string()));
        }
        Ok(vec![0.1, 0.2])
    }
}

struct FixedCompletions(Vec<String>);

#[async_trait]
impl CompletionProvider for FixedCompletions {
    async fn related_keywords(&self, _keyword: &str, count: usize) -> AppResult<Vec<String>> {
        Ok(self.0.iter().take(count).cloned().collect())
    }
}

struct FailingCompletions;

#[async_trait]
impl CompletionProvider for FailingCompletions {
    async fn related_keywords(&self, _keyword: &str, _count: usize) -> AppResult<Vec<String>> {
        Err(AppError::Provider("completion backend down".to_string()))
    }
}

struct FixedStore(Vec<Event>);

#[async_trait]
impl VectorStore for FixedStore {
    async fn ensure_collection(&self) -> AppResult<bool> {
        Ok(false)
    }

    async fn add(&self, _records: &[StoredRecord]) -> AppResult<()> {
        Ok(())
    }

    async fn query(&self, _embedding: &[f32], n_results: usize) -> AppResult<Vec<Event>> {
        Ok(self.0.iter().take(n_results).cloned().collect())
    }
}

fn event(title: &str, score: f32, date: &str) -> Event {
    Event {
        id: title.to_lowercase().replace(' ', "-"),
        title: title.to_string(),
        summary: format!("{title} summary"),
        url: String::new(),
        lat: 10.0,
        long: 20.0,
        date: date.parse().unwrap(),
        score: Some(score),
    }
}

fn state_with(events: Vec<Event>, embedder_fails: bool) -> AppState {
    AppState {
        embedder: Arc::new(FixedEmbedder {
            fail: embedder_fails,
        }),
        completions: Arc::new(FixedCompletions(vec![
            "mars missions".to_string(),
            "red planet".to_string(),
        ])),
        store: Arc::new(FixedStore(events)),
    }
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn search_requires_a_keyword() {
    for body in [r"{}", r#"{"keyword":"   "}"#] {
        let app = create_router(state_with(Vec::new(), false));
        let response = app.oneshot(post_json("/api/search", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Keyword is required");
    }
}

#[tokio::test]
async fn search_returns_scored_events() {
    let events = vec![
        event("Rover Landing", 0.1, "2021-02-18"),
        event("Mars Orbiter", 0.3, "2014-09-24"),
    ];
    let app = create_router(state_with(events, false));

    let response = app
        .oneshot(post_json("/api/search", r#"{"keyword":"Mars"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["title"], "Rover Landing");
    assert!((json[0]["score"].as_f64().unwrap() - 0.1).abs() < 1e-6);
}

#[tokio::test]
async fn search_filters_by_date_range_inclusively() {
    let events = vec![
        event("Rover Landing", 0.1, "2021-02-18"),
        event("Mars Orbiter", 0.3, "2014-09-24"),
        event("Sample Return", 0.5, "2026-07-01"),
    ];
    let app = create_router(state_with(events, false));

    let response = app
        .oneshot(post_json(
            "/api/search",
            r#"{"keyword":"Mars","startDate":"2014-09-24","endDate":"2021-02-18"}"#,
        ))
        .await
        .unwrap();

    let json = body_json(response).await;
    let titles: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Rover Landing", "Mars Orbiter"]);
}

#[tokio::test]
async fn search_without_end_date_returns_everything() {
    let events = vec![
        event("Rover Landing", 0.1, "2021-02-18"),
        event("Mars Orbiter", 0.3, "2014-09-24"),
    ];
    let app = create_router(state_with(events, false));

    let response = app
        .oneshot(post_json(
            "/api/search",
            r#"{"keyword":"Mars","startDate":"2020-01-01"}"#,
        ))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn search_maps_provider_failure_to_500() {
    let app = create_router(state_with(Vec::new(), true));

    let response = app
        .oneshot(post_json("/api/search", r#"{"keyword":"Mars"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    // Endpoint-level message only; the real cause goes to the log.
    assert_eq!(json["error"], "An error occurred while searching");
}

#[tokio::test]
async fn related_keywords_maps_provider_failure_to_500() {
    let state = AppState {
        completions: Arc::new(FailingCompletions),
        ..state_with(Vec::new(), false)
    };
    let app = create_router(state);

    let response = app
        .oneshot(post_json("/api/related-keywords", r#"{"keyword":"Mars"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "An error occurred while generating related keywords"
    );
}

#[tokio::test]
async fn discovery_path_maps_provider_failure_to_500() {
    let app = create_router(state_with(Vec::new(), true));

    let response = app
        .oneshot(post_json("/api/discovery-path", r#"{"keyword":"Mars"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "An error occurred while creating discovery path");
}

#[tokio::test]
async fn related_keywords_returns_wrapped_list() {
    let app = create_router(state_with(Vec::new(), false));

    let response = app
        .oneshot(post_json("/api/related-keywords", r#"{"keyword":"Mars"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["relatedKeywords"],
        serde_json::json!(["mars missions", "red planet"])
    );
}

#[tokio::test]
async fn related_keywords_requires_a_keyword() {
    let app = create_router(state_with(Vec::new(), false));
    let response = app
        .oneshot(post_json("/api/related-keywords", r"{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn discovery_path_caps_at_five_distinct_events() {
    let events = vec![
        event("A", 0.1, "2020-01-01"),
        event("B", 0.2, "2020-01-01"),
        event("C", 0.3, "2020-01-01"),
        event("D", 0.4, "2020-01-01"),
        event("E", 0.5, "2020-01-01"),
        event("F", 0.6, "2020-01-01"),
    ];
    let app = create_router(state_with(events, false));

    let response = app
        .oneshot(post_json("/api/discovery-path", r#"{"keyword":"Mars"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let titles: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["A", "B", "C", "D", "E"]);
}

#[tokio::test]
async fn discovery_path_requires_a_keyword() {
    let app = create_router(state_with(Vec::new(), false));
    let response = app
        .oneshot(post_json("/api/discovery-path", r#"{"keyword":""}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_check_responds_ok() {
    let app = create_router(state_with(Vec::new(), false));
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}
