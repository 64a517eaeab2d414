use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::llm::{CompletionProvider, EmbeddingProvider};
use crate::vector_store::VectorStore;

#[derive(Clone)]
pub struct AppState {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub completions: Arc<dyn CompletionProvider>,
    pub store: Arc<dyn VectorStore>,
}

/// A geolocated space event. `score` is a similarity distance (lower is
/// closer) and is only present on records produced by a vector query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub url: String,
    pub lat: f64,
    pub long: f64,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Event {
    pub fn date_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.date >= start && self.date <= end
    }
}

// API request/response types. Field names mirror the public wire format
// (camelCase) expected by existing clients.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub keyword: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordRequest {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedKeywordsResponse {
    pub related_keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
