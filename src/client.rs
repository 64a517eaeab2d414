// HTTP client for the astromap API
// Mirrors the three server endpoints; used by the `tour` command and any
// embedding of the service as a library.

use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::warn;

use crate::ingest;
use crate::models::{Event, RelatedKeywordsResponse};
use crate::types::{AppError, AppResult};

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn search_events(
        &self,
        keyword: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<Vec<Event>> {
        let response = self
            .client
            .post(format!("{}/api/search", self.base_url))
            .json(&json!({
                "keyword": keyword,
                "startDate": start_date,
                "endDate": end_date,
            }))
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("search request failed: {e}")))?;
        Self::parse(response, "search").await
    }

    pub async fn related_keywords(&self, keyword: &str) -> AppResult<Vec<String>> {
        let response = self
            .client
            .post(format!("{}/api/related-keywords", self.base_url))
            .json(&json!({ "keyword": keyword }))
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("related-keywords request failed: {e}")))?;
        let wrapped: RelatedKeywordsResponse = Self::parse(response, "related-keywords").await?;
        Ok(wrapped.related_keywords)
    }

    pub async fn discovery_path(&self, keyword: &str) -> AppResult<Vec<Event>> {
        let response = self
            .client
            .post(format!("{}/api/discovery-path", self.base_url))
            .json(&json!({ "keyword": keyword }))
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("discovery-path request failed: {e}")))?;
        Self::parse(response, "discovery-path").await
    }

    /// Search with a local dataset scan as fallback when the service is
    /// unreachable or failing.
    pub async fn search_with_fallback(
        &self,
        keyword: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        local: &[Event],
    ) -> Vec<Event> {
        match self.search_events(keyword, start_date, end_date).await {
            Ok(events) => events,
            Err(error) => {
                warn!("search failed, falling back to local dataset scan: {error}");
                let mut events = ingest::scan_keyword(local, keyword);
                if let (Some(start), Some(end)) = (start_date, end_date) {
                    events.retain(|event| event.date_within(start, end));
                }
                events
            }
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "{what} request returned {status}: {body}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("failed to parse {what} response: {e}")))
    }
}
