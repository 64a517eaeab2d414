// ChromaDB REST client
// Speaks the collection API (/api/v1/collections) and caches the resolved
// collection id after the first lookup.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::ChromaConfig;
use crate::models::Event;
use crate::types::{AppError, AppResult};
use crate::vector_store::{StoredRecord, VectorStore};

const COLLECTION_DESCRIPTION: &str = "Space-related events and data";

pub struct ChromaClient {
    client: Client,
    base_url: String,
    collection_name: String,
    collection_id: RwLock<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
    name: String,
}

/// Flat metadata stored alongside each vector. The document text itself is
/// `"{title} {summary}"`.
#[derive(Debug, Serialize, Deserialize)]
struct EventMetadata {
    title: String,
    summary: String,
    #[serde(default)]
    url: String,
    lat: f64,
    long: f64,
    date: NaiveDate,
}

impl From<&Event> for EventMetadata {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            summary: event.summary.clone(),
            url: event.url.clone(),
            lat: event.lat,
            long: event.long,
            date: event.date,
        }
    }
}

#[derive(Serialize)]
struct AddRequest {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    metadatas: Vec<EventMetadata>,
    documents: Vec<String>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: Vec<&'a [f32]>,
    n_results: usize,
    include: Vec<&'a str>,
}

// Chroma nests each field one level per query embedding; we always send
// exactly one.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    ids: Vec<Vec<String>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<serde_json::Value>>>>,
}

impl ChromaClient {
    pub fn new(config: &ChromaConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            collection_name: config.collection.clone(),
            collection_id: RwLock::new(None),
        }
    }

    async fn check_status(
        response: reqwest::Response,
        what: &str,
    ) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Provider(format!("{what} failed ({status}): {body}")))
    }

    async fn list_collections(&self) -> AppResult<Vec<CollectionInfo>> {
        let url = format!("{}/api/v1/collections", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("list collections failed: {e}")))?;
        let response = Self::check_status(response, "list collections").await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("failed to parse collection list: {e}")))
    }

    async fn create_collection(&self) -> AppResult<CollectionInfo> {
        let url = format!("{}/api/v1/collections", self.base_url);
        let body = json!({
            "name": self.collection_name,
            "metadata": { "description": COLLECTION_DESCRIPTION },
            "get_or_create": true,
        });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("create collection failed: {e}")))?;
        let response = Self::check_status(response, "create collection").await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("failed to parse created collection: {e}")))
    }

    async fn collection_id(&self) -> AppResult<String> {
        if let Some(id) = self.collection_id.read().await.as_ref() {
            return Ok(id.clone());
        }
        self.ensure_collection().await?;
        self.collection_id
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::Internal("collection id not resolved".to_string()))
    }
}

#[async_trait]
impl VectorStore for ChromaClient {
    async fn ensure_collection(&self) -> AppResult<bool> {
        let collections = self.list_collections().await?;
        if let Some(existing) = collections
            .into_iter()
            .find(|collection| collection.name == self.collection_name)
        {
            debug!("collection {} already exists", self.collection_name);
            *self.collection_id.write().await = Some(existing.id);
            return Ok(false);
        }

        info!("creating new collection: {}", self.collection_name);
        let created = self.create_collection().await?;
        *self.collection_id.write().await = Some(created.id);
        Ok(true)
    }

    async fn add(&self, records: &[StoredRecord]) -> AppResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let collection_id = self.collection_id().await?;
        let request = AddRequest {
            ids: records.iter().map(|r| r.event.id.clone()).collect(),
            embeddings: records.iter().map(|r| r.embedding.clone()).collect(),
            metadatas: records.iter().map(|r| EventMetadata::from(&r.event)).collect(),
            documents: records.iter().map(|r| r.document.clone()).collect(),
        };

        let url = format!("{}/api/v1/collections/{}/add", self.base_url, collection_id);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("add to collection failed: {e}")))?;
        Self::check_status(response, "add to collection").await?;

        debug!("added {} records to {}", records.len(), self.collection_name);
        Ok(())
    }

    async fn query(&self, embedding: &[f32], n_results: usize) -> AppResult<Vec<Event>> {
        let collection_id = self.collection_id().await?;
        let url = format!(
            "{}/api/v1/collections/{}/query",
            self.base_url, collection_id
        );
        let request = QueryRequest {
            query_embeddings: vec![embedding],
            n_results,
            include: vec!["metadatas", "distances"],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("vector query failed: {e}")))?;
        let response = Self::check_status(response, "vector query").await?;

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("failed to parse query response: {e}")))?;

        let ids = parsed.ids.into_iter().next().unwrap_or_default();
        let metadatas = parsed
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default();
        let distances = parsed
            .distances
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();

        let mut events = Vec::with_capacity(metadatas.len());
        for (index, metadata) in metadatas.into_iter().enumerate() {
            let Some(value) = metadata else { continue };
            let Ok(metadata) = serde_json::from_value::<EventMetadata>(value) else {
                debug!("dropping query hit {index} with malformed metadata");
                continue;
            };
            events.push(Event {
                id: ids.get(index).cloned().unwrap_or_default(),
                title: metadata.title,
                summary: metadata.summary,
                url: metadata.url,
                lat: metadata.lat,
                long: metadata.long,
                date: metadata.date,
                score: distances.get(index).copied(),
            });
        }

        Ok(events)
    }
}
