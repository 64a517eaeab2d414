pub mod chroma;

pub use chroma::ChromaClient;

use async_trait::async_trait;

use crate::models::Event;
use crate::types::AppResult;

/// One embedded record ready for insertion.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub embedding: Vec<f32>,
    pub document: String,
    pub event: Event,
}

/// Named-collection vector store with nearest-neighbor queries ranked
/// ascending by distance.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Makes sure the collection exists. Returns true when it had to be
    /// created, which is the signal to run dataset ingestion.
    async fn ensure_collection(&self) -> AppResult<bool>;

    async fn add(&self, records: &[StoredRecord]) -> AppResult<()>;

    /// Nearest neighbors of `embedding`, reshaped into events with the
    /// distance attached as `score`.
    async fn query(&self, embedding: &[f32], n_results: usize) -> AppResult<Vec<Event>>;
}
