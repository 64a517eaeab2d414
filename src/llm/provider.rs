use async_trait::async_trait;

use crate::types::AppResult;

/// Maps free text to a fixed-length vector for similarity comparison.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Synthesizes related keywords for a topic.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn related_keywords(&self, keyword: &str, count: usize) -> AppResult<Vec<String>>;
}
