//! Discovery path assembly
//!
//! A discovery path is an ordered tour of up to five thematically related
//! events for a keyword. Direct nearest-neighbor matches come first; when
//! they are sparse, the path is topped up from related keywords synthesized
//! by the completion provider.

pub mod stepper;

pub use stepper::DiscoveryStepper;

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::{CompletionProvider, EmbeddingProvider};
use crate::models::Event;
use crate::types::AppResult;
use crate::vector_store::VectorStore;

pub const PATH_LIMIT: usize = 5;
const DIRECT_NEIGHBORS: usize = 10;
const EXPANSION_KEYWORDS: usize = 3;
const EXPANSION_NEIGHBORS: usize = 3;

pub struct PathAssembler {
    embedder: Arc<dyn EmbeddingProvider>,
    completions: Arc<dyn CompletionProvider>,
    store: Arc<dyn VectorStore>,
}

impl PathAssembler {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        completions: Arc<dyn CompletionProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            embedder,
            completions,
            store,
        }
    }

    /// Assembles the discovery path for `keyword`.
    ///
    /// Failures embedding the keyword or running the direct query propagate
    /// to the caller. Failures during the expansion phase do not: whatever
    /// was collected so far is returned as a partial path.
    pub async fn assemble(&self, keyword: &str) -> AppResult<Vec<Event>> {
        let embedding = self.embedder.embed(keyword).await?;
        let mut path = self.store.query(&embedding, DIRECT_NEIGHBORS).await?;
        sort_by_relevance(&mut path);

        if path.len() < PATH_LIMIT {
            debug!(
                "only {} direct matches for {keyword:?}, expanding via related keywords",
                path.len()
            );
            if let Err(error) = self.expand(keyword, &mut path).await {
                warn!("expansion failed for {keyword:?}, keeping {} events: {error}", path.len());
            }
        }

        path.truncate(PATH_LIMIT);
        Ok(path)
    }

    async fn expand(&self, keyword: &str, path: &mut Vec<Event>) -> AppResult<()> {
        let related = self
            .completions
            .related_keywords(keyword, EXPANSION_KEYWORDS)
            .await?;

        for related_keyword in related {
            if path.len() >= PATH_LIMIT {
                break;
            }
            let embedding = self.embedder.embed(&related_keyword).await?;
            let candidates = self.store.query(&embedding, EXPANSION_NEIGHBORS).await?;
            for candidate in candidates {
                if path.iter().any(|event| event.title == candidate.title) {
                    continue;
                }
                path.push(candidate);
                if path.len() >= PATH_LIMIT {
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Ascending by similarity score, with date descending (newest first)
/// breaking ties. Unscored events rank after scored ones, ordered by date
/// descending among themselves.
pub fn sort_by_relevance(events: &mut [Event]) {
    events.sort_by(|a, b| match (a.score, b.score) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| b.date.cmp(&a.date)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.date.cmp(&a.date),
    });
}
