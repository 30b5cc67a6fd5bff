//! Top-k chunk retrieval against a session collection.

use crate::rag::embeddings::EmbeddingProvider;
use crate::types::{AppError, Chunk, RetrievalResult, Result};
use sage_vector::VectorDb;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Embeds a query and fetches the nearest chunks from one collection.
///
/// Distances coming back from the index are converted to similarities
/// normalized into `[0, 1]` so downstream consumers never see raw
/// metric-dependent values.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: VectorDb,
}

impl Retriever {
    /// Create a retriever over the given provider and index.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: VectorDb) -> Self {
        Self { embedder, index }
    }

    /// Retrieve the `top_k` chunks most similar to `query_text`.
    ///
    /// Results come back in descending similarity order with 1-based
    /// ranks. A collection that is empty, or that does not exist (for
    /// example swept away between requests), yields an empty list rather
    /// than an error.
    #[instrument(skip(self, query_text), fields(collection = %collection))]
    pub async fn retrieve(
        &self,
        query_text: &str,
        collection: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let texts = [query_text.to_string()];
        let mut vectors = self.embedder.embed(&texts).await?;
        let query_embedding = vectors.pop().ok_or_else(|| {
            AppError::Embedding("Provider returned no vector for the query".to_string())
        })?;

        let hits = match self.index.query(collection, &query_embedding, top_k).await {
            Ok(hits) => hits,
            Err(sage_vector::Error::CollectionNotFound(_)) => {
                debug!(collection, "Collection missing, returning no results");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let metric = self.index.metric();
        let results = hits
            .into_iter()
            .enumerate()
            .map(|(i, hit)| RetrievalResult {
                chunk: Chunk::from_payload(&hit.payload),
                similarity: metric.similarity(hit.distance),
                rank: i + 1,
            })
            .collect::<Vec<_>>();

        debug!(count = results.len(), "Retrieved chunks");
        Ok(results)
    }
}
