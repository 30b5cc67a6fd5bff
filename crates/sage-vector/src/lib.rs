//! # sage-vector
//!
//! A pure-Rust embedded vector index with exact nearest-neighbor search,
//! built for session-scoped document retrieval.
//!
//! ## Features
//!
//! - **Pure Rust**: no native dependencies, compiles anywhere Rust does
//! - **Exact search**: brute-force scan per collection, so results are
//!   fully deterministic for a given collection state
//! - **Thread-safe**: concurrent queries during inserts never observe a
//!   partially applied batch
//! - **Opaque payloads**: records carry typed key-value payloads the
//!   index never interprets
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sage_vector::{Payload, Record, VectorDb};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sage_vector::Error> {
//!     let db = VectorDb::new();
//!
//!     // Collections are created on first open; opening again is a no-op.
//!     db.open_collection("session_abc").await?;
//!
//!     // The first insert establishes the collection's dimension.
//!     let record = Record::new("doc_1", vec![0.1f32; 384], Payload::new());
//!     db.insert("session_abc", vec![record]).await?;
//!
//!     // Top-k query, ordered by ascending distance.
//!     let results = db.query("session_abc", &vec![0.1f32; 384], 3).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod distance;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use collection::Collection;
pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use types::{CollectionStats, Payload, PayloadValue, Record, RecordId, SearchResult};

use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The main vector index instance.
///
/// `VectorDb` manages multiple named collections. All operations are
/// thread-safe: the collection registry is an `scc::HashMap` (lock-free
/// reads, fine-grained writes, safe across `.await` points) and each
/// collection guards its records with a single `RwLock`.
#[derive(Clone, Default)]
pub struct VectorDb {
    inner: Arc<VectorDbInner>,
}

#[derive(Default)]
struct VectorDbInner {
    metric: DistanceMetric,
    /// Async-safe concurrent hashmap from the scc crate.
    collections: scc::HashMap<String, Arc<Collection>>,
}

impl VectorDb {
    /// Create an in-memory vector index using cosine distance.
    pub fn new() -> Self {
        Self::with_metric(DistanceMetric::Cosine)
    }

    /// Create an in-memory vector index with an explicit distance metric.
    pub fn with_metric(metric: DistanceMetric) -> Self {
        info!(%metric, "Opening vector index");
        Self {
            inner: Arc::new(VectorDbInner {
                metric,
                collections: scc::HashMap::new(),
            }),
        }
    }

    /// The distance metric new collections are created with.
    pub fn metric(&self) -> DistanceMetric {
        self.inner.metric
    }

    /// Open a collection, creating it if it does not exist.
    ///
    /// Idempotent: opening an existing collection never alters its
    /// contents. A collection deleted and opened again starts empty.
    #[instrument(skip(self))]
    pub async fn open_collection(&self, name: &str) -> Result<()> {
        if self.inner.collections.contains(name) {
            return Ok(());
        }

        let collection = Arc::new(Collection::new(name.to_string(), self.inner.metric));
        // A racing creator may win the insert; either way the collection
        // exists afterwards, which is all create-or-open promises.
        if self
            .inner
            .collections
            .insert(name.to_string(), collection)
            .is_ok()
        {
            debug!(name, "Created collection");
        }
        Ok(())
    }

    /// Delete a collection and all its records.
    ///
    /// Subsequent queries against the name fail with
    /// [`Error::CollectionNotFound`] until it is opened again.
    #[instrument(skip(self))]
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        if self.inner.collections.remove(name).is_none() {
            return Err(Error::CollectionNotFound(name.to_string()));
        }
        info!(name, "Deleted collection");
        Ok(())
    }

    /// Check whether a collection exists.
    pub fn collection_exists(&self, name: &str) -> bool {
        self.inner.collections.contains(name)
    }

    /// List all collection names.
    pub fn list_collections(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.inner.collections.scan(|name, _| {
            names.push(name.clone());
        });
        names
    }

    fn get_collection(&self, name: &str) -> Result<Arc<Collection>> {
        self.inner
            .collections
            .read(name, |_, collection| collection.clone())
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
    }

    /// Insert a batch of records into a collection.
    ///
    /// The batch is atomic: concurrent queries observe either none or all
    /// of it, and validation failures insert nothing. The first insert
    /// establishes the collection's dimension. An empty batch is a no-op.
    ///
    /// Returns the number of records inserted.
    #[instrument(skip(self, records), fields(collection = %collection, count = records.len()))]
    pub async fn insert(&self, collection: &str, records: Vec<Record>) -> Result<usize> {
        let col = self.get_collection(collection)?;
        let count = col.insert_batch(records)?;
        debug!(count, "Inserted batch");
        Ok(count)
    }

    /// Exact top-k query, ordered by ascending distance.
    ///
    /// Returns at most `k` results; fewer when the collection holds fewer
    /// records, and none at all for a collection with no inserts yet.
    #[instrument(skip(self, query), fields(collection = %collection, dim = query.len()))]
    pub async fn query(
        &self,
        collection: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        let col = self.get_collection(collection)?;
        let results = col.search(query, k)?;
        debug!(count = results.len(), "Query completed");
        Ok(results)
    }

    /// Look up a record's embedding and payload by id.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<(Vec<f32>, Payload)>> {
        let col = self.get_collection(collection)?;
        Ok(col.get(id))
    }

    /// Check whether a record exists in a collection.
    pub fn contains(&self, collection: &str, id: &str) -> Result<bool> {
        let col = self.get_collection(collection)?;
        Ok(col.contains(id))
    }

    /// Number of records in a collection.
    pub fn count(&self, collection: &str) -> Result<usize> {
        let col = self.get_collection(collection)?;
        Ok(col.len())
    }

    /// Statistics snapshot for a collection.
    pub fn collection_stats(&self, collection: &str) -> Result<CollectionStats> {
        let col = self.get_collection(collection)?;
        Ok(col.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, embedding: Vec<f32>) -> Record {
        Record::new(id, embedding, Payload::new())
    }

    #[tokio::test]
    async fn test_open_insert_query() {
        let db = VectorDb::new();
        db.open_collection("test").await.unwrap();

        db.insert(
            "test",
            vec![
                record("vec1", vec![1.0, 0.0, 0.0]),
                record("vec2", vec![0.0, 1.0, 0.0]),
                record("vec3", vec![0.9, 0.1, 0.0]),
            ],
        )
        .await
        .unwrap();

        let results = db.query("test", &[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "vec1");
        assert!(results[0].distance < results[1].distance);
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let db = VectorDb::new();
        db.open_collection("test").await.unwrap();
        db.insert("test", vec![record("vec1", vec![1.0, 0.0])])
            .await
            .unwrap();

        // Re-opening must not alter contents.
        db.open_collection("test").await.unwrap();
        assert_eq!(db.count("test").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_collection_lifecycle() {
        let db = VectorDb::new();

        assert!(!db.collection_exists("test"));
        db.open_collection("test").await.unwrap();
        assert!(db.collection_exists("test"));

        db.insert("test", vec![record("vec1", vec![1.0, 0.0])])
            .await
            .unwrap();
        db.delete_collection("test").await.unwrap();
        assert!(!db.collection_exists("test"));

        let result = db.query("test", &[1.0, 0.0], 3).await;
        assert!(matches!(result, Err(Error::CollectionNotFound(_))));

        // Recreated collection starts empty.
        db.open_collection("test").await.unwrap();
        assert_eq!(db.count("test").unwrap(), 0);
        assert!(db.query("test", &[1.0, 0.0], 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_collection() {
        let db = VectorDb::new();
        let result = db.delete_collection("ghost").await;
        assert!(matches!(result, Err(Error::CollectionNotFound(_))));
    }

    #[tokio::test]
    async fn test_query_isolated_per_collection() {
        let db = VectorDb::new();
        db.open_collection("a").await.unwrap();
        db.open_collection("b").await.unwrap();

        db.insert("a", vec![record("only_in_a", vec![1.0, 0.0])])
            .await
            .unwrap();

        let results = db.query("b", &[1.0, 0.0], 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_queries_never_see_partial_batches() {
        const BATCH: usize = 10;
        const BATCHES: usize = 5;

        let db = VectorDb::new();
        db.open_collection("test").await.unwrap();

        let mut writers = Vec::new();
        for batch_idx in 0..BATCHES {
            let db = db.clone();
            writers.push(tokio::spawn(async move {
                let records: Vec<Record> = (0..BATCH)
                    .map(|i| {
                        record(
                            &format!("doc_{}_{}", batch_idx, i),
                            vec![batch_idx as f32, i as f32, 1.0],
                        )
                    })
                    .collect();
                db.insert("test", records).await.unwrap();
            }));
        }

        let reader = {
            let db = db.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    let results = db.query("test", &[1.0, 1.0, 1.0], 1000).await.unwrap();
                    // Each insert call is atomic, so a reader only ever
                    // sees whole batches.
                    assert_eq!(results.len() % BATCH, 0);
                    tokio::task::yield_now().await;
                }
            })
        };

        for writer in writers {
            writer.await.unwrap();
        }
        reader.await.unwrap();

        assert_eq!(db.count("test").unwrap(), BATCH * BATCHES);
    }

    #[tokio::test]
    async fn test_stats() {
        let db = VectorDb::new();
        db.open_collection("test").await.unwrap();

        let stats = db.collection_stats("test").unwrap();
        assert_eq!(stats.record_count, 0);
        assert_eq!(stats.dimensions, None);

        db.insert("test", vec![record("vec1", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();

        let stats = db.collection_stats("test").unwrap();
        assert_eq!(stats.name, "test");
        assert_eq!(stats.record_count, 1);
        assert_eq!(stats.dimensions, Some(3));
        assert_eq!(stats.metric, DistanceMetric::Cosine);
    }
}
