//! A single named collection of vector records.

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::{CollectionStats, Payload, Record, SearchResult};
use parking_lot::RwLock;
use tracing::trace;

/// An isolated, independently queryable partition of records.
///
/// Records are append-only. The collection's dimension is established by
/// the first insert; every later vector (and every query) must match it.
///
/// # Concurrency
///
/// All record state lives behind one `RwLock`: queries take the read lock
/// and may run concurrently, while each insert call holds the write lock
/// across validation and append, so a reader never observes a partially
/// applied batch.
pub struct Collection {
    name: String,
    metric: DistanceMetric,
    state: RwLock<CollectionState>,
}

struct CollectionState {
    dimensions: Option<usize>,
    records: Vec<Record>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new(name: String, metric: DistanceMetric) -> Self {
        Self {
            name,
            metric,
            state: RwLock::new(CollectionState {
                dimensions: None,
                records: Vec::new(),
            }),
        }
    }

    /// Name of the collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distance metric of the collection.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Established vector dimension, or `None` before the first insert.
    pub fn dimensions(&self) -> Option<usize> {
        self.state.read().dimensions
    }

    /// Number of records in the collection.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// Whether the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a batch of records atomically.
    ///
    /// The whole batch is validated before any record is appended: on a
    /// dimension mismatch or invalid vector nothing is inserted. An empty
    /// batch is a no-op returning 0.
    ///
    /// Returns the number of records inserted.
    pub fn insert_batch(&self, records: Vec<Record>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.write();

        let expected = match state.dimensions {
            Some(dims) => dims,
            None => {
                let first = records[0].embedding.len();
                if first == 0 {
                    return Err(Error::InvalidVector(format!(
                        "Record '{}' has an empty embedding",
                        records[0].id
                    )));
                }
                first
            }
        };

        for record in &records {
            if record.embedding.len() != expected {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: record.embedding.len(),
                });
            }
            if record.embedding.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidVector(format!(
                    "Record '{}' contains NaN or Inf",
                    record.id
                )));
            }
        }

        // Validation passed: commit the whole batch.
        state.dimensions = Some(expected);
        let count = records.len();
        state.records.extend(records);

        trace!(collection = %self.name, count, "inserted batch");
        Ok(count)
    }

    /// Exact nearest-neighbor search.
    ///
    /// Returns up to `k` results ordered by ascending distance. An empty
    /// collection yields an empty list. Ties keep insertion order, so
    /// results are fully deterministic for a given collection state.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let state = self.state.read();

        let Some(expected) = state.dimensions else {
            return Ok(Vec::new());
        };

        if query.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidVector(
                "Query vector contains NaN or Inf".to_string(),
            ));
        }

        let mut results: Vec<SearchResult> = state
            .records
            .iter()
            .map(|record| SearchResult {
                id: record.id.clone(),
                distance: self.metric.distance(query, &record.embedding),
                payload: record.payload.clone(),
            })
            .collect();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(k);
        Ok(results)
    }

    /// Look up a record's embedding and payload by id.
    pub fn get(&self, id: &str) -> Option<(Vec<f32>, Payload)> {
        let state = self.state.read();
        state
            .records
            .iter()
            .find(|record| record.id == id)
            .map(|record| (record.embedding.clone(), record.payload.clone()))
    }

    /// Whether a record with the given id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.state
            .read()
            .records
            .iter()
            .any(|record| record.id == id)
    }

    /// Snapshot of the collection's statistics.
    pub fn stats(&self) -> CollectionStats {
        let state = self.state.read();
        CollectionStats {
            name: self.name.clone(),
            record_count: state.records.len(),
            dimensions: state.dimensions,
            metric: self.metric,
        }
    }
}
