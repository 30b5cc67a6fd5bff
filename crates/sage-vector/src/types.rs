//! Common types for sage-vector.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a record in a collection.
pub type RecordId = String;

/// Opaque payload stored alongside a vector.
///
/// The index never interprets payloads; callers encode their domain data
/// into key-value pairs and decode it from search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payload {
    /// Key-value pairs of payload data.
    pub data: HashMap<String, PayloadValue>,
}

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Create a payload from a list of key-value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PayloadValue>,
    {
        Self {
            data: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Insert a key-value pair.
    pub fn insert<K: Into<String>, V: Into<PayloadValue>>(&mut self, key: K, value: V) {
        self.data.insert(key.into(), value.into());
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.data.get(key)
    }

    /// Get a string value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.data.get(key)? {
            PayloadValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get an integer value by key.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.data.get(key)? {
            PayloadValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get a float value by key.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.data.get(key)? {
            PayloadValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Whether the payload has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of payload entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// A single payload value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PayloadValue {
    /// String value.
    String(String),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl From<String> for PayloadValue {
    fn from(s: String) -> Self {
        PayloadValue::String(s)
    }
}

impl From<&str> for PayloadValue {
    fn from(s: &str) -> Self {
        PayloadValue::String(s.to_string())
    }
}

impl From<i64> for PayloadValue {
    fn from(i: i64) -> Self {
        PayloadValue::Int(i)
    }
}

impl From<u32> for PayloadValue {
    fn from(i: u32) -> Self {
        PayloadValue::Int(i as i64)
    }
}

impl From<usize> for PayloadValue {
    fn from(i: usize) -> Self {
        PayloadValue::Int(i as i64)
    }
}

impl From<f64> for PayloadValue {
    fn from(f: f64) -> Self {
        PayloadValue::Float(f)
    }
}

impl From<bool> for PayloadValue {
    fn from(b: bool) -> Self {
        PayloadValue::Bool(b)
    }
}

/// One record to insert: id, embedding, payload.
#[derive(Debug, Clone)]
pub struct Record {
    /// Unique id within the collection. Never reused once inserted.
    pub id: RecordId,
    /// Embedding vector. Must match the collection's established dimension.
    pub embedding: Vec<f32>,
    /// Opaque payload carried through to search results.
    pub payload: Payload,
}

impl Record {
    /// Create a new record.
    pub fn new(id: impl Into<RecordId>, embedding: Vec<f32>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            embedding,
            payload,
        }
    }
}

/// Result of a nearest-neighbor query.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Id of the matched record.
    pub id: RecordId,
    /// Raw distance under the collection's metric. Lower is closer;
    /// results are returned in ascending distance order.
    pub distance: f32,
    /// Payload stored with the record.
    pub payload: Payload,
}

/// Statistics about a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Name of the collection.
    pub name: String,
    /// Number of records in the collection.
    pub record_count: usize,
    /// Established vector dimension, if any record has been inserted.
    pub dimensions: Option<usize>,
    /// Distance metric used by the collection.
    pub metric: crate::distance::DistanceMetric,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_typed_getters() {
        let mut payload = Payload::new();
        payload.insert("source", "report.txt");
        payload.insert("page", 3u32);
        payload.insert("weight", 0.5f64);

        assert_eq!(payload.get_str("source"), Some("report.txt"));
        assert_eq!(payload.get_int("page"), Some(3));
        assert_eq!(payload.get_float("weight"), Some(0.5));
        assert_eq!(payload.get_str("missing"), None);
        // Wrong-typed access returns None rather than coercing.
        assert_eq!(payload.get_str("page"), None);
    }

    #[test]
    fn test_payload_from_pairs() {
        let payload = Payload::from_pairs([
            ("text", PayloadValue::String("hello".to_string())),
            ("index", PayloadValue::Int(0)),
        ]);

        assert_eq!(payload.len(), 2);
        assert_eq!(payload.get_str("text"), Some("hello"));
        assert_eq!(payload.get_int("index"), Some(0));
    }
}
