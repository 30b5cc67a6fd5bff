//! Core data types shared across the SAGE server.
//!
//! Everything that crosses a module boundary lives here: the document
//! chunk model, retrieval and answer shapes, session bookkeeping, API
//! request/response payloads, and the application error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use sage_vector::Payload;
use serde::{Deserialize, Serialize};

// ============= Document Types =============

/// A bounded span of document text carrying its provenance.
///
/// Chunks are produced by the splitter in document order; `sequence_index`
/// preserves that order after the chunk has round-tripped through the
/// vector index as an opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text itself.
    pub text: String,
    /// Identifier of the originating document (usually the file name).
    pub source_id: String,
    /// Page number within the source, when the format has pages.
    pub page: Option<u32>,
    /// Zero-based position of this chunk within its document.
    pub sequence_index: usize,
}

impl Chunk {
    /// Encode this chunk as an index payload.
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("text", self.text.as_str());
        payload.insert("source_id", self.source_id.as_str());
        if let Some(page) = self.page {
            payload.insert("page", page);
        }
        payload.insert("sequence_index", self.sequence_index);
        payload
    }

    /// Decode a chunk from an index payload.
    ///
    /// Missing keys fall back to neutral values rather than failing; the
    /// index stores payloads opaquely and never validates them.
    pub fn from_payload(payload: &Payload) -> Self {
        Self {
            text: payload.get_str("text").unwrap_or_default().to_string(),
            source_id: payload
                .get_str("source_id")
                .unwrap_or("unknown")
                .to_string(),
            page: payload.get_int("page").and_then(|p| u32::try_from(p).ok()),
            sequence_index: payload
                .get_int("sequence_index")
                .and_then(|i| usize::try_from(i).ok())
                .unwrap_or(0),
        }
    }
}

// ============= Retrieval Types =============

/// One retrieved chunk with its relevance to the query.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    /// The chunk decoded from the index payload.
    pub chunk: Chunk,
    /// Normalized similarity in `[0, 1]`, 1 meaning identical.
    pub similarity: f32,
    /// 1-based position in the result list (1 = most similar).
    pub rank: usize,
}

/// A source reference attached to a grounded answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Identifier of the originating document.
    pub source_id: String,
    /// Page number within the source, when known.
    pub page: Option<u32>,
    /// Normalized similarity of the underlying chunk.
    pub similarity: f32,
    /// Leading excerpt of the chunk text.
    pub content_preview: String,
}

/// A grounded answer produced by the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    /// The generated answer text.
    pub answer: String,
    /// References to the chunks the answer was grounded in.
    pub sources: Vec<SourceRef>,
    /// The exact context string that was handed to the model.
    pub context_used: String,
}

// ============= Query Routing =============

/// How a query is routed after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Retrieve from the session's documents and answer grounded in them.
    DocumentSearch,
    /// Answer directly from the model without retrieval.
    GeneralChat,
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryMode::DocumentSearch => write!(f, "document_search"),
            QueryMode::GeneralChat => write!(f, "general_chat"),
        }
    }
}

// ============= Session Types =============

/// One upload recorded in a session's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Name of the uploaded file.
    pub file_name: String,
    /// Number of chunks the file was split into.
    pub chunk_count: usize,
    /// When the upload completed.
    pub uploaded_at: DateTime<Utc>,
}

/// Point-in-time snapshot of a session's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// The session id.
    pub id: String,
    /// Name of the session's private index collection.
    pub collection_name: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last time the session was touched by a query or upload.
    pub last_activity_at: DateTime<Utc>,
    /// Number of documents uploaded into the session.
    pub document_count: usize,
    /// Number of queries answered for the session.
    pub query_count: usize,
    /// Upload history, oldest first.
    pub uploaded_files: Vec<UploadedFile>,
    /// Whether the session has exceeded its idle timeout.
    pub expired: bool,
}

// ============= Health Types =============

/// Reachability of each backing component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Embedding model is loaded and producing vectors.
    pub embedding: bool,
    /// Generation backend answered a probe request.
    pub generation: bool,
    /// Vector index accepted a probe collection.
    pub index: bool,
}

/// Overall service health with per-component detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// True only when every component is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Per-component reachability.
    pub components: ComponentHealth,
}

// ============= API Request/Response Types =============

/// Response to session creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    /// Id of the newly created session.
    pub session_id: String,
}

/// Response to session deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSessionResponse {
    /// Id of the deleted session.
    pub session_id: String,
    /// Always true; deletion of a missing session is a 404 instead.
    pub deleted: bool,
}

/// Request to ingest a document into a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Path of the file to ingest, as visible to the server.
    pub path: String,
    /// Document format; inferred from the file extension when omitted.
    #[serde(default)]
    pub kind: Option<String>,
}

/// Response to a document ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Name of the ingested file.
    pub file_name: String,
    /// Number of chunks indexed for the file.
    pub chunks_indexed: usize,
}

/// Request to answer a question within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer.
    pub question: String,
    /// Override for the number of chunks to retrieve.
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Response to a session query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The answer text.
    pub answer: String,
    /// How the query was routed.
    pub mode: QueryMode,
    /// Sources the answer was grounded in; empty for general chat.
    pub sources: Vec<SourceRef>,
    /// The context block handed to the model; empty for general chat.
    pub context_used: String,
}

/// Request for a sessionless chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The chat message.
    pub message: String,
}

/// Response to a sessionless chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The model's reply.
    pub answer: String,
}

// ============= Error Types =============

/// Application-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding model failed to load or to produce vectors.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Error from the vector index.
    #[error("Vector store error: {0}")]
    VectorStore(#[from] sage_vector::Error),

    /// Generation backend failed after exhausting retries.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Generation refused by a safety or recitation policy.
    #[error("Generation blocked: {0}")]
    Blocked(String),

    /// A named resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller's input was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem error while loading a document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything that should not happen.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Blocked(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::VectorStore(sage_vector::Error::CollectionNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Result type used throughout the server.
pub type Result<T> = std::result::Result<T, AppError>;
