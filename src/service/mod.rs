//! The service facade: session lifecycle, document ingestion, query
//! routing, and health probing behind one type.
//!
//! [`RagService`] is what both the HTTP handlers and library callers
//! talk to. It owns the session registry and the vector index; the
//! embedding provider and generation client are injected so tests can
//! substitute deterministic fakes.

pub mod loader;

use crate::llm::{GenerationClient, GenerationOutcome};
use crate::rag::chunker::TextChunker;
use crate::rag::classifier::QueryClassifier;
use crate::rag::embeddings::EmbeddingProvider;
use crate::rag::pipeline::{RagPipeline, TRUNCATION_NOTICE};
use crate::rag::retriever::Retriever;
use crate::session::SessionRegistry;
use crate::types::{
    AppError, ChatResponse, ComponentHealth, HealthStatus, IngestResponse, QueryMode,
    QueryResponse, Result, SessionStats,
};
use crate::utils::config::Config;
use chrono::{DateTime, Utc};
use loader::DocumentKind;
use sage_vector::{Record, VectorDb};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Answer for a document-search query in a session with no uploads.
pub const NO_DOCUMENTS_ANSWER: &str = "No documents have been uploaded in this session yet. \
     Upload a document first, then ask about its contents.";

/// Collection used (and immediately dropped) by the health probe.
const HEALTH_COLLECTION: &str = "_health_probe";

/// Single words that make a chat prompt date-sensitive.
const TIME_WORDS: [&str; 4] = ["today", "date", "time", "now"];
/// Multi-word phrases that make a chat prompt date-sensitive.
const TIME_PHRASES: [&str; 2] = ["what day", "current date"];

/// Session-isolated document Q&A over injected embedding and
/// generation backends.
pub struct RagService {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationClient>,
    index: VectorDb,
    pipeline: RagPipeline,
    classifier: QueryClassifier,
    sessions: SessionRegistry,
    default_top_k: usize,
    embed_batch_size: usize,
}

impl RagService {
    /// Wire a service from configuration and its backends.
    ///
    /// Fails when the chunking parameters are inconsistent.
    pub fn new(
        config: &Config,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationClient>,
        index: VectorDb,
    ) -> Result<Self> {
        let chunker = TextChunker::new(config.rag.chunk_size, config.rag.chunk_overlap)?;
        let retriever = Retriever::new(embedder.clone(), index.clone());
        let pipeline = RagPipeline::new(retriever, generator.clone());
        let sessions = SessionRegistry::new(chrono::Duration::minutes(
            config.session.idle_timeout_minutes,
        ));

        Ok(Self {
            chunker,
            embedder,
            generator,
            index,
            pipeline,
            classifier: QueryClassifier,
            sessions,
            default_top_k: config.rag.top_k,
            embed_batch_size: config.rag.embedding_batch_size.max(1),
        })
    }

    /// Create a session and its private collection, returning the id.
    pub async fn create_session(&self) -> Result<String> {
        let id = self.sessions.create();
        let collection = SessionRegistry::collection_name(&id);

        if let Err(e) = self.index.open_collection(&collection).await {
            // Roll back so a half-created session is never observable.
            let _ = self.sessions.delete(&id);
            return Err(e.into());
        }
        Ok(id)
    }

    /// Delete a session and drop its collection.
    ///
    /// Dropping an already-missing collection is fine; a sweep may have
    /// raced us to it.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let collection = self.sessions.collection_for(session_id)?;
        self.sessions.delete(session_id)?;

        match self.index.delete_collection(&collection).await {
            Ok(()) | Err(sage_vector::Error::CollectionNotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Snapshot a session's usage counters and upload history.
    pub fn session_stats(&self, session_id: &str) -> Result<SessionStats> {
        self.sessions.stats(session_id)
    }

    /// Load, chunk, embed, and index a document into a session.
    #[instrument(skip(self, path, kind), fields(session_id = %session_id))]
    pub async fn ingest_document(
        &self,
        session_id: &str,
        path: &Path,
        kind: Option<DocumentKind>,
    ) -> Result<IngestResponse> {
        let collection = self.sessions.collection_for(session_id)?;
        let (file_name, chunks_indexed) = self.process_document(&collection, path, kind).await?;
        self.sessions
            .record_upload(session_id, &file_name, chunks_indexed)?;

        info!(session_id, file_name = %file_name, chunks = chunks_indexed, "Ingested document");
        Ok(IngestResponse {
            file_name,
            chunks_indexed,
        })
    }

    async fn process_document(
        &self,
        collection: &str,
        path: &Path,
        kind: Option<DocumentKind>,
    ) -> Result<(String, usize)> {
        let doc = loader::load_document(path, kind).await?;
        let chunks = self.chunker.split(&doc.content, &doc.source_id);

        // Batched so a large document never hands the provider more than
        // `embedding_batch_size` texts at once.
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.embed_batch_size) {
            embeddings.extend(self.embedder.embed(batch).await?);
        }
        if embeddings.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "Provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let tag = document_tag();
        let records: Vec<Record> = chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (chunk, embedding))| {
                Record::new(format!("doc_{}_{}", tag, i), embedding, chunk.to_payload())
            })
            .collect();

        let indexed = self.index.insert(collection, records).await?;
        Ok((doc.source_id, indexed))
    }

    /// Answer a question inside a session, routing it by query mode.
    ///
    /// Document-search questions run the retrieval pipeline against the
    /// session's collection; everything else goes straight to the model
    /// as general chat. Both paths count as session activity.
    #[instrument(skip(self, question), fields(session_id = %session_id))]
    pub async fn query_session(
        &self,
        session_id: &str,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<QueryResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidInput(
                "Question must not be empty".to_string(),
            ));
        }
        let top_k = top_k.unwrap_or(self.default_top_k);
        if top_k == 0 {
            return Err(AppError::InvalidInput(
                "top_k must be at least 1".to_string(),
            ));
        }

        let collection = self.sessions.collection_for(session_id)?;
        self.sessions.record_query(session_id)?;

        let mode = self.classifier.classify(question);
        debug!(session_id, %mode, "Routed query");

        match mode {
            QueryMode::GeneralChat => {
                let answer = self.generate_chat(question).await?;
                Ok(QueryResponse {
                    answer,
                    mode,
                    sources: Vec::new(),
                    context_used: String::new(),
                })
            }
            QueryMode::DocumentSearch => {
                if self.sessions.stats(session_id)?.document_count == 0 {
                    return Ok(QueryResponse {
                        answer: NO_DOCUMENTS_ANSWER.to_string(),
                        mode,
                        sources: Vec::new(),
                        context_used: String::new(),
                    });
                }

                let rag = self.pipeline.answer(question, &collection, top_k).await?;
                Ok(QueryResponse {
                    answer: rag.answer,
                    mode,
                    sources: rag.sources,
                    context_used: rag.context_used,
                })
            }
        }
    }

    /// Session-less general chat.
    pub async fn chat(&self, message: &str) -> Result<ChatResponse> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::InvalidInput(
                "Message must not be empty".to_string(),
            ));
        }

        let answer = self.generate_chat(message).await?;
        Ok(ChatResponse { answer })
    }

    async fn generate_chat(&self, message: &str) -> Result<String> {
        let prompt = with_time_context(message, Utc::now());
        match self.generator.generate(&prompt).await {
            GenerationOutcome::Success { text } => Ok(text),
            GenerationOutcome::Truncated { text } => Ok(format!("{}{}", text, TRUNCATION_NOTICE)),
            GenerationOutcome::Blocked { reason } => Err(AppError::Blocked(reason)),
            GenerationOutcome::Failed { reason } => Err(AppError::Generation(reason)),
        }
    }

    /// Sweep expired sessions and drop their collections.
    ///
    /// Returns how many sessions were removed. A collection that fails
    /// to drop is logged and skipped; the session itself stays gone.
    pub async fn cleanup_expired_sessions(&self) -> usize {
        let swept = self.sessions.sweep_expired();
        for id in &swept {
            let collection = SessionRegistry::collection_name(id);
            match self.index.delete_collection(&collection).await {
                Ok(()) | Err(sage_vector::Error::CollectionNotFound(_)) => {}
                Err(e) => {
                    warn!(session_id = %id, error = %e, "Failed to drop expired session's collection");
                }
            }
        }
        swept.len()
    }

    /// Spawn the periodic expiry sweep.
    ///
    /// The returned handle can be aborted on shutdown; the first tick
    /// fires immediately.
    pub fn start_sweep_task(self: &Arc<Self>, interval: StdDuration) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = service.cleanup_expired_sessions().await;
                if removed > 0 {
                    info!(count = removed, "Removed expired sessions");
                }
            }
        })
    }

    /// Probe each backing component with a cheap real operation.
    pub async fn health_check(&self) -> HealthStatus {
        let probe = ["health probe".to_string()];
        let embedding = match self.embedder.embed(&probe).await {
            Ok(vectors) => !vectors.is_empty(),
            Err(e) => {
                warn!(error = %e, "Embedding probe failed");
                false
            }
        };

        let outcome = self
            .generator
            .generate("Reply with the single word OK.")
            .await;
        let generation = outcome.is_usable();
        if !generation {
            warn!(?outcome, "Generation probe failed");
        }

        let index = match self.probe_index().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Index probe failed");
                false
            }
        };

        let components = ComponentHealth {
            embedding,
            generation,
            index,
        };
        HealthStatus {
            healthy: components.embedding && components.generation && components.index,
            version: env!("CARGO_PKG_VERSION").to_string(),
            components,
        }
    }

    async fn probe_index(&self) -> std::result::Result<(), sage_vector::Error> {
        self.index.open_collection(HEALTH_COLLECTION).await?;
        let _ = self.index.collection_stats(HEALTH_COLLECTION)?;
        self.index.delete_collection(HEALTH_COLLECTION).await?;
        Ok(())
    }
}

fn document_tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn wants_time_context(message: &str) -> bool {
    let lower = message.to_lowercase();
    if TIME_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return true;
    }
    // Whole-word matching: "now" must not fire on "know".
    lower
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .any(|word| TIME_WORDS.contains(&word))
}

/// Prepend today's date to prompts that ask about it. The model has no
/// clock of its own.
fn with_time_context(message: &str, now: DateTime<Utc>) -> String {
    if wants_time_context(message) {
        format!(
            "Today's date is {}.\n\n{}",
            now.format("%A, %B %d, %Y"),
            message
        )
    } else {
        message.to_string()
    }
}
