//! # S.A.G.E - Sessioned Augmented Generation Engine
//!
//! A document Q&A server with session-isolated retrieval, grounded
//! generation, and automatic query routing.
//!
//! ## Overview
//!
//! S.A.G.E can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `sage-server` binary
//! 2. **As a library** - Import components into your own Rust project
//!
//! Every session owns a private vector collection: documents uploaded
//! in one session are never retrievable from another. Questions are
//! routed automatically; phrasing that refers to uploaded material runs
//! the retrieval pipeline, everything else goes straight to the model
//! as general chat.
//!
//! ## Quick Start (Library Usage)
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sage-server = "0.1"
//! ```
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use sage::{Config, FastEmbedProvider, GeminiClient, RagService};
//! use sage_vector::VectorDb;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!
//!     let embedder = Arc::new(FastEmbedProvider::new(
//!         &config.rag.embedding_model,
//!         config.rag.embedding_batch_size,
//!     )?);
//!     let generator = Arc::new(GeminiClient::new(&config.generation)?);
//!     let service = RagService::new(&config, embedder, generator, VectorDb::new())?;
//!
//!     let session = service.create_session().await?;
//!     service
//!         .ingest_document(&session, Path::new("report.txt"), None)
//!         .await?;
//!
//!     let response = service
//!         .query_session(&session, "What does the document say about Q3?", None)
//!         .await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `local-embeddings` | Local ONNX embedding models via fastembed (default) |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`llm`] - Generation client, Gemini backend, retry policy
//! - [`rag`] - Chunking, embeddings, retrieval, and the answer pipeline
//! - [`service`] - The facade tying sessions, ingestion, and queries together
//! - [`session`] - Session registry with idle expiry
//! - [`types`] - Common types and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Generation backends and retry policy.
pub mod llm;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// The service facade for sessions, ingestion, and queries.
pub mod service;
/// Session registry with idle expiry.
pub mod session;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{GeminiClient, GenerationClient, GenerationOutcome};
#[cfg(feature = "local-embeddings")]
pub use rag::FastEmbedProvider;
pub use rag::{EmbeddingProvider, QueryClassifier, RagPipeline, Retriever, TextChunker};
pub use service::loader::DocumentKind;
pub use service::RagService;
pub use session::SessionRegistry;
pub use types::{AppError, QueryMode, Result};
pub use utils::config::Config;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration.
    pub config: Arc<Config>,
    /// The service facade handlers call into.
    pub service: Arc<RagService>,
}
