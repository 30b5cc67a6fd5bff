//! Retrieval-Augmented Generation pipeline.
//!
//! Everything between raw document text and a grounded answer lives
//! here: routing, chunking, embedding, retrieval, and the pipeline that
//! composes them.
//!
//! # Module Structure
//!
//! - [`classifier`] - routes queries to document search or general chat
//! - [`chunker`] - recursive separator-cascade text splitting
//! - [`embeddings`] - embedding provider trait and local ONNX backend
//! - [`retriever`] - top-k chunk retrieval with normalized similarities
//! - [`pipeline`] - retrieve, assemble context, generate, cite
//!
//! # Pipeline Flow
//!
//! 1. **Ingestion** - documents are chunked and embedded in batches
//! 2. **Storage** - vectors land in a per-session index collection
//! 3. **Retrieval** - the query is embedded and the nearest chunks fetched
//! 4. **Generation** - a grounding prompt constrains the model to the
//!    retrieved context, and the answer carries source references
//!
//! # Example
//!
//! ```rust,ignore
//! use sage::rag::{chunker::TextChunker, pipeline::RagPipeline, retriever::Retriever};
//!
//! let chunker = TextChunker::new(1000, 200)?;
//! let chunks = chunker.split(&document_text, "report.txt");
//!
//! let pipeline = RagPipeline::new(retriever, generator);
//! let answer = pipeline.answer("What changed?", "session_abc", 3).await?;
//! println!("{}", answer.answer);
//! ```

pub mod chunker;
pub mod classifier;
pub mod embeddings;
pub mod pipeline;
pub mod retriever;

pub use chunker::TextChunker;
pub use classifier::QueryClassifier;
pub use embeddings::EmbeddingProvider;
pub use pipeline::RagPipeline;
pub use retriever::Retriever;

#[cfg(feature = "local-embeddings")]
pub use embeddings::FastEmbedProvider;
