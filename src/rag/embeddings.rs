//! Embedding provider abstraction and the local ONNX implementation.

use crate::types::Result;
use async_trait::async_trait;

/// Turns text into fixed-dimension vectors.
///
/// Implementations load their model at construction and fail fast there;
/// `embed` assumes a loaded model. Output order matches input order, and
/// every vector has exactly `dimensions()` entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, preserving input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Fixed output dimension of this provider.
    fn dimensions(&self) -> usize;

    /// Identifier of the underlying model.
    fn model_name(&self) -> String;
}

#[cfg(feature = "local-embeddings")]
pub use local::FastEmbedProvider;

#[cfg(feature = "local-embeddings")]
mod local {
    use super::EmbeddingProvider;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use parking_lot::Mutex;
    use tracing::info;

    /// Local ONNX embeddings via fastembed.
    ///
    /// The model weights are downloaded on first use and cached, so
    /// construction can take a while on a cold machine.
    pub struct FastEmbedProvider {
        model: Mutex<TextEmbedding>,
        model_name: String,
        dimensions: usize,
        batch_size: usize,
    }

    impl FastEmbedProvider {
        /// Load the named model, failing if it is unknown or cannot load.
        pub fn new(model_name: &str, batch_size: usize) -> Result<Self> {
            let (model_kind, dimensions) = resolve_model(model_name)?;

            info!(model = model_name, dimensions, "Loading embedding model");
            let model = TextEmbedding::try_new(
                InitOptions::new(model_kind).with_show_download_progress(true),
            )
            .map_err(|e| {
                AppError::Embedding(format!("Failed to load model '{}': {}", model_name, e))
            })?;

            Ok(Self {
                model: Mutex::new(model),
                model_name: model_name.to_string(),
                dimensions,
                batch_size,
            })
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FastEmbedProvider {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            let mut model = self.model.lock();
            model
                .embed(texts.to_vec(), Some(self.batch_size))
                .map_err(|e| AppError::Embedding(e.to_string()))
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn model_name(&self) -> String {
            self.model_name.clone()
        }
    }

    /// Map a configured model name onto a fastembed model and its
    /// output dimension. Unknown names fail at startup, not at embed
    /// time.
    fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize)> {
        match name {
            "sentence-transformers/all-MiniLM-L6-v2" | "all-MiniLM-L6-v2" => {
                Ok((EmbeddingModel::AllMiniLML6V2, 384))
            }
            "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => {
                Ok((EmbeddingModel::BGESmallENV15, 384))
            }
            other => Err(AppError::Config(format!(
                "Unknown embedding model '{}'",
                other
            ))),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_unknown_model_is_rejected() {
            let result = FastEmbedProvider::new("definitely-not-a-model", 32);
            assert!(matches!(result, Err(AppError::Config(_))));
        }

        // Downloads model weights; run explicitly with --ignored.
        #[tokio::test]
        #[ignore]
        async fn test_embed_real_model() {
            let provider =
                FastEmbedProvider::new("sentence-transformers/all-MiniLM-L6-v2", 32).unwrap();
            assert_eq!(provider.dimensions(), 384);

            let vectors = provider
                .embed(&["hello world".to_string(), "goodbye world".to_string()])
                .await
                .unwrap();

            assert_eq!(vectors.len(), 2);
            assert_eq!(vectors[0].len(), 384);
            assert_ne!(vectors[0], vectors[1]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_preserves_order() {
        let mut mock = MockEmbeddingProvider::new();
        mock.expect_embed()
            .returning(|texts| Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect()));

        let vectors = mock
            .embed(&["a".to_string(), "bbb".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 1.0], vec![3.0, 1.0]]);
    }
}
