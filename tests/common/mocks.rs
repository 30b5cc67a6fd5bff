//! Mock implementations for testing.
//!
//! Deterministic embedding and generation backends shared across
//! integration test files, so no test needs a model download or an API
//! key.

use async_trait::async_trait;
use parking_lot::Mutex;
use sage::types::Result;
use sage::{EmbeddingProvider, GenerationClient, GenerationOutcome};
use std::collections::VecDeque;

/// Embedding provider that maps text to a small character-histogram
/// vector. Equal texts embed identically, similar texts land close, and
/// nothing is downloaded.
pub struct MockEmbedder;

/// An 8-dimensional histogram over alphanumeric characters. The 1.0
/// floor keeps the vector away from zero so cosine distance is always
/// defined.
pub fn embedding_for(text: &str) -> Vec<f32> {
    let mut buckets = [1.0f32; 8];
    for c in text.chars().filter(|c| c.is_alphanumeric()) {
        let slot = (c.to_ascii_lowercase() as usize) % 8;
        buckets[slot] += 1.0;
    }
    buckets.to_vec()
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| embedding_for(text)).collect())
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn model_name(&self) -> String {
        "mock-embedder".to_string()
    }
}

/// Generation client that replays scripted outcomes in order and
/// records every prompt it receives.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<GenerationOutcome>>,
    fallback: GenerationOutcome,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// Succeed with the same text on every call.
    pub fn always(text: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: GenerationOutcome::Success {
                text: text.to_string(),
            },
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replay `outcomes` in order; calls past the end of the script
    /// fail loudly so an over-calling test cannot pass by accident.
    pub fn with_outcomes(outcomes: Vec<GenerationOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            fallback: GenerationOutcome::Failed {
                reason: "generation script exhausted".to_string(),
            },
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt seen so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> GenerationOutcome {
        self.prompts.lock().push(prompt.to_string());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn model_name(&self) -> String {
        "mock-generator".to_string()
    }
}
