//! Generation client abstraction and the outcome taxonomy.
//!
//! A generation backend never leaks transport errors to its callers:
//! transient failures are retried inside the client, and whatever is
//! left is expressed as one of four terminal [`GenerationOutcome`]
//! variants. `Err` is reserved for programmer errors, which is why
//! [`GenerationClient::generate`] is infallible.

use async_trait::async_trait;

/// Terminal outcome of one generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The model completed normally.
    Success {
        /// The generated text.
        text: String,
    },

    /// The model hit its output-token cap. The text is usable but
    /// incomplete, and callers should say so.
    Truncated {
        /// The partial generated text.
        text: String,
    },

    /// The request or response was refused by a safety or recitation
    /// policy. Never retried; retrying a policy decision cannot help.
    Blocked {
        /// The policy reason reported by the backend.
        reason: String,
    },

    /// Transient failures exhausted the retry budget, or the backend
    /// answered with something unusable.
    Failed {
        /// Description of the final failure.
        reason: String,
    },
}

impl GenerationOutcome {
    /// The generated text, for outcomes that carry one.
    pub fn text(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Success { text } | GenerationOutcome::Truncated { text } => {
                Some(text)
            }
            _ => None,
        }
    }

    /// Whether the outcome produced usable text.
    pub fn is_usable(&self) -> bool {
        self.text().is_some()
    }
}

/// Sampling parameters forwarded to the generation backend.
#[derive(Debug, Clone)]
pub struct ModelParams {
    /// Sampling temperature.
    pub temperature: f32,
    /// Hard cap on generated tokens.
    pub max_output_tokens: u32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_output_tokens: 500,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

/// A text-generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// Transient backend failures are absorbed by the implementation's
    /// retry policy; the caller always receives a terminal outcome.
    async fn generate(&self, prompt: &str) -> GenerationOutcome;

    /// Identifier of the underlying model.
    fn model_name(&self) -> String;
}
