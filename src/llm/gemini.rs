//! Gemini REST backend for text generation.
//!
//! Talks to the `generateContent` endpoint over plain HTTP. Transient
//! faults (429, 5xx, transport errors) are retried with doubling
//! backoff; policy blocks and malformed responses are terminal on the
//! first answer. The base URL is configurable so tests can point the
//! client at a local mock server.

use crate::llm::client::{GenerationClient, GenerationOutcome, ModelParams};
use crate::llm::retry::RetryPolicy;
use crate::types::{AppError, Result};
use crate::utils::config::GenerationConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    params: ModelParams,
    retry: RetryPolicy,
}

impl GeminiClient {
    /// Build a client from configuration.
    ///
    /// Fails fast when the API key is missing or the HTTP client cannot
    /// be constructed; nothing is sent to the backend here.
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AppError::Config(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint,
            params: ModelParams {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
                top_p: config.top_p,
                top_k: config.top_k,
            },
            retry: RetryPolicy::new(
                config.max_retries,
                Duration::from_millis(config.retry_base_delay_ms),
            ),
        })
    }

    /// One request against the backend.
    ///
    /// `Ok` carries a terminal outcome; `Err` carries the description of
    /// a transient fault the retry loop may try again.
    async fn request_once(&self, prompt: &str) -> std::result::Result<GenerationOutcome, String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: RequestConfig {
                temperature: self.params.temperature,
                max_output_tokens: self.params.max_output_tokens,
                top_p: self.params.top_p,
                top_k: self.params.top_k,
            },
        };

        let response = match self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if is_transient_error(&e) => {
                return Err(format!("transport error: {}", e));
            }
            Err(e) => {
                return Ok(GenerationOutcome::Failed {
                    reason: format!("request error: {}", e),
                });
            }
        };

        let status = response.status();
        if should_retry(status) {
            return Err(format!("HTTP {}", status));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Ok(GenerationOutcome::Failed {
                reason: format!("HTTP {}: {}", status, truncate_reason(&detail)),
            });
        }

        match response.json::<GenerateResponse>().await {
            Ok(parsed) => Ok(interpret_response(parsed)),
            Err(e) => Ok(GenerationOutcome::Failed {
                reason: format!("invalid response body: {}", e),
            }),
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> GenerationOutcome {
        let mut attempt = 1u32;
        loop {
            match self.request_once(prompt).await {
                Ok(outcome) => {
                    debug!(attempt, "Generation finished");
                    return outcome;
                }
                Err(transient) => {
                    if self.retry.is_last_attempt(attempt) {
                        warn!(attempt, error = %transient, "Retry budget exhausted");
                        return GenerationOutcome::Failed {
                            reason: format!("{} (after {} attempts)", transient, attempt),
                        };
                    }
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %transient,
                        "Transient generation failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}

/// Statuses worth another attempt: rate limiting and server faults.
fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Transport-level failures that tend to clear on their own.
fn is_transient_error(error: &reqwest::Error) -> bool {
    error.is_timeout()
        || error.is_connect()
        || error.is_request()
        || error.is_body()
        || error.is_decode()
}

/// Map a parsed response onto the outcome taxonomy.
fn interpret_response(response: GenerateResponse) -> GenerationOutcome {
    // A prompt-level block arrives without candidates.
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return GenerationOutcome::Blocked { reason };
    }

    let Some(candidate) = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
    else {
        return GenerationOutcome::Failed {
            reason: "response contained no candidates".to_string(),
        };
    };

    let text: String = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .map(|part| part.text)
        .collect();

    let finish_reason = candidate
        .finish_reason
        .unwrap_or_else(|| "STOP".to_string());

    match finish_reason.as_str() {
        "STOP" => {
            if text.is_empty() {
                GenerationOutcome::Failed {
                    reason: "candidate contained no text".to_string(),
                }
            } else {
                GenerationOutcome::Success { text }
            }
        }
        "MAX_TOKENS" => GenerationOutcome::Truncated { text },
        "SAFETY" | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII" => {
            GenerationOutcome::Blocked {
                reason: finish_reason,
            }
        }
        other => GenerationOutcome::Failed {
            reason: format!("unexpected finish reason: {}", other),
        },
    }
}

fn truncate_reason(detail: &str) -> String {
    detail.chars().take(200).collect()
}

// ============= Wire Types =============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: RequestConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
