//! Environment-driven configuration.
//!
//! Every knob has a default except `GEMINI_API_KEY`; a `.env` file in
//! the working directory is honored but never overrides variables that
//! are already set.

#![allow(missing_docs)]

use crate::types::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub rag: RagConfig,
    pub generation: GenerationConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagConfig {
    /// Embedding model identifier, e.g. "sentence-transformers/all-MiniLM-L6-v2".
    pub embedding_model: String,
    pub embedding_batch_size: usize,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Overlap between neighboring chunks in characters; must stay
    /// below `chunk_size`.
    pub chunk_overlap: usize,
    /// Default number of chunks retrieved per query.
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
    /// Total attempts for transient failures, including the first.
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.1,
            max_output_tokens: 500,
            top_p: 0.95,
            top_k: 40,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub idle_timeout_minutes: i64,
    pub sweep_interval_secs: u64,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var_or(key, default)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e)))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: var_or("HOST", "127.0.0.1"),
                port: parse_var("PORT", "3000")?,
            },
            rag: RagConfig {
                embedding_model: var_or(
                    "EMBEDDING_MODEL",
                    "sentence-transformers/all-MiniLM-L6-v2",
                ),
                embedding_batch_size: parse_var("EMBEDDING_BATCH_SIZE", "32")?,
                chunk_size: parse_var("CHUNK_SIZE", "1000")?,
                chunk_overlap: parse_var("CHUNK_OVERLAP", "200")?,
                top_k: parse_var("RETRIEVAL_TOP_K", "3")?,
            },
            generation: GenerationConfig {
                api_key: env::var("GEMINI_API_KEY")
                    .map_err(|_| AppError::Config("GEMINI_API_KEY is not set".to_string()))?,
                model: var_or("GEMINI_MODEL", "gemini-2.5-flash"),
                base_url: var_or(
                    "GEMINI_BASE_URL",
                    "https://generativelanguage.googleapis.com",
                ),
                temperature: parse_var("GENERATION_TEMPERATURE", "0.1")?,
                max_output_tokens: parse_var("GENERATION_MAX_OUTPUT_TOKENS", "500")?,
                top_p: parse_var("GENERATION_TOP_P", "0.95")?,
                top_k: parse_var("GENERATION_TOP_K", "40")?,
                max_retries: parse_var("GENERATION_MAX_RETRIES", "3")?,
                retry_base_delay_ms: parse_var("GENERATION_RETRY_BASE_DELAY_MS", "1000")?,
                request_timeout_secs: parse_var("GENERATION_REQUEST_TIMEOUT_SECS", "60")?,
            },
            session: SessionConfig {
                idle_timeout_minutes: parse_var("SESSION_IDLE_TIMEOUT_MINUTES", "30")?,
                sweep_interval_secs: parse_var("SESSION_SWEEP_INTERVAL_SECS", "60")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_defaults_match_documented_values() {
        let config = GenerationConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.max_output_tokens, 500);
        assert_eq!(config.max_retries, 3);
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
    }
}
