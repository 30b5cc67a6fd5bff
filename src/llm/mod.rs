//! Text generation: client abstraction, retry policy, Gemini backend.
//!
//! The rest of the application only sees [`GenerationClient`] and the
//! [`GenerationOutcome`] taxonomy; which backend sits behind them is a
//! wiring decision made at startup.
//!
//! # Architecture
//!
//! - [`client`] - the `GenerationClient` trait and outcome taxonomy
//! - [`retry`] - bounded doubling-backoff schedule for transient faults
//! - [`gemini`] - REST client for the Gemini `generateContent` API
//!
//! # Example
//!
//! ```rust,ignore
//! use sage::llm::{GeminiClient, GenerationClient, GenerationOutcome};
//! use sage::utils::config::GenerationConfig;
//!
//! let client = GeminiClient::new(&GenerationConfig::default())?;
//! match client.generate("What is 2+2?").await {
//!     GenerationOutcome::Success { text } => println!("{}", text),
//!     other => eprintln!("no answer: {:?}", other),
//! }
//! ```

/// Generation client trait and the outcome taxonomy.
pub mod client;
/// Gemini REST backend.
pub mod gemini;
/// Retry schedule for transient failures.
pub mod retry;

pub use client::{GenerationClient, GenerationOutcome, ModelParams};
pub use gemini::GeminiClient;
pub use retry::RetryPolicy;
