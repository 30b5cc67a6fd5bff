//! Shared helpers for integration tests.
//!
//! Each test binary compiles its own copy of this module and uses a
//! different subset of it.
#![allow(dead_code)]

pub mod mocks;

use axum_test::TestServer;
use sage::utils::config::{Config, GenerationConfig, RagConfig, ServerConfig, SessionConfig};
use sage::{AppState, GenerationClient, RagService};
use sage_vector::VectorDb;
use std::sync::Arc;

/// Configuration with chunks small enough that a short document spans
/// several of them.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        rag: RagConfig {
            embedding_model: "mock".to_string(),
            embedding_batch_size: 8,
            chunk_size: 200,
            chunk_overlap: 40,
            top_k: 3,
        },
        generation: GenerationConfig::default(),
        session: SessionConfig {
            idle_timeout_minutes: 30,
            sweep_interval_secs: 60,
        },
    }
}

/// Service over the mock embedder and the given generation client.
pub fn test_service(generator: Arc<dyn GenerationClient>) -> Arc<RagService> {
    let service = RagService::new(
        &test_config(),
        Arc::new(mocks::MockEmbedder),
        generator,
        VectorDb::new(),
    )
    .expect("Failed to build test service");
    Arc::new(service)
}

/// Test server wrapping the full API router, mounted under `/api`.
pub fn test_server(service: Arc<RagService>) -> TestServer {
    let state = AppState {
        config: Arc::new(test_config()),
        service,
    };
    let app = axum::Router::new()
        .nest("/api", sage::api::routes::create_router())
        .with_state(state);
    TestServer::new(app).expect("Failed to create test server")
}
