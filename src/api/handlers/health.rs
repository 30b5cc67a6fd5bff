//! Component health handler.

use crate::{types::HealthStatus, AppState};
use axum::{extract::State, Json};

/// Probe the embedding, generation, and index components.
///
/// Always returns 200; the body says which components are down.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.service.health_check().await)
}
