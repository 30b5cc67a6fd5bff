//! Sessionless chat handler.

use crate::{
    types::{ChatRequest, ChatResponse, Result},
    AppState,
};
use axum::{extract::State, Json};

/// Chat with the model directly, without retrieval or a session.
///
/// Date-sensitive questions get today's date prepended to the prompt;
/// blocked and failed generations surface as 422 and 500 respectively.
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let response = state.service.chat(&payload.message).await?;
    Ok(Json(response))
}
