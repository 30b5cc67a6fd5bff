//! Session lifecycle, document upload, and query handlers.

use crate::{
    service::loader::DocumentKind,
    types::{
        CreateSessionResponse, DeleteSessionResponse, IngestRequest, IngestResponse, QueryRequest,
        QueryResponse, Result, SessionStats,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use std::path::PathBuf;

/// Create a session with an empty private collection.
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<CreateSessionResponse>> {
    let session_id = state.service.create_session().await?;
    Ok(Json(CreateSessionResponse { session_id }))
}

/// Session stats: counters, upload history, expiry.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionStats>> {
    Ok(Json(state.service.session_stats(&id)?))
}

/// Delete a session and drop its collection.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteSessionResponse>> {
    state.service.delete_session(&id).await?;
    Ok(Json(DeleteSessionResponse {
        session_id: id,
        deleted: true,
    }))
}

/// Ingest a server-visible file into the session's collection.
pub async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestResponse>> {
    let kind = payload
        .kind
        .as_deref()
        .map(str::parse::<DocumentKind>)
        .transpose()?;
    let path = PathBuf::from(&payload.path);

    let response = state.service.ingest_document(&id, &path, kind).await?;
    Ok(Json(response))
}

/// Answer a question inside the session, routed by query mode.
pub async fn query_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let response = state
        .service
        .query_session(&id, &payload.question, payload.top_k)
        .await?;
    Ok(Json(response))
}
