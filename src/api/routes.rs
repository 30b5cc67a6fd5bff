use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Build the API router. The caller nests it (typically under `/api`)
/// and attaches the application state.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(crate::api::handlers::health::health))
        .route("/chat", post(crate::api::handlers::chat::chat))
        .route(
            "/sessions",
            post(crate::api::handlers::sessions::create_session),
        )
        .route(
            "/sessions/{id}",
            get(crate::api::handlers::sessions::get_session)
                .delete(crate::api::handlers::sessions::delete_session),
        )
        .route(
            "/sessions/{id}/documents",
            post(crate::api::handlers::sessions::upload_document),
        )
        .route(
            "/sessions/{id}/query",
            post(crate::api::handlers::sessions::query_session),
        )
}
