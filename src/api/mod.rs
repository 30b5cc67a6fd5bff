//! HTTP API handlers and routes.
//!
//! The REST layer for S.A.G.E, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Sessions (`/api/sessions`)
//! - `POST /api/sessions` - Create a session with a private collection
//! - `GET /api/sessions/{id}` - Session stats and upload history
//! - `DELETE /api/sessions/{id}` - Delete a session and its collection
//!
//! ## Documents (`/api/sessions/{id}/documents`)
//! - `POST /api/sessions/{id}/documents` - Ingest a document into the session
//!
//! ## Query (`/api/sessions/{id}/query`)
//! - `POST /api/sessions/{id}/query` - Ask a question, routed by query mode
//!
//! ## Chat (`/api/chat`)
//! - `POST /api/chat` - Sessionless general chat
//!
//! ## Health (`/api/health`)
//! - `GET /api/health` - Component health probe

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
