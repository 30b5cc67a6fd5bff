//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Sessionless chat handler.
pub mod chat;
/// Component health handler.
pub mod health;
/// Session lifecycle, document upload, and query handlers.
pub mod sessions;
