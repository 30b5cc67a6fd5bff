//! Loading of source documents from disk.
//!
//! Formats are deliberately narrow: plain text and Markdown, both read
//! verbatim. Binary formats need their own extraction step before they
//! reach the engine, so the loader rejects nothing by content, only by
//! emptiness.

use crate::types::{AppError, Result};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::debug;

/// Supported source document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Plain UTF-8 text.
    Text,
    /// Markdown, indexed verbatim without rendering.
    Markdown,
}

impl DocumentKind {
    /// Infer the kind from a bare file extension (no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "text" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Infer the kind from a path, defaulting to plain text when the
    /// extension is missing or unknown.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Self::Text)
    }
}

impl FromStr for DocumentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" | "plain" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(AppError::InvalidInput(format!(
                "Unsupported document kind '{}': expected 'text' or 'markdown'",
                other
            ))),
        }
    }
}

/// A document read from disk, ready for chunking.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Identifier carried through chunk metadata and citations; the
    /// file name, or the full path when the name is not valid UTF-8.
    pub source_id: String,
    /// Format detected from the path or supplied by the caller.
    pub kind: DocumentKind,
    /// Full file contents.
    pub content: String,
}

/// Read a document from `path`.
///
/// `kind` overrides extension inference when given. Empty and
/// whitespace-only files are rejected: indexing them would create
/// collections that can never produce a grounded answer.
pub async fn load_document(path: &Path, kind: Option<DocumentKind>) -> Result<LoadedDocument> {
    let content = fs::read_to_string(path).await?;
    if content.trim().is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Document '{}' is empty",
            path.display()
        )));
    }

    let source_id = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string());
    let kind = kind.unwrap_or_else(|| DocumentKind::from_path(path));

    debug!(source_id = %source_id, ?kind, bytes = content.len(), "Loaded document");

    Ok(LoadedDocument {
        source_id,
        kind,
        content,
    })
}
