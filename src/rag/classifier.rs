//! Query routing between document retrieval and plain chat.
//!
//! Classification is a lowercase substring match against a fixed corpus
//! of trigger phrases. Anything that does not clearly ask about uploaded
//! material routes to general chat, so ambiguous questions never produce
//! a spurious "no documents found" answer.

use crate::types::QueryMode;
use tracing::debug;

/// Phrases that signal the user wants an answer from their documents.
const DOCUMENT_TRIGGERS: &[&str] = &[
    "search from pdf",
    "search from document",
    "search the pdf",
    "search in document",
    "search in pdf",
    "search this document",
    "from this source",
    "from the source",
    "from this pdf",
    "from the document",
    "from this document",
    "in this pdf",
    "in the document",
    "in this document",
    "according to the document",
    "according to the pdf",
    "what does the document say",
    "what does the pdf say",
    "check the pdf",
    "check the document",
    "check this document",
    "look in the document",
    "look in the pdf",
    "find in document",
    "find in pdf",
    "retrieve from document",
    "get from document",
    "extract from document",
    "based on the document",
    "based on this pdf",
    "as per the document",
    "as mentioned in",
    "tell me from the document",
    "what's in the document",
    "document says",
    "pdf says",
    "source material",
    "uploaded file",
    "my document",
    "the file",
    "from uploaded",
    "in uploaded",
    "what's in my pdf",
    "information from document",
    "data from pdf",
];

/// Routes queries to document search or general chat.
///
/// Stateless and cheap; a single instance is shared by the whole service.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryClassifier;

impl QueryClassifier {
    /// Create a classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify a query, defaulting to [`QueryMode::GeneralChat`].
    pub fn classify(&self, query: &str) -> QueryMode {
        match self.matching_trigger(query) {
            Some(trigger) => {
                debug!(trigger, "Query routed to document search");
                QueryMode::DocumentSearch
            }
            None => QueryMode::GeneralChat,
        }
    }

    /// Whether a query should route to document search.
    pub fn is_document_query(&self, query: &str) -> bool {
        self.classify(query) == QueryMode::DocumentSearch
    }

    /// The first trigger phrase the query contains, if any.
    fn matching_trigger(&self, query: &str) -> Option<&'static str> {
        let lowered = query.to_lowercase();
        DOCUMENT_TRIGGERS
            .iter()
            .find(|trigger| lowered.contains(*trigger))
            .copied()
    }
}
