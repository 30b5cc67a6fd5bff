//! The retrieval-augmented answer pipeline.
//!
//! Retrieval feeds a context block with per-source citation markers into
//! a grounding prompt; the generation outcome is folded into either a
//! final answer or a structured error. Empty retrieval short-circuits to
//! a fixed answer without spending a generation call.

use crate::llm::{GenerationClient, GenerationOutcome};
use crate::rag::retriever::Retriever;
use crate::types::{AppError, RagAnswer, Result, RetrievalResult, SourceRef};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Answer returned when retrieval produces nothing to ground on.
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find relevant information to answer this question.";

/// Appended to answers cut short by the output-token cap.
pub const TRUNCATION_NOTICE: &str = "\n\n[Answer truncated: output limit reached]";

/// Characters of chunk text echoed in a source reference.
const PREVIEW_CHARS: usize = 200;

/// Grounded question answering over one collection.
#[derive(Clone)]
pub struct RagPipeline {
    retriever: Retriever,
    generator: Arc<dyn GenerationClient>,
}

impl RagPipeline {
    /// Create a pipeline from its two stages.
    pub fn new(retriever: Retriever, generator: Arc<dyn GenerationClient>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer `question` grounded in the collection's documents.
    ///
    /// Retrieves up to `top_k` chunks, assembles the grounding prompt,
    /// and generates. Policy blocks and exhausted retries surface as
    /// [`AppError::Blocked`] and [`AppError::Generation`]; a truncated
    /// answer is still returned, marked as cut short.
    #[instrument(skip(self, question), fields(collection = %collection))]
    pub async fn answer(
        &self,
        question: &str,
        collection: &str,
        top_k: usize,
    ) -> Result<RagAnswer> {
        let results = self.retriever.retrieve(question, collection, top_k).await?;

        if results.is_empty() {
            debug!("Nothing retrieved, skipping generation");
            return Ok(RagAnswer {
                answer: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
                context_used: String::new(),
            });
        }

        let context = build_context(&results);
        let prompt = build_prompt(&context, question);

        let answer = match self.generator.generate(&prompt).await {
            GenerationOutcome::Success { text } => text,
            GenerationOutcome::Truncated { text } => format!("{}{}", text, TRUNCATION_NOTICE),
            GenerationOutcome::Blocked { reason } => return Err(AppError::Blocked(reason)),
            GenerationOutcome::Failed { reason } => return Err(AppError::Generation(reason)),
        };

        let sources = results.iter().map(source_ref).collect();
        Ok(RagAnswer {
            answer,
            sources,
            context_used: context,
        })
    }
}

/// Concatenate chunk texts with stable citation markers, in rank order.
fn build_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .map(|result| {
            let page = match result.chunk.page {
                Some(page) => page.to_string(),
                None => "N/A".to_string(),
            };
            format!(
                "[Source {}: {}, Page {}]\n{}",
                result.rank, result.chunk.source_id, page, result.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The grounding prompt: answer only from the context, admit gaps, cite.
fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant that answers questions based on the provided context.\n\
         \n\
         Context:\n\
         {}\n\
         \n\
         Question: {}\n\
         \n\
         Instructions:\n\
         - Answer based ONLY on the information in the context above\n\
         - If the context doesn't contain enough information, say so\n\
         - Be concise but complete\n\
         - Cite which source(s) you used\n\
         \n\
         Answer:",
        context, question
    )
}

fn source_ref(result: &RetrievalResult) -> SourceRef {
    SourceRef {
        source_id: result.chunk.source_id.clone(),
        page: result.chunk.page,
        similarity: result.similarity,
        content_preview: preview(&result.chunk.text),
    }
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
