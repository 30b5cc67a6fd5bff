//! End-to-end tests over the service facade with mock backends.
//!
//! The embedding provider and generation client are deterministic
//! fakes; the vector index and everything between them is real.

mod common;

use common::mocks::{MockEmbedder, ScriptedGenerator};
use common::test_service;
use sage::rag::pipeline::NO_CONTEXT_ANSWER;
use sage::service::NO_DOCUMENTS_ANSWER;
use sage::types::AppError;
use sage::{GenerationClient, GenerationOutcome, QueryMode, RagPipeline, Retriever};
use sage_vector::VectorDb;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn temp_doc(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

/// Six paragraphs, each long enough that the 200-char test chunker
/// keeps them in separate chunks.
fn multi_chunk_document() -> String {
    (1..=6)
        .map(|i| {
            format!(
                "Section {i} of the Veridia operations manual covers reactor maintenance \
                 procedures, including coolant inspection intervals, rod replacement \
                 schedules, and the emergency shutdown drill required every quarter."
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[tokio::test]
async fn test_document_flow_end_to_end() {
    let generator = Arc::new(ScriptedGenerator::always("Grounded answer."));
    let service = test_service(generator.clone());

    let session = service.create_session().await.unwrap();
    let file = temp_doc(&multi_chunk_document());

    let ingested = service
        .ingest_document(&session, file.path(), None)
        .await
        .unwrap();
    assert!(
        ingested.chunks_indexed >= 5,
        "expected a multi-chunk ingest, got {}",
        ingested.chunks_indexed
    );

    let response = service
        .query_session(
            &session,
            "According to the document, how often is the shutdown drill run?",
            None,
        )
        .await
        .unwrap();

    assert_eq!(response.mode, QueryMode::DocumentSearch);
    assert_eq!(response.answer, "Grounded answer.");
    assert!(!response.sources.is_empty());
    assert!(response.sources.len() <= 3, "default top_k is 3");
    assert!(response.context_used.contains("[Source 1:"));
    for source in &response.sources {
        assert!((0.0..=1.0).contains(&source.similarity));
        assert!(source.source_id.ends_with(".txt"));
        assert!(!source.content_preview.is_empty());
    }

    // The grounding prompt carries the cited context and the question.
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Context:"));
    assert!(prompts[0].contains("[Source 1:"));
    assert!(prompts[0].contains(&ingested.file_name));
    assert!(prompts[0].contains("how often is the shutdown drill run?"));
    assert!(prompts[0].trim_end().ends_with("Answer:"));
}

#[tokio::test]
async fn test_chunk_count_is_reported_exactly() {
    let service = test_service(Arc::new(ScriptedGenerator::always("ok")));
    let session = service.create_session().await.unwrap();

    // Each paragraph is 116 chars: it fills a 200-char chunk by itself
    // (no two pair up) and is too large to ride along in the 40-char
    // overlap window, so the split is one chunk per paragraph.
    let paragraphs: Vec<String> = (1..=5)
        .map(|i| {
            format!(
                "Chapter {i} of the station log records the coolant pressure readings \
                 and the duty roster for that week in full detail."
            )
        })
        .collect();
    let file = temp_doc(&paragraphs.join("\n\n"));

    let ingested = service
        .ingest_document(&session, file.path(), None)
        .await
        .unwrap();
    assert_eq!(ingested.chunks_indexed, 5);

    let stats = service.session_stats(&session).unwrap();
    assert_eq!(stats.document_count, 1);
    assert_eq!(stats.uploaded_files.len(), 1);
    assert_eq!(stats.uploaded_files[0].chunk_count, 5);
    assert_eq!(stats.uploaded_files[0].file_name, ingested.file_name);
}

#[tokio::test]
async fn test_query_routing_by_phrasing() {
    let generator = Arc::new(ScriptedGenerator::always("Paris."));
    let service = test_service(generator.clone());
    let session = service.create_session().await.unwrap();

    let response = service
        .query_session(&session, "What is the capital of France?", None)
        .await
        .unwrap();
    assert_eq!(response.mode, QueryMode::GeneralChat);
    assert!(response.sources.is_empty());
    assert!(response.context_used.is_empty());
    assert_eq!(response.answer, "Paris.");

    // General chat must not receive a grounding prompt.
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(!prompts[0].contains("Context:"));
}

#[tokio::test]
async fn test_document_query_without_uploads() {
    let service = test_service(Arc::new(ScriptedGenerator::with_outcomes(vec![])));
    let session = service.create_session().await.unwrap();

    let response = service
        .query_session(&session, "What does the document say about safety?", None)
        .await
        .unwrap();
    assert_eq!(response.mode, QueryMode::DocumentSearch);
    assert_eq!(response.answer, NO_DOCUMENTS_ANSWER);
    assert!(response.sources.is_empty());
}

#[tokio::test]
async fn test_empty_retrieval_short_circuits_generation() {
    let generator = Arc::new(ScriptedGenerator::with_outcomes(vec![]));
    let retriever = Retriever::new(Arc::new(MockEmbedder), VectorDb::new());
    let pipeline = RagPipeline::new(retriever, generator.clone() as Arc<dyn GenerationClient>);

    let answer = pipeline.answer("anything", "missing", 3).await.unwrap();
    assert_eq!(answer.answer, NO_CONTEXT_ANSWER);
    assert!(answer.sources.is_empty());
    assert!(generator.prompts().is_empty(), "generation must be skipped");
}

#[tokio::test]
async fn test_blocked_generation_surfaces_as_error() {
    let generator = Arc::new(ScriptedGenerator::with_outcomes(vec![
        GenerationOutcome::Blocked {
            reason: "SAFETY".to_string(),
        },
    ]));
    let service = test_service(generator);
    let session = service.create_session().await.unwrap();

    let file = temp_doc(&multi_chunk_document());
    service
        .ingest_document(&session, file.path(), None)
        .await
        .unwrap();

    let err = service
        .query_session(&session, "What does the document say about drills?", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Blocked(reason) if reason == "SAFETY"));
}

#[tokio::test]
async fn test_truncated_answer_is_marked() {
    let generator = Arc::new(ScriptedGenerator::with_outcomes(vec![
        GenerationOutcome::Truncated {
            text: "The drill runs every".to_string(),
        },
    ]));
    let service = test_service(generator);
    let session = service.create_session().await.unwrap();

    let file = temp_doc(&multi_chunk_document());
    service
        .ingest_document(&session, file.path(), None)
        .await
        .unwrap();

    let response = service
        .query_session(&session, "From the document, when does the drill run?", None)
        .await
        .unwrap();
    assert!(response.answer.starts_with("The drill runs every"));
    assert!(response.answer.contains("[Answer truncated"));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let service = test_service(Arc::new(ScriptedGenerator::always("From your document.")));

    let session_a = service.create_session().await.unwrap();
    let session_b = service.create_session().await.unwrap();

    let file_a = temp_doc(&multi_chunk_document());
    let ingested_a = service
        .ingest_document(&session_a, file_a.path(), None)
        .await
        .unwrap();

    // Session B never saw an upload, so its document query gets the
    // notice rather than session A's content.
    let response_b = service
        .query_session(&session_b, "What's in the document about reactors?", None)
        .await
        .unwrap();
    assert_eq!(response_b.answer, NO_DOCUMENTS_ANSWER);

    // Session B with its own upload only ever cites its own file.
    let file_b = temp_doc(
        "Penguin colonies on the southern shelf are counted by drone survey each winter. \
         The 2045 census recorded forty-one thousand breeding pairs across nine sites.",
    );
    service
        .ingest_document(&session_b, file_b.path(), None)
        .await
        .unwrap();

    let response_b = service
        .query_session(&session_b, "According to the document, how are colonies counted?", None)
        .await
        .unwrap();
    for source in &response_b.sources {
        assert_eq!(source.source_id, ingested_to_name(file_b.path()));
        assert_ne!(source.source_id, ingested_to_name(file_a.path()));
    }
    assert_eq!(ingested_a.file_name, ingested_to_name(file_a.path()));
}

fn ingested_to_name(path: &std::path::Path) -> String {
    path.file_name().unwrap().to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_top_k_override_is_respected() {
    let service = test_service(Arc::new(ScriptedGenerator::always("ok")));
    let session = service.create_session().await.unwrap();

    let file = temp_doc(&multi_chunk_document());
    let ingested = service
        .ingest_document(&session, file.path(), None)
        .await
        .unwrap();
    assert!(ingested.chunks_indexed >= 5);

    let response = service
        .query_session(
            &session,
            "Find in document: the rod replacement schedule",
            Some(5),
        )
        .await
        .unwrap();
    assert_eq!(response.sources.len(), 5);
}

#[tokio::test]
async fn test_delete_session_forgets_documents() {
    let service = test_service(Arc::new(ScriptedGenerator::always("ok")));
    let session = service.create_session().await.unwrap();

    let file = temp_doc(&multi_chunk_document());
    service
        .ingest_document(&session, file.path(), None)
        .await
        .unwrap();

    service.delete_session(&session).await.unwrap();

    let err = service
        .query_session(&session, "What does the document say?", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = service
        .ingest_document(&session, file.path(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
