//! services/api/src/web/pipeline.rs
//!
//! The request orchestrator: fetch, extract, prompt, invoke, normalize. Each
//! endpoint runs one linear pass with no retries; the first failure ends the request.

use crate::web::{
    envelope::{RelayError, FILE_TYPE_UNSUPPORTED, REFERENCE_UNSUPPORTED},
    state::AppState,
};
use std::time::Instant;
use study_relay_core::{
    build_chat_messages, build_study_prompt,
    domain::{char_prefix, AiData, ChatTurn, DocumentText, FileKind, GenerationMode},
    normalize::{Normalizer, PROCESS_FALLBACK_LIMIT},
};
use tracing::{debug, info, warn};

/// Characters of the raw model reply written to the debug log.
const REPLY_LOG_PREVIEW: usize = 500;

/// The result of a study-aid request.
#[derive(Debug)]
pub struct StudyOutcome {
    pub extracted_length: usize,
    pub ai_data: AiData,
}

/// Checks the file type, downloads the document and extracts its text.
///
/// Unsupported types are rejected before any network access, and an empty
/// extraction is reported instead of being passed on to the model.
pub async fn load_document(
    app_state: &AppState,
    file_url: &str,
    file_type: &str,
) -> Result<DocumentText, RelayError> {
    match FileKind::parse(file_type) {
        FileKind::Pdf => {}
        FileKind::Reference => return Err(RelayError::UnsupportedFileType(REFERENCE_UNSUPPORTED)),
        FileKind::Other(other) => {
            warn!(file_type = %other, "Rejected unsupported file type.");
            return Err(RelayError::UnsupportedFileType(FILE_TYPE_UNSUPPORTED));
        }
    }

    let data = app_state.fetcher.fetch(file_url).await?;
    let text = app_state.extractor.extract_text(data).await?;
    if text.is_empty() {
        warn!(file_url, "No text extracted from document.");
        return Err(RelayError::EmptyContent);
    }
    Ok(text)
}

/// Generates study aids for the requested mode.
pub async fn generate_study_material(
    app_state: &AppState,
    file_url: &str,
    file_type: &str,
    mode: GenerationMode,
) -> Result<StudyOutcome, RelayError> {
    info!(file_url, file_type, %mode, "Processing file.");
    let text = load_document(app_state, file_url, file_type).await?;
    let extracted_length = text.char_count();
    info!(extracted_length, "Extracted text. Sending to model...");

    let prompt = build_study_prompt(&text, mode);
    let llm_start = Instant::now();
    let raw = app_state.model.generate(&prompt).await?;
    info!("Model took: {:?}", llm_start.elapsed());
    debug!(reply = char_prefix(&raw, REPLY_LOG_PREVIEW), "Raw model reply.");

    let ai_data = Normalizer::with_fallback_limit(PROCESS_FALLBACK_LIMIT).normalize(&raw, mode);
    if let AiData::Material(material) = &ai_data {
        info!(
            has_summary = material.summary().is_some(),
            key_points = material.key_points().len(),
            quiz = material.quiz().len(),
            flashcards = material.flashcards().len(),
            "Study material parsed."
        );
    }
    Ok(StudyOutcome {
        extracted_length,
        ai_data,
    })
}

/// Answers `message` in the context of the document and the caller's history.
pub async fn answer_question(
    app_state: &AppState,
    file_url: &str,
    file_type: &str,
    message: &str,
    history: &[ChatTurn],
) -> Result<String, RelayError> {
    if message.trim().is_empty() {
        return Err(RelayError::InvalidRequest(
            "message must not be empty".to_string(),
        ));
    }

    info!(file_url, history_len = history.len(), "Chat message received.");
    let text = load_document(app_state, file_url, file_type).await?;

    let turns = build_chat_messages(&text, message, history);
    let llm_start = Instant::now();
    let reply = app_state.model.converse(&turns).await?;
    info!("Model took: {:?}", llm_start.elapsed());

    Ok(reply.trim().to_string())
}
