//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    envelope::{Envelope, ErrorBody, ErrorKind, RelayError},
    pipeline,
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_relay_core::domain::{AiData, ChatTurn, GenerationMode};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        process_handler,
        chat_handler,
    ),
    components(
        schemas(HealthResponse, ProcessRequest, ProcessResponse, ChatRequest, ChatResponse, ErrorBody, ErrorKind)
    ),
    tags(
        (name = "Study Relay API", description = "Turns uploaded study documents into summaries, quizzes, flashcards and tutor answers.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub service: String,
}

/// A request to generate study aids from a document.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessRequest {
    pub file_url: String,
    /// Only `PDF` is extracted.
    #[schema(example = "PDF")]
    pub file_type: String,
    /// One of `summary`, `quiz`, `flashcards`, `all`. Other values are answered as `all`.
    #[schema(example = "all")]
    pub generate_type: Option<String>,
}

/// Sent inside a `"status": "success"` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessResponse {
    /// The `generate_type` exactly as the caller sent it.
    #[serde(rename = "type")]
    pub generate_type: String,
    /// Characters of text extracted from the document.
    pub extracted_length: usize,
    /// Study material, or a fallback with `"error": "JSON_PARSE_ERROR"`.
    #[schema(value_type = Object)]
    pub ai_data: AiData,
}

/// A tutoring question about a document.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub file_url: String,
    #[schema(example = "PDF")]
    pub file_type: String,
    pub message: String,
    /// Earlier turns, oldest first. Each item needs `role` (`user` or `model`) and `content`.
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub history: Vec<ChatTurn>,
}

/// Sent inside a `"status": "success"` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}

fn read_payload<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RelayError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| RelayError::InvalidRequest(rejection.body_text()))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: app_state.config.service_name.clone(),
    })
}

/// Download a document and generate study aids from it.
#[utoipa::path(
    post,
    path = "/process",
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Study aids generated", body = ProcessResponse),
        (status = 400, description = "Malformed request body", body = ErrorBody),
        (status = 415, description = "File type not supported", body = ErrorBody),
        (status = 422, description = "Extraction failed or produced no text", body = ErrorBody),
        (status = 502, description = "Document download or model call failed", body = ErrorBody)
    )
)]
pub async fn process_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<Envelope<ProcessResponse>>, RelayError> {
    let request = read_payload(payload)?;
    let generate_type = request
        .generate_type
        .unwrap_or_else(|| GenerationMode::default().as_str().to_string());
    let mode = GenerationMode::from_request(&generate_type);

    let outcome = pipeline::generate_study_material(
        &app_state,
        &request.file_url,
        &request.file_type,
        mode,
    )
    .await?;

    Ok(Json(Envelope::Success(ProcessResponse {
        generate_type,
        extracted_length: outcome.extracted_length,
        ai_data: outcome.ai_data,
    })))
}

/// Ask the tutor a question about a document.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Tutor reply", body = ChatResponse),
        (status = 400, description = "Malformed request body or history", body = ErrorBody),
        (status = 415, description = "File type not supported", body = ErrorBody),
        (status = 422, description = "Extraction failed or produced no text", body = ErrorBody),
        (status = 502, description = "Document download or model call failed", body = ErrorBody)
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Envelope<ChatResponse>>, RelayError> {
    let request = read_payload(payload)?;

    let response = pipeline::answer_question(
        &app_state,
        &request.file_url,
        &request.file_type,
        &request.message,
        &request.history,
    )
    .await?;

    Ok(Json(Envelope::Success(ChatResponse { response })))
}
