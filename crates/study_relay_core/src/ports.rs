//! crates/study_relay_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the relay's external collaborators.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the HTTP client, the PDF library and the model provider.

use crate::domain::{ChatTurn, DocumentText};
use async_trait::async_trait;
use bytes::Bytes;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// Each variant carries the underlying message so it can be surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    Fetch(String),
    #[error("{0}")]
    Extraction(String),
    #[error("{0}")]
    Provider(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Downloads the raw bytes behind `url`. Non-2xx responses are errors.
    async fn fetch(&self, url: &str) -> PortResult<Bytes>;
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Converts a document's bytes into plain text. An empty result is not an error.
    async fn extract_text(&self, data: Bytes) -> PortResult<DocumentText>;
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends a single prompt and returns the model's raw reply.
    async fn generate(&self, prompt: &str) -> PortResult<String>;

    /// Sends an ordered conversation and returns the model's next reply.
    async fn converse(&self, turns: &[ChatTurn]) -> PortResult<String>;
}
