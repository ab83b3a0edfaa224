//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_relay_core::ports::{DocumentFetcher, ModelClient, TextExtractor};

/// The shared application state, created once at startup and passed to all handlers.
///
/// Every member is read-only for the lifetime of the process; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub extractor: Arc<dyn TextExtractor>,
    pub model: Arc<dyn ModelClient>,
}
