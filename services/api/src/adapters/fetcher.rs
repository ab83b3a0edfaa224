//! services/api/src/adapters/fetcher.rs
//!
//! Downloads referenced documents over HTTP. Implements the `DocumentFetcher` port.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use study_relay_core::ports::{DocumentFetcher, PortError, PortResult};
use tracing::info;

/// A `reqwest`-backed fetcher. One client is shared across requests.
#[derive(Clone)]
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
}

impl HttpDocumentFetcher {
    /// Builds a fetcher. Without a timeout the client's defaults apply.
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent("study-relay");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str) -> PortResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| PortError::Fetch(format!("Failed to download file: {e}")))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| PortError::Fetch(format!("Failed to read file body: {e}")))?;

        info!(bytes = body.len(), "Downloaded document.");
        Ok(body)
    }
}
