//! services/api/src/adapters/gemini_llm.rs
//!
//! This module contains the adapter for the generative model. It implements the
//! `ModelClient` port from the `core` crate by talking to Gemini through its
//! OpenAI-compatible chat completions endpoint.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use study_relay_core::{
    domain::{ChatRole, ChatTurn},
    ports::{ModelClient, PortError, PortResult},
};
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ModelClient` using an OpenAI-compatible LLM endpoint.
#[derive(Clone)]
pub struct GeminiModelAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GeminiModelAdapter {
    /// Creates a new `GeminiModelAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Builds the client for `api_base` authenticated with `api_key`.
    pub fn from_credentials(api_base: &str, api_key: &str, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);
        Self::new(Client::with_config(config), model)
    }

    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> PortResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Provider(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PortError::Provider("Model returned no choices in its response.".to_string()))?
            .message
            .content
            .unwrap_or_default();

        info!(model = %self.model, chars = content.len(), "Model reply received.");
        Ok(content)
    }
}

fn to_request_message(turn: &ChatTurn) -> PortResult<ChatCompletionRequestMessage> {
    let message: ChatCompletionRequestMessage = match turn.role {
        ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(turn.content.clone())
            .build()
            .map_err(|e| PortError::Provider(e.to_string()))?
            .into(),
        ChatRole::Model => ChatCompletionRequestAssistantMessageArgs::default()
            .content(turn.content.clone())
            .build()
            .map_err(|e| PortError::Provider(e.to_string()))?
            .into(),
    };
    Ok(message)
}

//=========================================================================================
// `ModelClient` Trait Implementation
//=========================================================================================

#[async_trait]
impl ModelClient for GeminiModelAdapter {
    /// Sends the prompt as a single user message.
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        let message = to_request_message(&ChatTurn::user(prompt))?;
        self.complete(vec![message]).await
    }

    /// Replays the conversation with `model` turns mapped to assistant messages.
    async fn converse(&self, turns: &[ChatTurn]) -> PortResult<String> {
        let messages = turns
            .iter()
            .map(to_request_message)
            .collect::<PortResult<Vec<_>>>()?;
        let reply = self.complete(messages).await?;
        if reply.trim().is_empty() {
            return Err(PortError::Provider("Model response contained no text content.".to_string()));
        }
        Ok(reply)
    }
}
