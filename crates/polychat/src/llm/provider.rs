//! LLM provider trait.

use async_trait::async_trait;

use super::error::LLMError;
use super::types::{ChatRequest, ChatStream};

/// Trait for LLM providers with different streaming API formats.
///
/// Implementations return once the upstream has accepted the request, so an
/// `Err` here means nothing has been streamed yet.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Start a streaming chat completion.
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, LLMError>;
}
