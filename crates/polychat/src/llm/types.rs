//! Common types for LLM chat completions.

use std::pin::Pin;

use futures::Stream;

use super::error::LLMError;

pub use polychat_types::{ChatMessage as Message, Role};

/// A provider-neutral streaming chat request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
}

/// An event from a provider's token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A chunk of generated text.
    Token(String),
    /// The provider finished the response.
    Done,
}

/// Boxed stream of events from a provider.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LLMError>> + Send>>;
