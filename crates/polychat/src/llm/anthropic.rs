//! Anthropic LLM provider with native API format.

use async_trait::async_trait;
use reqwest::Client;

use super::error::{LLMError, api_error};
use super::provider::LLMProvider;
use super::sse::{DataFrame, StreamParser};
use super::types::{ChatRequest, ChatStream, Role};

/// Anthropic provider with native API format.
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    api_version: String,
}

impl AnthropicProvider {
    pub const DEFAULT_API_VERSION: &'static str = "2023-06-01";
    const DEFAULT_MAX_TOKENS: u32 = 4096;

    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            api_version: Self::DEFAULT_API_VERSION.to_string(),
        }
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, LLMError> {
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));
        let anthropic_request = to_stream_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&anthropic_request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let byte_stream = response.bytes_stream();
        Ok(Box::pin(StreamParser::new(byte_stream, decode_data)))
    }
}

// --- Request types ---

#[derive(serde::Serialize)]
struct StreamRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<RequestMessage>,
    stream: bool,
}

#[derive(serde::Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

/// Anthropic takes system text as a separate field; multiple system messages
/// are joined in order.
fn to_stream_request(request: &ChatRequest) -> StreamRequest {
    let mut system_parts = Vec::new();
    let mut messages = Vec::new();

    for msg in &request.messages {
        match msg.role {
            Role::System => system_parts.push(msg.content.clone()),
            Role::User => messages.push(RequestMessage {
                role: "user",
                content: msg.content.clone(),
            }),
            Role::Assistant => messages.push(RequestMessage {
                role: "assistant",
                content: msg.content.clone(),
            }),
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    StreamRequest {
        model: request.model.clone(),
        max_tokens: request
            .max_tokens
            .unwrap_or(AnthropicProvider::DEFAULT_MAX_TOKENS),
        system,
        messages,
        stream: true,
    }
}

// --- Streaming ---

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Event {
    ContentBlockDelta {
        delta: Delta,
    },
    MessageStop,
    Error {
        error: ErrorDetail,
    },
    #[serde(other)]
    Other,
}

#[derive(serde::Deserialize)]
struct Delta {
    text: Option<String>,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    message: String,
}

fn decode_data(data: &str) -> DataFrame {
    match serde_json::from_str::<Event>(data) {
        Ok(Event::ContentBlockDelta { delta }) => match delta.text {
            Some(text) if !text.is_empty() => DataFrame::Token(text),
            _ => DataFrame::Ignore,
        },
        Ok(Event::MessageStop) => DataFrame::Done,
        Ok(Event::Error { error }) => DataFrame::Error(error.message),
        Ok(Event::Other) | Err(_) => DataFrame::Ignore,
    }
}
