//! OpenAI-compatible LLM provider.
//!
//! Works with OpenAI and any gateway that proxies its chat completions API.

use async_trait::async_trait;
use reqwest::Client;

use super::error::{LLMError, api_error};
use super::provider::LLMProvider;
use super::sse::{DataFrame, StreamParser};
use super::types::{ChatRequest, ChatStream, Message};

/// OpenAI-compatible provider.
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAICompatibleProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, LLMError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let stream_request = StreamRequest {
            model: request.model,
            messages: request.messages,
            max_tokens: request.max_tokens,
            stream: true,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&stream_request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let byte_stream = response.bytes_stream();
        Ok(Box::pin(StreamParser::new(byte_stream, decode_data)))
    }
}

// --- Streaming types ---

#[derive(serde::Serialize)]
struct StreamRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(serde::Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(serde::Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(serde::Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

fn decode_data(data: &str) -> DataFrame {
    if data == "[DONE]" {
        return DataFrame::Done;
    }

    let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) else {
        return DataFrame::Ignore;
    };

    match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(content) if !content.is_empty() => DataFrame::Token(content),
        _ => DataFrame::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::sse::tests::collect_events;
    use crate::llm::{Role, StreamEvent};

    #[test]
    fn test_stream_request_serialization() {
        let request = StreamRequest {
            model: "gpt-4-turbo".to_string(),
            messages: vec![Message {
                role: Role::User,
                content: "Hi".to_string(),
            }],
            max_tokens: None,
            stream: true,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"model\":\"gpt-4-turbo\""));
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"stream\":true"));
        assert!(!json.contains("max_tokens"));
    }

    #[test]
    fn test_decode_content_delta() {
        let data = r#"{"id":"c1","choices":[{"index":0,"delta":{"content":"Hel"},"finish_reason":null}]}"#;
        assert_eq!(decode_data(data), DataFrame::Token("Hel".to_string()));
    }

    #[test]
    fn test_decode_role_only_and_usage_chunks_are_ignored() {
        let role_only = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        let usage_only = r#"{"choices":[],"usage":{"prompt_tokens":3,"completion_tokens":2,"total_tokens":5}}"#;
        assert_eq!(decode_data(role_only), DataFrame::Ignore);
        assert_eq!(decode_data(usage_only), DataFrame::Ignore);
        assert_eq!(decode_data("not json"), DataFrame::Ignore);
        assert_eq!(decode_data("[DONE]"), DataFrame::Done);
    }

    #[tokio::test]
    async fn test_stream_body_to_tokens() {
        let body = [
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choi",
            "ces\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
        ];
        let events: Vec<_> = collect_events(&body, decode_data)
            .await
            .into_iter()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("Hel".to_string()),
                StreamEvent::Token("lo".to_string()),
                StreamEvent::Done,
            ]
        );
    }
}
