//! Google Gemini provider.
//!
//! Uses `streamGenerateContent` with `alt=sse`, which frames each partial
//! `GenerateContentResponse` as one `data:` line. There is no end sentinel;
//! the body simply ends.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::{LLMError, api_error};
use super::provider::LLMProvider;
use super::sse::{DataFrame, StreamParser};
use super::types::{ChatRequest, ChatStream, Role};

pub struct GoogleProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LLMProvider for GoogleProvider {
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, LLMError> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            request.model
        );
        let google_request = to_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&google_request)
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

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

fn text_content(role: Option<&str>, text: &str) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

fn to_request(request: &ChatRequest) -> Request {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for msg in &request.messages {
        match msg.role {
            Role::System => system_parts.push(msg.content.as_str()),
            Role::User => contents.push(text_content(Some("user"), &msg.content)),
            Role::Assistant => contents.push(text_content(Some("model"), &msg.content)),
        }
    }

    let system_instruction = if system_parts.is_empty() {
        None
    } else {
        Some(text_content(None, &system_parts.join("\n\n")))
    };

    Request {
        contents,
        system_instruction,
        generation_config: request.max_tokens.map(|max_output_tokens| GenerationConfig {
            max_output_tokens,
        }),
    }
}

// --- Streaming ---

#[derive(Deserialize)]
struct Chunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ChunkError>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Deserialize)]
struct ChunkError {
    message: String,
}

fn decode_data(data: &str) -> DataFrame {
    let Ok(chunk) = serde_json::from_str::<Chunk>(data) else {
        return DataFrame::Ignore;
    };

    if let Some(error) = chunk.error {
        return DataFrame::Error(error.message);
    }

    let text: String = chunk
        .candidates
        .into_iter()
        .next()
        .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        DataFrame::Ignore
    } else {
        DataFrame::Token(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::sse::tests::collect_events;
    use crate::llm::{Message, StreamEvent};

    #[test]
    fn test_roles_map_to_gemini_format() {
        let request = ChatRequest {
            model: "gemini-1.5-pro".to_string(),
            messages: vec![
                Message {
                    role: Role::System,
                    content: "Be brief.".to_string(),
                },
                Message {
                    role: Role::User,
                    content: "hi".to_string(),
                },
                Message {
                    role: Role::Assistant,
                    content: "hello".to_string(),
                },
            ],
            max_tokens: None,
        };

        let json = serde_json::to_value(to_request(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "hi"}]},
                    {"role": "model", "parts": [{"text": "hello"}]}
                ],
                "systemInstruction": {"parts": [{"text": "Be brief."}]}
            })
        );
    }

    #[test]
    fn test_decode_chunks() {
        let chunk = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hel"},{"text":"lo"}]},"index":0}]}"#;
        assert_eq!(decode_data(chunk), DataFrame::Token("Hello".to_string()));

        let finish_only = r#"{"candidates":[{"finishReason":"STOP","index":0}],"usageMetadata":{}}"#;
        assert_eq!(decode_data(finish_only), DataFrame::Ignore);

        let error = r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;
        assert_eq!(
            decode_data(error),
            DataFrame::Error("The model is overloaded.".to_string())
        );
    }

    #[tokio::test]
    async fn test_stream_ends_at_end_of_body() {
        let body = [
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hi\"}]}}]}\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\" there\"}]},\"finishReason\":\"STOP\"}]}\r\n\r\n",
        ];
        let events: Vec<_> = collect_events(&body, decode_data)
            .await
            .into_iter()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("Hi".to_string()),
                StreamEvent::Token(" there".to_string()),
                StreamEvent::Done,
            ]
        );
    }
}
