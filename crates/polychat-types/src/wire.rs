//! Relay request, error body, and stream framing.

use serde::{Deserialize, Serialize};

use crate::Provider;

/// Prefix of every payload line in the relay stream.
pub const DATA_PREFIX: &str = "data: ";

/// Payload marking the end of the relay stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// The role of a message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message as sent to the relay: role and content only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayRequest {
    pub messages: Vec<ChatMessage>,
    pub provider: Provider,
}

/// One token delta frame in the relay stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenDelta {
    pub content: String,
}

/// JSON body of every non-streaming error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_request_serialization() {
        let request = RelayRequest {
            messages: vec![ChatMessage {
                role: Role::User,
                content: "hi".to_string(),
            }],
            provider: Provider::Anthropic,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messages": [{"role": "user", "content": "hi"}],
                "provider": "anthropic"
            })
        );
    }

    #[test]
    fn test_chat_message_ignores_extra_fields() {
        let json = r#"{"id": "m1", "role": "assistant", "content": "ok", "provider": "google", "timestamp": 1}"#;
        let message: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "ok");
    }

    #[test]
    fn test_error_body_omits_empty_details() {
        let body = ErrorBody::new("boom");
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"error":"boom"}"#);

        let body = ErrorBody::new("boom").with_details("upstream said no");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["details"], "upstream said no");
    }

    #[test]
    fn test_roles_are_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"assistant\"").unwrap(),
            Role::Assistant
        );
        assert!(serde_json::from_str::<Role>("\"tool\"").is_err());
    }
}
