//! Chat relay handler.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::Stream;
use polychat_types::{DONE_SENTINEL, Provider, TokenDelta};
use serde_json::Value;
use thiserror::Error;
use tokio_stream::StreamExt;
use tracing::{debug, error, warn};

use crate::llm::{ChatRequest, ChatStream, LLMError, LLMProvider, Message, ProviderRegistry, StreamEvent};
use crate::response::RelayError;
use crate::server::AppState;

// ============================================================================
// Validation
// ============================================================================

/// A request that passed every check and has a provider to go to.
pub(crate) struct ValidatedRequest {
    pub provider: Provider,
    pub client: Arc<dyn LLMProvider>,
    pub messages: Vec<Message>,
}

/// Check a raw request body.
///
/// Order matters: provider presence, provider name, provider credential, then
/// messages. Nothing here talks to a provider.
pub(crate) fn validate_request(
    body: &[u8],
    registry: &ProviderRegistry,
) -> Result<ValidatedRequest, RelayError> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        RelayError::invalid_request(format!("Request body must be a JSON object: {e}"))
    })?;

    let Some(name) = payload.get("provider").and_then(Value::as_str) else {
        return Err(RelayError::invalid_request(
            "Provider parameter is required and must be a string",
        ));
    };

    let provider: Provider = name
        .parse()
        .map_err(|e: polychat_types::ParseProviderError| RelayError::invalid_request(e.to_string()))?;

    let Some(client) = registry.get(provider) else {
        let label = provider.descriptor().label;
        let var = registry.credential_var(provider);
        return Err(RelayError::Configuration {
            message: format!("{label} is not configured. Please set the {var} environment variable."),
            hint: format!("Export {var} with an API key for {label} and restart the server."),
        });
    };

    let Some(raw_messages) = payload.get("messages").filter(|m| m.is_array()) else {
        return Err(RelayError::invalid_request(
            "Messages parameter is required and must be an array",
        ));
    };

    // Extra fields (id, provider, timestamp) are dropped here
    let messages: Vec<Message> = serde_json::from_value(raw_messages.clone()).map_err(|e| {
        RelayError::invalid_request(format!(
            "Each message must have a role (user, assistant, system) and string content: {e}"
        ))
    })?;

    Ok(ValidatedRequest {
        provider,
        client,
        messages,
    })
}

// ============================================================================
// Handler
// ============================================================================

/// POST /api/chat
///
/// Request body: `{"messages": [{"role": "...", "content": "..."}], "provider": "..."}`
///
/// On success responds with `text/event-stream`:
/// - `data: {"content": "..."}` for every token delta, in order
/// - `data: [DONE]` once the provider finishes
///
/// Failures before the stream starts are JSON `{"error": "...", "details": "..."}`.
/// Failures after it started abort the body.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    let ValidatedRequest {
        provider,
        client,
        messages,
    } = match validate_request(&body, &state.providers) {
        Ok(request) => request,
        Err(e) => {
            if matches!(e, RelayError::Configuration { .. }) {
                error!(error = %e, "Relay misconfigured");
            } else {
                debug!(error = %e, "Rejected chat request");
            }
            return e.into_response();
        }
    };

    let descriptor = provider.descriptor();
    debug!(
        %provider,
        model = descriptor.model,
        messages = messages.len(),
        "Relaying chat request"
    );

    let chat_request = ChatRequest {
        model: descriptor.model.to_string(),
        messages,
        max_tokens: state.max_tokens,
    };

    let stream = match client.chat_stream(chat_request).await {
        Ok(s) => s,
        Err(e) => {
            error!(%provider, error = %e, "Provider request failed");
            return upstream_error(provider, e).into_response();
        }
    };

    let relay = RelayStream::new(
        stream,
        provider,
        Duration::from_secs(state.idle_timeout_seconds),
    );

    let keep_alive = KeepAlive::new()
        .interval(Duration::from_secs(state.keep_alive_interval_seconds))
        .text("keep-alive");

    Sse::new(relay).keep_alive(keep_alive).into_response()
}

fn upstream_error(provider: Provider, e: LLMError) -> RelayError {
    let status = e.status().unwrap_or(500);
    let details = match e {
        LLMError::Api { ref message, .. } if !message.is_empty() => message.clone(),
        _ => "Provider API failure".to_string(),
    };
    RelayError::Upstream {
        status,
        message: format!("{} request failed: {}", provider.descriptor().label, e),
        details,
    }
}

// ============================================================================
// SSE Relay
// ============================================================================

/// Why a relay stream ended early. Yielding one of these aborts the body.
#[derive(Debug, Error)]
pub enum RelayFailure {
    #[error(transparent)]
    Llm(#[from] LLMError),
    #[error("provider stream idle timeout")]
    Timeout,
}

type FlattenedStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, RelayFailure>> + Send>>;

/// Re-frames provider events as relay SSE events.
///
/// Token text is passed through untouched. The stream ends after `[DONE]`,
/// or with an error when the provider fails or goes idle.
struct RelayStream {
    inner: FlattenedStream,
    provider: Provider,
    tokens: usize,
    finished: bool,
}

impl RelayStream {
    fn new(inner: ChatStream, provider: Provider, idle_timeout: Duration) -> Self {
        let timed_stream = inner.timeout(idle_timeout);
        let flattened = timed_stream.map(|result| match result {
            Ok(Ok(event)) => Ok(event),
            Ok(Err(llm_err)) => Err(RelayFailure::Llm(llm_err)),
            Err(_elapsed) => Err(RelayFailure::Timeout),
        });

        Self {
            inner: Box::pin(flattened),
            provider,
            tokens: 0,
            finished: false,
        }
    }
}

impl Stream for RelayStream {
    type Item = Result<Event, RelayFailure>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(StreamEvent::Token(content)))) => {
                self.tokens += 1;
                let event = token_event(content);
                Poll::Ready(Some(Ok(event)))
            }

            Poll::Ready(Some(Ok(StreamEvent::Done))) | Poll::Ready(None) => {
                self.finished = true;
                debug!(provider = %self.provider, tokens = self.tokens, "Relay stream complete");
                Poll::Ready(Some(Ok(Event::default().data(DONE_SENTINEL))))
            }

            Poll::Ready(Some(Err(failure))) => {
                self.finished = true;
                warn!(
                    provider = %self.provider,
                    tokens = self.tokens,
                    error = %failure,
                    "Relay stream aborted"
                );
                Poll::Ready(Some(Err(failure)))
            }

            Poll::Pending => Poll::Pending,
        }
    }
}

fn token_event(content: String) -> Event {
    Event::default()
        .json_data(TokenDelta { content })
        .unwrap_or_else(|_| Event::default().data("{}"))
}
