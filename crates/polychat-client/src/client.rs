//! HTTP client for the relay endpoint.

use futures::StreamExt;
use polychat_types::ErrorBody;
use reqwest::Client;
use tracing::{debug, warn};

use crate::conversation::Conversation;
use crate::decoder::StreamDecoder;
use crate::error::{ClientError, SubmitError};
use crate::view::ChatView;

/// How a submitted turn ended.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The reply streamed to the end.
    Completed,
    /// The turn failed; a system message describing `0` was appended.
    Failed(ClientError),
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed)
    }
}

/// Talks to a polychat relay.
#[derive(Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Run one chat turn.
    ///
    /// Appends the user message, sends the whole history, and streams the
    /// reply into a new assistant message. Returns `Err` only when the
    /// submission itself is refused; failures after that are recorded in the
    /// conversation and reported as [`TurnOutcome::Failed`].
    pub async fn submit<V>(
        &self,
        conversation: &mut Conversation,
        input: &str,
        view: &mut V,
    ) -> Result<TurnOutcome, SubmitError>
    where
        V: ChatView + ?Sized,
    {
        let request = conversation.begin_turn(input)?;
        if let Some(message) = conversation.last() {
            view.message_appended(message);
        }
        view.waiting(request.provider);

        let url = format!("{}/api/chat", self.base_url);
        debug!(%url, provider = %request.provider, messages = request.messages.len(), "Sending chat request");

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => return Ok(fail(conversation, view, ClientError::Transport(e))),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(error_message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            let error = ClientError::Status {
                status: status.as_u16(),
                message,
            };
            return Ok(fail(conversation, view, error));
        }

        let mut reply = conversation.open_reply()?;
        view.message_appended(reply.message());

        let mut decoder = StreamDecoder::new();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let error = ClientError::Interrupted(e.to_string());
                    warn!(error = %error, "Relay stream broke off");
                    reply.abort(&error);
                    if let Some(message) = conversation.last() {
                        view.message_appended(message);
                    }
                    view.turn_finished();
                    return Ok(TurnOutcome::Failed(error));
                }
            };

            for delta in decoder.push(&chunk) {
                let message = reply.push_delta(&delta);
                view.delta(message, &delta);
            }
        }

        for delta in decoder.finish() {
            let message = reply.push_delta(&delta);
            view.delta(message, &delta);
        }
        if !decoder.is_done() {
            debug!("Relay stream ended without [DONE]");
        }

        reply.finish();
        view.turn_finished();
        Ok(TurnOutcome::Completed)
    }
}

/// Error text plus any remediation details the relay attached.
fn error_message(body: ErrorBody) -> String {
    match body.details {
        Some(details) if !details.is_empty() && !body.error.contains(&details) => {
            format!("{} {}", body.error, details)
        }
        _ => body.error,
    }
}

fn fail<V>(conversation: &mut Conversation, view: &mut V, error: ClientError) -> TurnOutcome
where
    V: ChatView + ?Sized,
{
    warn!(error = %error, "Chat request failed");
    let message = conversation.fail(&error);
    view.message_appended(message);
    view.turn_finished();
    TurnOutcome::Failed(error)
}
