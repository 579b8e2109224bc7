//! Chat history and the per-turn state machine.

use chrono::{DateTime, Utc};
use polychat_types::{ChatMessage, Provider, RelayRequest, Role};
use ulid::{Generator, Ulid};

use crate::error::SubmitError;

// ============================================================================
// Message
// ============================================================================

/// One entry in the conversation.
///
/// Content only changes while the message is the open assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: Ulid,
    role: Role,
    content: String,
    provider: Option<Provider>,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Provider that produced or triggered this message, if any.
    pub fn provider(&self) -> Option<Provider> {
        self.provider
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// ============================================================================
// Conversation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Ready for the next submission.
    Idle,
    /// Request sent, waiting for the relay to answer.
    Sending,
    /// Reply is streaming into the open assistant message.
    Streaming,
}

/// Ordered chat history plus the selected provider.
///
/// At most one assistant message is open at a time, and nothing can be
/// submitted until it is closed.
pub struct Conversation {
    messages: Vec<Message>,
    provider: Provider,
    phase: Phase,
    ids: Generator,
}

impl Conversation {
    pub fn new(provider: Provider) -> Self {
        Self {
            messages: Vec::new(),
            provider,
            phase: Phase::Idle,
            ids: Generator::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Select another provider for future turns.
    ///
    /// Returns the announcement appended to the history, or `None` if the
    /// provider was already selected.
    pub fn switch_provider(&mut self, provider: Provider) -> Result<Option<&Message>, SubmitError> {
        if self.is_loading() {
            return Err(SubmitError::Busy);
        }
        if provider == self.provider {
            return Ok(None);
        }

        self.provider = provider;
        let descriptor = provider.descriptor();
        let notice = format!("Switched to {} ({})", descriptor.label, descriptor.model);
        Ok(Some(self.push(Role::System, notice, Some(provider))))
    }

    /// Drop all history. Only allowed while idle.
    pub fn clear(&mut self) -> Result<(), SubmitError> {
        if self.is_loading() {
            return Err(SubmitError::Busy);
        }
        self.messages.clear();
        Ok(())
    }

    /// Start a turn: append the user message and build the relay request.
    pub fn begin_turn(&mut self, input: &str) -> Result<RelayRequest, SubmitError> {
        if self.is_loading() {
            return Err(SubmitError::Busy);
        }
        let input = input.trim();
        if input.is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        self.push(Role::User, input.to_string(), None);
        self.phase = Phase::Sending;

        Ok(RelayRequest {
            messages: self
                .messages
                .iter()
                .map(|m| ChatMessage::new(m.role, m.content.clone()))
                .collect(),
            provider: self.provider,
        })
    }

    /// Open the assistant message the reply streams into.
    pub fn open_reply(&mut self) -> Result<ReplyWriter<'_>, SubmitError> {
        if self.phase != Phase::Sending {
            return Err(SubmitError::UnexpectedPhase {
                expected: Phase::Sending,
                actual: self.phase,
            });
        }

        let provider = self.provider;
        self.push(Role::Assistant, String::new(), Some(provider));
        self.phase = Phase::Streaming;
        let index = self.messages.len() - 1;

        Ok(ReplyWriter {
            conversation: self,
            index,
        })
    }

    /// End a turn that failed before any reply was opened.
    ///
    /// Appends a system message describing the failure and returns to idle.
    pub fn fail(&mut self, error: impl std::fmt::Display) -> &Message {
        self.phase = Phase::Idle;
        let provider = self.provider;
        self.push(Role::System, format!("Error: {error}"), Some(provider))
    }

    fn push(&mut self, role: Role, content: String, provider: Option<Provider>) -> &Message {
        // The generator only fails when a millisecond's random space overflows
        let id = self.ids.generate().unwrap_or_else(|_| Ulid::new());
        self.messages.push(Message {
            id,
            role,
            content,
            provider,
            created_at: Utc::now(),
        });
        &self.messages[self.messages.len() - 1]
    }
}

// ============================================================================
// ReplyWriter
// ============================================================================

/// Exclusive handle on the open assistant message.
///
/// Dropping the writer closes the reply and returns the conversation to idle.
pub struct ReplyWriter<'a> {
    conversation: &'a mut Conversation,
    index: usize,
}

impl ReplyWriter<'_> {
    pub fn message(&self) -> &Message {
        &self.conversation.messages[self.index]
    }

    /// Append a token delta to the open reply.
    pub fn push_delta(&mut self, delta: &str) -> &Message {
        let message = &mut self.conversation.messages[self.index];
        message.content.push_str(delta);
        message
    }

    /// Close the reply normally.
    pub fn finish(self) {}

    /// Close the reply after the stream broke off.
    ///
    /// The partial reply stays in history, followed by a system error message.
    pub fn abort(self, error: impl std::fmt::Display) {
        let provider = self.conversation.provider;
        self.conversation
            .push(Role::System, format!("Error: {error}"), Some(provider));
    }
}

impl Drop for ReplyWriter<'_> {
    fn drop(&mut self) {
        self.conversation.phase = Phase::Idle;
    }
}
