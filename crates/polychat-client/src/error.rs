use thiserror::Error;

use crate::conversation::Phase;

/// A submission or state change the conversation refused.
///
/// None of these mutate the conversation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a reply is still in progress")]
    Busy,

    #[error("message is empty")]
    EmptyInput,

    #[error("conversation is {actual:?}, expected {expected:?}")]
    UnexpectedPhase { expected: Phase, actual: Phase },
}

/// Why a turn ended without a complete reply.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay answered with a non-success status before streaming.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("could not reach relay: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body broke off after streaming started.
    #[error("stream interrupted: {0}")]
    Interrupted(String),
}
