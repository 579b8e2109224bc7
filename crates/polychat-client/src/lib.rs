//! Client side of polychat.
//!
//! [`Conversation`] owns the chat history and enforces the turn state machine,
//! [`StreamDecoder`] turns relay body chunks into token deltas, and
//! [`RelayClient`] ties the two together over HTTP, reporting progress to a
//! [`ChatView`].

mod client;
mod conversation;
mod decoder;
mod error;
mod view;

pub use client::{RelayClient, TurnOutcome};
pub use conversation::{Conversation, Message, Phase, ReplyWriter};
pub use decoder::StreamDecoder;
pub use error::{ClientError, SubmitError};
pub use view::{ChatView, NullView};

pub use polychat_types::{Provider, Role};
