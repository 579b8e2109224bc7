//! Shared types for the polychat relay and its clients.
//!
//! Everything that crosses the wire between `polychat` (the relay) and
//! `polychat-client` lives here: the provider selector and its static
//! descriptors, chat roles and messages, the relay request and error bodies,
//! and the stream framing constants.

mod provider;
mod wire;

pub use provider::{ParseProviderError, Provider, ProviderDescriptor};
pub use wire::{
    ChatMessage, DATA_PREFIX, DONE_SENTINEL, ErrorBody, RelayRequest, Role, TokenDelta,
};
