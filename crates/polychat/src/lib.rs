//! Polychat - a streaming chat relay in front of OpenAI, Anthropic and Google.
//!
//! The relay validates a chat request, forwards the conversation to the
//! selected provider with that provider's fixed model, and re-frames the
//! provider's token stream as uniform server-sent events.

pub mod config;
pub mod handlers;
pub mod llm;
pub mod response;
pub mod server;
