//! LLM provider clients for streaming chat completions.

mod anthropic;
mod error;
mod google;
mod openai;
mod provider;
mod registry;
mod sse;
mod types;

pub use anthropic::AnthropicProvider;
pub use error::LLMError;
pub use google::GoogleProvider;
pub use openai::OpenAICompatibleProvider;
pub use provider::LLMProvider;
pub use registry::{ProviderRegistry, default_credential_var, resolve_base_url};
pub use types::{ChatRequest, ChatStream, Message, Role, StreamEvent};
