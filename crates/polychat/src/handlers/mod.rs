//! HTTP request handlers.

mod chat;
mod health;
mod providers;
mod version;

pub use chat::chat;
pub use health::{livez, readyz};
pub use providers::list_providers;
pub use version::version;
