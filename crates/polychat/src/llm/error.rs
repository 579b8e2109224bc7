//! LLM error types.

use thiserror::Error;

/// Errors that can occur when making LLM API calls.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Provider reported an error inside an already-open stream
    #[error("stream error: {0}")]
    Stream(String),
}

impl LLMError {
    /// Status code reported by the upstream, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            LLMError::Request(e) => e.status().map(|s| s.as_u16()),
            LLMError::Api { status, .. } => Some(*status),
            LLMError::Stream(_) => None,
        }
    }
}

/// Drain a non-success response into an `Api` error.
pub(crate) async fn api_error(response: reqwest::Response) -> LLMError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    LLMError::Api { status, message }
}
