//! Error outcomes of the relay endpoint and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use polychat_types::ErrorBody;
use thiserror::Error;

/// Every way a relay request can fail before the stream starts.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The caller sent something we cannot act on.
    #[error("{0}")]
    InvalidRequest(String),

    /// The operator has not configured what the request needs.
    #[error("{message}")]
    Configuration { message: String, hint: String },

    /// The provider rejected or failed the request.
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        details: String,
    },
}

impl RelayError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        RelayError::InvalidRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Upstream { status, .. } => {
                // Upstream success codes never reach here; anything unusable maps to 500
                StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            RelayError::InvalidRequest(message) => ErrorBody::new(message.clone()),
            RelayError::Configuration { message, hint } => {
                ErrorBody::new(message.clone()).with_details(hint.clone())
            }
            RelayError::Upstream {
                message, details, ..
            } => ErrorBody::new(message.clone()).with_details(details.clone()),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RelayError::invalid_request("bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::Configuration {
                message: "missing key".to_string(),
                hint: "set it".to_string(),
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let upstream = |status| RelayError::Upstream {
            status,
            message: "failed".to_string(),
            details: String::new(),
        };
        assert_eq!(upstream(429).status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(upstream(502).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream(200).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(upstream(1000).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_body_carries_details() {
        let err = RelayError::Configuration {
            message: "missing key".to_string(),
            hint: "set OPENAI_API_KEY".to_string(),
        };
        let body = err.body();
        assert_eq!(body.error, "missing key");
        assert_eq!(body.details.as_deref(), Some("set OPENAI_API_KEY"));

        assert!(RelayError::invalid_request("bad").body().details.is_none());
    }
}
