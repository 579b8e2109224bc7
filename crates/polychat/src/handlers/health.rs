use axum::extract::State;
use axum::http::StatusCode;
use polychat_types::Provider;

use crate::server::AppState;

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Ready once at least one provider has a credential.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if Provider::ALL
        .into_iter()
        .any(|p| state.providers.is_configured(p))
    {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "no providers configured")
    }
}
