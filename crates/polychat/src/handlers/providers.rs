//! Provider listing handler.

use axum::Json;
use axum::extract::State;
use polychat_types::{Provider, ProviderDescriptor};
use serde::Serialize;

use crate::server::AppState;

#[derive(Serialize)]
pub struct ProviderInfo {
    #[serde(flatten)]
    descriptor: &'static ProviderDescriptor,
    configured: bool,
}

#[derive(Serialize)]
pub struct ListProvidersResponse {
    providers: Vec<ProviderInfo>,
}

/// GET /api/providers
pub async fn list_providers(State(state): State<AppState>) -> Json<ListProvidersResponse> {
    let providers = Provider::ALL
        .into_iter()
        .map(|p| ProviderInfo {
            descriptor: p.descriptor(),
            configured: state.providers.is_configured(p),
        })
        .collect();

    Json(ListProvidersResponse { providers })
}
