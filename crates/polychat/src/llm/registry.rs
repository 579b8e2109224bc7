//! Provider registry for managing LLM provider instances.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::anthropic::AnthropicProvider;
use super::google::GoogleProvider;
use super::openai::OpenAICompatibleProvider;
use super::provider::LLMProvider;
use crate::config::{GatewayConfig, ProviderSettings, ProvidersConfig};
use polychat_types::Provider;

/// Environment variable holding a provider's API key unless overridden.
pub fn default_credential_var(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAI => "OPENAI_API_KEY",
        Provider::Anthropic => "ANTHROPIC_API_KEY",
        Provider::Google => "GOOGLE_API_KEY",
    }
}

fn default_base_url(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAI => "https://api.openai.com/v1",
        Provider::Anthropic => "https://api.anthropic.com/v1",
        Provider::Google => "https://generativelanguage.googleapis.com/v1beta",
    }
}

/// Path segment a gateway uses to route to each provider.
fn gateway_segment(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAI => "openai",
        Provider::Anthropic => "anthropic",
        Provider::Google => "google-ai",
    }
}

/// Resolve the API base URL for a provider.
///
/// Precedence: explicit per-provider `base_url`, then `{gateway.url}/{segment}`,
/// then the provider's public endpoint.
pub fn resolve_base_url(
    provider: Provider,
    settings: &ProviderSettings,
    gateway: &GatewayConfig,
) -> String {
    if let Some(ref url) = settings.base_url {
        return url.trim_end_matches('/').to_string();
    }
    if let Some(ref url) = gateway.url {
        return format!(
            "{}/{}",
            url.trim_end_matches('/'),
            gateway_segment(provider)
        );
    }
    default_base_url(provider).to_string()
}

/// Registry of configured LLM providers, keyed by provider.
///
/// A provider is present only if its credential was found at construction
/// time. The registry is immutable once the server starts.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn LLMProvider>>,
    credential_vars: HashMap<Provider, String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize providers from environment variables.
    pub fn from_env(providers: &ProvidersConfig, gateway: &GatewayConfig) -> Self {
        Self::from_lookup(providers, gateway, |name| std::env::var(name).ok())
    }

    /// Initialize providers, reading each credential through `lookup`.
    pub fn from_lookup<F>(providers: &ProvidersConfig, gateway: &GatewayConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut registry = Self::new();

        for provider in Provider::ALL {
            let settings = providers.get(provider);
            let var = settings
                .api_key_env
                .clone()
                .unwrap_or_else(|| default_credential_var(provider).to_string());

            let api_key = lookup(&var).filter(|key| !key.trim().is_empty());
            registry.credential_vars.insert(provider, var);

            let Some(api_key) = api_key else {
                continue;
            };

            let base_url = resolve_base_url(provider, settings, gateway);
            let implementation: Arc<dyn LLMProvider> = match provider {
                Provider::OpenAI => {
                    Arc::new(OpenAICompatibleProvider::new(base_url.clone(), api_key))
                }
                Provider::Anthropic => Arc::new(AnthropicProvider::new(api_key, base_url.clone())),
                Provider::Google => Arc::new(GoogleProvider::new(api_key, base_url.clone())),
            };
            registry.register(provider, implementation);
            info!(%provider, %base_url, "Registered provider");
        }

        if registry.providers.is_empty() {
            warn!(
                "No LLM providers configured. Set {}, {}, or {}.",
                registry.credential_var(Provider::OpenAI),
                registry.credential_var(Provider::Anthropic),
                registry.credential_var(Provider::Google),
            );
        }

        registry
    }

    /// Register a provider implementation.
    pub fn register(&mut self, provider: Provider, implementation: Arc<dyn LLMProvider>) {
        self.providers.insert(provider, implementation);
    }

    /// Get a provider by type.
    pub fn get(&self, provider: Provider) -> Option<Arc<dyn LLMProvider>> {
        self.providers.get(&provider).cloned()
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        self.providers.contains_key(&provider)
    }

    /// Name of the environment variable the provider's credential is read from.
    pub fn credential_var(&self, provider: Provider) -> &str {
        self.credential_vars
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| default_credential_var(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_only_providers_with_credentials_are_registered() {
        let registry = ProviderRegistry::from_lookup(
            &ProvidersConfig::default(),
            &GatewayConfig::default(),
            lookup_from(&[("ANTHROPIC_API_KEY", "sk-ant")]),
        );

        assert!(registry.is_configured(Provider::Anthropic));
        assert!(!registry.is_configured(Provider::OpenAI));
        assert!(!registry.is_configured(Provider::Google));
        assert!(registry.get(Provider::OpenAI).is_none());
    }

    #[test]
    fn test_blank_credentials_count_as_missing() {
        let registry = ProviderRegistry::from_lookup(
            &ProvidersConfig::default(),
            &GatewayConfig::default(),
            lookup_from(&[("OPENAI_API_KEY", "  ")]),
        );
        assert!(!registry.is_configured(Provider::OpenAI));
    }

    #[test]
    fn test_credential_var_can_be_overridden() {
        let mut providers = ProvidersConfig::default();
        providers.google.api_key_env = Some("GEMINI_KEY".to_string());

        let registry = ProviderRegistry::from_lookup(
            &providers,
            &GatewayConfig::default(),
            lookup_from(&[("GEMINI_KEY", "g-key"), ("GOOGLE_API_KEY", "ignored")]),
        );
        assert!(registry.is_configured(Provider::Google));
        assert_eq!(registry.credential_var(Provider::Google), "GEMINI_KEY");
        assert_eq!(registry.credential_var(Provider::OpenAI), "OPENAI_API_KEY");
    }

    #[test]
    fn test_credential_var_on_empty_registry_uses_defaults() {
        let registry = ProviderRegistry::new();
        assert_eq!(registry.credential_var(Provider::Google), "GOOGLE_API_KEY");
    }

    #[test]
    fn test_resolve_base_url_precedence() {
        let gateway = GatewayConfig {
            url: Some("https://gateway.example.com/v1/gw-123/".to_string()),
        };
        let no_gateway = GatewayConfig::default();
        let plain = ProviderSettings::default();
        let overridden = ProviderSettings {
            api_key_env: None,
            base_url: Some("http://localhost:9000/v1/".to_string()),
        };

        assert_eq!(
            resolve_base_url(Provider::OpenAI, &plain, &no_gateway),
            "https://api.openai.com/v1"
        );
        assert_eq!(
            resolve_base_url(Provider::Google, &plain, &gateway),
            "https://gateway.example.com/v1/gw-123/google-ai"
        );
        assert_eq!(
            resolve_base_url(Provider::Anthropic, &plain, &gateway),
            "https://gateway.example.com/v1/gw-123/anthropic"
        );
        assert_eq!(
            resolve_base_url(Provider::OpenAI, &overridden, &gateway),
            "http://localhost:9000/v1"
        );
    }
}
