use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use polychat_types::Provider;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Longest gap allowed between upstream stream chunks.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    #[serde(default = "default_keep_alive_interval")]
    pub keep_alive_interval_seconds: u64,
    /// Upper bound on generated tokens per reply.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            keep_alive_interval_seconds: default_keep_alive_interval(),
            max_tokens: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    300
}

fn default_idle_timeout() -> u64 {
    60
}

fn default_keep_alive_interval() -> u64 {
    15
}

// ============================================================================
// GatewayConfig
// ============================================================================

/// Optional upstream gateway fronting all providers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    /// Base URL including any gateway identifier; each provider is reached at
    /// `{url}/{provider-segment}`.
    #[serde(default)]
    pub url: Option<String>,
}

// ============================================================================
// ProvidersConfig
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub anthropic: ProviderSettings,
    #[serde(default)]
    pub google: ProviderSettings,
}

impl ProvidersConfig {
    pub fn get(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::OpenAI => &self.openai,
            Provider::Anthropic => &self.anthropic,
            Provider::Google => &self.google,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    /// Environment variable to read the API key from.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Overrides both the gateway-derived and the public base URL.
    #[serde(default)]
    pub base_url: Option<String>,
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_seconds, 300);
        assert_eq!(config.server.idle_timeout_seconds, 60);
        assert_eq!(config.server.keep_alive_interval_seconds, 15);
        assert!(config.server.max_tokens.is_none());
        assert!(config.gateway.url.is_none());
        assert!(config.providers.openai.base_url.is_none());
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let missing_path = tmp_dir.path().join("missing-config.yaml");
        let config = Config::load(&missing_path).await.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[tokio::test]
    async fn test_load_valid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 3000
  request_timeout_seconds: 60
  idle_timeout_seconds: 120
  keep_alive_interval_seconds: 30
  max_tokens: 512
gateway:
  url: "https://gateway.example.com/v1/gw-123"
providers:
  google:
    api_key_env: "GEMINI_API_KEY"
  openai:
    base_url: "http://localhost:11434/v1"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_seconds, 60);
        assert_eq!(config.server.idle_timeout_seconds, 120);
        assert_eq!(config.server.keep_alive_interval_seconds, 30);
        assert_eq!(config.server.max_tokens, Some(512));
        assert_eq!(
            config.gateway.url.as_deref(),
            Some("https://gateway.example.com/v1/gw-123")
        );
        assert_eq!(
            config.providers.get(Provider::Google).api_key_env.as_deref(),
            Some("GEMINI_API_KEY")
        );
        assert_eq!(
            config.providers.get(Provider::OpenAI).base_url.as_deref(),
            Some("http://localhost:11434/v1")
        );
        assert!(config.providers.anthropic.api_key_env.is_none());
    }

    #[tokio::test]
    async fn test_load_partial_yaml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 9000
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.server.host, "0.0.0.0"); // default
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.request_timeout_seconds, 300); // default
        assert_eq!(config.server.idle_timeout_seconds, 60); // default
        assert!(config.gateway.url.is_none()); // default
    }

    #[tokio::test]
    async fn test_load_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(file.path()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_config_error_display() {
        let io_error = ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "test",
        ));
        assert!(io_error.to_string().contains("failed to read config file"));
    }
}
