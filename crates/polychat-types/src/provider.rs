//! Provider selector and static descriptors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Anthropic,
    Google,
}

/// Immutable display and routing facts about a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    /// Canonical wire name (`openai`, `anthropic`, `google`).
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Completion model the relay binds requests to.
    pub model: &'static str,
    /// Display color as `#rrggbb`.
    pub color: &'static str,
}

static DESCRIPTORS: [ProviderDescriptor; 3] = [
    ProviderDescriptor {
        name: "openai",
        label: "OpenAI",
        model: "gpt-4-turbo",
        color: "#10a37f",
    },
    ProviderDescriptor {
        name: "anthropic",
        label: "Anthropic",
        model: "claude-3-5-sonnet-20241022",
        color: "#d97757",
    },
    ProviderDescriptor {
        name: "google",
        label: "Google",
        model: "gemini-1.5-pro",
        color: "#4285f4",
    },
];

impl Provider {
    /// All providers, in selector order.
    pub const ALL: [Provider; 3] = [Provider::OpenAI, Provider::Anthropic, Provider::Google];

    pub fn descriptor(self) -> &'static ProviderDescriptor {
        match self {
            Provider::OpenAI => &DESCRIPTORS[0],
            Provider::Anthropic => &DESCRIPTORS[1],
            Provider::Google => &DESCRIPTORS[2],
        }
    }

    pub fn as_str(self) -> &'static str {
        self.descriptor().name
    }

    /// Comma-separated list of valid wire names, for error messages.
    pub fn valid_names() -> String {
        Provider::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the supported provider names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid provider: {name}. Must be one of: {valid}", valid = Provider::valid_names())]
pub struct ParseProviderError {
    pub name: String,
}

impl FromStr for Provider {
    type Err = ParseProviderError;

    /// Parse an exact wire name. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParseProviderError {
                name: s.to_string(),
            })
    }
}
