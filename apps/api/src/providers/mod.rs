//! Provider registry — the static description of every AI vendor the
//! orchestrator may dispatch to, held in priority order.
//!
//! Profiles are built once at startup from `Config` and never mutated.
//! A provider that is disabled or carries an empty credential is invisible
//! to `available_providers()` and therefore never attempted.

pub mod adapters;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Default attempt order when `AI_PROVIDER_PRIORITY` is not set.
pub const DEFAULT_PRIORITY: [ProviderId; 5] = [
    ProviderId::Qwen,
    ProviderId::Moonshot,
    ProviderId::Baichuan,
    ProviderId::Chatglm,
    ProviderId::OpenAi,
];

/// Identity of an external text-generation vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Qwen,
    Moonshot,
    Baichuan,
    Chatglm,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Qwen => "qwen",
            ProviderId::Moonshot => "moonshot",
            ProviderId::Baichuan => "baichuan",
            ProviderId::Chatglm => "chatglm",
            ProviderId::OpenAi => "openai",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown provider id: {0}")]
pub struct UnknownProvider(String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qwen" => Ok(ProviderId::Qwen),
            "moonshot" => Ok(ProviderId::Moonshot),
            "baichuan" => Ok(ProviderId::Baichuan),
            "chatglm" => Ok(ProviderId::Chatglm),
            "openai" => Ok(ProviderId::OpenAi),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Immutable per-provider connection and pricing profile.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub id: ProviderId,
    pub model: String,
    pub endpoint: String,
    pub api_key: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Price per billed token, in account currency units.
    pub cost_per_token: f64,
    pub enabled: bool,
    pub timeout: Duration,
}

impl ProviderProfile {
    /// A provider without a credential can never be dispatched to,
    /// regardless of its enabled flag.
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn is_available(&self) -> bool {
        self.enabled && self.has_credential()
    }
}

/// All known providers, in attempt-priority order.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    profiles: Vec<ProviderProfile>,
}

impl ProviderRegistry {
    /// Builds the registry from configuration. The priority list decides
    /// ordering; providers missing from it are simply not registered.
    pub fn from_config(config: &Config) -> Self {
        let profiles = config
            .provider_priority
            .iter()
            .map(|&id| {
                let settings = config.provider_settings(id);
                ProviderProfile {
                    id,
                    model: settings.model,
                    endpoint: settings.endpoint,
                    api_key: settings.api_key,
                    max_tokens: settings.max_tokens,
                    temperature: settings.temperature,
                    cost_per_token: settings.cost_per_token,
                    enabled: settings.enabled,
                    timeout: Duration::from_secs(config.ai_request_timeout_secs),
                }
            })
            .collect();
        Self { profiles }
    }

    pub fn new(profiles: Vec<ProviderProfile>) -> Self {
        Self { profiles }
    }

    /// Providers eligible for dispatch, in priority order.
    pub fn available_providers(&self) -> Vec<&ProviderProfile> {
        self.profiles.iter().filter(|p| p.is_available()).collect()
    }

    /// Enabled providers, including those still missing a credential.
    /// Used by the health check, which reports on configuration breadth.
    pub fn enabled_providers(&self) -> Vec<&ProviderProfile> {
        self.profiles.iter().filter(|p| p.enabled).collect()
    }

    /// First available provider. Drives health reporting and default selection.
    pub fn primary_provider(&self) -> Option<&ProviderProfile> {
        self.profiles.iter().find(|p| p.is_available())
    }
}

#[cfg(test)]
pub(crate) fn test_profile(id: ProviderId, api_key: &str, enabled: bool) -> ProviderProfile {
    ProviderProfile {
        id,
        model: format!("{id}-test-model"),
        endpoint: format!("https://{id}.example.com/v1/chat/completions"),
        api_key: api_key.to_string(),
        max_tokens: 2048,
        temperature: 0.2,
        cost_per_token: 0.000002,
        enabled,
        timeout: Duration::from_secs(30),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_round_trips_through_str() {
        for id in DEFAULT_PRIORITY {
            let parsed: ProviderId = id.as_str().parse().unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn test_provider_id_parse_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderId>().unwrap(), ProviderId::OpenAi);
        assert_eq!(" qwen ".parse::<ProviderId>().unwrap(), ProviderId::Qwen);
    }

    #[test]
    fn test_provider_id_parse_rejects_unknown() {
        assert!("claude".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_provider_id_serde_wire_names() {
        let json = serde_json::to_string(&ProviderId::OpenAi).unwrap();
        assert_eq!(json, r#""openai""#);
        let json = serde_json::to_string(&ProviderId::Chatglm).unwrap();
        assert_eq!(json, r#""chatglm""#);
    }

    #[test]
    fn test_disabled_provider_is_not_available() {
        let registry = ProviderRegistry::new(vec![
            test_profile(ProviderId::Qwen, "key", false),
            test_profile(ProviderId::Moonshot, "key", true),
        ]);
        let available = registry.available_providers();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, ProviderId::Moonshot);
    }

    #[test]
    fn test_empty_credential_is_not_available() {
        let registry = ProviderRegistry::new(vec![
            test_profile(ProviderId::Qwen, "   ", true),
            test_profile(ProviderId::OpenAi, "sk-test", true),
        ]);
        let available = registry.available_providers();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, ProviderId::OpenAi);
    }

    #[test]
    fn test_available_providers_preserve_priority_order() {
        let registry = ProviderRegistry::new(vec![
            test_profile(ProviderId::Qwen, "k", true),
            test_profile(ProviderId::Moonshot, "k", true),
            test_profile(ProviderId::Baichuan, "", true),
            test_profile(ProviderId::OpenAi, "k", true),
        ]);
        let order: Vec<ProviderId> = registry.available_providers().iter().map(|p| p.id).collect();
        assert_eq!(
            order,
            vec![ProviderId::Qwen, ProviderId::Moonshot, ProviderId::OpenAi]
        );
    }

    #[test]
    fn test_primary_provider_skips_unavailable() {
        let registry = ProviderRegistry::new(vec![
            test_profile(ProviderId::Qwen, "k", false),
            test_profile(ProviderId::Moonshot, "k", true),
        ]);
        assert_eq!(registry.primary_provider().unwrap().id, ProviderId::Moonshot);
    }

    #[test]
    fn test_primary_provider_none_when_nothing_available() {
        let registry = ProviderRegistry::new(vec![test_profile(ProviderId::Qwen, "", true)]);
        assert!(registry.primary_provider().is_none());
    }
}
