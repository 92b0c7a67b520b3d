use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::providers::{ProviderId, DEFAULT_PRIORITY};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Provider attempt order. `AI_PROVIDER_PRIORITY` overrides the default.
    pub provider_priority: Vec<ProviderId>,
    pub ai_request_timeout_secs: u64,
    pub ai_max_tokens: u32,
    pub ai_temperature: f32,
    disabled_providers: Vec<ProviderId>,
    api_keys: HashMap<ProviderId, String>,
    endpoint_overrides: HashMap<ProviderId, String>,
    model_overrides: HashMap<ProviderId, String>,
}

/// Resolved settings for a single provider, defaults applied.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub cost_per_token: f64,
    pub enabled: bool,
}

struct ProviderDefaults {
    endpoint: &'static str,
    model: &'static str,
    cost_per_token: f64,
}

fn provider_defaults(id: ProviderId) -> ProviderDefaults {
    match id {
        ProviderId::Qwen => ProviderDefaults {
            endpoint: "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation",
            model: "qwen-turbo",
            cost_per_token: 0.000008,
        },
        ProviderId::Moonshot => ProviderDefaults {
            endpoint: "https://api.moonshot.cn/v1/chat/completions",
            model: "moonshot-v1-8k",
            cost_per_token: 0.000012,
        },
        ProviderId::Baichuan => ProviderDefaults {
            endpoint: "https://api.baichuan-ai.com/v1/chat/completions",
            model: "Baichuan2-Turbo",
            cost_per_token: 0.000008,
        },
        ProviderId::Chatglm => ProviderDefaults {
            endpoint: "https://open.bigmodel.cn/api/paas/v4/chat/completions",
            model: "glm-4",
            cost_per_token: 0.00001,
        },
        ProviderId::OpenAi => ProviderDefaults {
            endpoint: "https://api.openai.com/v1/chat/completions",
            model: "gpt-4o-mini",
            cost_per_token: 0.000002,
        },
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut api_keys = HashMap::new();
        let mut endpoint_overrides = HashMap::new();
        let mut model_overrides = HashMap::new();
        for id in DEFAULT_PRIORITY {
            let upper = id.as_str().to_uppercase();
            if let Ok(key) = std::env::var(format!("{upper}_API_KEY")) {
                api_keys.insert(id, key);
            }
            if let Ok(endpoint) = std::env::var(format!("{upper}_ENDPOINT")) {
                endpoint_overrides.insert(id, endpoint);
            }
            if let Ok(model) = std::env::var(format!("{upper}_MODEL")) {
                model_overrides.insert(id, model);
            }
        }

        let provider_priority = match std::env::var("AI_PROVIDER_PRIORITY") {
            Ok(raw) => parse_provider_list(&raw).context("invalid AI_PROVIDER_PRIORITY")?,
            Err(_) => DEFAULT_PRIORITY.to_vec(),
        };

        let disabled_providers = match std::env::var("AI_DISABLED_PROVIDERS") {
            Ok(raw) => parse_provider_list(&raw).context("invalid AI_DISABLED_PROVIDERS")?,
            Err(_) => Vec::new(),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            provider_priority,
            ai_request_timeout_secs: std::env::var("AI_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("AI_REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            ai_max_tokens: std::env::var("AI_MAX_TOKENS")
                .unwrap_or_else(|_| "4096".to_string())
                .parse::<u32>()
                .context("AI_MAX_TOKENS must be a positive integer")?,
            ai_temperature: std::env::var("AI_TEMPERATURE")
                .unwrap_or_else(|_| "0.7".to_string())
                .parse::<f32>()
                .context("AI_TEMPERATURE must be a number")?,
            disabled_providers,
            api_keys,
            endpoint_overrides,
            model_overrides,
        })
    }

    /// Resolved per-provider settings: env overrides where present,
    /// built-in endpoint/model/pricing defaults otherwise. A provider with
    /// no configured key resolves to an empty credential and is filtered
    /// out by the registry.
    pub fn provider_settings(&self, id: ProviderId) -> ProviderSettings {
        let defaults = provider_defaults(id);
        ProviderSettings {
            api_key: self.api_keys.get(&id).cloned().unwrap_or_default(),
            endpoint: self
                .endpoint_overrides
                .get(&id)
                .cloned()
                .unwrap_or_else(|| defaults.endpoint.to_string()),
            model: self
                .model_overrides
                .get(&id)
                .cloned()
                .unwrap_or_else(|| defaults.model.to_string()),
            max_tokens: self.ai_max_tokens,
            temperature: self.ai_temperature,
            cost_per_token: defaults.cost_per_token,
            enabled: !self.disabled_providers.contains(&id),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses a comma-separated provider list, e.g. `qwen,moonshot,openai`.
fn parse_provider_list(raw: &str) -> Result<Vec<ProviderId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ProviderId>().map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_list() {
        let parsed = parse_provider_list("qwen, moonshot ,openai").unwrap();
        assert_eq!(
            parsed,
            vec![ProviderId::Qwen, ProviderId::Moonshot, ProviderId::OpenAi]
        );
    }

    #[test]
    fn test_parse_provider_list_rejects_unknown_names() {
        assert!(parse_provider_list("qwen,unknown").is_err());
    }

    #[test]
    fn test_parse_provider_list_skips_empty_segments() {
        let parsed = parse_provider_list("qwen,,moonshot,").unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_every_provider_has_defaults() {
        for id in DEFAULT_PRIORITY {
            let defaults = provider_defaults(id);
            assert!(defaults.endpoint.starts_with("https://"));
            assert!(!defaults.model.is_empty());
            assert!(defaults.cost_per_token > 0.0);
        }
    }
}
