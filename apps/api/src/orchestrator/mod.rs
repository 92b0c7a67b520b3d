//! Fallback orchestrator — the single entry point for all AI text
//! generation in TalentDesk.
//!
//! ARCHITECTURAL RULE: no other module may call a vendor API directly.
//! The orchestrator walks the provider chain sequentially, swallowing
//! per-attempt failures, and pays at most one provider per logical
//! request. Network I/O lives behind the `Transport` seam so attempts
//! fail uniformly and tests can script outcomes.

pub mod usage;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::providers::adapters::{adapter_for, Completion, GenerationParams};
use crate::providers::{ProviderId, ProviderProfile, ProviderRegistry};

use self::usage::{UsageCounter, UsageTracker};

/// Trivial prompt fired by the health check.
const HEALTH_CHECK_PROMPT: &str = "Reply with the single word: pong";

/// Caller-supplied, per-call overrides. Anything unset falls back to the
/// provider profile.
#[derive(Debug, Clone, Default)]
pub struct InvocationOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub preferred_provider: Option<ProviderId>,
}

/// Outcome of a successful invocation.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    pub text: String,
    pub provider: ProviderId,
    pub model: String,
    pub tokens_used: u32,
    pub cost: f64,
}

/// A single provider attempt's failure. Recovered locally inside the
/// fallback loop — callers only ever see `OrchestratorError`.
#[derive(Debug, Error)]
pub enum ProviderCallError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("vendor error: {0}")]
    Vendor(String),
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("all providers failed (last error: {last_error})")]
    AllProvidersFailed { last_error: String },
}

/// Owns the actual HTTP POST. One call per provider attempt; bearer
/// auth; the profile timeout is the only bound on an in-flight call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        endpoint: &str,
        api_key: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, ProviderCallError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<Self> {
        // Per-attempt timeouts come from the provider profile, so the
        // shared client itself carries none.
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        endpoint: &str,
        api_key: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, ProviderCallError> {
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderCallError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderCallError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderCallError::Network(e.to_string()))
    }
}

pub struct Orchestrator {
    registry: ProviderRegistry,
    transport: Arc<dyn Transport>,
    usage: UsageTracker,
}

impl Orchestrator {
    pub fn new(registry: ProviderRegistry, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
            usage: UsageTracker::new(),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Walks the provider chain sequentially and returns the first
    /// success. Per-attempt failures are logged and swallowed; the same
    /// provider is never retried within one call. Chain exhaustion (or an
    /// empty chain) surfaces as `AllProvidersFailed`.
    pub async fn invoke(
        &self,
        prompt: &str,
        options: &InvocationOptions,
    ) -> Result<InvocationResult, OrchestratorError> {
        let chain = resolve_chain(
            self.registry.available_providers(),
            options.preferred_provider,
        );

        let mut last_error: Option<ProviderCallError> = None;

        for profile in chain {
            debug!(provider = %profile.id, model = %profile.model, "attempting provider");
            match self.attempt(profile, prompt, options).await {
                Ok(completion) => {
                    let cost = f64::from(completion.tokens_used) * profile.cost_per_token;
                    self.usage.record(profile.id, completion.tokens_used, cost);
                    info!(
                        provider = %profile.id,
                        tokens = completion.tokens_used,
                        cost,
                        "invocation served"
                    );
                    return Ok(InvocationResult {
                        text: completion.text,
                        provider: profile.id,
                        model: profile.model.clone(),
                        tokens_used: completion.tokens_used,
                        cost,
                    });
                }
                Err(e) => {
                    warn!(provider = %profile.id, "provider attempt failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(OrchestratorError::AllProvidersFailed {
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no providers enabled with credentials".to_string()),
        })
    }

    /// One provider attempt: build the vendor payload, POST it, detect
    /// vendor-reported errors, parse the completion. Does not touch the
    /// usage counters — only `invoke` records billable successes.
    async fn attempt(
        &self,
        profile: &ProviderProfile,
        prompt: &str,
        options: &InvocationOptions,
    ) -> Result<Completion, ProviderCallError> {
        let params = GenerationParams {
            max_tokens: options
                .max_tokens
                .unwrap_or(profile.max_tokens)
                .min(profile.max_tokens),
            temperature: options.temperature.unwrap_or(profile.temperature),
        };

        let adapter = adapter_for(profile.id);
        let payload = adapter.build_payload(profile, prompt, &params);
        let body = self
            .transport
            .post_json(&profile.endpoint, &profile.api_key, &payload, profile.timeout)
            .await?;

        if let Some(message) = vendor_error_message(&body) {
            return Err(ProviderCallError::Vendor(message));
        }

        let completion = adapter.parse_response(&body);
        if completion.text.is_empty() {
            return Err(ProviderCallError::Vendor("empty completion text".to_string()));
        }
        Ok(completion)
    }

    /// Fires a trivial prompt at every enabled provider concurrently.
    /// Each failure is caught independently, so one dead provider cannot
    /// block reporting on the rest; the returned map is always complete.
    pub async fn health_check(&self) -> HashMap<ProviderId, bool> {
        let options = InvocationOptions {
            max_tokens: Some(8),
            temperature: Some(0.0),
            preferred_provider: None,
        };

        let checks = self.registry.enabled_providers().into_iter().map(|profile| {
            let options = options.clone();
            async move {
                let healthy = profile.has_credential()
                    && self
                        .attempt(profile, HEALTH_CHECK_PROMPT, &options)
                        .await
                        .is_ok();
                (profile.id, healthy)
            }
        });

        join_all(checks).await.into_iter().collect()
    }

    pub fn usage_stats(&self) -> HashMap<ProviderId, UsageCounter> {
        self.usage.snapshot()
    }
}

/// Computes the attempt chain: available providers in priority order,
/// with the preferred provider (when it is itself available) moved to the
/// front. Relative order of the rest is preserved; no duplicates.
fn resolve_chain(
    available: Vec<&ProviderProfile>,
    preferred: Option<ProviderId>,
) -> Vec<&ProviderProfile> {
    let Some(preferred) = preferred else {
        return available;
    };
    let Some(pos) = available.iter().position(|p| p.id == preferred) else {
        return available;
    };
    let mut chain = available;
    let profile = chain.remove(pos);
    chain.insert(0, profile);
    chain
}

/// Detects an error body a vendor returned with a 2xx status. OpenAI-style
/// bodies carry an `error` object; DashScope reports a top-level
/// code/message pair with no `output`.
fn vendor_error_message(body: &Value) -> Option<String> {
    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unspecified vendor error");
        return Some(message.to_string());
    }
    if body.get("output").is_none() && body.get("choices").is_none() {
        if let (Some(code), Some(message)) = (
            body.get("code").and_then(Value::as_str),
            body.get("message").and_then(Value::as_str),
        ) {
            return Some(format!("{code}: {message}"));
        }
    }
    None
}
