//! Vendor adapters — per-provider translation between the vendor-neutral
//! prompt/params pair and each vendor's JSON schema.
//!
//! Adapters are pure: no network I/O (the orchestrator owns that, so
//! failures are attributed uniformly) and no errors — a response missing
//! the expected fields parses to an empty completion, never a panic.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{ProviderId, ProviderProfile};

/// Concrete generation parameters after caller overrides have been
/// resolved against the provider profile.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Vendor-neutral completion extracted from a provider response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: u32,
}

pub trait VendorAdapter: Send + Sync {
    /// Builds the vendor-specific request body.
    fn build_payload(
        &self,
        profile: &ProviderProfile,
        prompt: &str,
        params: &GenerationParams,
    ) -> Value;

    /// Extracts `(text, tokens_used)` from the vendor response body.
    /// Missing fields resolve to an empty string / zero tokens.
    fn parse_response(&self, body: &Value) -> Completion;
}

/// Adapter registry. Adding a provider means adding an entry here —
/// the orchestrator never branches on provider id.
pub fn adapter_for(id: ProviderId) -> &'static dyn VendorAdapter {
    match id {
        ProviderId::Qwen => &QwenAdapter,
        ProviderId::Moonshot | ProviderId::Baichuan | ProviderId::Chatglm | ProviderId::OpenAi => {
            &OpenAiCompatAdapter
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI-compatible chat completions (openai, moonshot, baichuan, chatglm)
// ────────────────────────────────────────────────────────────────────────────

pub struct OpenAiCompatAdapter;

#[derive(Debug, Default, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: UsageBlock,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatChoiceMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct UsageBlock {
    #[serde(default)]
    total_tokens: u32,
}

impl VendorAdapter for OpenAiCompatAdapter {
    fn build_payload(
        &self,
        profile: &ProviderProfile,
        prompt: &str,
        params: &GenerationParams,
    ) -> Value {
        json!({
            "model": profile.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        })
    }

    fn parse_response(&self, body: &Value) -> Completion {
        let parsed: ChatCompletionResponse =
            serde_json::from_value(body.clone()).unwrap_or_default();
        Completion {
            text: parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .unwrap_or_default(),
            tokens_used: parsed.usage.total_tokens,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Qwen (DashScope) — wraps messages in an input/parameters envelope and
// returns the completion as output.text
// ────────────────────────────────────────────────────────────────────────────

pub struct QwenAdapter;

#[derive(Debug, Default, Deserialize)]
struct QwenResponse {
    #[serde(default)]
    output: QwenOutput,
    #[serde(default)]
    usage: UsageBlock,
}

#[derive(Debug, Default, Deserialize)]
struct QwenOutput {
    #[serde(default)]
    text: String,
}

impl VendorAdapter for QwenAdapter {
    fn build_payload(
        &self,
        profile: &ProviderProfile,
        prompt: &str,
        params: &GenerationParams,
    ) -> Value {
        json!({
            "model": profile.model,
            "input": {
                "messages": [{"role": "user", "content": prompt}]
            },
            "parameters": {
                "max_tokens": params.max_tokens,
                "temperature": params.temperature,
            },
        })
    }

    fn parse_response(&self, body: &Value) -> Completion {
        let parsed: QwenResponse = serde_json::from_value(body.clone()).unwrap_or_default();
        Completion {
            text: parsed.output.text,
            tokens_used: parsed.usage.total_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_profile;

    const PARAMS: GenerationParams = GenerationParams {
        max_tokens: 1024,
        temperature: 0.3,
    };

    #[test]
    fn test_openai_payload_shape() {
        let profile = test_profile(ProviderId::OpenAi, "sk-test", true);
        let payload = OpenAiCompatAdapter.build_payload(&profile, "Hello", &PARAMS);

        assert_eq!(payload["model"], profile.model.as_str());
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["messages"][0]["content"], "Hello");
        assert_eq!(payload["max_tokens"], 1024);
        assert!(payload.get("input").is_none());
    }

    #[test]
    fn test_qwen_payload_uses_input_parameters_envelope() {
        let profile = test_profile(ProviderId::Qwen, "sk-test", true);
        let payload = QwenAdapter.build_payload(&profile, "Hello", &PARAMS);

        assert_eq!(payload["input"]["messages"][0]["content"], "Hello");
        assert_eq!(payload["parameters"]["max_tokens"], 1024);
        assert!(payload.get("messages").is_none());
        assert!(payload.get("max_tokens").is_none());
    }

    #[test]
    fn test_openai_response_parses_text_and_tokens() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "result text"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 32, "total_tokens": 42}
        });
        let completion = OpenAiCompatAdapter.parse_response(&body);
        assert_eq!(completion.text, "result text");
        assert_eq!(completion.tokens_used, 42);
    }

    #[test]
    fn test_qwen_response_parses_output_text() {
        let body = json!({
            "output": {"text": "qwen says hi", "finish_reason": "stop"},
            "usage": {"total_tokens": 17},
            "request_id": "abc"
        });
        let completion = QwenAdapter.parse_response(&body);
        assert_eq!(completion.text, "qwen says hi");
        assert_eq!(completion.tokens_used, 17);
    }

    #[test]
    fn test_missing_fields_resolve_to_empty_defaults() {
        let completion = OpenAiCompatAdapter.parse_response(&json!({"choices": []}));
        assert_eq!(completion, Completion::default());

        let completion = QwenAdapter.parse_response(&json!({"request_id": "x"}));
        assert_eq!(completion, Completion::default());
    }

    #[test]
    fn test_unrecognized_shape_never_panics() {
        for body in [json!("just a string"), json!(42), json!({"error": {"message": "boom"}})] {
            assert_eq!(OpenAiCompatAdapter.parse_response(&body), Completion::default());
            assert_eq!(QwenAdapter.parse_response(&body), Completion::default());
        }
    }

    #[test]
    fn test_every_provider_has_an_adapter() {
        for id in crate::providers::DEFAULT_PRIORITY {
            let profile = test_profile(id, "k", true);
            let payload = adapter_for(id).build_payload(&profile, "ping", &PARAMS);
            assert!(payload.is_object());
        }
    }
}
