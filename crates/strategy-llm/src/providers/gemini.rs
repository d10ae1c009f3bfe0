//! Google Gemini provider implementation
//!
//! This module implements the LLMProvider trait for the Gemini models of the
//! Google Generative Language API.
//! See: https://ai.google.dev/api/generate-content
//!
//! # Example
//!
//! ```no_run
//! use strategy_llm::{CompletionRequest, LLMProvider, Message};
//! use strategy_llm::providers::{GeminiConfig, GeminiProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GeminiProvider::with_config(GeminiConfig::new("AIza..."))?;
//!
//!     let request = CompletionRequest::builder("gemini-1.5-flash")
//!         .add_message(Message::user("Hello!"))
//!         .max_tokens(100)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text());
//!     Ok(())
//! }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, Role,
    StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default model used by the strategist
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Configuration for the Gemini provider
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header
    pub api_key: String,

    /// Base URL (default: "https://generativelanguage.googleapis.com/v1beta")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a provider from an explicit configuration
    ///
    /// Fails with [`LLMError::ConfigurationError`] when the API key is empty.
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "Gemini API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider with default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// `generateContent` URL for `model`
    ///
    /// A bare name is looked up under `models/`; names already qualified
    /// with `models/` or `tunedModels/` keep their collection. The name is
    /// percent-encoded as a single path segment.
    pub fn endpoint(&self, model: &str) -> Result<Url> {
        let (collection, name) = match model.split_once('/') {
            Some((collection @ ("models" | "tunedModels"), name)) => (collection, name),
            _ => ("models", model),
        };

        let mut url = Url::parse(&self.config.api_base).map_err(|e| {
            LLMError::ConfigurationError(format!(
                "invalid Gemini API base {}: {e}",
                self.config.api_base
            ))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                LLMError::ConfigurationError(format!(
                    "Gemini API base {} cannot carry a path",
                    self.config.api_base
                ))
            })?
            .pop_if_empty()
            .push(collection)
            .push(&format!("{name}:generateContent"));
        Ok(url)
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to Gemini API");

        let url = self.endpoint(&request.model)?;
        let model = request.model.clone();
        let gemini_request = build_gemini_request(request);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("content-type", "application/json")
            .json(&gemini_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(LLMError::from_status(status.as_u16(), error_text, &model));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        convert_response(gemini_response)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// Gemini-specific request/response types
// These match the generateContent REST format

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

fn text_content(role: Option<&str>, text: String) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart { text }],
    }
}

/// Build the Gemini request body
///
/// System text (both `request.system` and any system-role messages) is
/// folded into `systemInstruction`; assistant turns use the "model" role.
fn build_gemini_request(request: CompletionRequest) -> GeminiRequest {
    let mut system_parts: Vec<String> = request.system.into_iter().collect();
    let mut contents = Vec::with_capacity(request.messages.len());

    for Message { role, content } in request.messages {
        match role {
            Role::System => system_parts.push(content),
            Role::User => contents.push(text_content(Some("user"), content)),
            Role::Assistant => contents.push(text_content(Some("model"), content)),
        }
    }

    let system_instruction =
        (!system_parts.is_empty()).then(|| text_content(None, system_parts.join("\n\n")));

    GeminiRequest {
        contents,
        system_instruction,
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
            stop_sequences: request.stop_sequences,
        },
    }
}

fn convert_response(response: GeminiResponse) -> Result<CompletionResponse> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::UnexpectedResponse("No candidates in response".to_string()))?;

    let finish_reason = candidate.finish_reason.unwrap_or_default();
    let stop_reason = map_finish_reason(&finish_reason);

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() && stop_reason == StopReason::ContentFiltered {
        return Err(LLMError::ProviderError(format!(
            "Response blocked by provider (finish reason: {finish_reason})"
        )));
    }

    let usage = response
        .usage_metadata
        .map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        })
        .unwrap_or_default();

    debug!(
        "Received response - finish_reason: {}, tokens: {}/{}",
        finish_reason, usage.input_tokens, usage.output_tokens
    );

    Ok(CompletionResponse {
        message: Message::assistant(text),
        stop_reason,
        usage,
    })
}

fn map_finish_reason(reason: &str) -> StopReason {
    match reason {
        "MAX_TOKENS" => StopReason::MaxTokens,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            StopReason::ContentFiltered
        }
        "STOP" | "" => StopReason::EndTurn,
        other => {
            debug!("Unknown finish reason: {}", other);
            StopReason::EndTurn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = GeminiProvider::new("test-key");
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().name(), "gemini");
    }

    #[test]
    fn test_endpoint_for_plain_model() {
        let provider = GeminiProvider::new("k").unwrap();
        let url = provider.endpoint("gemini-1.5-flash").unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_endpoint_escapes_model_name() {
        let config = GeminiConfig::new("k").with_api_base("http://127.0.0.1:9000/v1beta/");
        let provider = GeminiProvider::with_config(config).unwrap();

        let tuned = provider.endpoint("tunedModels/energy-7").unwrap();
        assert_eq!(
            tuned.as_str(),
            "http://127.0.0.1:9000/v1beta/tunedModels/energy-7:generateContent"
        );

        let odd = provider.endpoint("flash?alt=sse").unwrap();
        assert_eq!(
            odd.as_str(),
            "http://127.0.0.1:9000/v1beta/models/flash%3Falt=sse:generateContent"
        );
        assert!(odd.query().is_none());

        let nested = provider.endpoint("a/b").unwrap();
        assert_eq!(
            nested.as_str(),
            "http://127.0.0.1:9000/v1beta/models/a%2Fb:generateContent"
        );
    }

    #[test]
    fn test_endpoint_rejects_bad_base() {
        let provider = GeminiProvider::with_config(GeminiConfig::new("k").with_api_base("not a url")).unwrap();
        assert!(matches!(
            provider.endpoint("gemini-1.5-flash"),
            Err(LLMError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = GeminiProvider::new("  ");
        assert!(matches!(result, Err(LLMError::ConfigurationError(_))));
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = GeminiConfig::new("secret-key").with_api_base("http://localhost:9000/");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert_eq!(config.api_base, "http://localhost:9000");
    }

    #[test]
    fn test_request_body() {
        let request = CompletionRequest::builder(DEFAULT_GEMINI_MODEL)
            .system("You are a market strategist.")
            .add_message(Message::user("Plan entry"))
            .max_tokens(512)
            .temperature(0.5)
            .build();

        let body = serde_json::to_value(build_gemini_request(request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Plan entry" }] }],
                "systemInstruction": { "parts": [{ "text": "You are a market strategist." }] },
                "generationConfig": { "maxOutputTokens": 512, "temperature": 0.5 }
            })
        );
    }

    #[test]
    fn test_assistant_role_maps_to_model() {
        let request = CompletionRequest::builder(DEFAULT_GEMINI_MODEL)
            .add_message(Message::user("Hi"))
            .add_message(Message::assistant("Hello"))
            .build();

        let body = build_gemini_request(request);
        assert_eq!(body.contents[1].role.as_deref(), Some("model"));
        assert!(body.system_instruction.is_none());
    }

    #[test]
    fn test_convert_response() {
        let raw = r#"{
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "STEP 1: " }, { "text": "Partner" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 42, "candidatesTokenCount": 7, "totalTokenCount": 49 }
        }"#;

        let response = convert_response(serde_json::from_str(raw).unwrap()).unwrap();
        assert_eq!(response.message.text(), "STEP 1: Partner");
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage.total(), 49);
    }

    #[test]
    fn test_blocked_response_is_error() {
        let raw = r#"{ "candidates": [{ "finishReason": "SAFETY" }] }"#;
        let result = convert_response(serde_json::from_str(raw).unwrap());
        assert!(matches!(result, Err(LLMError::ProviderError(_))));
    }

    #[test]
    fn test_no_candidates() {
        let result = convert_response(serde_json::from_str("{}").unwrap());
        assert!(matches!(result, Err(LLMError::UnexpectedResponse(_))));
    }
}
