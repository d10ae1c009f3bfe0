//! Language-model provider selected by configuration

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use strategy_llm::providers::{GeminiConfig, GeminiProvider, OpenAIConfig, OpenAIProvider};
use strategy_llm::{CompletionRequest, CompletionResponse, LLMError, LLMProvider};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::{ApiKey, LlmBackend, StrategyConfig};

/// Provider for the configured backend, built on the first request
///
/// Construction never fails; a missing or empty API key is reported as
/// [`LLMError::ConfigurationError`] by the first call to `complete`.
pub struct ConfiguredProvider {
    backend: LlmBackend,
    api_key: Option<ApiKey>,
    api_base: Option<String>,
    timeout: Duration,
    inner: OnceCell<Arc<dyn LLMProvider>>,
}

impl ConfiguredProvider {
    /// Capture the language-model settings of `config`
    pub fn from_config(config: &StrategyConfig) -> Self {
        Self {
            backend: config.provider,
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            timeout: config.llm_timeout,
            inner: OnceCell::new(),
        }
    }

    fn build(&self) -> strategy_llm::Result<Arc<dyn LLMProvider>> {
        let key = self.api_key.as_ref().ok_or_else(|| {
            LLMError::ConfigurationError(format!(
                "no API key for the {} backend; set {}",
                self.backend,
                self.backend.api_key_var()
            ))
        })?;
        let timeout_secs = self.timeout.as_secs().max(1);
        debug!(backend = %self.backend, "Initializing language-model provider");

        let provider: Arc<dyn LLMProvider> = match self.backend {
            LlmBackend::Gemini => {
                let mut config = GeminiConfig::new(key.expose()).with_timeout(timeout_secs);
                if let Some(base) = &self.api_base {
                    config = config.with_api_base(base);
                }
                Arc::new(GeminiProvider::with_config(config)?)
            }
            LlmBackend::OpenAI => {
                let mut config = OpenAIConfig::new(key.expose()).with_timeout(timeout_secs);
                if let Some(base) = &self.api_base {
                    config = config.with_api_base(base);
                }
                Arc::new(OpenAIProvider::with_config(config)?)
            }
        };
        Ok(provider)
    }
}

#[async_trait]
impl LLMProvider for ConfiguredProvider {
    async fn complete(&self, request: CompletionRequest) -> strategy_llm::Result<CompletionResponse> {
        let provider = self.inner.get_or_try_init(|| async { self.build() }).await?;
        provider.complete(request).await
    }

    fn name(&self) -> &str {
        self.backend.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest::prompt("gemini-1.5-flash", "hello")
    }

    #[test]
    fn test_missing_key_reported_on_first_call() {
        let config = StrategyConfig::builder().build().unwrap();
        let provider = ConfiguredProvider::from_config(&config);
        assert_eq!(provider.name(), "gemini");

        let err = tokio_test::block_on(provider.complete(request())).unwrap_err();
        match err {
            LLMError::ConfigurationError(msg) => assert!(msg.contains("GOOGLE_API_KEY")),
            other => panic!("Expected ConfigurationError, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_key_rejected_by_backend() {
        let config = StrategyConfig::builder()
            .provider(LlmBackend::OpenAI)
            .api_key("  ")
            .build()
            .unwrap();
        let provider = ConfiguredProvider::from_config(&config);

        let err = tokio_test::block_on(provider.complete(request())).unwrap_err();
        assert!(matches!(err, LLMError::ConfigurationError(_)));
    }

    #[test]
    fn test_builds_selected_backend() {
        let config = StrategyConfig::builder()
            .provider(LlmBackend::OpenAI)
            .api_key("sk-test")
            .api_base("http://localhost:1234/v1")
            .build()
            .unwrap();
        let provider = ConfiguredProvider::from_config(&config);

        let inner = provider.build().unwrap();
        assert_eq!(inner.name(), "openai");
    }
}
