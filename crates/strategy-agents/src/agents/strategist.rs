//! Strategist stage: asks the language model for an entry strategy

use async_trait::async_trait;
use std::sync::Arc;
use strategy_core::{PipelineContext, Result, Stage};
use strategy_llm::{CompletionRequest, DEFAULT_MAX_TOKENS, LLMProvider, StopReason};
use tracing::{debug, info, instrument, warn};

use crate::config::StrategyConfig;
use crate::error::AgentError;
use crate::llm::ConfiguredProvider;
use crate::prompts::StrategyPrompt;

/// Stage that fills `strategy` with model output
pub struct Strategist {
    provider: Arc<dyn LLMProvider>,
    prompt: StrategyPrompt,
    model: String,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl Strategist {
    /// Create a strategist calling `model` through `provider`
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            prompt: StrategyPrompt::default(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    /// Create a strategist for the backend selected in `config`
    ///
    /// The provider is built on first use, so a missing API key surfaces
    /// when this stage runs rather than at startup.
    pub fn from_config(config: &StrategyConfig) -> Self {
        let provider = Arc::new(ConfiguredProvider::from_config(config));
        Self::new(provider, config.model.clone())
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature)
    }

    /// Replace the prompt template
    pub fn with_prompt(mut self, prompt: StrategyPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    /// Set maximum tokens to generate
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Produce a strategy from the research and analysis text
    #[instrument(skip(self, research_data, data_analysis), fields(model = %self.model))]
    pub async fn strategize(
        &self,
        topic: &str,
        research_data: &str,
        data_analysis: &str,
    ) -> crate::Result<String> {
        let prompt = self.prompt.render(topic, research_data, data_analysis)?;
        debug!("Prompt is {} characters", prompt.len());

        let mut request = CompletionRequest::builder(self.model.clone())
            .user(prompt)
            .max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            request = request.temperature(temperature);
        }

        let response = self.provider.complete(request.build()).await?;

        if response.stop_reason == StopReason::MaxTokens {
            warn!("Strategy was cut off at {} tokens", self.max_tokens);
        }

        let strategy = response.message.text().trim();
        if strategy.is_empty() {
            return Err(AgentError::EmptyCompletion);
        }

        info!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Strategy received"
        );
        Ok(strategy.to_string())
    }
}

#[async_trait]
impl Stage for Strategist {
    async fn run(&self, context: PipelineContext) -> Result<PipelineContext> {
        let strategy = self
            .strategize(
                context.topic(),
                context.research_data()?,
                context.data_analysis()?,
            )
            .await?;
        Ok(context.with_strategy(strategy)?)
    }

    fn name(&self) -> &str {
        "Strategist"
    }
}
