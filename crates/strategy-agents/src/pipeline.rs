//! Assembly of the four-stage market strategy pipeline

use std::sync::Arc;
use strategy_llm::LLMProvider;
use strategy_workflow::Pipeline;

use crate::agents::{DataSynthesizer, Presenter, Researcher, Strategist};
use crate::api::HeadlineSource;
use crate::config::StrategyConfig;
use crate::error::Result;

/// Name reported in pipeline logs
pub const PIPELINE_NAME: &str = "market-strategy";

/// Build the pipeline with production news and language-model clients
///
/// Researcher, DataSynthesizer, Strategist and Presenter run in that order.
/// `config` is validated first, since its fields can be set directly.
pub fn build_pipeline(config: &StrategyConfig) -> Result<Pipeline> {
    config.validate()?;
    let pipeline = Pipeline::builder(PIPELINE_NAME)
        .add_stage(Arc::new(Researcher::from_config(config)?))
        .add_stage(Arc::new(DataSynthesizer::from_config(config)))
        .add_stage(Arc::new(Strategist::from_config(config)))
        .add_stage(Arc::new(Presenter::from_config(config)))
        .build()?;
    Ok(pipeline)
}

/// Build the pipeline around caller-supplied news and model backends
pub fn build_pipeline_with(
    config: &StrategyConfig,
    headlines: Arc<dyn HeadlineSource>,
    provider: Arc<dyn LLMProvider>,
) -> Result<Pipeline> {
    config.validate()?;
    let strategist = Strategist::new(provider, config.model.clone())
        .with_max_tokens(config.max_tokens)
        .with_temperature(config.temperature);

    let pipeline = Pipeline::builder(PIPELINE_NAME)
        .add_stage(Arc::new(
            Researcher::new(headlines).with_max_headlines(config.max_headlines),
        ))
        .add_stage(Arc::new(DataSynthesizer::from_config(config)))
        .add_stage(Arc::new(strategist))
        .add_stage(Arc::new(Presenter::from_config(config)))
        .build()?;
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::news::MockHeadlineSource;
    use crate::error::AgentError;
    use strategy_llm::{CompletionRequest, CompletionResponse, LLMError};

    struct NoProvider;

    #[async_trait::async_trait]
    impl LLMProvider for NoProvider {
        fn name(&self) -> &str {
            "none"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, LLMError> {
            Err(LLMError::ConfigurationError("unused".to_string()))
        }
    }

    #[test]
    fn test_stage_order() {
        let pipeline = build_pipeline(&StrategyConfig::default()).unwrap();
        assert_eq!(pipeline.name(), PIPELINE_NAME);
        assert_eq!(
            pipeline.stage_names(),
            vec!["Researcher", "DataSynthesizer", "Strategist", "Presenter"]
        );
    }

    #[test]
    fn test_rejects_unvalidated_config() {
        let config = StrategyConfig {
            max_headlines: 0,
            ..StrategyConfig::default()
        };

        assert!(matches!(build_pipeline(&config), Err(AgentError::ConfigError(_))));
        assert!(matches!(
            build_pipeline_with(
                &config,
                Arc::new(MockHeadlineSource::new()),
                Arc::new(NoProvider),
            ),
            Err(AgentError::ConfigError(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_data_range() {
        let config = StrategyConfig {
            data_mode: crate::config::MarketDataMode::Uniform {
                low: 90,
                high: 60,
                seed: None,
            },
            ..StrategyConfig::default()
        };
        assert!(matches!(build_pipeline(&config), Err(AgentError::ConfigError(_))));
    }
}
