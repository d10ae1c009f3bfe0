//! Researcher stage: gathers headlines for the topic

use async_trait::async_trait;
use std::sync::Arc;
use strategy_core::{PipelineContext, Result, Stage};
use tracing::{info, instrument, warn};

use crate::api::{GoogleNewsClient, HeadlineSource};
use crate::config::StrategyConfig;

/// Research text used when the news source has nothing for the topic
pub const NO_HEADLINES: &str = "No recent headlines found.";

const DEFAULT_MAX_HEADLINES: usize = 5;

/// Stage that fills `research_data` with recent headlines
pub struct Researcher {
    source: Arc<dyn HeadlineSource>,
    max_headlines: usize,
}

impl Researcher {
    /// Create a researcher reading from `source`
    pub fn new(source: Arc<dyn HeadlineSource>) -> Self {
        Self {
            source,
            max_headlines: DEFAULT_MAX_HEADLINES,
        }
    }

    /// Create a researcher backed by Google News
    pub fn from_config(config: &StrategyConfig) -> crate::Result<Self> {
        let client = GoogleNewsClient::new(config)?;
        Ok(Self::new(Arc::new(client)).with_max_headlines(config.max_headlines))
    }

    /// Cap the number of headlines kept
    pub fn with_max_headlines(mut self, max: usize) -> Self {
        self.max_headlines = max.max(1);
        self
    }

    /// Fetch headlines for `topic` and join them into research text
    #[instrument(skip(self))]
    pub async fn research(&self, topic: &str) -> crate::Result<String> {
        let headlines = self.source.headlines(topic).await?;
        let text = format_headlines(&headlines, self.max_headlines);
        if text == NO_HEADLINES {
            warn!("No headlines found for topic");
        } else {
            info!("Collected {} headlines", text.lines().count());
        }
        Ok(text)
    }
}

/// Join up to `max` non-blank headlines with newlines
pub fn format_headlines(headlines: &[String], max: usize) -> String {
    let kept: Vec<&str> = headlines
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .take(max)
        .collect();

    if kept.is_empty() {
        NO_HEADLINES.to_string()
    } else {
        kept.join("\n")
    }
}

#[async_trait]
impl Stage for Researcher {
    async fn run(&self, context: PipelineContext) -> Result<PipelineContext> {
        let research = self.research(context.topic()).await?;
        Ok(context.with_research_data(research)?)
    }

    fn name(&self) -> &str {
        "Researcher"
    }
}
