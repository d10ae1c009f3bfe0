//! Data synthesizer stage: builds the market table and its chart

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use strategy_core::{PipelineContext, Result, Stage};
use tracing::{info, instrument};

use crate::chart::{chart_title, render_chart};
use crate::config::{MarketDataMode, StrategyConfig};
use crate::data::MarketTable;

/// Stage that fills `data_analysis` and writes the chart image
pub struct DataSynthesizer {
    mode: MarketDataMode,
    chart_path: PathBuf,
    chart_font: Option<PathBuf>,
}

impl DataSynthesizer {
    /// Create a synthesizer writing its chart to `chart_path`
    pub fn new(mode: MarketDataMode, chart_path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            chart_path: chart_path.into(),
            chart_font: None,
        }
    }

    /// Create a synthesizer from the data and output settings of `config`
    pub fn from_config(config: &StrategyConfig) -> Self {
        let synthesizer = Self::new(config.data_mode, config.chart_path());
        match &config.chart_font {
            Some(font) => synthesizer.with_chart_font(font),
            None => synthesizer,
        }
    }

    /// Use a specific TrueType font for chart text
    pub fn with_chart_font(mut self, font: impl Into<PathBuf>) -> Self {
        self.chart_font = Some(font.into());
        self
    }

    /// Where the chart is written
    pub fn chart_path(&self) -> &Path {
        &self.chart_path
    }

    /// Generate the table and render its chart
    #[instrument(skip(self), fields(chart = %self.chart_path.display()))]
    pub fn synthesize(&self, topic: &str) -> crate::Result<MarketTable> {
        let table = MarketTable::generate(self.mode);

        if let Some(dir) = self.chart_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        render_chart(
            &table,
            &chart_title(topic),
            &self.chart_path,
            self.chart_font.as_deref(),
        )?;

        info!(prices = ?table.prices(), "Market table generated and charted");
        Ok(table)
    }
}

#[async_trait]
impl Stage for DataSynthesizer {
    async fn run(&self, context: PipelineContext) -> Result<PipelineContext> {
        let table = self.synthesize(context.topic())?;
        let summary = table.summary(context.topic());
        Ok(context.with_data_analysis(summary)?)
    }

    fn name(&self) -> &str {
        "DataSynthesizer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_chart_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let stage = DataSynthesizer::new(MarketDataMode::Fixed, dir.path().join("chart.png"));

        let context = PipelineContext::new("Renewable energy India")
            .unwrap()
            .with_research_data("No recent headlines found.")
            .unwrap();
        let context = stage.run(context).await.unwrap();

        let analysis = context.data_analysis().unwrap();
        assert!(analysis.starts_with("Energy pricing data for Renewable energy India:"));
        assert_eq!(analysis.lines().count(), 5);

        let chart = std::fs::metadata(stage.chart_path()).unwrap();
        assert!(chart.len() > 0);
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/chart.png");
        let stage = DataSynthesizer::new(MarketDataMode::Fixed, &path);

        let table = stage.synthesize("solar").unwrap();

        assert_eq!(table.rows().len(), 3);
        assert!(path.is_file());
    }

    #[test]
    fn test_from_config_uses_output_dir() {
        let config = StrategyConfig::builder()
            .output_dir("/tmp/strategy")
            .chart_file("trend.png")
            .build()
            .unwrap();
        let stage = DataSynthesizer::from_config(&config);
        assert_eq!(stage.chart_path(), Path::new("/tmp/strategy/trend.png"));
    }
}
