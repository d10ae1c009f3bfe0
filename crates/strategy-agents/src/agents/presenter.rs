//! Presenter stage: writes the PDF report

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use strategy_core::{PipelineContext, Result, Stage};
use tracing::{info, instrument};

use crate::config::{StrategyConfig, is_file};
use crate::error::AgentError;
use crate::report::{REPORT_TITLE, ReportContent, render_report, write_atomically};

/// Stage that renders the strategy and chart to a PDF and fills
/// `final_output` with its path
pub struct Presenter {
    chart_path: PathBuf,
    report_path: PathBuf,
}

impl Presenter {
    /// Create a presenter embedding `chart_path` into `report_path`
    pub fn new(chart_path: impl Into<PathBuf>, report_path: impl Into<PathBuf>) -> Self {
        Self {
            chart_path: chart_path.into(),
            report_path: report_path.into(),
        }
    }

    /// Create a presenter from the output settings of `config`
    pub fn from_config(config: &StrategyConfig) -> Self {
        Self::new(config.chart_path(), config.report_path())
    }

    /// Where the report is written
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Render the report and move it into place
    #[instrument(skip(self, strategy), fields(report = %self.report_path.display()))]
    pub fn present(&self, strategy: &str) -> crate::Result<PathBuf> {
        if !is_file(&self.chart_path) {
            return Err(AgentError::ChartMissing(self.chart_path.clone()));
        }

        let bytes = render_report(&ReportContent {
            title: REPORT_TITLE,
            body: strategy,
            chart: &self.chart_path,
            generated_on: chrono::Local::now().date_naive(),
        })?;

        if let Some(dir) = self.report_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        write_atomically(&self.report_path, &bytes)?;

        info!(bytes = bytes.len(), "Report written");
        Ok(self.report_path.clone())
    }
}

#[async_trait]
impl Stage for Presenter {
    async fn run(&self, context: PipelineContext) -> Result<PipelineContext> {
        let path = self.present(context.strategy()?)?;
        Ok(context.with_final_output(path.display().to_string())?)
    }

    fn name(&self) -> &str {
        "Presenter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::render_chart;
    use crate::config::MarketDataMode;
    use crate::data::MarketTable;

    fn strategy_context() -> PipelineContext {
        PipelineContext::new("solar")
            .unwrap()
            .with_research_data("No recent headlines found.")
            .unwrap()
            .with_data_analysis("Energy pricing data for solar:")
            .unwrap()
            .with_strategy("STEP 1: Start with rooftop installers")
            .unwrap()
    }

    #[tokio::test]
    async fn test_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let chart = dir.path().join("chart.png");
        render_chart(&MarketTable::generate(MarketDataMode::Fixed), "solar", &chart, None).unwrap();
        let stage = Presenter::new(&chart, dir.path().join("strategy_report.pdf"));

        let context = stage.run(strategy_context()).await.unwrap();

        let path = PathBuf::from(context.final_output().unwrap());
        assert_eq!(path, stage.report_path());
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_missing_chart_keeps_old_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("strategy_report.pdf");
        std::fs::write(&report, b"previous run").unwrap();
        let stage = Presenter::new(dir.path().join("chart.png"), &report);

        let err = stage.run(strategy_context()).await.unwrap_err();

        assert!(err.to_string().contains("Chart image not found"));
        assert_eq!(std::fs::read(&report).unwrap(), b"previous run");
    }
}
