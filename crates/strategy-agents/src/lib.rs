//! Market-entry strategy pipeline
//!
//! This crate implements the four stages that turn a topic into a PDF
//! strategy report:
//!
//! - [`Researcher`]: scrapes recent headlines from a news search page
//! - [`DataSynthesizer`]: builds a three-month price table and charts it
//! - [`Strategist`]: asks a language model for a step-by-step entry plan
//! - [`Presenter`]: renders the plan and chart into a PDF
//!
//! Stages communicate only through the [`PipelineContext`] they hand to
//! each other; [`build_pipeline`] wires them up in order.
//!
//! # Example
//!
//! ```rust,no_run
//! use strategy_agents::{StrategyConfig, build_pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StrategyConfig::from_env()?;
//!     let pipeline = build_pipeline(&config)?;
//!
//!     let run = pipeline.run("Renewable energy India").await?;
//!     println!("Report written to {:?}", run.output_path());
//!     Ok(())
//! }
//! ```
//!
//! [`PipelineContext`]: strategy_core::PipelineContext

pub mod agents;
pub mod api;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod llm;
mod metrics;
pub mod pipeline;
pub mod prompts;
pub mod report;

pub use agents::{DataSynthesizer, NO_HEADLINES, Presenter, Researcher, Strategist};
pub use api::{GoogleNewsClient, HeadlineSource};
pub use config::{LlmBackend, MarketDataMode, StrategyConfig, StrategyConfigBuilder};
pub use data::MarketTable;
pub use error::{AgentError, Result};
pub use llm::ConfiguredProvider;
pub use pipeline::{PIPELINE_NAME, build_pipeline, build_pipeline_with};
