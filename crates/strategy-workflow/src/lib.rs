//! Pipeline driver for the market strategy pipeline
//!
//! The driver runs an ordered list of stages against one
//! [`PipelineContext`](strategy_core::PipelineContext). Each stage receives
//! the context produced by the previous one; the first failure aborts the
//! run.

pub mod error;
pub mod pipeline;

// Re-export for convenience
pub use error::{Result, WorkflowError};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineRun, StageEvent, StageReport};
