//! Error types for pipeline execution

use strategy_core::ContextError;
use thiserror::Error;

/// Result type for pipeline execution
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Errors that abort a pipeline run
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The initial context could not be created (e.g. empty topic)
    #[error("invalid pipeline input: {0}")]
    InvalidInput(#[from] ContextError),

    /// A stage returned an error; later stages did not run
    #[error("stage '{stage}' failed: {source}")]
    StageFailed {
        /// Name of the failing stage
        stage: String,
        /// The stage's error
        #[source]
        source: strategy_core::Error,
    },

    /// The pipeline was built without any stage
    #[error("pipeline '{0}' has no stages")]
    NoStages(String),
}

impl WorkflowError {
    /// Name of the stage that failed, if the failure came from a stage
    pub fn failed_stage(&self) -> Option<&str> {
        match self {
            Self::StageFailed { stage, .. } => Some(stage),
            _ => None,
        }
    }
}
