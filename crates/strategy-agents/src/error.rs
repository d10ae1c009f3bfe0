//! Error types for the pipeline stages

use std::path::PathBuf;
use strategy_core::ContextError;
use strategy_llm::LLMError;
use thiserror::Error;

/// Errors raised by the four stages and their helpers
#[derive(Debug, Error)]
pub enum AgentError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The news source answered with a non-success status
    #[error("News source returned {status} for {url}")]
    NewsSource { status: u16, url: String },

    /// The headline selector is not valid CSS
    #[error("Invalid headline selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A configured URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Chart rendering failed
    #[error("Chart error: {0}")]
    ChartError(String),

    /// The chart the report embeds does not exist
    #[error("Chart image not found at {}", .0.display())]
    ChartMissing(PathBuf),

    /// PDF rendering failed
    #[error("PDF error: {0}")]
    PdfError(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Language-model call failed
    #[error(transparent)]
    Llm(#[from] LLMError),

    /// The model returned no text
    #[error("Language model returned an empty strategy")]
    EmptyCompletion,

    /// Prompt template failed to render
    #[error("Prompt error: {0}")]
    PromptError(#[from] minijinja::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Context ordering violation
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Pipeline assembly or execution error
    #[error(transparent)]
    Workflow(#[from] strategy_workflow::WorkflowError),
}

/// Result type alias for stage operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Convert AgentError to strategy_core::Error
impl From<AgentError> for strategy_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Context(e) => strategy_core::Error::Context(e),
            other => strategy_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

impl From<strategy_utils::ConfigError> for AgentError {
    fn from(err: strategy_utils::ConfigError) -> Self {
        AgentError::ConfigError(err.to_string())
    }
}
