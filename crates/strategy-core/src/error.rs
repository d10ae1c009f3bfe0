//! Error types for strategy-core

use crate::context::ContextError;
use thiserror::Error;

/// Result type alias for strategy-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for stage operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Stage initialization failed
    #[error("Stage initialization failed: {0}")]
    InitializationFailed(String),

    /// Stage processing failed
    #[error("Stage processing failed: {0}")]
    ProcessingFailed(String),

    /// Context was read before being written, or written twice
    #[error(transparent)]
    Context(#[from] ContextError),
}
