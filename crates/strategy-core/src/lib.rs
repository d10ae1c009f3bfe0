//! Core abstractions for the market strategy pipeline
//!
//! This crate defines the fundamental types shared by every stage: the
//! [`Stage`] trait, the accumulating [`PipelineContext`] record, and the
//! error types.

pub mod context;
pub mod error;
pub mod stage;

pub use context::{ContextError, ContextField, PipelineContext};
pub use error::{Error, Result};
pub use stage::Stage;
