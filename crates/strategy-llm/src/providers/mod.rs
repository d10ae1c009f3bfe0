//! Concrete LLM provider implementations
//!
//! This module contains implementations of the LLMProvider trait for
//! various LLM services.

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "gemini")]
pub use gemini::{DEFAULT_GEMINI_MODEL, GeminiConfig, GeminiProvider};

#[cfg(feature = "openai")]
pub use openai::{DEFAULT_OPENAI_MODEL, OpenAIConfig, OpenAIProvider};
