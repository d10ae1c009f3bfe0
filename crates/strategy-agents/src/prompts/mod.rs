//! Prompt templates
//!
//! Templates use MiniJinja syntax and are rendered with a fresh
//! environment per call.

mod strategist;

pub use strategist::{STRATEGIST_TEMPLATE, StrategyPrompt};
