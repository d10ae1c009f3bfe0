//! Shared utilities for the market strategy pipeline
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and environment configuration helpers.

pub mod config;
pub mod logging;

pub use config::{ConfigError, env_parse, env_var, env_var_or, require_env};
pub use logging::{LogConfig, LogFormat, init_tracing, init_tracing_with};
