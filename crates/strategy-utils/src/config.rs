//! Environment configuration helpers
//!
//! Configuration is read from the environment exactly once, when the
//! application assembles its config structs. Nothing in the workspace
//! writes to the process environment.

use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set or is empty
    #[error("environment variable {0} is not set")]
    Missing(String),

    /// A variable is set but could not be parsed
    #[error("environment variable {name} has invalid value '{value}': {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

/// Read a non-empty environment variable
///
/// Whitespace-only values are treated as unset.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read an environment variable, falling back to `default`
pub fn env_var_or(name: &str, default: &str) -> String {
    env_var(name).unwrap_or_else(|| default.to_string())
}

/// Read and parse an environment variable, if present
pub fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_var(name)
        .map(|value| {
            value.parse::<T>().map_err(|e| ConfigError::Invalid {
                name: name.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Read a required environment variable
pub fn require_env(name: &str) -> Result<String, ConfigError> {
    env_var(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable() {
        let name = "STRATEGY_UTILS_TEST_SURELY_UNSET";
        assert_eq!(env_var(name), None);
        assert_eq!(env_var_or(name, "fallback"), "fallback");
        assert_eq!(
            require_env(name).unwrap_err(),
            ConfigError::Missing(name.to_string())
        );
        assert_eq!(env_parse::<u64>(name).unwrap(), None);
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::Invalid {
            name: "STRATEGY_MAX_TOKENS".to_string(),
            value: "lots".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "environment variable STRATEGY_MAX_TOKENS has invalid value 'lots': invalid digit found in string"
        );
    }
}
