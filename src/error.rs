//! Error types for configuration loading.
//!
//! The logging adapter itself never fails: every input to [`crate::TracingLogger`]
//! degrades to a documented default. Only turning user-facing configuration
//! (CLI flags, environment variables, JSON documents) into options can go wrong.

use thiserror::Error;

/// Errors produced while parsing a [`crate::config::QueryLogConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A duration string such as `"250ms"` could not be parsed.
    #[error("invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },

    /// A log level name was not one of `silent`, `error`, `warn` or `info`.
    #[error("invalid log level '{0}' (expected silent, error, warn or info)")]
    InvalidLogLevel(String),

    /// The JSON configuration document was malformed.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid_duration(input: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidDuration {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
