// SPDX-License-Identifier: MIT

//! Typed error handling for content-studio
//!
//! Every fallible path in the runtime and the studio returns [`StudioError`].
//! Request handlers stringify it once, at the edge.

use crate::adk::state::StateKey;
use thiserror::Error;

/// Top-level error type for content-studio
#[derive(Debug, Error)]
pub enum StudioError {
    /// API errors from external services (Gemini)
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Tool not found during execution
    #[error("Tool '{name}' not found")]
    ToolNotFound { name: String },

    /// The model called a tool with arguments that do not match its schema
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidToolArgs { tool: String, message: String },

    /// A step read a session key that nothing has written yet
    #[error("Session state '{key}' is not set")]
    MissingState { key: StateKey },

    /// Session lookup failed
    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline composition errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Model/LLM errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Max iterations/turns reached
    #[error("Max {kind} reached: {limit}")]
    MaxIterations { kind: String, limit: u32 },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// A spawned branch panicked or was cancelled
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    /// Generic error wrapper for compatibility
    #[error("{0}")]
    Other(String),
}

/// Errors found while wiring or running a composed pipeline
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    /// An agent reads a key that no earlier step writes
    #[error("agent '{agent}' reads '{key}' before any step writes it")]
    UnsatisfiedRead { agent: String, key: StateKey },

    /// Two parallel branches write the same key
    #[error("parallel branches '{first}' and '{second}' both write '{key}'")]
    ConflictingWrite {
        key: StateKey,
        first: String,
        second: String,
    },
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// The provider refused to answer
    #[error("Response blocked: {0}")]
    Blocked(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

impl StudioError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a tool not found error
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    /// Create an invalid tool arguments error
    pub fn invalid_args(tool: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidToolArgs {
            tool: tool.into(),
            message: message.to_string(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<&str> for StudioError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for StudioError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}
