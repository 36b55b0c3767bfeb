//! Error types for lyra-ai

use thiserror::Error;

/// Result type alias using lyra-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the upstream text-generation service
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing API key
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    /// Server-sent events error
    #[error("SSE error: {0}")]
    Sse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
