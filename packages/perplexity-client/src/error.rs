//! Error types for the Perplexity client.

use thiserror::Error;

/// Result type for Perplexity client operations.
pub type Result<T> = std::result::Result<T, PerplexityError>;

/// Perplexity client errors.
#[derive(Debug, Error)]
pub enum PerplexityError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection refused, body could not be read)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body is not the expected chat completion envelope
    #[error("Parse error: {0}")]
    Parse(String),
}

impl PerplexityError {
    /// True for failures talking to the API, as opposed to a reply we could not read.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Api { .. })
    }
}
