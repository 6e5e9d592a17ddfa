//! Typed errors for founder discovery.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can
//! classify a failure and decide on retries and user messaging themselves.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during a discovery or enrichment invocation.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Network or HTTP failure talking to the answer engine or the store
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Answer engine replied with an envelope we could not read
    #[error("upstream format error: {message}")]
    UpstreamFormat { message: String },

    /// No usable record list in the engine's reply
    #[error("extraction failed: {reason}")]
    Extraction { reason: ExtractionFailure },

    /// A precondition was violated before any I/O happened
    #[error("validation failed: {reason}")]
    Validation { reason: ValidationFailure },

    /// Store-side failure that is not a transport problem
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Caller cancelled the invocation
    #[error("operation cancelled")]
    Cancelled,

    /// Caller-supplied timeout elapsed
    #[error("timed out after {after:?}")]
    Timeout { after: Duration },

    /// Configuration error
    #[error("config error: {message}")]
    Config { message: String },
}

/// Coarse classification of a [`DiscoveryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    UpstreamFormat,
    Extraction,
    Validation,
    Storage,
    Cancelled,
    Timeout,
    Config,
}

impl DiscoveryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::UpstreamFormat { .. } => ErrorKind::UpstreamFormat,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn upstream_format(message: impl Into<String>) -> Self {
        Self::UpstreamFormat {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into().into())
    }

    /// Stable reason code for extraction and validation failures.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Extraction { reason } => Some(reason.code()),
            Self::Validation { reason } => Some(reason.code()),
            _ => None,
        }
    }
}

/// Why list extraction produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// No `[ {` opener anywhere in the text
    NoArrayFound,
    /// An array was located but is not valid JSON
    InvalidJson { detail: String },
}

impl ExtractionFailure {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoArrayFound => "no-array-found",
            Self::InvalidJson { .. } => "invalid-json",
        }
    }
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoArrayFound => f.write_str(self.code()),
            Self::InvalidJson { detail } => write!(f, "{} ({})", self.code(), detail),
        }
    }
}

impl From<ExtractionFailure> for DiscoveryError {
    fn from(reason: ExtractionFailure) -> Self {
        Self::Extraction { reason }
    }
}

/// Which precondition was violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Enrichment subject lacks a first or last name
    NameRequired,
    /// Tag confidence outside `[0, 1]`
    ConfidenceOutOfRange,
    /// Tag name is blank
    EmptyTagName,
    /// A stored row does not satisfy the record invariants
    InvalidRecord { detail: String },
}

impl ValidationFailure {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NameRequired => "name-required",
            Self::ConfidenceOutOfRange => "confidence-out-of-range",
            Self::EmptyTagName => "empty-tag-name",
            Self::InvalidRecord { .. } => "invalid-record",
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRecord { detail } => write!(f, "{} ({})", self.code(), detail),
            _ => f.write_str(self.code()),
        }
    }
}

impl From<ValidationFailure> for DiscoveryError {
    fn from(reason: ValidationFailure) -> Self {
        Self::Validation { reason }
    }
}

impl From<perplexity_client::PerplexityError> for DiscoveryError {
    fn from(err: perplexity_client::PerplexityError) -> Self {
        use perplexity_client::PerplexityError;

        match err {
            PerplexityError::Network(message) => Self::Transport { message },
            PerplexityError::Api { status, message } => Self::Transport {
                message: format!("HTTP {}: {}", status, message),
            },
            PerplexityError::Parse(message) => Self::UpstreamFormat { message },
            PerplexityError::Config(message) => Self::Config { message },
        }
    }
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use perplexity_client::PerplexityError;

    #[test]
    fn test_reason_codes() {
        let err: DiscoveryError = ExtractionFailure::NoArrayFound.into();
        assert_eq!(err.reason(), Some("no-array-found"));
        assert_eq!(err.kind(), ErrorKind::Extraction);

        let err: DiscoveryError = ValidationFailure::NameRequired.into();
        assert_eq!(err.reason(), Some("name-required"));
        assert_eq!(err.to_string(), "validation failed: name-required");

        assert_eq!(DiscoveryError::Cancelled.reason(), None);
    }

    #[test]
    fn test_invalid_json_display_keeps_detail() {
        let reason = ExtractionFailure::InvalidJson {
            detail: "EOF while parsing".into(),
        };
        assert_eq!(reason.code(), "invalid-json");
        assert_eq!(reason.to_string(), "invalid-json (EOF while parsing)");
    }

    #[test]
    fn test_perplexity_errors_are_classified() {
        let err: DiscoveryError = PerplexityError::Api {
            status: 503,
            message: "unavailable".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err: DiscoveryError = PerplexityError::Network("connection reset".into()).into();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err: DiscoveryError = PerplexityError::Parse("no choices".into()).into();
        assert_eq!(err.kind(), ErrorKind::UpstreamFormat);
    }
}
