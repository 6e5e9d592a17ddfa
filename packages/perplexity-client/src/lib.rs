//! Pure Perplexity REST API client
//!
//! A minimal client for Perplexity's chat completions endpoint with no
//! domain-specific logic. Supports the search options that make the online
//! models useful as an answer engine: a domain allowlist and a citation cap.
//!
//! # Example
//!
//! ```rust,ignore
//! use perplexity_client::{ChatRequest, Message, PerplexityClient, SONAR_PRO};
//!
//! let client = PerplexityClient::from_env()?;
//!
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new(SONAR_PRO)
//!             .message(Message::user("Who founded Atlassian?"))
//!             .search_domains(["crunchbase.com"])
//!             .max_citations(5),
//!     )
//!     .await?;
//!
//! println!("{}", response.content);
//! for url in &response.citations {
//!     println!("  source: {url}");
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{PerplexityError, Result};
pub use types::*;

use reqwest::Client;
use std::fmt;
use tracing::{debug, warn};

/// Public Perplexity API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";

/// Pure Perplexity API client.
#[derive(Clone)]
pub struct PerplexityClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl PerplexityClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `PERPLEXITY_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PERPLEXITY_API_KEY")
            .map_err(|_| PerplexityError::Config("PERPLEXITY_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Sends exactly one request. Failures reaching the API or non-2xx
    /// statuses are `Network`/`Api`; a body without
    /// `choices[0].message.content` is `Parse`.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Perplexity request failed");
                PerplexityError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Perplexity API error");
            return Err(PerplexityError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PerplexityError::Network(e.to_string()))?;

        let raw: types::ChatResponseRaw = serde_json::from_str(&body)
            .map_err(|e| PerplexityError::Parse(format!("unexpected response envelope: {}", e)))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PerplexityError::Parse("response has no choices".into()))?;

        debug!(
            model = %request.model,
            citations = raw.citations.len(),
            duration_ms = start.elapsed().as_millis(),
            "Perplexity chat completion"
        );

        Ok(ChatResponse {
            content,
            citations: raw.citations,
            usage: raw.usage,
        })
    }
}

impl fmt::Debug for PerplexityClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerplexityClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}
