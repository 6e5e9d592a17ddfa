//! Perplexity account settings.
//!
//! The API key lives in a [`SecretString`] and is only exposed when the HTTP
//! client is built.

use std::fmt;

use perplexity_client::{PerplexityClient, DEFAULT_BASE_URL, SONAR_PRO};
pub use secrecy::SecretString;
use secrecy::ExposeSecret;

use crate::error::{DiscoveryError, Result};

/// Key, model, and endpoint used to reach the answer engine.
#[derive(Clone)]
pub struct EngineCredentials {
    api_key: SecretString,
    pub model: String,
    pub base_url: String,
}

impl EngineCredentials {
    /// Credentials for the public endpoint and the `sonar-pro` model.
    ///
    /// # Errors
    ///
    /// `Config` when the key is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DiscoveryError::Config {
                message: "Perplexity API key is blank".to_string(),
            });
        }

        Ok(Self {
            api_key: SecretString::from(api_key.trim().to_string()),
            model: SONAR_PRO.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a proxy or a local stand-in for the API.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn uses_default_endpoint(&self) -> bool {
        self.base_url.trim_end_matches('/') == DEFAULT_BASE_URL
    }

    /// Build an HTTP client carrying the key.
    pub fn client(&self) -> PerplexityClient {
        PerplexityClient::new(self.api_key.expose_secret()).with_base_url(self.base_url.as_str())
    }
}

impl fmt::Debug for EngineCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineCredentials")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_target_public_sonar_pro() {
        let creds = EngineCredentials::new("pplx-secret").unwrap();
        assert_eq!(creds.model, "sonar-pro");
        assert!(creds.uses_default_endpoint());
        assert_eq!(creds.client().base_url(), "https://api.perplexity.ai");
    }

    #[test]
    fn test_blank_key_is_config_error() {
        let err = EngineCredentials::new("  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_key_not_in_debug() {
        let creds = EngineCredentials::new("pplx-secret")
            .unwrap()
            .with_model("sonar")
            .with_base_url("http://localhost:9000/");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("pplx-secret"));
        assert!(debug.contains("sonar"));
        assert!(!creds.uses_default_endpoint());
        assert_eq!(creds.client().base_url(), "http://localhost:9000");
    }
}
