use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::security::{EngineCredentials, SecretString};

const DEFAULT_REGION: &str = "Australian";
const DEFAULT_COUNTRY: &str = "Australia";

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineCredentials,
    /// Only needed when the Postgres store is used
    pub database_url: Option<SecretString>,
    /// Adjective describing the founder population ("Australian")
    pub region: String,
    /// Country named in research prompts ("Australia")
    pub country: String,
    /// Default per-invocation timeout for network stages
    pub timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = var("PERPLEXITY_API_KEY").context("PERPLEXITY_API_KEY must be set")?;
        let mut engine =
            EngineCredentials::new(api_key).context("PERPLEXITY_API_KEY must not be blank")?;

        if let Some(model) = var("PERPLEXITY_MODEL") {
            engine = engine.with_model(model);
        }
        if let Some(base_url) = var("PERPLEXITY_BASE_URL") {
            engine = engine.with_base_url(base_url);
        }

        let timeout = var("DISCOVERY_TIMEOUT_SECS")
            .map(|secs| {
                secs.parse::<u64>()
                    .context("DISCOVERY_TIMEOUT_SECS must be a whole number of seconds")
            })
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            engine,
            database_url: var("DATABASE_URL").map(SecretString::from),
            region: var("DISCOVERY_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            country: var("DISCOVERY_COUNTRY").unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            timeout,
        })
    }
}
