//! Answer-engine abstraction.
//!
//! An answer engine takes a natural-language prompt, searches a restricted
//! set of web domains, and replies with free text that cites its sources.
//! Implementations make exactly one outbound request per call and never
//! retry; retry policy belongs to the caller.

use async_trait::async_trait;

use crate::error::Result;

/// Professional and startup-data domains searched during bulk discovery.
pub const DISCOVERY_DOMAINS: &[&str] = &[
    "linkedin.com",
    "crunchbase.com",
    "startupdaily.net",
    "startupaus.org",
];

/// Domains searched when researching a single founder.
pub const RESEARCH_DOMAINS: &[&str] = &["linkedin.com", "crunchbase.com", "github.com"];

pub const DISCOVERY_CITATION_LIMIT: u32 = 15;
pub const RESEARCH_CITATION_LIMIT: u32 = 10;

/// Which domains the engine may search and how many sources it may cite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePolicy {
    pub domains: Vec<String>,
    pub citation_limit: u32,
}

impl SourcePolicy {
    /// Create a policy; duplicate domains are dropped, first occurrence wins.
    pub fn new(domains: impl IntoIterator<Item = impl Into<String>>, citation_limit: u32) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for domain in domains.into_iter().map(Into::into) {
            if !unique.contains(&domain) {
                unique.push(domain);
            }
        }
        Self {
            domains: unique,
            citation_limit,
        }
    }

    /// Curated allowlist for bulk discovery.
    pub fn discovery() -> Self {
        Self::new(DISCOVERY_DOMAINS.iter().copied(), DISCOVERY_CITATION_LIMIT)
    }

    /// Allowlist for single-founder research.
    pub fn research() -> Self {
        Self::new(RESEARCH_DOMAINS.iter().copied(), RESEARCH_CITATION_LIMIT)
    }
}

/// The engine's reply: message content plus the sources it cited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineResponse {
    pub content: String,
    pub citations: Vec<String>,
}

impl EngineResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citations(mut self, citations: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.citations = citations.into_iter().map(Into::into).collect();
        self
    }
}

/// Natural-language answer engine.
///
/// # Errors
///
/// - `Transport` when the engine cannot be reached or answers non-2xx
/// - `UpstreamFormat` when the reply has no message content
#[async_trait]
pub trait AnswerEngine: Send + Sync {
    async fn query(&self, prompt: &str, policy: &SourcePolicy) -> Result<EngineResponse>;
}
