//! Perplexity-backed answer engine.

use async_trait::async_trait;
use perplexity_client::{ChatRequest, Message, PerplexityClient};
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::security::EngineCredentials;
use crate::traits::engine::{AnswerEngine, EngineResponse, SourcePolicy};

/// Sends prompts to Perplexity's chat completions endpoint.
#[derive(Debug, Clone)]
pub struct PerplexityEngine {
    client: PerplexityClient,
    model: String,
}

impl PerplexityEngine {
    pub fn new(credentials: &EngineCredentials) -> Self {
        Self {
            client: credentials.client(),
            model: credentials.model.clone(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.engine)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnswerEngine for PerplexityEngine {
    async fn query(&self, prompt: &str, policy: &SourcePolicy) -> Result<EngineResponse> {
        let request = ChatRequest::new(self.model.as_str())
            .message(Message::user(prompt))
            .search_domains(policy.domains.iter().cloned())
            .max_citations(policy.citation_limit);

        let response = self.client.chat_completion(request).await?;

        debug!(
            model = %self.model,
            content_len = response.content.len(),
            citations = response.citations.len(),
            "Answer engine replied"
        );

        Ok(EngineResponse {
            content: response.content,
            citations: response.citations,
        })
    }
}
