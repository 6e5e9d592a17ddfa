//! Perplexity API request and response types.

use serde::{Deserialize, Serialize};

/// Default online model.
pub const SONAR_PRO: &str = "sonar-pro";

// =============================================================================
// Chat Completion
// =============================================================================

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use (e.g., "sonar", "sonar-pro")
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Restrict web search to these domains
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_domain_filter: Vec<String>,

    /// Upper bound on the number of cited sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_citations: Option<u32>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            model: SONAR_PRO.to_string(),
            messages: Vec::new(),
            search_domain_filter: Vec::new(),
            max_citations: None,
            temperature: None,
        }
    }
}

impl ChatRequest {
    /// Create a new chat request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Restrict search to the given domains.
    pub fn search_domains(mut self, domains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.search_domain_filter = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Cap the number of citations.
    pub fn max_citations(mut self, max_citations: u32) -> Self {
        self.max_citations = Some(max_citations);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Content of the first choice
    pub content: String,

    /// URLs the answer cites, in citation order
    pub citations: Vec<String>,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

/// Raw chat response from API (for internal parsing).
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseRaw {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub citations: Vec<String>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessageResponse {
    pub content: String,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total tokens used
    #[serde(default)]
    pub total_tokens: u32,
}
