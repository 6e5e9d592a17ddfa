//! Testing utilities including mock implementations.
//!
//! Useful for exercising the discovery service without calling a real
//! answer engine. Pair with [`crate::stores::MemoryRecordStore`] for the
//! store side.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::error::{DiscoveryError, Result};
use crate::traits::engine::{AnswerEngine, EngineResponse, SourcePolicy};

type ErrorFactory = Arc<dyn Fn() -> DiscoveryError + Send + Sync>;

#[derive(Clone)]
enum MockReply {
    Response(EngineResponse),
    Error(ErrorFactory),
}

impl MockReply {
    fn produce(&self) -> Result<EngineResponse> {
        match self {
            MockReply::Response(response) => Ok(response.clone()),
            MockReply::Error(make) => Err(make()),
        }
    }
}

/// Record of a call made to the mock engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockEngineCall {
    pub prompt: String,
    pub policy: SourcePolicy,
}

/// A scripted answer engine.
///
/// Queued replies are handed out in order; once the queue is empty every
/// call gets the fallback reply. With neither, calls fail with
/// `UpstreamFormat`.
#[derive(Clone, Default)]
pub struct MockAnswerEngine {
    queue: Arc<Mutex<VecDeque<MockReply>>>,
    fallback: Arc<RwLock<Option<MockReply>>>,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<MockEngineCall>>>,
}

impl MockAnswerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to every call with `content`.
    pub fn replying(content: impl Into<String>) -> Self {
        Self::new().with_fallback(EngineResponse::new(content))
    }

    /// Fail every call with the error `make` builds.
    pub fn failing(make: impl Fn() -> DiscoveryError + Send + Sync + 'static) -> Self {
        let engine = Self::new();
        *engine.fallback.write().unwrap() = Some(MockReply::Error(Arc::new(make)));
        engine
    }

    /// Queue one reply.
    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.with_response(EngineResponse::new(content))
    }

    /// Queue one full response.
    pub fn with_response(self, response: EngineResponse) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(MockReply::Response(response));
        self
    }

    /// Queue one failure.
    pub fn with_error(self, make: impl Fn() -> DiscoveryError + Send + Sync + 'static) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(MockReply::Error(Arc::new(make)));
        self
    }

    /// Reply used once the queue is drained.
    pub fn with_fallback(self, response: EngineResponse) -> Self {
        *self.fallback.write().unwrap() = Some(MockReply::Response(response));
        self
    }

    /// Wait this long before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all calls made to this engine.
    pub fn calls(&self) -> Vec<MockEngineCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn next_reply(&self) -> Option<MockReply> {
        let queued = self.queue.lock().unwrap().pop_front();
        queued.or_else(|| self.fallback.read().unwrap().clone())
    }
}

#[async_trait]
impl AnswerEngine for MockAnswerEngine {
    async fn query(&self, prompt: &str, policy: &SourcePolicy) -> Result<EngineResponse> {
        self.calls.write().unwrap().push(MockEngineCall {
            prompt: prompt.to_string(),
            policy: policy.clone(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply() {
            Some(reply) => reply.produce(),
            None => Err(DiscoveryError::upstream_format("no mock reply configured")),
        }
    }
}
