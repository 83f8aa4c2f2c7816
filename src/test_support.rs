//! In-process fakes for the provider traits.

use crate::{
    error::{ApiError, Result},
    ml::{Embedder, GenerationRequest, TextGenerator},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{collections::HashMap, time::Duration};

/// Replies with queued texts in order, then repeats the last one. Records every request.
pub struct FakeGenerator {
    replies: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
    fail: bool,
}

impl FakeGenerator {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        self.requests.lock().push(request);
        if self.fail {
            return Err(ApiError::UpstreamService("generator unavailable".into()));
        }
        let mut replies = self.replies.lock();
        let reply = if replies.len() > 1 {
            replies.pop()
        } else {
            replies.last().cloned()
        };
        reply.ok_or_else(|| ApiError::UpstreamService("no reply queued".into()))
    }
}

/// Maps known texts to fixed vectors; unknown text gets `fallback`.
pub struct FakeEmbedder {
    vectors: HashMap<String, Vec<f64>>,
    fallback: Option<Vec<f64>>,
    delay: Option<Duration>,
}

impl FakeEmbedder {
    pub fn constant(vector: Vec<f64>) -> Self {
        Self {
            vectors: HashMap::new(),
            fallback: Some(vector),
            delay: None,
        }
    }

    pub fn mapping(pairs: &[(&str, Vec<f64>)]) -> Self {
        Self {
            vectors: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            fallback: None,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.vectors
            .get(text)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| ApiError::UpstreamService(format!("no embedding for '{}'", text)))
    }
}
