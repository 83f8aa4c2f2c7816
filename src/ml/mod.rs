//! Seams to the external generative-AI provider.
//!
//! Services depend on these traits rather than on a concrete HTTP client so
//! the ranking pipeline can be driven by fixtures in tests.

pub mod embedding_cache;

pub use embedding_cache::CachingEmbedder;

use crate::{error::Result, models::ChatTurn};
use async_trait::async_trait;

/// A single text-generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub contents: Vec<ChatTurn>,
    /// Ask the provider for a JSON document instead of prose.
    pub json_response: bool,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, contents: Vec<ChatTurn>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            contents,
            json_response: false,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn expect_json(mut self) -> Self {
        self.json_response = true;
        self
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;
}
