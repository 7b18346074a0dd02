//! Text generation backends.
//!
//! The pipeline only needs "prompt in, text out". [`GenaiBackend`] talks to a real
//! provider through `genai`; [`MockBackend`] is a scripted stand-in for tests.

pub mod error;
pub mod provider;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use error::LlmError;
pub use provider::GenaiBackend;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Token accounting reported by the provider, when available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Generated text plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

impl LlmResponse {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            usage: None,
        }
    }
}

#[async_trait]
/// Turns a rendered prompt into generated text.
pub trait GenerationBackend: Send + Sync {
    /// Generates a completion for `prompt`. Failures are never retried here.
    async fn generate(&self, prompt: &str) -> Result<LlmResponse, LlmError>;

    /// Model identifier used for responses and logs.
    fn model(&self) -> &str;
}
