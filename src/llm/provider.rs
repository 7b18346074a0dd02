use std::time::Duration;

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatRequest, ChatResponse};
use tracing::{debug, error};

use super::{GenerationBackend, LlmError, LlmResponse, TokenUsage};

/// Generation through `genai`, which picks the provider from the model name
/// and reads the provider API key from its usual environment variable.
#[derive(Clone)]
pub struct GenaiBackend {
    client: Client,
    model: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GenaiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiBackend")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GenaiBackend {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
            timeout: None,
        }
    }

    /// Uses an existing client (shared connection pool).
    pub fn with_client(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn exec(&self, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let call = self.client.exec_chat(&self.model, request, None);

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| LlmError::Timeout {
                    seconds: limit.as_secs(),
                })?,
            None => call.await,
        };

        result.map_err(|e| {
            error!(model = %self.model, "Provider error: {}", e);
            LlmError::Provider {
                model: self.model.clone(),
                message: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl GenerationBackend for GenaiBackend {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse, LlmError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Calling provider");

        let response = self.exec(prompt).await?;

        let text = response.first_text().unwrap_or_default().to_string();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                model: self.model.clone(),
            });
        }

        let usage = &response.usage;
        let usage = TokenUsage {
            prompt_tokens: usage.prompt_tokens.and_then(|v| u32::try_from(v).ok()),
            completion_tokens: usage.completion_tokens.and_then(|v| u32::try_from(v).ok()),
            total_tokens: usage.total_tokens.and_then(|v| u32::try_from(v).ok()),
        };

        Ok(LlmResponse {
            text,
            model: self.model.clone(),
            usage: Some(usage),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
