use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{GenerationBackend, LlmError, LlmResponse};

pub const MOCK_MODEL: &str = "mock-llm";

/// Deterministic backend for tests.
///
/// Replies are taken from the script queue first, then fall back to the fixed
/// answer. Every prompt is recorded.
#[derive(Debug)]
pub struct MockBackend {
    answer: String,
    script: Mutex<VecDeque<String>>,
    fail_marker: Option<String>,
    fail_all: bool,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("MOCK ANSWER")
    }
}

impl MockBackend {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            script: Mutex::new(VecDeque::new()),
            fail_marker: None,
            fail_all: false,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A backend whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Fails any call whose prompt contains `marker`.
    pub fn fail_when_prompt_contains(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }

    /// Queues replies returned (in order) before the fixed answer.
    pub fn with_script<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script
            .lock()
            .extend(replies.into_iter().map(Into::into));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        let marked = self
            .fail_marker
            .as_deref()
            .is_some_and(|marker| prompt.contains(marker));

        if self.fail_all || marked {
            return Err(LlmError::Provider {
                model: MOCK_MODEL.to_string(),
                message: "mock failure".to_string(),
            });
        }

        let text = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.answer.clone());

        Ok(LlmResponse::new(text, MOCK_MODEL))
    }

    fn model(&self) -> &str {
        MOCK_MODEL
    }
}
