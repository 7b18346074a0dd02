use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use super::Ranker;
use crate::document::{RetrievedDoc, sort_by_score_desc};
use crate::llm::GenerationBackend;

pub const DEFAULT_JUDGE_TIMEOUT_SECS: u64 = 30;

/// Rubric sent once per document.
pub fn judge_prompt(query: &str, text: &str) -> String {
    format!(
        "Rate relevance between query and document from 0 to 5. Return ONLY the number.\n\
         Query: {query}\n\
         Document: {text}\n"
    )
}

/// Highest rating the rubric asks for.
pub const MAX_JUDGE_SCORE: f32 = 5.0;

/// Parses the judge's reply.
///
/// Replies that are not a number inside `0..=5` are rejected, so the caller
/// scores them `0.0` like any other failed judgement. `-0` reads as `0.0`.
pub fn parse_judge_score(reply: &str) -> Option<f32> {
    reply
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|score| (0.0..=MAX_JUDGE_SCORE).contains(score))
        .map(|score| score + 0.0)
}

/// Uses a generation backend as a relevance judge.
///
/// Issues one call per document. With `concurrency > 1` calls overlap, but the
/// scores are still matched to documents by position before the stable sort.
pub struct JudgeRanker {
    backend: Arc<dyn GenerationBackend>,
    concurrency: usize,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for JudgeRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeRanker")
            .field("model", &self.backend.model())
            .field("concurrency", &self.concurrency)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl JudgeRanker {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            concurrency: 1,
            timeout: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    async fn score_one(&self, query: &str, doc: &RetrievedDoc) -> f32 {
        let prompt = judge_prompt(query, &doc.text);
        let call = self.backend.generate(&prompt);

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(doc_id = %doc.id, timeout_secs = limit.as_secs(), "Judge call timed out");
                    return 0.0;
                }
            },
            None => call.await,
        };

        match result {
            Ok(response) => parse_judge_score(&response.text).unwrap_or_else(|| {
                warn!(doc_id = %doc.id, reply = %response.text.trim(), "Unparsable judge score");
                0.0
            }),
            Err(e) => {
                warn!(doc_id = %doc.id, "Judge call failed: {}", e);
                0.0
            }
        }
    }
}

#[async_trait]
impl Ranker for JudgeRanker {
    async fn rerank(&self, query: &str, mut docs: Vec<RetrievedDoc>) -> Vec<RetrievedDoc> {
        debug!(
            num_candidates = docs.len(),
            concurrency = self.concurrency,
            "Judging candidates"
        );

        // Map over indices: a closure taking `&RetrievedDoc` breaks the Send bound.
        let scores: Vec<f32> =
            stream::iter((0..docs.len()).map(|i| self.score_one(query, &docs[i])))
                .buffered(self.concurrency)
                .collect()
                .await;

        for (doc, score) in docs.iter_mut().zip(scores) {
            doc.score = score;
        }

        sort_by_score_desc(&mut docs);

        debug!(
            top_score = docs.first().map(|d| d.score),
            "Judge rerank complete"
        );

        docs
    }

    fn name(&self) -> &'static str {
        "judge"
    }
}
