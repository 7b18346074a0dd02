//! Candidate reranking.
//!
//! A [`Ranker`] overwrites every candidate's `score` and returns the same
//! documents sorted by that score, highest first. Equal scores keep their input
//! order. Two strategies are provided:
//!
//! - [`LexicalRanker`]: query-token coverage, local and cheap, scores in `[0, 1]`.
//! - [`JudgeRanker`]: one generation call per document asking for a `0..=5` rating.
//!
//! Rankers never fail. A document that cannot be scored gets `0.0`.

pub mod judge;
pub mod lexical;

#[cfg(test)]
mod tests;

pub use judge::{DEFAULT_JUDGE_TIMEOUT_SECS, JudgeRanker, judge_prompt, parse_judge_score};
pub use lexical::{LexicalRanker, tokenize};

use std::sync::Arc;

use async_trait::async_trait;

use crate::document::RetrievedDoc;
use crate::llm::GenerationBackend;

#[async_trait]
/// Rescoring strategy applied between retrieval and answering.
pub trait Ranker: Send + Sync {
    /// Rescores `docs` for `query` and returns them sorted by score, descending.
    async fn rerank(&self, query: &str, docs: Vec<RetrievedDoc>) -> Vec<RetrievedDoc>;

    /// Short strategy name for logs and response metadata.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Ranker selection, usually read from configuration.
pub enum RankerKind {
    /// No reranking; retrieval order and scores are used as-is.
    None,
    #[default]
    /// [`LexicalRanker`].
    Lexical,
    /// [`JudgeRanker`].
    Judge,
}

impl std::str::FromStr for RankerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "lexical" | "local" => Ok(Self::Lexical),
            "judge" | "llm" => Ok(Self::Judge),
            _ => Err(format!("Unknown ranker: {}", s)),
        }
    }
}

impl std::fmt::Display for RankerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RankerKind::None => "none",
            RankerKind::Lexical => "lexical",
            RankerKind::Judge => "judge",
        };
        f.write_str(name)
    }
}

/// Settings for [`build_ranker`] that only the judge strategy uses.
#[derive(Debug, Clone, Copy)]
pub struct JudgeSettings {
    pub concurrency: usize,
    pub timeout_secs: u64,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            timeout_secs: DEFAULT_JUDGE_TIMEOUT_SECS,
        }
    }
}

/// Instantiates the configured strategy. `judge_backend` is only used for
/// [`RankerKind::Judge`].
pub fn build_ranker(
    kind: RankerKind,
    judge_backend: Arc<dyn GenerationBackend>,
    settings: JudgeSettings,
) -> Option<Arc<dyn Ranker>> {
    match kind {
        RankerKind::None => None,
        RankerKind::Lexical => Some(Arc::new(LexicalRanker::new())),
        RankerKind::Judge => Some(Arc::new(
            JudgeRanker::new(judge_backend)
                .with_concurrency(settings.concurrency)
                .with_timeout(std::time::Duration::from_secs(settings.timeout_secs)),
        )),
    }
}
