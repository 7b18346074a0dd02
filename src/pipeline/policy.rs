use tracing::debug;

use super::error::PipelineError;
use super::types::NoResultsReason;
use crate::constants::{
    DEFAULT_EXTRACTIVE_SCORE_THRESHOLD, DEFAULT_MIN_RELEVANCE_SCORE, DEFAULT_TOP_K,
};
use crate::document::RetrievedDoc;

/// Thresholds governing the relevance gate and the extractive shortcut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerPolicy {
    min_relevance_score: f32,
    extractive_score_threshold: f32,
    default_top_k: usize,
}

impl Default for AnswerPolicy {
    fn default() -> Self {
        Self {
            min_relevance_score: DEFAULT_MIN_RELEVANCE_SCORE,
            extractive_score_threshold: DEFAULT_EXTRACTIVE_SCORE_THRESHOLD,
            default_top_k: DEFAULT_TOP_K,
        }
    }
}

/// Where a gated candidate batch goes next.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerRoute {
    NoResults(NoResultsReason),
    /// Return the top candidate's text verbatim.
    Extractive,
    /// Prompt the generation backend with every candidate.
    Generative,
}

impl AnswerPolicy {
    /// Requires finite thresholds with `0 <= min_relevance_score <= extractive_score_threshold`
    /// and `default_top_k >= 1`.
    pub fn new(
        min_relevance_score: f32,
        extractive_score_threshold: f32,
        default_top_k: usize,
    ) -> Result<Self, PipelineError> {
        if !min_relevance_score.is_finite() || !extractive_score_threshold.is_finite() {
            return Err(PipelineError::InvalidPolicy {
                reason: "thresholds must be finite".to_string(),
            });
        }
        if min_relevance_score < 0.0 {
            return Err(PipelineError::InvalidPolicy {
                reason: format!("min_relevance_score {min_relevance_score} is negative"),
            });
        }
        if extractive_score_threshold < min_relevance_score {
            return Err(PipelineError::InvalidPolicy {
                reason: format!(
                    "extractive_score_threshold {extractive_score_threshold} is below \
                     min_relevance_score {min_relevance_score}"
                ),
            });
        }
        if default_top_k == 0 {
            return Err(PipelineError::InvalidPolicy {
                reason: "default_top_k must be at least 1".to_string(),
            });
        }

        Ok(Self {
            min_relevance_score,
            extractive_score_threshold,
            default_top_k,
        })
    }

    pub fn min_relevance_score(&self) -> f32 {
        self.min_relevance_score
    }

    pub fn extractive_score_threshold(&self) -> f32 {
        self.extractive_score_threshold
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Gates `docs` (already ranked, best first) and picks the answer strategy.
    ///
    /// Only `docs[0]` is inspected. A NaN top score never passes the gate.
    pub fn route(&self, docs: &[RetrievedDoc]) -> AnswerRoute {
        let Some(top) = docs.first() else {
            return AnswerRoute::NoResults(NoResultsReason::NoCandidates);
        };

        if top.score.is_nan() || top.score < self.min_relevance_score {
            debug!(
                top_score = top.score,
                threshold = self.min_relevance_score,
                candidates = docs.len(),
                "Top candidate below relevance gate"
            );
            return AnswerRoute::NoResults(NoResultsReason::BelowThreshold {
                top_score: top.score,
                candidates: docs.len(),
            });
        }

        if docs.len() == 1 || top.score >= self.extractive_score_threshold {
            AnswerRoute::Extractive
        } else {
            AnswerRoute::Generative
        }
    }
}
