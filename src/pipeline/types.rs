use serde::{Deserialize, Serialize};

use crate::agent::AgentDecision;
use crate::constants::NO_RESULTS_MESSAGE;
use crate::document::RetrievedDoc;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Why a query ended without an answer.
pub enum NoResultsReason {
    /// The retriever returned nothing usable.
    NoCandidates,
    /// The best candidate scored below the relevance gate.
    BelowThreshold { top_score: f32, candidates: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// How the answer text was produced.
pub enum AnswerStrategy {
    Extractive,
    Generative,
    Direct,
    SocialPost,
    NoResults,
}

impl AnswerStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStrategy::Extractive => "extractive",
            AnswerStrategy::Generative => "generative",
            AnswerStrategy::Direct => "direct",
            AnswerStrategy::SocialPost => "social_post",
            AnswerStrategy::NoResults => "no_results",
        }
    }
}

impl std::fmt::Display for AnswerStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Terminal state of one pipeline run.
///
/// `ranker` is the name of the ranker that rescored the batch, if any.
pub enum AnswerOutcome {
    NoResults {
        reason: NoResultsReason,
        ranker: Option<&'static str>,
    },
    /// Top candidate returned verbatim; no generation call was made.
    Extractive {
        answer: String,
        docs: Vec<RetrievedDoc>,
        ranker: Option<&'static str>,
    },
    Generative {
        answer: String,
        model: String,
        docs: Vec<RetrievedDoc>,
        ranker: Option<&'static str>,
    },
    /// Retrieval bypassed by the agent.
    Direct {
        answer: String,
        model: String,
        social_post: bool,
    },
}

impl AnswerOutcome {
    /// User-facing answer. "No results" renders as the fixed fallback sentence.
    pub fn answer(&self) -> &str {
        match self {
            AnswerOutcome::NoResults { .. } => NO_RESULTS_MESSAGE,
            AnswerOutcome::Extractive { answer, .. }
            | AnswerOutcome::Generative { answer, .. }
            | AnswerOutcome::Direct { answer, .. } => answer,
        }
    }

    /// Supporting documents, best first. Empty for "no results" and direct answers.
    pub fn docs(&self) -> &[RetrievedDoc] {
        match self {
            AnswerOutcome::Extractive { docs, .. } | AnswerOutcome::Generative { docs, .. } => {
                docs
            }
            AnswerOutcome::NoResults { .. } | AnswerOutcome::Direct { .. } => &[],
        }
    }

    pub fn strategy(&self) -> AnswerStrategy {
        match self {
            AnswerOutcome::NoResults { .. } => AnswerStrategy::NoResults,
            AnswerOutcome::Extractive { .. } => AnswerStrategy::Extractive,
            AnswerOutcome::Generative { .. } => AnswerStrategy::Generative,
            AnswerOutcome::Direct {
                social_post: true, ..
            } => AnswerStrategy::SocialPost,
            AnswerOutcome::Direct { .. } => AnswerStrategy::Direct,
        }
    }

    pub fn decision(&self) -> AgentDecision {
        match self {
            AnswerOutcome::Direct { .. } => AgentDecision::Generate,
            _ => AgentDecision::Retrieve,
        }
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, AnswerOutcome::NoResults { .. })
    }

    pub fn metadata(&self) -> ResponseMetadata {
        let (ranker, candidates, top_score, model) = match self {
            AnswerOutcome::NoResults { reason, ranker } => match reason {
                NoResultsReason::NoCandidates => (*ranker, 0, None, None),
                NoResultsReason::BelowThreshold {
                    top_score,
                    candidates,
                } => (*ranker, *candidates, Some(*top_score), None),
            },
            AnswerOutcome::Extractive { docs, ranker, .. } => (
                *ranker,
                docs.len(),
                docs.first().map(|d| d.score),
                None,
            ),
            AnswerOutcome::Generative {
                docs,
                ranker,
                model,
                ..
            } => (
                *ranker,
                docs.len(),
                docs.first().map(|d| d.score),
                Some(model.clone()),
            ),
            AnswerOutcome::Direct { model, .. } => (None, 0, None, Some(model.clone())),
        };

        ResponseMetadata {
            agent_decision: self.decision(),
            strategy: self.strategy(),
            reranked: ranker.is_some(),
            ranker: ranker.map(str::to_string),
            candidates,
            top_score,
            model,
        }
    }

    /// Structured presentation: answer, contexts and metadata.
    pub fn into_response(self) -> RagResponse {
        let metadata = self.metadata();
        let answer = self.answer().to_string();
        let contexts = match self {
            AnswerOutcome::Extractive { docs, .. } | AnswerOutcome::Generative { docs, .. } => {
                docs.into_iter().map(RetrievedContext::from).collect()
            }
            AnswerOutcome::NoResults { .. } | AnswerOutcome::Direct { .. } => Vec::new(),
        };

        RagResponse {
            answer,
            contexts,
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One supporting chunk in a structured response.
pub struct RetrievedContext {
    pub doc_id: String,
    pub score: f32,
    pub content: String,
}

impl From<RetrievedDoc> for RetrievedContext {
    fn from(doc: RetrievedDoc) -> Self {
        Self {
            doc_id: doc.id,
            score: doc.score,
            content: doc.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub agent_decision: AgentDecision,
    pub strategy: AnswerStrategy,
    pub reranked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranker: Option<String>,
    pub candidates: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Result of [`RagPipeline::run_with_context`](super::RagPipeline::run_with_context).
pub struct RagResponse {
    pub answer: String,
    pub contexts: Vec<RetrievedContext>,
    pub metadata: ResponseMetadata,
}
