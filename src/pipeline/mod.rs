//! Answer orchestration.
//!
//! One run moves through retrieve → rerank (optional) → gate → answer:
//!
//! 1. The [`AgentController`] may divert the query to pure generation, skipping
//!    retrieval entirely.
//! 2. Candidates from the [`Retriever`] are normalized into [`RetrievedDoc`]s and,
//!    when requested and configured, rescored by the [`Ranker`].
//! 3. [`AnswerPolicy::route`] applies the relevance gate to the top candidate
//!    and chooses between the extractive shortcut (no LLM call) and generation.
//!
//! Retrieval and ranking failures degrade to "no results". Generation failures
//! are returned to the caller as [`PipelineError::Generation`].

mod error;
mod policy;
mod types;


pub use error::PipelineError;
pub use policy::{AnswerPolicy, AnswerRoute};
pub use types::{
    AnswerOutcome, AnswerStrategy, NoResultsReason, RagResponse, ResponseMetadata,
    RetrievedContext,
};

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::agent::{AgentController, AgentDecision, SOCIAL_POST_PROMPT, direct_prompt};
use crate::document::{RetrievedDoc, normalize_candidates};
use crate::llm::{GenerationBackend, LlmResponse};
use crate::prompt::PromptBuilder;
use crate::ranking::Ranker;
use crate::retrieval::Retriever;

/// The RAG orchestrator. Collaborators are built once and shared; the pipeline
/// itself holds no per-request state.
pub struct RagPipeline {
    retriever: Arc<dyn Retriever>,
    ranker: Option<Arc<dyn Ranker>>,
    backend: Arc<dyn GenerationBackend>,
    prompt_builder: PromptBuilder,
    agent: AgentController,
    policy: AnswerPolicy,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("ranker", &self.ranker.as_ref().map(|r| r.name()))
            .field("model", &self.backend.model())
            .field("prompt_mode", &self.prompt_builder.mode())
            .field("policy", &self.policy)
            .finish()
    }
}

impl RagPipeline {
    /// Creates a pipeline without a ranker and with the default agent triggers.
    pub fn new(
        retriever: Arc<dyn Retriever>,
        backend: Arc<dyn GenerationBackend>,
        prompt_builder: PromptBuilder,
        policy: AnswerPolicy,
    ) -> Self {
        Self {
            retriever,
            ranker: None,
            backend,
            prompt_builder,
            agent: AgentController::default(),
            policy,
        }
    }

    pub fn with_ranker(mut self, ranker: Arc<dyn Ranker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    pub fn with_optional_ranker(mut self, ranker: Option<Arc<dyn Ranker>>) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn with_agent(mut self, agent: AgentController) -> Self {
        self.agent = agent;
        self
    }

    pub fn policy(&self) -> &AnswerPolicy {
        &self.policy
    }

    pub fn ranker_name(&self) -> Option<&'static str> {
        self.ranker.as_ref().map(|r| r.name())
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Runs the full state machine and returns its terminal state.
    ///
    /// `top_k` falls back to the policy default; `Some(0)` is rejected.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn answer(
        &self,
        query: &str,
        top_k: Option<usize>,
        use_rerank: bool,
    ) -> Result<AnswerOutcome, PipelineError> {
        let top_k = top_k.unwrap_or(self.policy.default_top_k());
        if top_k == 0 {
            return Err(PipelineError::InvalidArgument {
                reason: "top_k must be at least 1".to_string(),
            });
        }

        let decision = self.agent.decide(query);
        debug!(decision = %decision, "Agent decision");

        let outcome = match decision {
            AgentDecision::Generate => self.answer_directly(query).await?,
            AgentDecision::Retrieve => self.answer_from_knowledge_base(query, top_k, use_rerank).await?,
        };

        info!(
            strategy = %outcome.strategy(),
            decision = %outcome.decision(),
            candidates = outcome.docs().len(),
            "Answered query"
        );
        Ok(outcome)
    }

    /// Plain-text presentation.
    pub async fn run(
        &self,
        query: &str,
        top_k: Option<usize>,
        use_rerank: bool,
    ) -> Result<String, PipelineError> {
        let outcome = self.answer(query, top_k, use_rerank).await?;
        Ok(outcome.answer().to_string())
    }

    /// Structured presentation with contexts and metadata.
    pub async fn run_with_context(
        &self,
        query: &str,
        top_k: Option<usize>,
        use_rerank: bool,
    ) -> Result<RagResponse, PipelineError> {
        Ok(self.answer(query, top_k, use_rerank).await?.into_response())
    }

    /// Generates the fixed-rubric social post and returns the trimmed text.
    pub async fn generate_social_post(&self) -> Result<String, PipelineError> {
        let response = self.backend.generate(SOCIAL_POST_PROMPT).await?;
        Ok(response.text.trim().to_string())
    }

    async fn answer_directly(&self, query: &str) -> Result<AnswerOutcome, PipelineError> {
        let social_post = self.agent.is_social_post(query);
        let response: LlmResponse = if social_post {
            self.backend.generate(SOCIAL_POST_PROMPT).await?
        } else {
            self.backend.generate(&direct_prompt(query)).await?
        };

        Ok(AnswerOutcome::Direct {
            answer: response.text.trim().to_string(),
            model: response.model,
            social_post,
        })
    }

    async fn answer_from_knowledge_base(
        &self,
        query: &str,
        top_k: usize,
        use_rerank: bool,
    ) -> Result<AnswerOutcome, PipelineError> {
        let candidates = self.retriever.search(query, top_k).await;
        let mut docs: Vec<RetrievedDoc> = normalize_candidates(candidates);

        let mut ranker_used = None;
        if use_rerank
            && !docs.is_empty()
            && let Some(ranker) = &self.ranker
        {
            docs = ranker.rerank(query, docs).await;
            ranker_used = Some(ranker.name());
            debug!(ranker = ranker.name(), candidates = docs.len(), "Reranked candidates");
        }

        match self.policy.route(&docs) {
            AnswerRoute::NoResults(reason) => Ok(AnswerOutcome::NoResults {
                reason,
                ranker: ranker_used,
            }),
            AnswerRoute::Extractive => {
                let answer = docs
                    .first()
                    .map(|d| d.text.clone())
                    .unwrap_or_default();
                Ok(AnswerOutcome::Extractive {
                    answer,
                    docs,
                    ranker: ranker_used,
                })
            }
            AnswerRoute::Generative => {
                let prompt = self.prompt_builder.build(query, &docs);
                let response = self.backend.generate(&prompt).await?;
                Ok(AnswerOutcome::Generative {
                    answer: response.text,
                    model: response.model,
                    docs,
                    ranker: ranker_used,
                })
            }
        }
    }
}
