//! Recall: retrieval-augmented answering with a relevance gate and an
//! extractive shortcut.
//!
//! # Request flow
//!
//! ```text
//! query ─► AgentController ─┬─ generate ─► GenerationBackend ─► answer
//!                           └─ retrieve ─► Retriever ─► Ranker ─► AnswerPolicy
//!                                           ├─ no results  ─► fixed "not found" message
//!                                           ├─ extractive  ─► top chunk verbatim
//!                                           └─ generative  ─► PromptBuilder ─► GenerationBackend
//! ```
//!
//! ## Core Types
//! - [`RagPipeline`], [`AnswerPolicy`], [`AnswerOutcome`] - orchestration
//! - [`Ranker`], [`LexicalRanker`], [`JudgeRanker`] - candidate rescoring
//! - [`AgentController`] - retrieve-or-generate routing
//! - [`Config`] - environment configuration
//!
//! ## Adapters
//! - [`GenaiBackend`] - generation through `genai`
//! - [`HttpEmbedder`], [`StubEmbedder`] - embeddings
//! - [`QdrantStore`] - vector store
//! - [`gateway`] - axum HTTP surface
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod agent;
pub mod config;
pub mod constants;
pub mod document;
pub mod embedding;
pub mod evaluation;
pub mod gateway;
pub mod hashing;
pub mod ingest;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod ranking;
pub mod retrieval;
pub mod vectordb;

pub use agent::{AgentController, AgentDecision};
pub use config::{Config, ConfigError};
pub use constants::NO_RESULTS_MESSAGE;
pub use document::{Candidate, RetrievedDoc};
pub use embedding::{Embedder, EmbeddingError, HttpEmbedder, StubEmbedder};
pub use evaluation::{
    EvalError, EvalRecord, EvalSample, evaluate_dataset, evaluate_sample, export_to_csv,
    keyword_overlap_score, load_dataset, precision_at_k, recall_at_k,
};
pub use ingest::{IngestError, Ingestor, clean_text, split_text};
pub use llm::{GenaiBackend, GenerationBackend, LlmError, LlmResponse, TokenUsage};
#[cfg(any(test, feature = "mock"))]
pub use llm::MockBackend;
pub use pipeline::{
    AnswerOutcome, AnswerPolicy, AnswerStrategy, NoResultsReason, PipelineError, RagPipeline,
    RagResponse, RetrievedContext,
};
pub use prompt::{PromptBuilder, PromptError, PromptMode};
pub use ranking::{JudgeRanker, LexicalRanker, Ranker, RankerKind, build_ranker};
pub use retrieval::{Retriever, SemanticRetriever};
#[cfg(any(test, feature = "mock"))]
pub use retrieval::StaticRetriever;
pub use vectordb::{ChunkPoint, QdrantStore, SearchResult, VectorDbError, VectorStore};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorStore;
