use thiserror::Error;

use crate::llm::LlmError;

#[derive(Debug, Error)]
/// Errors surfaced by [`RagPipeline`](super::RagPipeline).
///
/// Retrieval and ranking problems never appear here; they degrade to
/// "no results" or zero scores. Generation failures do.
pub enum PipelineError {
    /// A per-call argument was out of range.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Threshold settings that would make the answer policy incoherent.
    #[error("invalid answer policy: {reason}")]
    InvalidPolicy { reason: String },

    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),
}
