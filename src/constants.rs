//! Cross-cutting, shared constants.
//!
//! The answer thresholds are defaults only. Runtime values come from
//! [`Config`](crate::config::Config) and are carried by
//! [`AnswerPolicy`](crate::pipeline::AnswerPolicy).

/// Best-candidate score below which a batch is treated as "no results".
pub const DEFAULT_MIN_RELEVANCE_SCORE: f32 = 0.3;

/// Best-candidate score at or above which the top candidate is returned verbatim.
pub const DEFAULT_EXTRACTIVE_SCORE_THRESHOLD: f32 = 0.65;

/// Candidate count used when a request does not specify `top_k`.
pub const DEFAULT_TOP_K: usize = 5;

/// Score assigned to loosely-typed candidates that carry no score of their own.
pub const DEFAULT_CANDIDATE_SCORE: f32 = 1.0;

/// User-visible answer for any query the knowledge base cannot answer.
pub const NO_RESULTS_MESSAGE: &str = "I could not find this information in the knowledge base.";

/// Default generation model. `genai` infers the provider from the model name.
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";

/// Default embedding vector size (MiniLM-class sentence encoders).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Default character budget for the rendered context block.
pub const DEFAULT_PROMPT_MAX_CHARS: usize = 12_000;

/// Ingest chunk window, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Characters shared by consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_ordered() {
        assert!(DEFAULT_MIN_RELEVANCE_SCORE <= DEFAULT_EXTRACTIVE_SCORE_THRESHOLD);
    }

    #[test]
    fn test_chunk_overlap_smaller_than_window() {
        assert!(DEFAULT_CHUNK_OVERLAP < DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_no_results_message_mentions_knowledge_base() {
        assert!(NO_RESULTS_MESSAGE.contains("could not find this information"));
        assert!(NO_RESULTS_MESSAGE.contains("knowledge base"));
    }
}
