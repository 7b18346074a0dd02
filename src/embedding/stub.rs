use async_trait::async_trait;
use tracing::debug;

use super::{Embedder, EmbeddingError, l2_normalize};
use crate::hashing::hash_to_u64;
use crate::ranking::tokenize;

pub const STUB_MODEL_NAME: &str = "blake3-feature-hash";

/// Deterministic embedder for tests and model-less local runs.
///
/// Each lowercase word token is hashed with BLAKE3 into one signed bucket, and
/// the result is L2-normalized. Texts sharing words end up close in cosine
/// space, which is enough to exercise retrieval end to end.
#[derive(Debug, Clone, Copy)]
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let hash = hash_to_u64(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!(batch = texts.len(), "Generating stub embeddings");
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        STUB_MODEL_NAME
    }

    fn is_stub(&self) -> bool {
        true
    }
}
