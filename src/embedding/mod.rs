//! Text embedding backends.
//!
//! - [`HttpEmbedder`] calls an OpenAI-compatible `/v1/embeddings` endpoint.
//! - [`StubEmbedder`] is deterministic feature hashing, usable without any model.
//!
//! Both are constructed once at startup and shared behind `Arc`.

mod error;
/// OpenAI-compatible HTTP embedder.
pub mod http;
/// Deterministic hashing embedder.
pub mod stub;


pub use error::EmbeddingError;
pub use http::HttpEmbedder;
pub use stub::{STUB_MODEL_NAME, StubEmbedder};

use async_trait::async_trait;

#[async_trait]
/// Maps texts to fixed-size vectors.
pub trait Embedder: Send + Sync {
    /// Embeds a batch, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Output vector size.
    fn dimension(&self) -> usize;

    /// Model identifier reported to API clients.
    fn model_name(&self) -> &str;

    /// Returns `true` for the hashing stub.
    fn is_stub(&self) -> bool {
        false
    }
}

/// Embeds a single text.
pub async fn embed_one(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    embedder
        .embed(&[text.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or(EmbeddingError::MalformedResponse {
            reason: "no embedding returned".to_string(),
        })
}

/// Scales `vector` to unit length in place (zero vectors are left unchanged).
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
