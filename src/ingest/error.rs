use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
/// Errors returned while adding documents to the knowledge base.
pub enum IngestError {
    /// Nothing left to index after cleaning.
    #[error("document '{source_name}' is empty")]
    EmptyDocument { source_name: String },

    #[error("invalid chunking: overlap {overlap} must be smaller than chunk size {size}")]
    InvalidChunking { size: usize, overlap: usize },

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store write failed: {0}")]
    Store(#[from] VectorDbError),
}
