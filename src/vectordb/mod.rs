//! Vector store integration (Qdrant) for knowledge-base chunks.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{QdrantStore, VectorStore};
pub use error::VectorDbError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockVectorStore, cosine_similarity};
pub use model::{ChunkPoint, SearchResult};

pub const DEFAULT_COLLECTION_NAME: &str = "recall_chunks";

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteConsistency {
    /// Wait until the points are indexed and searchable (`wait=true`).
    #[default]
    Strong,
    /// Return once the server acknowledges receipt (`wait=false`).
    Eventual,
}

impl From<WriteConsistency> for bool {
    fn from(c: WriteConsistency) -> bool {
        matches!(c, WriteConsistency::Strong)
    }
}
