//! Query-time retrieval.
//!
//! A [`Retriever`] never fails. Blank queries and upstream outages (embedding
//! or vector store) are logged and reported as an empty candidate list, which
//! the pipeline turns into its "no results" answer.

#[cfg(any(test, feature = "mock"))]
mod fixed;
mod semantic;


#[cfg(any(test, feature = "mock"))]
pub use fixed::StaticRetriever;
pub use semantic::SemanticRetriever;

use async_trait::async_trait;

use crate::document::Candidate;

#[async_trait]
/// Produces ranked candidates for a query.
pub trait Retriever: Send + Sync {
    /// Up to `top_k` candidates, best first.
    async fn search(&self, query: &str, top_k: usize) -> Vec<Candidate>;
}
