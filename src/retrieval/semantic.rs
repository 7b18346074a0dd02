use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::Retriever;
use crate::document::{Candidate, RetrievedDoc, sort_by_score_desc};
use crate::embedding::{Embedder, embed_one};
use crate::vectordb::VectorStore;

/// Embeds the query and runs a nearest-neighbour search against one collection.
pub struct SemanticRetriever<V: VectorStore> {
    store: Arc<V>,
    embedder: Arc<dyn Embedder>,
    collection: String,
}

impl<V: VectorStore> SemanticRetriever<V> {
    pub fn new(store: Arc<V>, embedder: Arc<dyn Embedder>, collection: impl Into<String>) -> Self {
        Self {
            store,
            embedder,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Typed variant of [`Retriever::search`].
    pub async fn search_docs(&self, query: &str, top_k: usize) -> Vec<RetrievedDoc> {
        if query.trim().is_empty() {
            warn!("Empty query passed to retriever");
            return vec![];
        }
        if top_k == 0 {
            return vec![];
        }

        let vector = match embed_one(self.embedder.as_ref(), query).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Query embedding failed; returning no candidates");
                return vec![];
            }
        };

        let results = match self
            .store
            .search(&self.collection, vector, top_k as u64)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, collection = %self.collection, "Vector search failed; returning no candidates");
                return vec![];
            }
        };

        let mut docs: Vec<RetrievedDoc> = results.into_iter().map(RetrievedDoc::from).collect();
        sort_by_score_desc(&mut docs);
        docs.truncate(top_k);

        debug!(
            collection = %self.collection,
            candidates = docs.len(),
            top_score = docs.first().map(|d| d.score),
            "Retrieved candidates"
        );
        docs
    }
}

#[async_trait]
impl<V: VectorStore> Retriever for SemanticRetriever<V> {
    async fn search(&self, query: &str, top_k: usize) -> Vec<Candidate> {
        self.search_docs(query, top_k)
            .await
            .into_iter()
            .map(Candidate::from)
            .collect()
    }
}
