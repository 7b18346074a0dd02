use async_trait::async_trait;
use parking_lot::Mutex;

use super::Retriever;
use crate::document::{Candidate, RetrievedDoc};

/// Returns the same candidates for every query (truncated to `top_k`).
#[derive(Default)]
pub struct StaticRetriever {
    candidates: Vec<Candidate>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StaticRetriever {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_docs(docs: impl IntoIterator<Item = RetrievedDoc>) -> Self {
        Self::new(docs.into_iter().map(Candidate::from).collect())
    }

    /// `(query, top_k)` of every search so far.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn search(&self, query: &str, top_k: usize) -> Vec<Candidate> {
        self.queries.lock().push((query.to_string(), top_k));
        self.candidates.iter().take(top_k).cloned().collect()
    }
}
