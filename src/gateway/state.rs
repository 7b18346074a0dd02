use std::sync::Arc;

use crate::embedding::Embedder;
use crate::ingest::Ingestor;
use crate::pipeline::RagPipeline;
use crate::vectordb::VectorStore;

/// Shared handler state. Every field is built once at startup.
pub struct AppState<V: VectorStore + 'static> {
    pub pipeline: Arc<RagPipeline>,

    pub ingestor: Arc<Ingestor<V>>,

    pub embedder: Arc<dyn Embedder>,
}

impl<V: VectorStore + 'static> Clone for AppState<V> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            ingestor: Arc::clone(&self.ingestor),
            embedder: Arc::clone(&self.embedder),
        }
    }
}

impl<V: VectorStore + 'static> AppState<V> {
    pub fn new(
        pipeline: Arc<RagPipeline>,
        ingestor: Arc<Ingestor<V>>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            pipeline,
            ingestor,
            embedder,
        }
    }
}
