//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use recall::embedding::Embedder;
use recall::gateway::{AppState, create_router_with_state};
use recall::ingest::Ingestor;
use recall::llm::{GenerationBackend, MockBackend};
use recall::pipeline::{AnswerPolicy, RagPipeline};
use recall::prompt::PromptBuilder;
use recall::ranking::Ranker;
use recall::retrieval::SemanticRetriever;
use recall::vectordb::MockVectorStore;
use recall::{LexicalRanker, StubEmbedder};

pub const COLLECTION: &str = "integration_chunks";
pub const DIM: usize = 512;

pub const PARIS_TEXT: &str =
    "Paris is the capital of France. It is known for the Eiffel Tower.";
pub const BANANA_TEXT: &str = "Bananas grow in tropical climates and are rich in potassium.";

/// A knowledge base wired the way the server wires it, minus the network.
pub struct KnowledgeBase {
    pub store: Arc<MockVectorStore>,
    pub embedder: Arc<dyn Embedder>,
    pub backend: Arc<MockBackend>,
    pub ingestor: Arc<Ingestor<MockVectorStore>>,
    pub pipeline: Arc<RagPipeline>,
}

impl KnowledgeBase {
    pub fn new(backend: MockBackend) -> Self {
        Self::with_ranker(backend, Some(Arc::new(LexicalRanker::new())))
    }

    pub fn with_ranker(backend: MockBackend, ranker: Option<Arc<dyn Ranker>>) -> Self {
        let store = Arc::new(MockVectorStore::new());
        let embedder: Arc<dyn Embedder> = Arc::new(StubEmbedder::new(DIM));
        let backend = Arc::new(backend);

        let retriever = SemanticRetriever::new(store.clone(), embedder.clone(), COLLECTION);
        let pipeline = RagPipeline::new(
            Arc::new(retriever),
            backend.clone() as Arc<dyn GenerationBackend>,
            PromptBuilder::default(),
            AnswerPolicy::default(),
        )
        .with_optional_ranker(ranker);
        let ingestor = Ingestor::new(store.clone(), embedder.clone(), COLLECTION);

        Self {
            store,
            embedder,
            backend,
            ingestor: Arc::new(ingestor),
            pipeline: Arc::new(pipeline),
        }
    }

    pub async fn seed(&self) {
        self.ingestor
            .ingest_text(PARIS_TEXT, "paris.txt")
            .await
            .expect("paris ingest");
        self.ingestor
            .ingest_text(BANANA_TEXT, "bananas.txt")
            .await
            .expect("banana ingest");
    }

    pub fn router(&self) -> axum::Router {
        create_router_with_state(AppState::new(
            self.pipeline.clone(),
            self.ingestor.clone(),
            self.embedder.clone(),
        ))
    }
}
