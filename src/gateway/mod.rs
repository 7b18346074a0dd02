//! HTTP gateway (axum) over the answer pipeline and ingestion.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{
    AskRequest, EmbeddingRequest, EmbeddingResponse, IngestRequest, IngestResponse, ask_handler,
    embedding_handler, ingest_handler,
};
pub use state::AppState;

use crate::vectordb::VectorStore;

/// Response header carrying a short machine-readable outcome.
pub const RECALL_STATUS_HEADER: &str = "x-recall-status";

pub const RECALL_STATUS_HEALTHY: &str = "healthy";

/// The server is up but the vector store is unreachable.
pub const RECALL_STATUS_DEGRADED: &str = "degraded";

pub fn create_router_with_state<V: VectorStore + 'static>(state: AppState<V>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/healthz", get(health_handler::<V>))
        .route("/ask", post(ask_handler::<V>))
        .route("/ingest", post(ingest_handler::<V>))
        .route("/embedding", post(embedding_handler::<V>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub ranker: Option<String>,
    pub embedder_mode: String,
    /// `"ok"` or `"unavailable"`.
    pub vector_store: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct RootResponse {
    pub message: String,
}

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Recall RAG API is running".to_string(),
    })
}

/// `GET /healthz`. Always 200 while the process serves requests; an
/// unreachable vector store is reported as `degraded` since queries still
/// answer with the "not found" message.
#[tracing::instrument(skip(state))]
pub async fn health_handler<V: VectorStore + 'static>(State(state): State<AppState<V>>) -> Response {
    let store_ok = match state.ingestor.store().health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Vector store health check failed");
            false
        }
    };

    let (status, header) = if store_ok {
        ("ok", RECALL_STATUS_HEALTHY)
    } else {
        (RECALL_STATUS_DEGRADED, RECALL_STATUS_DEGRADED)
    };

    let mut headers = HeaderMap::new();
    headers.insert(RECALL_STATUS_HEADER, HeaderValue::from_static(header));

    let embedder_mode = if state.embedder.is_stub() { "stub" } else { "real" };

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: status.to_string(),
            model: state.pipeline.model().to_string(),
            ranker: state.pipeline.ranker_name().map(str::to_string),
            embedder_mode: embedder_mode.to_string(),
            vector_store: if store_ok { "ok" } else { "unavailable" }.to_string(),
        }),
    )
        .into_response()
}
