use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::RECALL_STATUS_HEADER;
use super::error::GatewayError;
use super::state::AppState;
use crate::embedding::embed_one;
use crate::vectordb::VectorStore;

fn default_use_rerank() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default = "default_use_rerank")]
    pub use_rerank: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub text: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub source: String,
    pub chunks_created: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
    pub model: String,
    pub dimensions: usize,
}

fn status_headers(status: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        RECALL_STATUS_HEADER,
        HeaderValue::from_str(status).unwrap_or(HeaderValue::from_static("ok")),
    );
    headers
}

/// `POST /ask`. Blank queries are answered with the "not found" message.
#[instrument(skip(state, request), fields(query_len = request.query.len(), top_k = ?request.top_k))]
pub async fn ask_handler<V: VectorStore + 'static>(
    State(state): State<AppState<V>>,
    Json(request): Json<AskRequest>,
) -> Result<Response, GatewayError> {
    let response = state
        .pipeline
        .run_with_context(&request.query, request.top_k, request.use_rerank)
        .await?;

    debug!(
        strategy = %response.metadata.strategy,
        contexts = response.contexts.len(),
        "Ask completed"
    );

    Ok((
        status_headers(response.metadata.strategy.as_str()),
        Json(response),
    )
        .into_response())
}

/// `POST /ingest`: chunk, embed and index a document.
#[instrument(skip(state, request), fields(source = %request.source, text_len = request.text.len()))]
pub async fn ingest_handler<V: VectorStore + 'static>(
    State(state): State<AppState<V>>,
    Json(request): Json<IngestRequest>,
) -> Result<Response, GatewayError> {
    if request.source.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "source must not be empty".to_string(),
        ));
    }
    if request.text.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "text must not be empty".to_string(),
        ));
    }

    let chunks_created = state
        .ingestor
        .ingest_text(&request.text, &request.source)
        .await?;

    info!(chunks = chunks_created, "Document ingested");

    Ok((
        status_headers("ingested"),
        Json(IngestResponse {
            status: "success".to_string(),
            source: request.source,
            chunks_created,
        }),
    )
        .into_response())
}

/// `POST /embedding`: embeds one text with the configured embedder.
#[instrument(skip(state, request), fields(text_len = request.text.len()))]
pub async fn embedding_handler<V: VectorStore + 'static>(
    State(state): State<AppState<V>>,
    Json(request): Json<EmbeddingRequest>,
) -> Result<Json<EmbeddingResponse>, GatewayError> {
    if request.text.is_empty() {
        return Err(GatewayError::Unprocessable(
            "text must not be empty".to_string(),
        ));
    }

    let embedding = embed_one(state.embedder.as_ref(), &request.text).await?;

    Ok(Json(EmbeddingResponse {
        dimensions: embedding.len(),
        model: state.embedder.model_name().to_string(),
        embedding,
    }))
}
