use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::RECALL_STATUS_HEADER;
use crate::embedding::EmbeddingError;
use crate::ingest::IngestError;
use crate::pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Well-formed JSON with a field that fails validation.
    #[error("unprocessable request: {0}")]
    Unprocessable(String),

    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("vector store error: {0}")]
    StoreFailed(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<PipelineError> for GatewayError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidArgument { .. } => GatewayError::InvalidRequest(err.to_string()),
            PipelineError::Generation(e) => GatewayError::GenerationFailed(e.to_string()),
            PipelineError::InvalidPolicy { .. } => GatewayError::InternalError(err.to_string()),
        }
    }
}

impl From<IngestError> for GatewayError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::EmptyDocument { .. } | IngestError::InvalidChunking { .. } => {
                GatewayError::InvalidRequest(err.to_string())
            }
            IngestError::Embedding(e) => GatewayError::EmbeddingFailed(e.to_string()),
            IngestError::Store(e) => GatewayError::StoreFailed(e.to_string()),
        }
    }
}

impl From<EmbeddingError> for GatewayError {
    fn from(err: EmbeddingError) -> Self {
        GatewayError::EmbeddingFailed(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, recall_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::Unprocessable(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_request")
            }
            GatewayError::GenerationFailed(_) => (StatusCode::BAD_GATEWAY, "generation_error"),
            GatewayError::EmbeddingFailed(_) => (StatusCode::BAD_GATEWAY, "embedding_error"),
            GatewayError::StoreFailed(_) => (StatusCode::BAD_GATEWAY, "store_error"),
            GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            RECALL_STATUS_HEADER,
            HeaderValue::from_static(recall_status),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
