use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Embedder, EmbeddingError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Client for an OpenAI-compatible embeddings endpoint (OpenAI, Ollama, TEI, vLLM).
#[derive(Clone)]
pub struct HttpEmbedder {
    http: HttpClient,
    url: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
}

impl std::fmt::Debug for HttpEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbedder")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpEmbedder {
    /// `url` is the full endpoint, e.g. `http://localhost:11434/v1/embeddings`.
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "dimension must be greater than zero".to_string(),
            });
        }

        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            url: url.into(),
            model: model.into(),
            api_key: None,
            dimension,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(url = %self.url, model = %self.model, batch = texts.len(), "Requesting embeddings");

        let mut request = self.http.post(&self.url).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?.error_for_status()?;
        let mut body: EmbeddingResponse = response.json().await?;

        if body.data.len() != texts.len() {
            return Err(EmbeddingError::MalformedResponse {
                reason: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    body.data.len()
                ),
            });
        }

        body.data.sort_by_key(|d| d.index);

        body.data
            .into_iter()
            .map(|d| {
                if d.embedding.len() != self.dimension {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimension,
                        actual: d.embedding.len(),
                    });
                }
                Ok(d.embedding)
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
