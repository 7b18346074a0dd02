use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{PointStruct, ScoredPoint, Value};

use crate::document::RetrievedDoc;

pub const PAYLOAD_DOC_ID: &str = "doc_id";
pub const PAYLOAD_TEXT: &str = "text";
pub const PAYLOAD_SOURCE: &str = "source";
pub const PAYLOAD_CHUNK_INDEX: &str = "chunk_index";
pub const PAYLOAD_INGESTED_AT: &str = "ingested_at";

/// One embedded chunk as stored in the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub doc_id: String,
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
    /// Unix seconds; `0` when unknown.
    pub ingested_at: i64,
}

impl ChunkPoint {
    pub fn new(
        id: u64,
        vector: Vec<f32>,
        doc_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            vector,
            doc_id: doc_id.into(),
            text: text.into(),
            source: String::new(),
            chunk_index: 0,
            ingested_at: 0,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>, chunk_index: usize) -> Self {
        self.source = source.into();
        self.chunk_index = chunk_index;
        self
    }

    pub fn with_ingested_at(mut self, timestamp: i64) -> Self {
        self.ingested_at = timestamp;
        self
    }

    pub(crate) fn into_point_struct(self) -> PointStruct {
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert(PAYLOAD_DOC_ID.to_string(), self.doc_id.into());
        payload.insert(PAYLOAD_TEXT.to_string(), self.text.into());
        payload.insert(PAYLOAD_SOURCE.to_string(), self.source.into());
        payload.insert(
            PAYLOAD_CHUNK_INDEX.to_string(),
            (self.chunk_index as i64).into(),
        );
        payload.insert(PAYLOAD_INGESTED_AT.to_string(), self.ingested_at.into());

        PointStruct::new(self.id, self.vector, payload)
    }
}

/// A scored hit, carrying enough payload to become a [`RetrievedDoc`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: u64,
    pub score: f32,
    pub doc_id: String,
    pub text: String,
}

impl SearchResult {
    /// Points without a numeric id or a `text` payload are skipped.
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let id = match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Num(n)) => n,
            _ => return None,
        };

        let payload = point.payload;

        let text = payload
            .get(PAYLOAD_TEXT)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())?;

        let doc_id = payload
            .get(PAYLOAD_DOC_ID)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| id.to_string());

        Some(SearchResult {
            id,
            score: point.score,
            doc_id,
            text,
        })
    }
}

impl From<SearchResult> for RetrievedDoc {
    fn from(result: SearchResult) -> Self {
        RetrievedDoc::new(result.doc_id, result.text, result.score)
    }
}
