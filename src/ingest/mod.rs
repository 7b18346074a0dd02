//! Document ingestion: clean, chunk, embed, upsert.

mod error;


pub use error::IngestError;

use std::sync::Arc;

use tracing::info;

use crate::constants::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::embedding::Embedder;
use crate::hashing::{chunk_doc_id, chunk_point_id};
use crate::vectordb::{ChunkPoint, VectorStore, WriteConsistency};

/// Normalizes line endings, trims every line and collapses runs of blank
/// lines into one. Paragraph structure is kept.
pub fn clean_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(normalized.len());
    let mut pending_blank = false;

    for line in normalized.split('\n').map(str::trim) {
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        pending_blank = false;
    }

    out
}

/// Splits `text` into windows of `size` characters, each starting
/// `size - overlap` characters after the previous one. The last window ends
/// at the end of the text.
pub fn split_text(text: &str, size: usize, overlap: usize) -> Result<Vec<String>, IngestError> {
    if size == 0 || overlap >= size {
        return Err(IngestError::InvalidChunking { size, overlap });
    }

    let chars: Vec<char> = text.chars().collect();
    let step = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}

/// Writes documents into one collection of a [`VectorStore`].
pub struct Ingestor<V: VectorStore> {
    store: Arc<V>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    chunk_size: usize,
    overlap: usize,
    consistency: WriteConsistency,
}

impl<V: VectorStore> Ingestor<V> {
    pub fn new(store: Arc<V>, embedder: Arc<dyn Embedder>, collection: impl Into<String>) -> Self {
        Self {
            store,
            embedder,
            collection: collection.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
            consistency: WriteConsistency::Strong,
        }
    }

    pub fn with_chunking(mut self, chunk_size: usize, overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.overlap = overlap;
        self
    }

    pub fn with_consistency(mut self, consistency: WriteConsistency) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn store(&self) -> &Arc<V> {
        &self.store
    }

    /// Creates the collection sized for the embedder, if missing.
    pub async fn prepare(&self) -> Result<(), IngestError> {
        self.store
            .ensure_collection(&self.collection, self.embedder.dimension() as u64)
            .await?;
        Ok(())
    }

    /// Indexes `text` under `source` and returns the number of chunks written.
    ///
    /// Chunk `i` gets doc id `"{source}_{i}"` and a point id derived from it,
    /// so ingesting the same source again overwrites its earlier chunks.
    pub async fn ingest_text(&self, text: &str, source: &str) -> Result<usize, IngestError> {
        let cleaned = clean_text(text);
        let chunks = split_text(&cleaned, self.chunk_size, self.overlap)?;
        if chunks.is_empty() {
            return Err(IngestError::EmptyDocument {
                source_name: source.to_string(),
            });
        }

        let vectors = self.embedder.embed(&chunks).await?;
        let ingested_at = chrono::Utc::now().timestamp();

        let points: Vec<ChunkPoint> = chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (chunk, vector))| {
                ChunkPoint::new(chunk_point_id(source, i), vector, chunk_doc_id(source, i), chunk)
                    .with_source(source, i)
                    .with_ingested_at(ingested_at)
            })
            .collect();
        let count = points.len();

        self.prepare().await?;
        self.store
            .upsert_points(&self.collection, points, self.consistency)
            .await?;

        info!(source, chunks = count, collection = %self.collection, "Ingested document");
        Ok(count)
    }
}
