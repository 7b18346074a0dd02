use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::{ChunkPoint, SearchResult, VectorDbError, VectorStore, WriteConsistency};

/// In-memory [`VectorStore`] with brute-force cosine search.
#[derive(Default)]
pub struct MockVectorStore {
    collections: RwLock<HashMap<String, MockCollection>>,
    fail_search: AtomicBool,
}

#[derive(Default, Clone)]
struct MockCollection {
    vector_size: u64,
    points: HashMap<u64, ChunkPoint>,
}

impl MockVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.points.len())
    }

    pub fn get_point(&self, collection: &str, id: u64) -> Option<ChunkPoint> {
        self.collections
            .read()
            .get(collection)
            .and_then(|c| c.points.get(&id).cloned())
    }

    /// Makes every subsequent `search` and `health_check` fail, simulating an
    /// unreachable store.
    pub fn fail_searches(&self) {
        self.fail_search.store(true, Ordering::SeqCst);
    }
}

impl VectorStore for MockVectorStore {
    async fn health_check(&self) -> Result<(), VectorDbError> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(VectorDbError::ConnectionFailed {
                url: "mock://".to_string(),
                message: "simulated outage".to_string(),
            });
        }
        Ok(())
    }

    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        self.collections
            .write()
            .entry(name.to_string())
            .or_insert(MockCollection {
                vector_size,
                points: HashMap::new(),
            });
        Ok(())
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<ChunkPoint>,
        _consistency: WriteConsistency,
    ) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write();
        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for point in points {
            if point.vector.len() as u64 != coll.vector_size {
                return Err(VectorDbError::InvalidDimension {
                    expected: coll.vector_size as usize,
                    actual: point.vector.len(),
                });
            }
            coll.points.insert(point.id, point);
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchResult>, VectorDbError> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "simulated outage".to_string(),
            });
        }

        let collections = self.collections.read();
        let coll = collections
            .get(collection)
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: collection.to_string(),
            })?;

        let mut results: Vec<SearchResult> = coll
            .points
            .values()
            .map(|p| SearchResult {
                id: p.id,
                score: cosine_similarity(&query, &p.vector),
                doc_id: p.doc_id.clone(),
                text: p.text.clone(),
            })
            .collect();

        // HashMap order is arbitrary; break ties by id to keep searches repeatable.
        results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        results.truncate(limit as usize);
        Ok(results)
    }

    async fn delete_points(&self, collection: &str, ids: Vec<u64>) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write();
        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for id in ids {
            coll.points.remove(&id);
        }

        Ok(())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
