use std::future::Future;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance, PointStruct, PointsIdsList,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use tracing::debug;

use super::WriteConsistency;
use super::error::VectorDbError;
use super::model::{ChunkPoint, SearchResult};

#[derive(Clone)]
/// Qdrant-backed chunk store.
pub struct QdrantStore {
    client: Qdrant,
    url: String,
}

impl QdrantStore {
    /// Creates a client for `url` (gRPC port, usually `6334`).
    pub fn new(url: &str) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Creates a collection with cosine distance.
    pub async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> Result<(), VectorDbError> {
        let vectors_config = VectorParamsBuilder::new(vector_size, Distance::Cosine);

        self.client
            .create_collection(CreateCollectionBuilder::new(name).vectors_config(vectors_config))
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    pub async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.client.collection_exists(name).await.map_err(|e| {
            VectorDbError::CollectionCheckFailed {
                collection: name.to_string(),
                message: e.to_string(),
            }
        })
    }
}

/// Minimal async interface the retrieval and ingest paths depend on.
pub trait VectorStore: Send + Sync {
    /// Succeeds when the store is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), VectorDbError>> + Send;

    /// Creates the collection if it does not exist yet.
    fn ensure_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> impl Future<Output = Result<(), VectorDbError>> + Send;

    fn upsert_points(
        &self,
        collection: &str,
        points: Vec<ChunkPoint>,
        consistency: WriteConsistency,
    ) -> impl Future<Output = Result<(), VectorDbError>> + Send;

    /// Nearest neighbours of `query`, best first.
    fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<SearchResult>, VectorDbError>> + Send;

    fn delete_points(
        &self,
        collection: &str,
        ids: Vec<u64>,
    ) -> impl Future<Output = Result<(), VectorDbError>> + Send;
}

impl VectorStore for QdrantStore {
    async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        if !self.collection_exists(name).await? {
            debug!(collection = name, vector_size, "Creating collection");
            self.create_collection(name, vector_size).await?;
        }
        Ok(())
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<ChunkPoint>,
        consistency: WriteConsistency,
    ) -> Result<(), VectorDbError> {
        if points.is_empty() {
            return Ok(());
        }

        let qdrant_points: Vec<PointStruct> = points
            .into_iter()
            .map(ChunkPoint::into_point_struct)
            .collect();

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(collection, qdrant_points).wait(consistency.into()),
            )
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchResult>, VectorDbError> {
        let search_builder = SearchPointsBuilder::new(collection, query, limit).with_payload(true);

        let response = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(response
            .result
            .into_iter()
            .filter_map(SearchResult::from_scored_point)
            .collect())
    }

    async fn delete_points(&self, collection: &str, ids: Vec<u64>) -> Result<(), VectorDbError> {
        if ids.is_empty() {
            return Ok(());
        }

        let points_selector = PointsIdsList {
            ids: ids.into_iter().map(|id| id.into()).collect(),
        };

        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(points_selector)
                    .wait(true),
            )
            .await
            .map_err(|e| VectorDbError::DeleteFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}
