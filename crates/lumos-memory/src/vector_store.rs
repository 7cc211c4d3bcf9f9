//! Vector storage abstraction for chunk embeddings.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::document::{Chunk, DocumentId, SourceType};

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("collection error: {0}")]
    Collection(String),

    #[error("upsert failed: {0}")]
    Upsert(String),

    #[error("search failed: {0}")]
    Search(String),

    #[error("delete failed: {0}")]
    Delete(String),
}

/// Provenance stored alongside every vector, so search results can be
/// traced back to their document without a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub document_id: DocumentId,
    pub filename: String,
    pub source_type: SourceType,
    pub chunk_index: usize,
    pub content: String,
}

impl From<Chunk> for ChunkPayload {
    fn from(chunk: Chunk) -> Self {
        Self {
            document_id: chunk.document_id,
            filename: chunk.filename,
            source_type: chunk.source_type,
            chunk_index: chunk.chunk_index,
            content: chunk.content,
        }
    }
}

/// A vector with its id and payload, ready for upsert.
#[derive(Debug, Clone)]
pub struct ChunkPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

/// A search hit with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub id: String,
    pub score: f32,
    pub payload: ChunkPayload,
}

/// Optional constraints applied to search results. Empty filter matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub document_id: Option<DocumentId>,
    pub source_type: Option<SourceType>,
}

impl SearchFilter {
    #[must_use]
    pub fn matches(&self, payload: &ChunkPayload) -> bool {
        self.document_id
            .as_ref()
            .is_none_or(|id| *id == payload.document_id)
            && self
                .source_type
                .is_none_or(|st| st == payload.source_type)
    }
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not already exist.
    fn ensure_collection(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>>;

    fn delete_collection(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn upsert(
        &self,
        collection: &str,
        points: Vec<ChunkPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
        filter: Option<SearchFilter>,
    ) -> BoxFuture<'_, Result<Vec<ScoredChunk>, VectorStoreError>>;

    fn delete_by_ids(
        &self,
        collection: &str,
        ids: Vec<String>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;
}
