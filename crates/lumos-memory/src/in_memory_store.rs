//! Process-local [`VectorStore`] backed by a `HashMap`.
//!
//! Brute-force cosine scan over every point in a collection. Fine for the
//! document volumes a single process ingests; anything larger belongs in a
//! real vector database behind the same trait.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::vector_store::{
    ChunkPayload, ChunkPoint, ScoredChunk, SearchFilter, VectorStore, VectorStoreError,
};

struct StoredPoint {
    vector: Vec<f32>,
    payload: ChunkPayload,
}

#[derive(Default)]
struct Collection {
    points: HashMap<String, StoredPoint>,
}

#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore").finish_non_exhaustive()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorStore for InMemoryVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
    ) -> crate::vector_store::BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut collections = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            collections.entry(collection).or_default();
            Ok(())
        })
    }

    fn collection_exists(
        &self,
        collection: &str,
    ) -> crate::vector_store::BoxFuture<'_, Result<bool, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let collections = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            Ok(collections.contains_key(&collection))
        })
    }

    fn delete_collection(
        &self,
        collection: &str,
    ) -> crate::vector_store::BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut collections = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Delete(e.to_string()))?;
            collections.remove(&collection);
            Ok(())
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<ChunkPoint>,
    ) -> crate::vector_store::BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut collections = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            let Some(coll) = collections.get_mut(&collection) else {
                return Err(VectorStoreError::Upsert(format!(
                    "collection not found: {collection}"
                )));
            };
            for point in points {
                coll.points.insert(
                    point.id,
                    StoredPoint {
                        vector: point.vector,
                        payload: point.payload,
                    },
                );
            }
            Ok(())
        })
    }

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
        filter: Option<SearchFilter>,
    ) -> crate::vector_store::BoxFuture<'_, Result<Vec<ScoredChunk>, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let collections = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            let Some(coll) = collections.get(&collection) else {
                return Err(VectorStoreError::Search(format!(
                    "collection not found: {collection}"
                )));
            };

            let mut results: Vec<ScoredChunk> = coll
                .points
                .iter()
                .filter(|(_, sp)| filter.as_ref().is_none_or(|f| f.matches(&sp.payload)))
                .map(|(id, sp)| ScoredChunk {
                    id: id.clone(),
                    score: cosine_similarity(&vector, &sp.vector),
                    payload: sp.payload.clone(),
                })
                .collect();

            results.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            results.truncate(limit);
            Ok(results)
        })
    }

    fn delete_by_ids(
        &self,
        collection: &str,
        ids: Vec<String>,
    ) -> crate::vector_store::BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut collections = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Delete(e.to_string()))?;
            let Some(coll) = collections.get_mut(&collection) else {
                return Err(VectorStoreError::Delete(format!(
                    "collection not found: {collection}"
                )));
            };
            for id in &ids {
                coll.points.remove(id);
            }
            Ok(())
        })
    }
}
