//! Chunk, embed, and store documents end to end.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use crate::document_store::DocumentStore;
use crate::vector_store::{ChunkPoint, ScoredChunk, SearchFilter, VectorStore};

use super::chunker::TextChunker;
use super::error::DocumentError;
use super::loader::DocumentLoader;
use super::types::DocumentId;

/// Failure reported by an embedding backend.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct EmbedError(pub String);

pub type EmbedFuture = Pin<Box<dyn Future<Output = Result<Vec<f32>, EmbedError>> + Send>>;

/// Embedding seam: any backend that turns text into a vector. The pipeline
/// never sees what is behind it.
pub type EmbedFn = Box<dyn Fn(&str) -> EmbedFuture + Send + Sync>;

/// Outcome of a single [`IngestionPipeline::ingest`] call.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub document_id: DocumentId,
    pub chunk_count: usize,
    /// True when the document was already present and nothing was re-embedded.
    pub deduplicated: bool,
}

/// Drives a document from raw text to searchable vectors: chunk, embed each
/// chunk, upsert into the vector store, and record the document.
///
/// Re-uploads of identical content are detected by [`DocumentId`] and
/// skipped without touching the embedding backend.
pub struct IngestionPipeline {
    chunker: TextChunker,
    documents: Arc<DocumentStore>,
    vectors: Arc<dyn VectorStore>,
    collection: String,
    embed_fn: EmbedFn,
}

fn point_id(document_id: &DocumentId, chunk_index: usize) -> String {
    format!("{document_id}:{chunk_index}")
}

impl IngestionPipeline {
    pub fn new(
        chunker: TextChunker,
        documents: Arc<DocumentStore>,
        vectors: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        embed_fn: EmbedFn,
    ) -> Self {
        Self {
            chunker,
            documents,
            vectors,
            collection: collection.into(),
            embed_fn,
        }
    }

    #[must_use]
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Ingest one document's text under the given filename.
    ///
    /// # Errors
    ///
    /// Returns an error when embedding fails or the vector store rejects
    /// the upsert.
    pub async fn ingest(
        &self,
        filename: &str,
        content: &str,
    ) -> Result<IngestReport, DocumentError> {
        let document = self.chunker.chunk_document(filename, content);

        if let Some(existing) = self.documents.get(&document.id) {
            tracing::debug!(document_id = %existing.id, filename, "duplicate upload skipped");
            return Ok(IngestReport {
                document_id: existing.id.clone(),
                chunk_count: existing.chunks.len(),
                deduplicated: true,
            });
        }

        self.vectors.ensure_collection(&self.collection).await?;

        let mut points = Vec::with_capacity(document.chunks.len());
        for chunk in &document.chunks {
            let vector = (self.embed_fn)(&chunk.content).await?;
            points.push(ChunkPoint {
                id: point_id(&document.id, chunk.chunk_index),
                vector,
                payload: chunk.clone().into(),
            });
        }
        self.vectors.upsert(&self.collection, points).await?;

        let report = IngestReport {
            document_id: document.id.clone(),
            chunk_count: document.chunks.len(),
            deduplicated: false,
        };
        tracing::info!(
            document_id = %report.document_id,
            filename,
            chunks = report.chunk_count,
            "document ingested"
        );
        self.documents.insert(document);
        Ok(report)
    }

    /// Read a file through `loader` and ingest it.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or ingestion fails.
    pub async fn load_and_ingest(
        &self,
        loader: &(dyn DocumentLoader + '_),
        path: &Path,
    ) -> Result<IngestReport, DocumentError> {
        let raw = loader.load(path).await?;
        self.ingest(&raw.filename, &raw.content).await
    }

    /// Remove a document and its vectors. Returns false when the id is
    /// unknown.
    ///
    /// # Errors
    ///
    /// Returns an error when the vector store fails to delete the points.
    pub async fn delete_document(&self, id: &DocumentId) -> Result<bool, DocumentError> {
        let Some(document) = self.documents.remove(id) else {
            return Ok(false);
        };

        let ids = (0..document.chunks.len())
            .map(|i| point_id(id, i))
            .collect();
        self.vectors.delete_by_ids(&self.collection, ids).await?;
        tracing::info!(document_id = %id, "document deleted");
        Ok(true)
    }

    /// Embed `query` and return the closest chunks.
    ///
    /// # Errors
    ///
    /// Returns an error when embedding or the search itself fails.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        filter: Option<SearchFilter>,
    ) -> Result<Vec<ScoredChunk>, DocumentError> {
        let vector = (self.embed_fn)(query).await?;
        let results = self
            .vectors
            .search(&self.collection, vector, limit, filter)
            .await?;
        Ok(results)
    }
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::chunker::ChunkerConfig;
    use crate::in_memory_store::InMemoryVectorStore;

    fn hash_embed() -> EmbedFn {
        Box::new(|text: &str| {
            let hash = blake3::hash(text.as_bytes());
            let vector = hash.as_bytes()[..4].iter().map(|&b| f32::from(b)).collect();
            Box::pin(async move { Ok(vector) })
        })
    }

    fn failing_embed() -> EmbedFn {
        Box::new(|_: &str| Box::pin(async { Err(EmbedError("backend down".into())) }))
    }

    fn pipeline(embed_fn: EmbedFn) -> IngestionPipeline {
        IngestionPipeline::new(
            TextChunker::new(ChunkerConfig::default()),
            Arc::new(DocumentStore::new()),
            Arc::new(InMemoryVectorStore::new()),
            "test",
            embed_fn,
        )
    }

    #[tokio::test]
    async fn ingest_records_document_and_vectors() {
        let p = pipeline(hash_embed());
        let report = p.ingest("notes.txt", "hello world").await.unwrap();
        assert_eq!(report.chunk_count, 1);
        assert!(!report.deduplicated);
        assert!(p.documents().contains(&report.document_id));

        let results = p.search("hello world", 5, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].payload.content, "hello world");
    }

    #[tokio::test]
    async fn duplicate_upload_is_skipped() {
        let p = pipeline(hash_embed());
        let first = p.ingest("notes.txt", "same content").await.unwrap();
        let second = p.ingest("notes.txt", "same content").await.unwrap();
        assert!(!first.deduplicated);
        assert!(second.deduplicated);
        assert_eq!(first.document_id, second.document_id);
        assert_eq!(p.documents().len(), 1);
    }

    #[tokio::test]
    async fn embed_failure_propagates() {
        let p = pipeline(failing_embed());
        let result = p.ingest("notes.txt", "content").await;
        assert!(matches!(result, Err(DocumentError::Embedding(_))));
        assert!(p.documents().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_document_returns_false() {
        let p = pipeline(hash_embed());
        let id = DocumentId::derive("ghost.txt", "never ingested");
        assert!(!p.delete_document(&id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_document_and_vectors() {
        let p = pipeline(hash_embed());
        let report = p.ingest("notes.txt", "delete me").await.unwrap();
        assert!(p.delete_document(&report.document_id).await.unwrap());
        assert!(p.documents().is_empty());

        let results = p.search("delete me", 5, None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_filter_narrows_results() {
        let p = pipeline(hash_embed());
        p.ingest("report.pdf", "PDF Document\nContent:\nalpha beta")
            .await
            .unwrap();
        p.ingest("plain.txt", "alpha beta").await.unwrap();

        let filter = SearchFilter {
            source_type: Some(crate::document::SourceType::Pdf),
            ..SearchFilter::default()
        };
        let results = p.search("alpha beta", 10, Some(filter)).await.unwrap();
        assert!(!results.is_empty());
        assert!(
            results
                .iter()
                .all(|r| r.payload.source_type == crate::document::SourceType::Pdf)
        );
    }
}
