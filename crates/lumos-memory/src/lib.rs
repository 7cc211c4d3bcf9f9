//! Document chunking and in-memory vector search for Lumos.
//!
//! The [`document`] module splits uploaded text into overlapping chunks and
//! runs the chunk → embed → store pipeline. [`DocumentStore`] tracks ingested
//! documents by content hash, and [`InMemoryVectorStore`] provides a
//! process-local [`VectorStore`] for similarity search over chunk payloads.

pub mod document;
pub mod document_store;
pub mod in_memory_store;
pub mod vector_store;

pub use document::{
    Chunk, ChunkerConfig, Document, DocumentError, DocumentId, DocumentLoader, IngestReport,
    IngestionPipeline, SourceType, TextChunker, TextLoader,
};
pub use document_store::DocumentStore;
pub use in_memory_store::InMemoryVectorStore;
pub use vector_store::{
    ChunkPayload, ChunkPoint, ScoredChunk, SearchFilter, VectorStore, VectorStoreError,
};
