//! Document ingestion: chunking, sentinel headers, loaders, and the
//! embed-and-store pipeline.

pub mod chunker;
pub mod error;
pub mod header;
pub mod loader;
pub mod pipeline;
pub mod types;

pub use chunker::{APPROX_CHARS_PER_WORD, ChunkerConfig, TextChunker, approx_word_count};
pub use error::DocumentError;
pub use loader::{DocumentLoader, RawDocument, TextLoader};
pub use pipeline::{EmbedError, EmbedFn, EmbedFuture, IngestReport, IngestionPipeline};
pub use types::{Chunk, Document, DocumentId, SourceType};

/// Default maximum file size accepted by loaders: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
