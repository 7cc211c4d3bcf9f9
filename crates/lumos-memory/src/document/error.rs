#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("embedding failed: {0}")]
    Embedding(#[from] super::pipeline::EmbedError),

    #[error("vector store error: {0}")]
    Storage(#[from] crate::vector_store::VectorStoreError),
}
