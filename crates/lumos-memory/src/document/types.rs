use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Number of leading content characters hashed into a [`DocumentId`].
pub const ID_CONTENT_PREFIX_CHARS: usize = 1000;

/// Classification of an uploaded document, derived from its filename.
///
/// Selects the metadata-sentinel handling during chunking; anything without a
/// recognized extension is treated as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Pdf,
    Docx,
    Xlsx,
    Pptx,
    Text,
}

impl SourceType {
    #[must_use]
    pub fn from_filename(filename: &str) -> Self {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("docx") => Self::Docx,
            Some("xlsx") => Self::Xlsx,
            Some("pptx") => Self::Pptx,
            _ => Self::Text,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Pptx => "pptx",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// blake3 hex digest of the filename plus the first
/// [`ID_CONTENT_PREFIX_CHARS`] characters of content.
///
/// Identical re-uploads map to the same id, which is how the ingestion
/// pipeline deduplicates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    #[must_use]
    pub fn derive(filename: &str, content: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(filename.as_bytes());
        let end = content
            .char_indices()
            .nth(ID_CONTENT_PREFIX_CHARS)
            .map_or(content.len(), |(i, _)| i);
        hasher.update(content[..end].as_bytes());
        Self(hasher.finalize().to_hex().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bounded-size excerpt of a document, tagged with its position and origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub document_id: DocumentId,
    /// Zero-based position within the owning document, contiguous from 0.
    pub chunk_index: usize,
    pub source_type: SourceType,
    pub filename: String,
}

/// An ingested unit of text and its ordered chunks.
///
/// Immutable after creation; chunks are owned exclusively by their document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub source_type: SourceType,
    pub chunks: Vec<Chunk>,
}
