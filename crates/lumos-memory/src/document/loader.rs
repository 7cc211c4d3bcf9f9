use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use super::DEFAULT_MAX_FILE_SIZE;
use super::error::DocumentError;

/// A file read into memory, prior to chunking.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub content: String,
}

type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<RawDocument, DocumentError>> + Send + 'a>>;

pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> LoadFuture<'_>;

    fn supported_extensions(&self) -> &[&str];
}

/// Reads UTF-8 text files, carrying the file name through for source-type
/// classification. Binary office formats enter the pipeline as pre-extracted
/// text, not through this loader.
pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let meta = tokio::fs::metadata(&path).await?;
            if meta.len() > max_size {
                return Err(DocumentError::FileTooLarge(meta.len()));
            }

            let content = tokio::fs::read_to_string(&path).await?;
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_owned();

            Ok(RawDocument { filename, content })
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown", "csv"]
    }
}
