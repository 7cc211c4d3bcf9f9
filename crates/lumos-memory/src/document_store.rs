//! In-process registry of ingested documents.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::document::{Document, DocumentId};

/// Owns the documents known to an ingestion pipeline, keyed by id.
///
/// Callers construct one and share it explicitly; there is no process-wide
/// registry. Documents are stored behind `Arc` so lookups hand out cheap
/// clones without holding the lock.
#[derive(Default)]
pub struct DocumentStore {
    documents: RwLock<HashMap<DocumentId, Arc<Document>>>,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, returning the previous one under the same id.
    pub fn insert(&self, document: Document) -> Option<Arc<Document>> {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(document.id.clone(), Arc::new(document))
    }

    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<Arc<Document>> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn remove(&self, id: &DocumentId) -> Option<Arc<Document>> {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    #[must_use]
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<DocumentId> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
