//! In-memory document storage

use async_lock::RwLock;
use async_trait::async_trait;
use hearth_core::Result;
use serde_json::Value;
use std::sync::Arc;

use crate::document::{Collection, Document, DocumentStorage};

/// Document storage held in process memory. Clones share the same collection.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStorage {
    collection: Arc<RwLock<Collection>>,
}

impl MemoryDocumentStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.collection.read().await.documents().len()
    }

    /// Whether the storage is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Overwrite a document wholesale, bypassing insert checks (for seeding fixtures)
    pub async fn put_raw(&self, id: &str, document: Document) {
        self.collection.write().await.put(id, document);
    }
}

#[async_trait]
impl DocumentStorage for MemoryDocumentStorage {
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.collection.read().await.find_by_id(id))
    }

    async fn find_one(&self, path: &str, value: &Value) -> Result<Option<Document>> {
        Ok(self.collection.read().await.find_one(path, value))
    }

    async fn insert(&self, id: &str, document: Document) -> Result<()> {
        self.collection.write().await.insert(id, document)
    }

    async fn set_fields(&self, id: &str, fields: Document) -> Result<bool> {
        Ok(self.collection.write().await.set_fields(id, fields))
    }

    async fn unset_fields(&self, id: &str, fields: &[&str]) -> Result<bool> {
        Ok(self.collection.write().await.unset_fields(id, fields))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.collection.write().await.delete(id))
    }

    async fn ids(&self) -> Result<Vec<String>> {
        Ok(self.collection.read().await.ids())
    }
}
