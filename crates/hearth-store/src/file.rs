//! JSON-file document storage
//!
//! The whole collection is a single JSON object mapping `_id` to document, rewritten
//! atomically (write to a sibling temp file, then rename) after every mutation. Meant for
//! operator tooling and small single-node deployments, not for concurrent writers in
//! separate processes.

use async_lock::Mutex;
use async_trait::async_trait;
use hearth_core::{HearthError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::document::{Collection, Document, DocumentStorage};

/// Document storage persisted to one JSON file
#[derive(Debug, Clone)]
pub struct FileDocumentStorage {
    path: PathBuf,
    collection: Arc<Mutex<Collection>>,
}

impl FileDocumentStorage {
    /// Open `path`, starting empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let collection = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Collection::new()
            } else {
                let documents: BTreeMap<String, Document> = serde_json::from_str(&content)?;
                Collection::from_documents(documents)
            }
        } else {
            Collection::new()
        };
        tracing::debug!(path = %path.display(), documents = collection.documents().len(), "opened document file");
        Ok(Self {
            path,
            collection: Arc::new(Mutex::new(collection)),
        })
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, collection: &Collection) -> Result<()> {
        let content = serde_json::to_string_pretty(collection.documents())?;
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path).map_err(|e| {
            HearthError::storage(format!("failed to replace {}: {e}", self.path.display()))
        })
    }
}

#[async_trait]
impl DocumentStorage for FileDocumentStorage {
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.collection.lock().await.find_by_id(id))
    }

    async fn find_one(&self, path: &str, value: &Value) -> Result<Option<Document>> {
        Ok(self.collection.lock().await.find_one(path, value))
    }

    async fn insert(&self, id: &str, document: Document) -> Result<()> {
        let mut collection = self.collection.lock().await;
        collection.insert(id, document)?;
        self.persist(&collection)
    }

    async fn set_fields(&self, id: &str, fields: Document) -> Result<bool> {
        let mut collection = self.collection.lock().await;
        let existed = collection.set_fields(id, fields);
        if existed {
            self.persist(&collection)?;
        }
        Ok(existed)
    }

    async fn unset_fields(&self, id: &str, fields: &[&str]) -> Result<bool> {
        let mut collection = self.collection.lock().await;
        let existed = collection.unset_fields(id, fields);
        if existed {
            self.persist(&collection)?;
        }
        Ok(existed)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut collection = self.collection.lock().await;
        let existed = collection.delete(id);
        if existed {
            self.persist(&collection)?;
        }
        Ok(existed)
    }

    async fn ids(&self) -> Result<Vec<String>> {
        Ok(self.collection.lock().await.ids())
    }
}
