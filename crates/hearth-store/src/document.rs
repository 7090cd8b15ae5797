//! Document collection abstraction
//!
//! Models the subset of a document database the core relies on: documents keyed by `_id`,
//! point lookups, a single-field equality query, field-level set/unset, and delete. Each
//! operation touches one document and is atomic on its own.

use async_trait::async_trait;
use hearth_core::{HearthError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A stored document
pub type Document = Map<String, Value>;

/// Keyed collection of JSON documents
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Point lookup by `_id`
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>>;

    /// First document whose dotted `path` equals `value`
    async fn find_one(&self, path: &str, value: &Value) -> Result<Option<Document>>;

    /// Insert a new document; fails if `id` exists
    async fn insert(&self, id: &str, document: Document) -> Result<()>;

    /// `$set` top-level fields. Returns whether the document existed.
    async fn set_fields(&self, id: &str, fields: Document) -> Result<bool>;

    /// `$unset` top-level fields. Returns whether the document existed.
    async fn unset_fields(&self, id: &str, fields: &[&str]) -> Result<bool>;

    /// Delete a document. Returns whether it existed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Every stored `_id`, sorted
    async fn ids(&self) -> Result<Vec<String>>;
}

/// In-process collection state shared by the storage backends
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    documents: BTreeMap<String, Document>,
}

impl Collection {
    /// Empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a serialized map of `_id` to document
    pub fn from_documents(documents: BTreeMap<String, Document>) -> Self {
        Self { documents }
    }

    /// Serialized view of the collection
    pub fn documents(&self) -> &BTreeMap<String, Document> {
        &self.documents
    }

    /// Point lookup
    pub fn find_by_id(&self, id: &str) -> Option<Document> {
        self.documents.get(id).cloned()
    }

    /// First document whose dotted `path` equals `value`
    pub fn find_one(&self, path: &str, value: &Value) -> Option<Document> {
        self.documents
            .values()
            .find(|document| lookup_path(document, path) == Some(value))
            .cloned()
    }

    /// Insert a new document
    pub fn insert(&mut self, id: &str, document: Document) -> Result<()> {
        if self.documents.contains_key(id) {
            return Err(HearthError::storage(format!("duplicate document id {id}")));
        }
        self.documents.insert(id.to_string(), document);
        Ok(())
    }

    /// Store a document under `id`, replacing any existing one
    pub fn put(&mut self, id: &str, document: Document) -> Option<Document> {
        self.documents.insert(id.to_string(), document)
    }

    /// `$set`
    pub fn set_fields(&mut self, id: &str, fields: Document) -> bool {
        match self.documents.get_mut(id) {
            Some(document) => {
                document.extend(fields);
                true
            }
            None => false,
        }
    }

    /// `$unset`
    pub fn unset_fields(&mut self, id: &str, fields: &[&str]) -> bool {
        match self.documents.get_mut(id) {
            Some(document) => {
                for field in fields {
                    document.remove(*field);
                }
                true
            }
            None => false,
        }
    }

    /// Delete
    pub fn delete(&mut self, id: &str) -> bool {
        self.documents.remove(id).is_some()
    }

    /// Sorted ids
    pub fn ids(&self) -> Vec<String> {
        self.documents.keys().cloned().collect()
    }
}

/// Resolve a dotted path such as `frontendRef.notificationHandle`
pub fn lookup_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_lookup_path() {
        let document = doc(json!({ "frontendRef": { "notificationHandle": "n1" } }));
        assert_eq!(
            lookup_path(&document, "frontendRef.notificationHandle"),
            Some(&json!("n1"))
        );
        assert_eq!(lookup_path(&document, "frontendRef.ipNetwork"), None);
        assert_eq!(lookup_path(&document, "owner"), None);
    }

    #[test]
    fn test_set_and_unset() {
        let mut collection = Collection::new();
        collection
            .insert("a", doc(json!({ "expiresIfUnused": 5, "revoked": false })))
            .unwrap();

        assert!(collection.unset_fields("a", &["expiresIfUnused"]));
        assert!(collection.unset_fields("a", &["expiresIfUnused"]));
        assert!(collection.set_fields("a", doc(json!({ "revoked": true }))));
        assert!(!collection.set_fields("missing", Document::new()));

        let stored = collection.find_by_id("a").unwrap();
        assert_eq!(stored.get("revoked"), Some(&json!(true)));
        assert!(stored.get("expiresIfUnused").is_none());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut collection = Collection::new();
        collection.insert("a", Document::new()).unwrap();
        assert!(matches!(
            collection.insert("a", Document::new()),
            Err(HearthError::Storage { .. })
        ));
    }

    #[test]
    fn test_put_replaces_whole_document() {
        let mut collection = Collection::new();
        assert!(collection
            .put("a", doc(json!({ "revoked": false, "expires": 5 })))
            .is_none());

        let previous = collection.put("a", doc(json!({ "revoked": true })));

        assert_eq!(previous.unwrap().get("expires"), Some(&json!(5)));
        assert_eq!(
            collection.find_by_id("a"),
            Some(doc(json!({ "revoked": true })))
        );
        assert_eq!(collection.ids(), vec!["a".to_string()]);
    }
}
