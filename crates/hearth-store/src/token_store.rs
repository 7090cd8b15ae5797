//! `TokenStore` over a document collection

use async_trait::async_trait;
use hearth_core::effects::TokenStore;
use hearth_core::{CapabilityToken, NotificationId, Result, TokenId};
use serde_json::json;

use crate::codec::{decode_token, encode_token, fields};
use crate::document::{Document, DocumentStorage};
use crate::memory::MemoryDocumentStorage;

/// Token store persisting records through any [`DocumentStorage`]
#[derive(Debug, Clone)]
pub struct DocumentTokenStore<S> {
    storage: S,
}

impl<S: DocumentStorage> DocumentTokenStore<S> {
    /// Wrap a document storage
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Every stored token id
    pub async fn token_ids(&self) -> Result<Vec<TokenId>> {
        self.storage
            .ids()
            .await?
            .iter()
            .map(|id| TokenId::from_base64(id))
            .collect()
    }
}

impl DocumentTokenStore<MemoryDocumentStorage> {
    /// Token store backed by a fresh in-memory collection
    pub fn in_memory() -> Self {
        Self::new(MemoryDocumentStorage::new())
    }
}

#[async_trait]
impl<S: DocumentStorage> TokenStore for DocumentTokenStore<S> {
    async fn get(&self, id: &TokenId) -> Result<Option<CapabilityToken>> {
        match self.storage.find_by_id(&id.to_base64()).await? {
            Some(document) => decode_token(&document).map(Some),
            None => Ok(None),
        }
    }

    async fn insert(&self, token: &CapabilityToken) -> Result<()> {
        let document = encode_token(token)?;
        self.storage.insert(&token.id.to_base64(), document).await?;
        tracing::debug!(token = %token.id, owner = token.owner.kind_name(), "stored token");
        Ok(())
    }

    async fn clear_expires_if_unused(&self, id: &TokenId) -> Result<()> {
        self.storage
            .unset_fields(&id.to_base64(), &[fields::EXPIRES_IF_UNUSED])
            .await?;
        Ok(())
    }

    async fn revoke(&self, id: &TokenId) -> Result<bool> {
        let mut update = Document::new();
        update.insert(fields::REVOKED.into(), json!(true));
        self.storage.set_fields(&id.to_base64(), update).await
    }

    async fn remove(&self, id: &TokenId) -> Result<bool> {
        self.storage.delete(&id.to_base64()).await
    }

    async fn references_notification(&self, notification: &NotificationId) -> Result<bool> {
        Ok(self
            .storage
            .find_one(fields::NOTIFICATION_HANDLE_PATH, &json!(notification))
            .await?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use hearth_core::{FrontendRef, HearthError, Owner, PhysicalTime, TokenKind};

    fn handle(seed: u8, notification: &str) -> CapabilityToken {
        CapabilityToken::root(
            TokenId::from_bytes([seed; 32]),
            TokenKind::FrontendRef(FrontendRef::NotificationHandle(notification.into())),
            Owner::user("u1"),
            vec![],
            PhysicalTime::from_millis(1),
        )
        .with_expires_if_unused(PhysicalTime::from_millis(50))
    }

    #[tokio::test]
    async fn test_insert_get_and_clear() {
        let store = DocumentTokenStore::in_memory();
        let token = handle(1, "n1");
        store.insert(&token).await.unwrap();

        assert_eq!(store.get(&token.id).await.unwrap(), Some(token.clone()));

        store.clear_expires_if_unused(&token.id).await.unwrap();
        store.clear_expires_if_unused(&token.id).await.unwrap();
        let stored = store.get(&token.id).await.unwrap().unwrap();
        assert_eq!(stored.expires_if_unused, None);
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let store = DocumentTokenStore::in_memory();
        let token = handle(1, "n1");
        store.insert(&token).await.unwrap();
        assert_matches!(store.insert(&token).await, Err(HearthError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_revoke_and_remove_report_existence() {
        let store = DocumentTokenStore::in_memory();
        let token = handle(2, "n2");
        store.insert(&token).await.unwrap();

        assert!(store.revoke(&token.id).await.unwrap());
        assert!(store.get(&token.id).await.unwrap().unwrap().revoked);
        assert!(store.remove(&token.id).await.unwrap());
        assert!(!store.remove(&token.id).await.unwrap());
        assert!(!store.revoke(&token.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_references_notification() {
        let store = DocumentTokenStore::in_memory();
        store.insert(&handle(3, "n3")).await.unwrap();

        assert!(store.references_notification(&"n3".into()).await.unwrap());
        assert!(!store.references_notification(&"n4".into()).await.unwrap());
    }
}
