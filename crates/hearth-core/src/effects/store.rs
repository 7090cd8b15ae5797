//! Token store effect
//!
//! Each method is a single-record read or write that the backend performs atomically.
//! Nothing here spans records: a chain walk is a sequence of independent reads, and a
//! concurrent revoke of an ancestor mid-walk may or may not be observed.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::Result;
use crate::identifiers::{NotificationId, TokenId};
use crate::token::CapabilityToken;

/// Durable keyed storage of capability-token records
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Point lookup by id
    async fn get(&self, id: &TokenId) -> Result<Option<CapabilityToken>>;

    /// Insert a new record; fails if the id is already taken
    async fn insert(&self, token: &CapabilityToken) -> Result<()>;

    /// `$unset` the `expiresIfUnused` field. Clearing an already-cleared field is a no-op.
    async fn clear_expires_if_unused(&self, id: &TokenId) -> Result<()>;

    /// Mark revoked. Returns whether a record existed.
    async fn revoke(&self, id: &TokenId) -> Result<bool>;

    /// Delete the record. Returns whether a record existed.
    async fn remove(&self, id: &TokenId) -> Result<bool>;

    /// Whether any stored token is a handle for this notification
    async fn references_notification(&self, notification: &NotificationId) -> Result<bool>;
}

#[async_trait]
impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    async fn get(&self, id: &TokenId) -> Result<Option<CapabilityToken>> {
        (**self).get(id).await
    }

    async fn insert(&self, token: &CapabilityToken) -> Result<()> {
        (**self).insert(token).await
    }

    async fn clear_expires_if_unused(&self, id: &TokenId) -> Result<()> {
        (**self).clear_expires_if_unused(id).await
    }

    async fn revoke(&self, id: &TokenId) -> Result<bool> {
        (**self).revoke(id).await
    }

    async fn remove(&self, id: &TokenId) -> Result<bool> {
        (**self).remove(id).await
    }

    async fn references_notification(&self, notification: &NotificationId) -> Result<bool> {
        (**self).references_notification(notification).await
    }
}
