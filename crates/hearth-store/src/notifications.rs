//! In-memory notification store

use async_lock::RwLock;
use async_trait::async_trait;
use hearth_core::effects::{Notification, NotificationEffects};
use hearth_core::{NotificationId, Result, UserId};
use std::collections::HashMap;
use std::sync::Arc;

/// Notifications kept in process memory. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotificationStore {
    notifications: Arc<RwLock<HashMap<NotificationId, Notification>>>,
}

impl MemoryNotificationStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications shown to `user`, oldest first
    pub async fn for_user(&self, user: &UserId) -> Vec<Notification> {
        let mut found: Vec<_> = self
            .notifications
            .read()
            .await
            .values()
            .filter(|n| &n.user_id == user)
            .cloned()
            .collect();
        found.sort_by_key(|n| n.timestamp);
        found
    }

    /// Number of stored notifications
    pub async fn len(&self) -> usize {
        self.notifications.read().await.len()
    }

    /// Whether no notifications are stored
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl NotificationEffects for MemoryNotificationStore {
    async fn insert(&self, notification: Notification) -> Result<()> {
        tracing::debug!(notification = %notification.id, user = %notification.user_id, "stored notification");
        self.notifications
            .write()
            .await
            .insert(notification.id.clone(), notification);
        Ok(())
    }

    async fn get(&self, id: &NotificationId) -> Result<Option<Notification>> {
        Ok(self.notifications.read().await.get(id).cloned())
    }

    async fn remove(&self, id: &NotificationId) -> Result<Option<Notification>> {
        Ok(self.notifications.write().await.remove(id))
    }
}
