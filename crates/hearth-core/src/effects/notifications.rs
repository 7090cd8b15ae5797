//! User notification store

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::identifiers::{GrainId, NotificationId, UserId};
use crate::sturdyref::Secret;
use crate::time::PhysicalTime;

/// A notification shown to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification id
    pub id: NotificationId,
    /// Grain that raised it
    pub grain_id: GrainId,
    /// User it is shown to
    pub user_id: UserId,
    /// Caption
    pub text: String,
    /// Wake-lock token held while the notification is ongoing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ongoing: Option<Secret>,
    /// When it was raised
    pub timestamp: PhysicalTime,
    /// Whether the user has not yet seen it
    pub is_unread: bool,
}

/// Storage of user notifications
#[async_trait]
pub trait NotificationEffects: Send + Sync {
    /// Store a notification
    async fn insert(&self, notification: Notification) -> Result<()>;

    /// Look up a notification
    async fn get(&self, id: &NotificationId) -> Result<Option<Notification>>;

    /// Remove a notification, returning it if it existed
    async fn remove(&self, id: &NotificationId) -> Result<Option<Notification>>;
}
