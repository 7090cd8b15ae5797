//! Notification handles

use async_trait::async_trait;
use hearth_core::{NotificationId, Owner, Result, Secret};

use super::{Persistent, SaveHandle};
use crate::context::CoreContext;
use crate::drop::DropEngine;

/// Keeps a notification alive.
///
/// A handle returned straight from `add_ongoing_notification` is unsaved: closing it
/// dismisses the notification. A handle obtained by restoring a saved token does nothing on
/// close; the notification lives until its last handle token is dropped.
#[derive(Debug, Clone)]
pub struct NotificationHandle {
    notification_id: NotificationId,
    saved: bool,
    persistence: SaveHandle,
    ctx: CoreContext,
}

impl NotificationHandle {
    pub(crate) fn new(
        notification_id: NotificationId,
        saved: bool,
        persistence: SaveHandle,
        ctx: CoreContext,
    ) -> Self {
        Self {
            notification_id,
            saved,
            persistence,
            ctx,
        }
    }

    /// Notification this handle keeps alive
    pub fn notification_id(&self) -> &NotificationId {
        &self.notification_id
    }

    /// Whether the handle came from a saved token
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Release the handle
    pub async fn close(&self) -> Result<()> {
        if self.saved {
            return Ok(());
        }
        DropEngine::new(self.ctx.clone())
            .dismiss_notification(&self.notification_id, false)
            .await
    }
}

#[async_trait]
impl Persistent for NotificationHandle {
    async fn save(&self, owner: Owner) -> Result<Secret> {
        self.persistence.save(owner).await
    }
}
