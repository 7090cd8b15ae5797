//! Drop engine: teardown and revocation
//!
//! Dropping is defined for the ancillary capabilities the core itself hands out: notification
//! handles and wake locks. Dropping a token that does not exist succeeds, so teardown can be
//! retried. Other tokens reach the terminal state through [`DropEngine::revoke`].

use futures::future::{BoxFuture, FutureExt};
use hearth_core::{
    id_of, FrontendRef, HearthError, NotificationId, ObjectId, OwnerPattern, Result, Secret,
    TokenKind, TokenOrigin, UserId,
};

use crate::context::CoreContext;
use crate::restore::RestoreEngine;

/// Runtime failure message reported when a grain shuts down before answering
const DISCONNECTED: &str = "disconnected";

/// Drops, dismisses and revokes tokens
#[derive(Debug, Clone)]
pub struct DropEngine {
    ctx: CoreContext,
}

impl DropEngine {
    /// Engine over `ctx`
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Drop the token `secret` denotes, provided its owner matches `owner_pattern`
    #[tracing::instrument(skip_all, fields(pattern = %owner_pattern))]
    pub async fn drop(&self, secret: &Secret, owner_pattern: &OwnerPattern) -> Result<()> {
        let id = id_of(secret);
        let Some(token) = self.ctx.store.get(&id).await? else {
            tracing::debug!(token = %id, "drop of missing token");
            return Ok(());
        };

        if !owner_pattern.matches(&token.owner) {
            return Err(HearthError::owner_mismatch(format!(
                "token {id} is owned by a {}, caller expects {owner_pattern}",
                token.owner.kind_name()
            )));
        }

        match &token.origin {
            TokenOrigin::Root(TokenKind::FrontendRef(FrontendRef::NotificationHandle(
                notification,
            ))) => {
                self.ctx.store.remove(&id).await?;
                tracing::info!(token = %id, %notification, "dropped notification handle");
                if !self.ctx.store.references_notification(notification).await? {
                    self.dismiss_notification(notification, false).await?;
                }
                Ok(())
            }
            TokenOrigin::Root(TokenKind::Object {
                grain_id,
                object_id: object_id @ ObjectId::WakeLockNotification(_),
            }) => {
                let handle = self.ctx.runtime.ensure_active(grain_id).await?;
                hearth_core::effects::GrainRuntime::drop(&*self.ctx.runtime, &handle, object_id).await?;
                tracing::info!(token = %id, grain = %grain_id, "released wake lock");
                Ok(())
            }
            TokenOrigin::Root(kind) => {
                tracing::error!(token = %id, kind = kind.kind_name(), "drop undefined for kind");
                Err(HearthError::unknown_token_kind(format!(
                    "cannot drop a {} token",
                    kind.kind_name()
                )))
            }
            TokenOrigin::Child { .. } => Err(HearthError::unknown_token_kind(
                "cannot drop a child token; revoke it instead",
            )),
        }
    }

    /// Remove a notification and release what keeps it alive.
    ///
    /// An ongoing notification holds a wake-lock token. Without `call_cancel` the token is just
    /// dropped; with it, the wake lock is restored first so the application can be told to
    /// cancel after the drop. A grain that shuts down before answering the cancel is not an
    /// error.
    pub fn dismiss_notification<'a>(
        &'a self,
        notification_id: &'a NotificationId,
        call_cancel: bool,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let Some(notification) = self.ctx.notifications.remove(notification_id).await? else {
                return Ok(());
            };
            tracing::info!(notification = %notification_id, call_cancel, "dismissed notification");

            let Some(wake_lock) = notification.ongoing else {
                return Ok(());
            };

            if !call_cancel {
                return self.drop(&wake_lock, &OwnerPattern::Frontend).await;
            }

            let ongoing = RestoreEngine::new(self.ctx.clone())
                .restore(&wake_lock, &OwnerPattern::Frontend, &[])
                .await?;
            self.drop(&wake_lock, &OwnerPattern::Frontend).await?;
            match ongoing.cancel().await {
                Err(HearthError::Runtime { message }) if message.contains(DISCONNECTED) => {
                    tracing::debug!(notification = %notification_id, "grain gone before cancel returned");
                    Ok(())
                }
                other => other,
            }
        }
        .boxed()
    }

    /// Dismiss a notification on behalf of `user`, who must be the one it is shown to
    pub async fn dismiss_notification_for_user(
        &self,
        notification_id: &NotificationId,
        user: &UserId,
    ) -> Result<()> {
        let notification = self
            .ctx
            .notifications
            .get(notification_id)
            .await?
            .ok_or_else(|| HearthError::not_found(notification_id.to_string()))?;
        if &notification.user_id != user {
            return Err(HearthError::owner_mismatch(format!(
                "notification {notification_id} does not belong to {user}"
            )));
        }
        self.dismiss_notification(notification_id, true).await
    }

    /// Mark the token `secret` denotes revoked. Terminal: no later restore succeeds.
    #[tracing::instrument(skip_all, fields(pattern = %owner_pattern))]
    pub async fn revoke(&self, secret: &Secret, owner_pattern: &OwnerPattern) -> Result<()> {
        let id = id_of(secret);
        let token = self
            .ctx
            .store
            .get(&id)
            .await?
            .ok_or_else(|| HearthError::not_found(id.to_base64()))?;
        if !owner_pattern.matches(&token.owner) {
            return Err(HearthError::owner_mismatch(format!(
                "token {id} is owned by a {}, caller expects {owner_pattern}",
                token.owner.kind_name()
            )));
        }
        self.ctx.store.revoke(&id).await?;
        tracing::info!(token = %id, "revoked token");
        Ok(())
    }
}
