//! The capability core as seen from inside one grain
//!
//! A grain can only restore and drop tokens it owns, mint root tokens for its own objects,
//! mint children of tokens it holds, and raise ongoing notifications for its owner.

use hearth_core::effects::{HostedCapability, Notification};
use hearth_core::{
    id_of, FrontendRef, GrainId, HearthError, NotificationId, ObjectId, Owner, OwnerPattern,
    PermissionSet, Requirement, Result, Secret,
};
use std::sync::Arc;

use crate::capability::{Capability, NotificationHandle, SaveHandle};
use crate::context::CoreContext;
use crate::drop::DropEngine;
use crate::mint::{ChildTokenMinter, RootOptions};
use crate::restore::RestoreEngine;

/// Hands out per-grain cores
#[derive(Debug, Clone)]
pub struct CoreFactory {
    ctx: CoreContext,
}

impl CoreFactory {
    /// Factory over `ctx`
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Core bound to `grain_id`
    pub fn core_for(&self, grain_id: impl Into<GrainId>) -> GrainCore {
        GrainCore {
            grain_id: grain_id.into(),
            ctx: self.ctx.clone(),
        }
    }
}

/// Capability core bound to a single grain
#[derive(Debug, Clone)]
pub struct GrainCore {
    grain_id: GrainId,
    ctx: CoreContext,
}

impl GrainCore {
    /// Grain this core acts for
    pub fn grain_id(&self) -> &GrainId {
        &self.grain_id
    }

    fn own_tokens(&self) -> OwnerPattern {
        OwnerPattern::Grain(self.grain_id.clone())
    }

    /// Restore a token owned by this grain.
    ///
    /// With `required_permissions`, the restore additionally requires that the identity
    /// which introduced the capability to this grain still holds those permissions here.
    #[tracing::instrument(skip_all, fields(grain = %self.grain_id))]
    pub async fn restore(
        &self,
        secret: &Secret,
        required_permissions: Option<PermissionSet>,
    ) -> Result<Capability> {
        let id = id_of(secret);
        let token = self
            .ctx
            .store
            .get(&id)
            .await?
            .ok_or_else(|| HearthError::not_found(id.to_base64()))?;

        let mut requirements = Vec::new();
        if let (
            Some(permissions),
            Owner::Grain {
                introducer_identity: Some(identity_id),
                ..
            },
        ) = (required_permissions, &token.owner)
        {
            requirements.push(Requirement::PermissionsHeld {
                grain_id: self.grain_id.clone(),
                identity_id: identity_id.clone(),
                permissions,
            });
        }

        RestoreEngine::new(self.ctx.clone())
            .restore(secret, &self.own_tokens(), &requirements)
            .await
    }

    /// Drop a token owned by this grain
    pub async fn drop(&self, secret: &Secret) -> Result<()> {
        DropEngine::new(self.ctx.clone())
            .drop(secret, &self.own_tokens())
            .await
    }

    /// Mint a root token for one of this grain's objects
    pub async fn make_token(
        &self,
        object_id: ObjectId,
        owner: Owner,
        requirements: Vec<Requirement>,
    ) -> Result<Secret> {
        ChildTokenMinter::new(self.ctx.clone())
            .make_object_token(
                self.grain_id.clone(),
                object_id,
                owner,
                requirements,
                RootOptions::default(),
            )
            .await
    }

    /// Mint a child of `parent`, a token this grain holds
    pub async fn make_child_token(
        &self,
        parent: &Secret,
        owner: Owner,
        requirements: Vec<Requirement>,
    ) -> Result<Secret> {
        ChildTokenMinter::new(self.ctx.clone())
            .mint(parent, owner, requirements, None)
            .await
    }

    /// Show the grain's owner an ongoing notification.
    ///
    /// `notification` is the grain's own object; saving it yields the wake-lock token that
    /// keeps the grain running while the notification is shown. The returned handle is
    /// unsaved: closing it dismisses the notification, saving it mints a handle token.
    #[tracing::instrument(skip_all, fields(grain = %self.grain_id))]
    pub async fn add_ongoing_notification(
        &self,
        caption: &str,
        notification: Arc<dyn HostedCapability>,
    ) -> Result<NotificationHandle> {
        let user_id = self
            .ctx
            .grains
            .owner_of(&self.grain_id)
            .await?
            .ok_or_else(|| HearthError::not_found(format!("grain {}", self.grain_id)))?;

        let wake_lock = notification.save(Some(Owner::Frontend)).await?;
        let notification_id = NotificationId::random();
        self.ctx
            .notifications
            .insert(Notification {
                id: notification_id.clone(),
                grain_id: self.grain_id.clone(),
                user_id,
                text: caption.to_string(),
                ongoing: Some(wake_lock),
                timestamp: self.ctx.now().await?,
                is_unread: true,
            })
            .await?;
        tracing::info!(notification = %notification_id, "added ongoing notification");

        let persistence = SaveHandle::root(
            &self.ctx,
            FrontendRef::NotificationHandle(notification_id.clone()),
        );
        Ok(NotificationHandle::new(
            notification_id,
            false,
            persistence,
            self.ctx.clone(),
        ))
    }
}
