//! Host collaborators for offline use
//!
//! The CLI works on a token file with no grain supervisor, view subsystem or user database
//! behind it. [`OfflineHost`] stands in for all of them: oracles answer "no", directories are
//! empty, and anything that would need a live grain fails as unsupported.

use async_trait::async_trait;
use hearth_core::effects::{
    AdminOracle, GrainDirectory, GrainRuntime, HostedCapability, Notification,
    NotificationEffects, PermissionOracle, SupervisorHandle, ViewRights, ViewTokenMinter,
};
use hearth_core::{
    GrainId, HearthError, IdentityId, NotificationId, ObjectId, Owner, PermissionSet,
    Requirement, Result, Secret, UserId,
};
use std::sync::Arc;

/// Host with nothing running
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineHost;

impl OfflineHost {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PermissionOracle for OfflineHost {
    async fn permissions_for(
        &self,
        _grain: &GrainId,
        _identity: &IdentityId,
    ) -> Result<Option<PermissionSet>> {
        Ok(None)
    }
}

#[async_trait]
impl AdminOracle for OfflineHost {
    async fn is_admin(&self, _user: &UserId) -> Result<bool> {
        Ok(false)
    }
}

#[async_trait]
impl GrainRuntime for OfflineHost {
    async fn ensure_active(&self, grain: &GrainId) -> Result<SupervisorHandle> {
        Err(HearthError::unsupported(format!(
            "grain {grain} cannot be started offline"
        )))
    }

    async fn restore(
        &self,
        _handle: &SupervisorHandle,
        _object_id: &ObjectId,
        _requirements: &[Requirement],
        _original_secret: &Secret,
    ) -> Result<Arc<dyn HostedCapability>> {
        Err(HearthError::unsupported("no grain runtime offline"))
    }

    async fn drop(&self, _handle: &SupervisorHandle, _object_id: &ObjectId) -> Result<()> {
        Err(HearthError::unsupported("no grain runtime offline"))
    }
}

#[async_trait]
impl ViewTokenMinter for OfflineHost {
    async fn mint_view_child(
        &self,
        _original_secret: &Secret,
        grain: &GrainId,
        _petname: Option<&str>,
        _rights: ViewRights,
        _owner: Owner,
    ) -> Result<Secret> {
        Err(HearthError::unsupported(format!(
            "sharing grain {grain} needs the view subsystem"
        )))
    }
}

#[async_trait]
impl NotificationEffects for OfflineHost {
    async fn insert(&self, _notification: Notification) -> Result<()> {
        Err(HearthError::unsupported("no notification store offline"))
    }

    async fn get(&self, _id: &NotificationId) -> Result<Option<Notification>> {
        Ok(None)
    }

    async fn remove(&self, _id: &NotificationId) -> Result<Option<Notification>> {
        Ok(None)
    }
}

#[async_trait]
impl GrainDirectory for OfflineHost {
    async fn owner_of(&self, _grain: &GrainId) -> Result<Option<UserId>> {
        Ok(None)
    }
}
