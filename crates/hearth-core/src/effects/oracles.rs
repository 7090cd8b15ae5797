//! Authorization oracles consulted by requirement evaluation

use async_trait::async_trait;

use crate::errors::Result;
use crate::identifiers::{GrainId, IdentityId, UserId};
use crate::permissions::PermissionSet;

/// Computes the permissions an identity currently holds on a grain
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    /// Current permissions, or `None` when they cannot be determined
    async fn permissions_for(
        &self,
        grain: &GrainId,
        identity: &IdentityId,
    ) -> Result<Option<PermissionSet>>;
}

/// Answers whether a user is currently an administrator
#[async_trait]
pub trait AdminOracle: Send + Sync {
    /// Current admin status of `user`
    async fn is_admin(&self, user: &UserId) -> Result<bool>;
}
