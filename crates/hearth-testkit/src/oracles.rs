//! Scriptable permission and admin oracles

use async_trait::async_trait;
use hearth_core::effects::{AdminOracle, PermissionOracle};
use hearth_core::{GrainId, HearthError, IdentityId, PermissionSet, Result, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Permission oracle answering from a table. Unlisted pairs are "unknown".
#[derive(Debug, Clone, Default)]
pub struct MockPermissionOracle {
    table: Arc<Mutex<HashMap<(GrainId, IdentityId), PermissionSet>>>,
    failing: Arc<Mutex<bool>>,
    queries: Arc<Mutex<usize>>,
}

impl MockPermissionOracle {
    /// Empty oracle
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the permissions `identity` currently holds on `grain`
    pub fn grant(
        &self,
        grain: impl Into<GrainId>,
        identity: impl Into<IdentityId>,
        permissions: PermissionSet,
    ) {
        self.table
            .lock()
            .unwrap()
            .insert((grain.into(), identity.into()), permissions);
    }

    /// Forget `identity`'s permissions on `grain`, making them unknown
    pub fn forget(&self, grain: impl Into<GrainId>, identity: impl Into<IdentityId>) {
        self.table
            .lock()
            .unwrap()
            .remove(&(grain.into(), identity.into()));
    }

    /// Make every query fail with an oracle error
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Number of queries answered so far
    pub fn query_count(&self) -> usize {
        *self.queries.lock().unwrap()
    }
}

#[async_trait]
impl PermissionOracle for MockPermissionOracle {
    async fn permissions_for(
        &self,
        grain: &GrainId,
        identity: &IdentityId,
    ) -> Result<Option<PermissionSet>> {
        *self.queries.lock().unwrap() += 1;
        if *self.failing.lock().unwrap() {
            return Err(HearthError::oracle("permission oracle unavailable"));
        }
        Ok(self
            .table
            .lock()
            .unwrap()
            .get(&(grain.clone(), identity.clone()))
            .cloned())
    }
}

/// Admin oracle answering from a set of admins
#[derive(Debug, Clone, Default)]
pub struct MockAdminOracle {
    admins: Arc<Mutex<HashSet<UserId>>>,
}

impl MockAdminOracle {
    /// Oracle with no admins
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant or withdraw admin status
    pub fn set_admin(&self, user: impl Into<UserId>, admin: bool) {
        let mut admins = self.admins.lock().unwrap();
        let user = user.into();
        if admin {
            admins.insert(user);
        } else {
            admins.remove(&user);
        }
    }
}

#[async_trait]
impl AdminOracle for MockAdminOracle {
    async fn is_admin(&self, user: &UserId) -> Result<bool> {
        Ok(self.admins.lock().unwrap().contains(user))
    }
}
