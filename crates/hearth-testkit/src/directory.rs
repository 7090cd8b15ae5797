//! Grain directory double

use async_trait::async_trait;
use hearth_core::effects::GrainDirectory;
use hearth_core::{GrainId, Result, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Grain ownership kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryGrainDirectory {
    owners: Arc<Mutex<HashMap<GrainId, UserId>>>,
}

impl MemoryGrainDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `grain` as owned by `user`
    pub fn add_grain(&self, grain: impl Into<GrainId>, user: impl Into<UserId>) {
        self.owners.lock().unwrap().insert(grain.into(), user.into());
    }
}

#[async_trait]
impl GrainDirectory for MemoryGrainDirectory {
    async fn owner_of(&self, grain: &GrainId) -> Result<Option<UserId>> {
        Ok(self.owners.lock().unwrap().get(grain).cloned())
    }
}
