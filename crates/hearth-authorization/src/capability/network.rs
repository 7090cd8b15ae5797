//! Raw IP pseudo-capabilities
//!
//! The core only persists these; the networking drivers that act on them live elsewhere.

use async_trait::async_trait;
use hearth_core::{Owner, Result, Secret};

use super::{Persistent, SaveHandle};

/// Raw IP network access
#[derive(Debug, Clone)]
pub struct IpNetwork {
    persistence: SaveHandle,
}

impl IpNetwork {
    pub(crate) fn new(persistence: SaveHandle) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl Persistent for IpNetwork {
    async fn save(&self, owner: Owner) -> Result<Secret> {
        self.persistence.save(owner).await
    }
}

/// Raw IP interface access
#[derive(Debug, Clone)]
pub struct IpInterface {
    persistence: SaveHandle,
}

impl IpInterface {
    pub(crate) fn new(persistence: SaveHandle) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl Persistent for IpInterface {
    async fn save(&self, owner: Owner) -> Result<Secret> {
        self.persistence.save(owner).await
    }
}
