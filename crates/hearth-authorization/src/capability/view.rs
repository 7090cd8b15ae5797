//! Restricted grain views

use async_trait::async_trait;
use hearth_core::{Owner, Result, Secret};

use super::{Persistent, SaveHandle};

/// A grain's root interface as seen by anything other than a human: it can be saved and
/// passed along, but exposes none of the view's methods.
#[derive(Debug, Clone)]
pub struct PersistentUiView {
    persistence: SaveHandle,
}

impl PersistentUiView {
    pub(crate) fn new(persistence: SaveHandle) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl Persistent for PersistentUiView {
    async fn save(&self, owner: Owner) -> Result<Secret> {
        self.persistence.save(owner).await
    }
}
