//! View-permission / denormalization subsystem

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::identifiers::GrainId;
use crate::sturdyref::Secret;
use crate::token::Owner;

/// Rights granted to a minted view child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewRights {
    /// Everything the parent view can do
    AllAccess,
}

/// Mints children of view tokens, denormalizing grain id, petname and title onto them
#[async_trait]
pub trait ViewTokenMinter: Send + Sync {
    /// Mint a child of the view token denoted by `original_secret` and return its secret
    async fn mint_view_child(
        &self,
        original_secret: &Secret,
        grain: &GrainId,
        petname: Option<&str>,
        rights: ViewRights,
        owner: Owner,
    ) -> Result<Secret>;
}
