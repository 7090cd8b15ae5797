//! View-minting double
//!
//! Stores view children the way the permission subsystem does: as child tokens carrying the
//! grain id, identity and petname of their parent view.

use async_trait::async_trait;
use hearth_core::effects::{PhysicalTimeEffects, RandomEffects, TokenStore, ViewRights, ViewTokenMinter};
use hearth_core::{
    generate_secret, id_of, CapabilityToken, GrainId, GrainView, Owner, Result, Secret,
    TokenOrigin,
};
use std::sync::{Arc, Mutex};

/// One call to [`ViewTokenMinter::mint_view_child`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewMintCall {
    /// Grain of the parent view
    pub grain_id: GrainId,
    /// Petname passed along
    pub petname: Option<String>,
    /// Rights granted
    pub rights: ViewRights,
    /// Owner of the new child, title included
    pub owner: Owner,
}

/// View minter that records calls and writes denormalized children
#[derive(Clone)]
pub struct MockViewMinter {
    store: Arc<dyn TokenStore>,
    random: Arc<dyn RandomEffects>,
    time: Arc<dyn PhysicalTimeEffects>,
    calls: Arc<Mutex<Vec<ViewMintCall>>>,
}

impl std::fmt::Debug for MockViewMinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockViewMinter")
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

impl MockViewMinter {
    /// Minter writing into `store`
    pub fn new(
        store: Arc<dyn TokenStore>,
        random: Arc<dyn RandomEffects>,
        time: Arc<dyn PhysicalTimeEffects>,
    ) -> Self {
        Self {
            store,
            random,
            time,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Calls received, in order
    pub fn calls(&self) -> Vec<ViewMintCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ViewTokenMinter for MockViewMinter {
    async fn mint_view_child(
        &self,
        original_secret: &Secret,
        grain: &GrainId,
        petname: Option<&str>,
        rights: ViewRights,
        owner: Owner,
    ) -> Result<Secret> {
        self.calls.lock().unwrap().push(ViewMintCall {
            grain_id: grain.clone(),
            petname: petname.map(str::to_string),
            rights,
            owner: owner.clone(),
        });

        let parent_id = id_of(original_secret);
        let identity_id = self
            .store
            .get(&parent_id)
            .await?
            .and_then(|parent| parent.grain_view().and_then(|view| view.identity_id.clone()));

        let secret = generate_secret(self.random.as_ref(), 32).await;
        let mut child = CapabilityToken::child(
            secret.token_id(),
            parent_id,
            owner,
            Vec::new(),
            self.time.physical_time().await?,
        );
        child.origin = TokenOrigin::Child {
            parent: parent_id,
            grain_view: Some(GrainView {
                grain_id: grain.clone(),
                identity_id,
                petname: petname.map(str::to_string),
            }),
        };
        self.store.insert(&child).await?;
        Ok(secret)
    }
}
