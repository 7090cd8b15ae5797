//! Fixtures: a wired-up environment and hand-built tokens

use hearth_core::effects::{PhysicalTimeEffects, RandomEffects, TokenStore};
use hearth_core::{
    id_of, CapabilityToken, CoreConfig, Owner, PhysicalTime, Requirement, Secret, TokenKind,
};
use hearth_store::{DocumentTokenStore, MemoryDocumentStorage, MemoryNotificationStore};
use std::sync::Arc;

use crate::directory::MemoryGrainDirectory;
use crate::oracles::{MockAdminOracle, MockPermissionOracle};
use crate::random::DeterministicRandom;
use crate::runtime::MockGrainRuntime;
use crate::time::ControllableClock;
use crate::views::MockViewMinter;

/// Every collaborator of the capability core, as in-memory doubles sharing one token store
#[derive(Debug, Clone)]
pub struct TestEnvironment {
    /// Token store over an in-memory collection
    pub store: Arc<DocumentTokenStore<MemoryDocumentStorage>>,
    /// Clock
    pub clock: Arc<ControllableClock>,
    /// Seeded randomness
    pub random: Arc<DeterministicRandom>,
    /// Permission oracle
    pub permissions: Arc<MockPermissionOracle>,
    /// Admin oracle
    pub admins: Arc<MockAdminOracle>,
    /// Grain runtime
    pub runtime: Arc<MockGrainRuntime>,
    /// View-minting subsystem
    pub views: Arc<MockViewMinter>,
    /// Notification store
    pub notifications: Arc<MemoryNotificationStore>,
    /// Grain directory
    pub grains: Arc<MemoryGrainDirectory>,
    /// Core configuration
    pub config: CoreConfig,
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnvironment {
    /// Fresh environment with the default seed and start time
    pub fn new() -> Self {
        Self::with_seed([42; 32])
    }

    /// Fresh environment with a specific random seed
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let store = Arc::new(DocumentTokenStore::in_memory());
        let clock = Arc::new(ControllableClock::default());
        let random = Arc::new(DeterministicRandom::with_seed(seed));

        let dyn_store: Arc<dyn TokenStore> = store.clone();
        let dyn_random: Arc<dyn RandomEffects> = random.clone();
        let dyn_clock: Arc<dyn PhysicalTimeEffects> = clock.clone();

        Self {
            runtime: Arc::new(MockGrainRuntime::new(
                dyn_store.clone(),
                dyn_random.clone(),
                dyn_clock.clone(),
            )),
            views: Arc::new(MockViewMinter::new(dyn_store, dyn_random, dyn_clock)),
            store,
            clock,
            random,
            permissions: Arc::new(MockPermissionOracle::new()),
            admins: Arc::new(MockAdminOracle::new()),
            notifications: Arc::new(MemoryNotificationStore::new()),
            grains: Arc::new(MemoryGrainDirectory::new()),
            config: CoreConfig::default(),
        }
    }

    /// Stored record for `secret`, if any
    pub async fn token_for(&self, secret: &Secret) -> Option<CapabilityToken> {
        self.store.get(&id_of(secret)).await.unwrap()
    }
}

/// A token built by hand, with a secret chosen by the test
#[derive(Debug, Clone)]
pub struct TokenFixture {
    secret: Secret,
    token: CapabilityToken,
}

impl TokenFixture {
    /// Root token of `kind`, known by `secret`
    pub fn root(secret: &str, kind: TokenKind, owner: Owner) -> Self {
        let secret = Secret::from_text(secret);
        let token = CapabilityToken::root(
            secret.token_id(),
            kind,
            owner,
            Vec::new(),
            PhysicalTime::from_millis(0),
        );
        Self { secret, token }
    }

    /// Child of the token known by `parent`
    pub fn child(secret: &str, parent: &Secret, owner: Owner) -> Self {
        let secret = Secret::from_text(secret);
        let token = CapabilityToken::child(
            secret.token_id(),
            parent.token_id(),
            owner,
            Vec::new(),
            PhysicalTime::from_millis(0),
        );
        Self { secret, token }
    }

    /// Add a stored requirement
    pub fn requirement(mut self, requirement: Requirement) -> Self {
        self.token.requirements.push(requirement);
        self
    }

    /// Set an absolute deadline
    pub fn expires(mut self, deadline: PhysicalTime) -> Self {
        self.token.expires = Some(deadline);
        self
    }

    /// Set a deadline cleared by the first restore
    pub fn expires_if_unused(mut self, deadline: PhysicalTime) -> Self {
        self.token.expires_if_unused = Some(deadline);
        self
    }

    /// Mark revoked
    pub fn revoked(mut self) -> Self {
        self.token.revoked = true;
        self
    }

    /// The record as it will be stored
    pub fn token(&self) -> &CapabilityToken {
        &self.token
    }

    /// Store the record and return its secret
    pub async fn insert_into(self, store: &dyn TokenStore) -> Secret {
        store.insert(&self.token).await.unwrap();
        self.secret
    }
}
