//! Grain runtime double
//!
//! Records every call and hands out [`MockHostedCapability`] objects. A hosted capability
//! saves itself the way a supervisor would: by storing a root `object` token for its grain.

use async_trait::async_trait;
use hearth_core::effects::{
    GrainRuntime, HostedCapability, PhysicalTimeEffects, RandomEffects, SupervisorHandle,
    TokenStore,
};
use hearth_core::{
    generate_secret, CapabilityToken, GrainId, HearthError, ObjectId, Owner, Requirement, Result,
    Secret, TokenKind,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// One call to [`GrainRuntime::restore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreCall {
    /// Grain asked to restore
    pub grain_id: GrainId,
    /// Object restored
    pub object_id: ObjectId,
    /// Requirements passed through by the core
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Default)]
struct RuntimeLog {
    activations: Vec<GrainId>,
    restores: Vec<RestoreCall>,
    drops: Vec<(GrainId, ObjectId)>,
    unavailable: HashSet<GrainId>,
    cancel_error: Option<HearthError>,
    sessions: u64,
}

/// Grain runtime that records calls
#[derive(Clone)]
pub struct MockGrainRuntime {
    store: Arc<dyn TokenStore>,
    random: Arc<dyn RandomEffects>,
    time: Arc<dyn PhysicalTimeEffects>,
    log: Arc<Mutex<RuntimeLog>>,
    cancels: Arc<Mutex<usize>>,
}

impl std::fmt::Debug for MockGrainRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGrainRuntime")
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl MockGrainRuntime {
    /// Runtime whose hosted capabilities save into `store`
    pub fn new(
        store: Arc<dyn TokenStore>,
        random: Arc<dyn RandomEffects>,
        time: Arc<dyn PhysicalTimeEffects>,
    ) -> Self {
        Self {
            store,
            random,
            time,
            log: Arc::new(Mutex::new(RuntimeLog::default())),
            cancels: Arc::new(Mutex::new(0)),
        }
    }

    /// A hosted capability for `object_id` in `grain`, as the grain would export it
    pub fn hosted(&self, grain: impl Into<GrainId>, object_id: ObjectId) -> MockHostedCapability {
        MockHostedCapability {
            grain_id: grain.into(),
            object_id,
            runtime: self.clone(),
        }
    }

    /// Make `ensure_active` fail for `grain`
    pub fn set_unavailable(&self, grain: impl Into<GrainId>) {
        self.log.lock().unwrap().unavailable.insert(grain.into());
    }

    /// Make `cancel` on hosted capabilities fail with `error`
    pub fn fail_cancel_with(&self, error: HearthError) {
        self.log.lock().unwrap().cancel_error = Some(error);
    }

    /// Grains activated, in call order
    pub fn activations(&self) -> Vec<GrainId> {
        self.log.lock().unwrap().activations.clone()
    }

    /// Restores delegated to grains, in call order
    pub fn restores(&self) -> Vec<RestoreCall> {
        self.log.lock().unwrap().restores.clone()
    }

    /// Objects dropped, in call order
    pub fn drops(&self) -> Vec<(GrainId, ObjectId)> {
        self.log.lock().unwrap().drops.clone()
    }

    /// Number of `cancel` calls received
    pub fn cancel_count(&self) -> usize {
        *self.cancels.lock().unwrap()
    }
}

#[async_trait]
impl GrainRuntime for MockGrainRuntime {
    async fn ensure_active(&self, grain: &GrainId) -> Result<SupervisorHandle> {
        let mut log = self.log.lock().unwrap();
        if log.unavailable.contains(grain) {
            return Err(HearthError::runtime(format!("grain {grain} failed to start")));
        }
        log.activations.push(grain.clone());
        log.sessions += 1;
        Ok(SupervisorHandle {
            grain_id: grain.clone(),
            session: log.sessions,
        })
    }

    async fn restore(
        &self,
        handle: &SupervisorHandle,
        object_id: &ObjectId,
        requirements: &[Requirement],
        _original_secret: &Secret,
    ) -> Result<Arc<dyn HostedCapability>> {
        self.log.lock().unwrap().restores.push(RestoreCall {
            grain_id: handle.grain_id.clone(),
            object_id: object_id.clone(),
            requirements: requirements.to_vec(),
        });
        Ok(Arc::new(self.hosted(handle.grain_id.clone(), object_id.clone())))
    }

    async fn drop(&self, handle: &SupervisorHandle, object_id: &ObjectId) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .drops
            .push((handle.grain_id.clone(), object_id.clone()));
        Ok(())
    }
}

/// Object living inside a mock grain
#[derive(Debug, Clone)]
pub struct MockHostedCapability {
    grain_id: GrainId,
    object_id: ObjectId,
    runtime: MockGrainRuntime,
}

#[async_trait]
impl HostedCapability for MockHostedCapability {
    fn grain_id(&self) -> &GrainId {
        &self.grain_id
    }

    fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    async fn save(&self, owner: Option<Owner>) -> Result<Secret> {
        let secret = generate_secret(self.runtime.random.as_ref(), 32).await;
        let token = CapabilityToken::root(
            secret.token_id(),
            TokenKind::Object {
                grain_id: self.grain_id.clone(),
                object_id: self.object_id.clone(),
            },
            owner.unwrap_or(Owner::Frontend),
            Vec::new(),
            self.runtime.time.physical_time().await?,
        );
        self.runtime.store.insert(&token).await?;
        Ok(secret)
    }

    async fn cancel(&self) -> Result<()> {
        *self.runtime.cancels.lock().unwrap() += 1;
        match self.runtime.log.lock().unwrap().cancel_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
