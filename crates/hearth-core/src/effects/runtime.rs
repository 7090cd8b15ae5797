//! Sandboxed application runtime
//!
//! Each grain runs under a supervisor. The core asks the runtime to make sure a grain is
//! running, then delegates restore/drop of the grain's exported objects to it. Retries and
//! backoff for a grain that is starting up belong to the runtime; to the core each call is
//! one fallible operation.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::errors::{HearthError, Result};
use crate::identifiers::{GrainId, UserId};
use crate::sturdyref::Secret;
use crate::token::{ObjectId, Owner, Requirement};

/// Handle on a running grain's supervisor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SupervisorHandle {
    /// Grain the supervisor runs
    pub grain_id: GrainId,
    /// Runtime-assigned session for this activation
    pub session: u64,
}

/// Capability implemented inside a grain. The grain, not the core, owns its `save`.
#[async_trait]
pub trait HostedCapability: Send + Sync + fmt::Debug {
    /// Grain hosting the object
    fn grain_id(&self) -> &GrainId;

    /// Object the capability denotes
    fn object_id(&self) -> &ObjectId;

    /// Persist the capability for `owner`, returning the new secret
    async fn save(&self, owner: Option<Owner>) -> Result<Secret>;

    /// Ask the application to cancel an ongoing activity
    async fn cancel(&self) -> Result<()> {
        Err(HearthError::unsupported("cancel"))
    }
}

/// Supervisor of sandboxed grains
#[async_trait]
pub trait GrainRuntime: Send + Sync {
    /// Start the grain if needed and return a handle on its supervisor
    async fn ensure_active(&self, grain: &GrainId) -> Result<SupervisorHandle>;

    /// Restore an exported object; the grain enforces its own rules for `requirements`
    async fn restore(
        &self,
        handle: &SupervisorHandle,
        object_id: &ObjectId,
        requirements: &[Requirement],
        original_secret: &Secret,
    ) -> Result<Arc<dyn HostedCapability>>;

    /// Drop an exported object, e.g. release a wake lock
    async fn drop(&self, handle: &SupervisorHandle, object_id: &ObjectId) -> Result<()>;
}

/// Grain metadata the core needs
#[async_trait]
pub trait GrainDirectory: Send + Sync {
    /// User owning the grain, or `None` if the grain does not exist
    async fn owner_of(&self, grain: &GrainId) -> Result<Option<UserId>>;
}
