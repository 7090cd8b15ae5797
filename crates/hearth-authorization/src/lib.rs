//! # Hearth Authorization - Capability Core
//!
//! **Purpose**: Exchange sturdy references for live capabilities, derive child capabilities,
//! and tear capabilities down, gated by recursively evaluated membrane requirements.
//!
//! # Architecture Constraints
//!
//! - YES restore/drop/mint protocols over the effect traits in `hearth-core`
//! - YES capability kinds synthesized by the core
//! - NO storage, clock or randomness implementations (injected through [`CoreContext`])
//! - NO ambient session state: every operation receives its secret, owner pattern and
//!   requirements explicitly
//!
//! ## Components
//!
//! - [`RequirementEvaluator`]: conjunctive, fail-closed requirement checks
//! - [`RestoreEngine`]: chain walk from a secret to its root, then [`CapabilityFactory`]
//! - [`DropEngine`]: idempotent teardown of notification handles and wake locks, revocation
//! - [`ChildTokenMinter`]: root and child token minting
//! - [`GrainCore`]: the per-grain facade handed to sandboxed applications

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod capability;
pub mod context;
pub mod drop;
pub mod factory;
pub mod grain_core;
pub mod mint;
pub mod requirements;
pub mod restore;

pub use capability::{
    Capability, EmailVerifier, IpInterface, IpNetwork, NotificationHandle, Persistent,
    PersistentUiView, SaveHandle, VerifiedEmail,
};
pub use context::{CoreContext, CoreContextBuilder};
pub use drop::DropEngine;
pub use factory::CapabilityFactory;
pub use grain_core::{CoreFactory, GrainCore};
pub use mint::{ChildTokenMinter, RootOptions};
pub use requirements::RequirementEvaluator;
pub use restore::RestoreEngine;
