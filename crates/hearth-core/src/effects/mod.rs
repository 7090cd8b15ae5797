//! Effect traits for everything the capability core consumes from outside
//!
//! The core never touches the clock, randomness, storage, or any collaborator directly.
//! Each concern is an async trait here; production handlers live in `hearth-effects` and
//! `hearth-store`, test doubles in `hearth-testkit`.
//!
//! | trait | collaborator |
//! |---|---|
//! | [`PhysicalTimeEffects`] | wall clock |
//! | [`RandomEffects`] | secure randomness |
//! | [`TokenStore`] | document database holding token records |
//! | [`PermissionOracle`], [`AdminOracle`] | permission computation, admin membership |
//! | [`GrainRuntime`], [`GrainDirectory`] | sandboxed application supervisor, grain metadata |
//! | [`ViewTokenMinter`] | view-permission / denormalization subsystem |
//! | [`NotificationEffects`] | user notification store |

pub mod notifications;
pub mod oracles;
pub mod random;
pub mod runtime;
pub mod store;
pub mod time;
pub mod views;

pub use notifications::{Notification, NotificationEffects};
pub use oracles::{AdminOracle, PermissionOracle};
pub use random::RandomEffects;
pub use runtime::{GrainDirectory, GrainRuntime, HostedCapability, SupervisorHandle};
pub use store::TokenStore;
pub use time::PhysicalTimeEffects;
pub use views::{ViewRights, ViewTokenMinter};
