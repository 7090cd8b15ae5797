//! Hearth Testing Infrastructure
//!
//! In-memory, deterministic doubles for everything the capability core consumes: a
//! controllable clock, seeded randomness, scriptable permission and admin oracles, a grain
//! runtime that records every call, a view-minting double and a grain directory.
//! [`TestEnvironment`] wires them together over an in-memory token store.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! hearth-testkit = { path = "../hearth-testkit" }
//! ```
//!
//! ```rust,ignore
//! let env = TestEnvironment::new();
//! let secret = TokenFixture::root("s1", TokenKind::FrontendRef(FrontendRef::IpNetwork), Owner::Frontend)
//!     .insert_into(env.store.as_ref())
//!     .await;
//! ```

pub mod directory;
pub mod fixtures;
pub mod logging;
pub mod oracles;
pub mod random;
pub mod runtime;
pub mod time;
pub mod views;

pub use directory::MemoryGrainDirectory;
pub use fixtures::{TestEnvironment, TokenFixture};
pub use logging::init_test_tracing;
pub use oracles::{MockAdminOracle, MockPermissionOracle};
pub use random::DeterministicRandom;
pub use runtime::{MockGrainRuntime, MockHostedCapability, RestoreCall};
pub use time::ControllableClock;
pub use views::{MockViewMinter, ViewMintCall};
