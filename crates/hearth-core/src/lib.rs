//! # Hearth Core - Foundation
//!
//! **Purpose**: Define the persistent-capability data model, the sturdy-reference codec, the
//! unified error type, and the effect traits for every collaborator the capability core
//! talks to.
//!
//! # Architecture Constraints
//!
//! - YES token, owner, kind and requirement types
//! - YES pure hashing and secret handling
//! - YES effect trait definitions
//! - NO effect handler implementations (`hearth-effects`, `hearth-store`)
//! - NO restore/drop/mint logic (`hearth-authorization`)
//!
//! ## Core Concepts
//!
//! - **Sturdy reference**: a bearer [`Secret`]; only its hash, the [`TokenId`], is stored
//! - **Token**: the persisted [`CapabilityToken`], a root or a child in a delegation chain
//! - **Requirement**: a [`Requirement`] that must currently hold for a restore to succeed

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod effects;
pub mod errors;
pub mod hash;
pub mod identifiers;
pub mod permissions;
pub mod sturdyref;
pub mod time;
pub mod token;

pub use config::CoreConfig;
pub use errors::{HearthError, Result};
pub use identifiers::{GrainId, IdentityId, NotificationId, TokenId, UserId};
pub use permissions::PermissionSet;
pub use sturdyref::{generate_secret, id_of, Secret};
pub use time::PhysicalTime;
pub use token::{
    CapabilityToken, FrontendRef, GrainView, LocalizedText, ObjectId, Owner, OwnerPattern,
    Requirement, TokenKind, TokenOrigin,
};
