//! Live capabilities produced by a restore
//!
//! Every capability is [`Persistent`]: it can be saved into a new sturdy reference for a new
//! owner. Kind-specific structs get `save` by holding a [`SaveHandle`] rather than by
//! sharing a base type. Objects hosted by a grain implement their own `save` inside the
//! grain runtime.

mod email;
mod network;
mod notification;
mod view;

pub use email::{EmailVerifier, VerifiedEmail};
pub use network::{IpInterface, IpNetwork};
pub use notification::NotificationHandle;
pub use view::PersistentUiView;

use async_trait::async_trait;
use hearth_core::effects::HostedCapability;
use hearth_core::{
    CapabilityToken, FrontendRef, HearthError, Owner, Requirement, Result, Secret,
};
use std::fmt;
use std::sync::Arc;

use crate::context::CoreContext;
use crate::mint::{ChildTokenMinter, RootOptions};

/// A capability that can be saved into a new sturdy reference
#[async_trait]
pub trait Persistent: Send + Sync {
    /// Persist this capability for `owner` and return the new secret
    async fn save(&self, owner: Owner) -> Result<Secret>;
}

/// How a capability synthesized by the core saves itself
#[derive(Clone)]
pub enum SaveHandle {
    /// Mint a child of the restored token, as the restore's original holder
    Child {
        /// Minter bound to the core
        minter: ChildTokenMinter,
        /// Secret the capability was restored from
        original_secret: Secret,
        /// Root record reached by the restore
        root: Box<CapabilityToken>,
        /// Requirements the restore was made under; carried onto every child
        requirements: Vec<Requirement>,
    },
    /// Mint a fresh root, for capabilities that were never saved yet
    Root {
        /// Minter bound to the core
        minter: ChildTokenMinter,
        /// Pseudo-capability to persist
        frontend_ref: FrontendRef,
    },
}

impl SaveHandle {
    /// Save handle for a capability restored from `original_secret` through `root`
    pub fn child(
        ctx: &CoreContext,
        original_secret: Secret,
        root: CapabilityToken,
        requirements: Vec<Requirement>,
    ) -> Self {
        Self::Child {
            minter: ChildTokenMinter::new(ctx.clone()),
            original_secret,
            root: Box::new(root),
            requirements,
        }
    }

    /// Save handle minting a new `frontend_ref` root
    pub fn root(ctx: &CoreContext, frontend_ref: FrontendRef) -> Self {
        Self::Root {
            minter: ChildTokenMinter::new(ctx.clone()),
            frontend_ref,
        }
    }
}

impl fmt::Debug for SaveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Child { root, .. } => f
                .debug_struct("SaveHandle::Child")
                .field("root", &root.id)
                .finish_non_exhaustive(),
            Self::Root { frontend_ref, .. } => f
                .debug_struct("SaveHandle::Root")
                .field("frontend_ref", frontend_ref)
                .finish_non_exhaustive(),
        }
    }
}

#[async_trait]
impl Persistent for SaveHandle {
    async fn save(&self, owner: Owner) -> Result<Secret> {
        match self {
            Self::Child {
                minter,
                original_secret,
                root,
                requirements,
            } => {
                minter
                    .mint(original_secret, owner, requirements.clone(), Some(root.as_ref()))
                    .await
            }
            Self::Root {
                minter,
                frontend_ref,
            } => {
                minter
                    .save_frontend_ref(
                        frontend_ref.clone(),
                        owner,
                        Vec::new(),
                        RootOptions::default(),
                    )
                    .await
            }
        }
    }
}

/// A restored capability, one variant per kind
#[derive(Debug, Clone)]
pub enum Capability {
    /// Handle keeping a notification alive
    NotificationHandle(NotificationHandle),
    /// Raw network access
    IpNetwork(IpNetwork),
    /// Raw interface access
    IpInterface(IpInterface),
    /// E-mail verifier
    EmailVerifier(EmailVerifier),
    /// Proof of a verified address
    VerifiedEmail(VerifiedEmail),
    /// Method-restricted view of a grain's root interface
    UiView(PersistentUiView),
    /// Object restored inside a grain
    Hosted(Arc<dyn HostedCapability>),
}

impl Capability {
    /// Variant name, for logs and assertions
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::NotificationHandle(_) => "notificationHandle",
            Self::IpNetwork(_) => "ipNetwork",
            Self::IpInterface(_) => "ipInterface",
            Self::EmailVerifier(_) => "emailVerifier",
            Self::VerifiedEmail(_) => "verifiedEmail",
            Self::UiView(_) => "uiView",
            Self::Hosted(_) => "hosted",
        }
    }

    /// Ask the capability to cancel the activity it represents. Only hosted objects can.
    pub async fn cancel(&self) -> Result<()> {
        match self {
            Self::Hosted(hosted) => hosted.cancel().await,
            other => Err(HearthError::unsupported(format!(
                "{} capabilities cannot be cancelled",
                other.kind_name()
            ))),
        }
    }
}

#[async_trait]
impl Persistent for Capability {
    async fn save(&self, owner: Owner) -> Result<Secret> {
        match self {
            Self::NotificationHandle(cap) => cap.save(owner).await,
            Self::IpNetwork(cap) => cap.save(owner).await,
            Self::IpInterface(cap) => cap.save(owner).await,
            Self::EmailVerifier(cap) => cap.save(owner).await,
            Self::VerifiedEmail(cap) => cap.save(owner).await,
            Self::UiView(cap) => cap.save(owner).await,
            Self::Hosted(hosted) => hosted.save(Some(owner)).await,
        }
    }
}
