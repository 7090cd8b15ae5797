//! E-mail verification pseudo-capabilities
//!
//! A `VerifiedEmail` root records that a user proved control of an address in a particular
//! browser tab. An `EmailVerifier` lets a grain check such a proof: the grain hands the
//! verification capability back, the verifier saves it to find the token it leads to, and
//! reads the address off the root.

use async_trait::async_trait;
use hearth_core::{
    id_of, FrontendRef, HearthError, Owner, Result, Secret, TokenId, TokenKind, TokenOrigin,
};
use std::collections::HashSet;

use super::{Persistent, SaveHandle};
use crate::context::CoreContext;

/// Checks presented `VerifiedEmail` capabilities
#[derive(Debug, Clone)]
pub struct EmailVerifier {
    persistence: SaveHandle,
    id: TokenId,
    services: Option<Vec<String>>,
    ctx: CoreContext,
}

impl EmailVerifier {
    pub(crate) fn new(
        persistence: SaveHandle,
        id: TokenId,
        services: Option<Vec<String>>,
        ctx: CoreContext,
    ) -> Self {
        Self {
            persistence,
            id,
            services,
            ctx,
        }
    }

    /// Id of the verifier's root token; `VerifiedEmail` proofs name their verifier by it
    pub fn id(&self) -> TokenId {
        self.id
    }

    /// Login services this verifier is restricted to
    pub fn services(&self) -> Option<&[String]> {
        self.services.as_deref()
    }

    /// Check `verification` and return the address it proves.
    ///
    /// The verification must lead to a `verifiedEmail` root made in tab `tab_id`. A verifier
    /// restricted to specific services additionally requires the proof to name this verifier.
    #[tracing::instrument(skip_all, fields(verifier = %self.id))]
    pub async fn verify_email<P>(&self, tab_id: &[u8], verification: &P) -> Result<String>
    where
        P: Persistent + ?Sized,
    {
        let saved = verification.save(Owner::Frontend).await?;
        let mut looked_up = id_of(&saved);
        let mut current = self.ctx.store.get(&looked_up).await?;
        self.ctx.store.remove(&looked_up).await?;

        let mut visited = HashSet::new();
        let root = loop {
            let token = current.ok_or_else(|| HearthError::not_found(looked_up.to_base64()))?;
            if !visited.insert(token.id) {
                return Err(HearthError::cycle_detected(token.id.to_base64()));
            }
            if visited.len() > self.ctx.config.max_chain_depth + 1 {
                return Err(HearthError::chain_too_deep(self.ctx.config.max_chain_depth));
            }
            match token.origin {
                TokenOrigin::Child { parent, .. } => {
                    looked_up = parent;
                    current = self.ctx.store.get(&parent).await?;
                }
                TokenOrigin::Root(kind) => break kind,
            }
        };

        let TokenKind::FrontendRef(FrontendRef::VerifiedEmail {
            verifier_id,
            tab_id: verified_tab,
            address,
        }) = root
        else {
            return Err(HearthError::invalid("not a VerifiedEmail capability"));
        };

        if verified_tab != hex::encode(tab_id) {
            tracing::warn!("verification came from a different tab");
            return Err(HearthError::invalid("VerifiedEmail is from a different tab"));
        }
        if self.services.is_some() && verifier_id != self.id.to_base64() {
            tracing::warn!("verification names a different verifier");
            return Err(HearthError::invalid(
                "VerifiedEmail is for a different EmailVerifier",
            ));
        }

        Ok(address)
    }
}

#[async_trait]
impl Persistent for EmailVerifier {
    async fn save(&self, owner: Owner) -> Result<Secret> {
        self.persistence.save(owner).await
    }
}

/// Proof that a user verified an address
#[derive(Debug, Clone)]
pub struct VerifiedEmail {
    persistence: SaveHandle,
}

impl VerifiedEmail {
    pub(crate) fn new(persistence: SaveHandle) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl Persistent for VerifiedEmail {
    async fn save(&self, owner: Owner) -> Result<Secret> {
        self.persistence.save(owner).await
    }
}
