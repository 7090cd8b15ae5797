//! Restore engine: sturdy reference to live capability
//!
//! Starting at `id_of(secret)`, each link of the parent chain is checked in turn:
//!
//! 1. the record exists (`NotFound`)
//! 2. it is not revoked (`Revoked`)
//! 3. its owner matches the caller's pattern, on the first link only (`OwnerMismatch`)
//! 4. its stored requirements hold (`RequirementsNotSatisfied`)
//! 5. `expires` has not lapsed, nor `expiresIfUnused` (`Expired`); a pending
//!    `expiresIfUnused` is cleared
//!
//! Parents are trusted transitively, so the caller's pattern only constrains the token
//! actually presented. The caller's extra requirements are evaluated once, against the root,
//! and the root's kind decides what gets built. The first failing link aborts the restore.
//!
//! Links are independent reads: a revoke racing with the walk may or may not be seen.

use hearth_core::{
    id_of, CapabilityToken, HearthError, OwnerPattern, Requirement, Result, Secret, TokenId,
};
use std::collections::HashSet;

use crate::capability::Capability;
use crate::context::CoreContext;
use crate::factory::CapabilityFactory;
use crate::requirements::RequirementEvaluator;

/// Turns sturdy references into live capabilities
#[derive(Debug, Clone)]
pub struct RestoreEngine {
    ctx: CoreContext,
    evaluator: RequirementEvaluator,
}

impl RestoreEngine {
    /// Engine over `ctx`
    pub fn new(ctx: CoreContext) -> Self {
        Self {
            evaluator: RequirementEvaluator::new(ctx.clone()),
            ctx,
        }
    }

    /// Restore the capability `secret` denotes.
    ///
    /// `owner_pattern` restricts which owners of the presented token the caller honors;
    /// `extra_requirements` are checked against the root and handed to the grain runtime for
    /// hosted objects.
    #[tracing::instrument(skip_all, fields(pattern = %owner_pattern))]
    pub async fn restore(
        &self,
        secret: &Secret,
        owner_pattern: &OwnerPattern,
        extra_requirements: &[Requirement],
    ) -> Result<Capability> {
        let root = self.walk_chain(id_of(secret), owner_pattern).await?;

        if !self.evaluator.holds_all(extra_requirements).await? {
            tracing::warn!(root = %root.id, "extra requirements not satisfied");
            return Err(HearthError::requirements_not_satisfied(root.id.to_base64()));
        }

        CapabilityFactory::new(self.ctx.clone())
            .build(secret, root, extra_requirements)
            .await
    }

    /// Validate every link from `leaf` to its root and return the root record
    pub async fn walk_chain(
        &self,
        leaf: TokenId,
        owner_pattern: &OwnerPattern,
    ) -> Result<CapabilityToken> {
        let now = self.ctx.now().await?;
        let max_depth = self.ctx.config.max_chain_depth;
        let mut visited = HashSet::new();
        let mut token_id = leaf;
        let relaxed = OwnerPattern::Any;
        let mut pattern = owner_pattern;

        loop {
            if !visited.insert(token_id) {
                tracing::error!(token = %token_id, "parent chain loops back on itself");
                return Err(HearthError::cycle_detected(token_id.to_base64()));
            }
            if visited.len() > max_depth + 1 {
                return Err(HearthError::chain_too_deep(max_depth));
            }

            let token = self
                .ctx
                .store
                .get(&token_id)
                .await?
                .ok_or_else(|| HearthError::not_found(token_id.to_base64()))?;
            tracing::debug!(token = %token.id, owner = token.owner.kind_name(), "visiting chain link");

            if token.revoked {
                tracing::warn!(token = %token.id, "restore of revoked token");
                return Err(HearthError::revoked(token.id.to_base64()));
            }

            if !pattern.matches(&token.owner) {
                tracing::warn!(token = %token.id, owner = token.owner.kind_name(), "owner mismatch");
                return Err(HearthError::owner_mismatch(format!(
                    "token {} is owned by a {}, caller expects {pattern}",
                    token.id,
                    token.owner.kind_name()
                )));
            }

            if !self.evaluator.holds_all(&token.requirements).await? {
                tracing::warn!(token = %token.id, "stored requirements not satisfied");
                return Err(HearthError::requirements_not_satisfied(token.id.to_base64()));
            }

            if token.expires.is_some_and(|deadline| deadline.has_lapsed_at(now)) {
                return Err(HearthError::expired(token.id.to_base64()));
            }

            if let Some(deadline) = token.expires_if_unused {
                if deadline.has_lapsed_at(now) {
                    return Err(HearthError::expired(token.id.to_base64()));
                }
                self.ctx.store.clear_expires_if_unused(&token.id).await?;
                tracing::debug!(token = %token.id, "cleared expiresIfUnused");
            }

            match token.parent() {
                Some(parent) => {
                    token_id = parent;
                    pattern = &relaxed;
                }
                None => return Ok(token),
            }
        }
    }
}
