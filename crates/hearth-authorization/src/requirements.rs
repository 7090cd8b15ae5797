//! Requirement evaluation
//!
//! Requirements are conjunctive and evaluated read-only. Anything that cannot be
//! affirmatively verified (a missing token, an unknown permission set) does not hold. A
//! stored requirement with an unrecognized tag fails the decode in the store and aborts
//! evaluation with `UnknownRequirementKind`.
//!
//! `tokenValid` nests: the referenced token's own requirements are evaluated in turn. The
//! evaluator tracks the tokens on the current path and stops with `CycleDetected` when a
//! token requires its own validity, and with `ChainTooDeep` past
//! `max_requirement_depth` levels.

use futures::future::{BoxFuture, FutureExt};
use hearth_core::{HearthError, Requirement, Result, TokenId};

use crate::context::CoreContext;

/// Evaluates membrane requirements against the store and the oracles
#[derive(Debug, Clone)]
pub struct RequirementEvaluator {
    ctx: CoreContext,
}

impl RequirementEvaluator {
    /// Evaluator over `ctx`
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Whether a single requirement currently holds
    pub async fn holds(&self, requirement: &Requirement) -> Result<bool> {
        self.evaluate(requirement, &[]).await
    }

    /// Whether every requirement currently holds. The empty list holds.
    pub async fn holds_all(&self, requirements: &[Requirement]) -> Result<bool> {
        for requirement in requirements {
            if !self.evaluate(requirement, &[]).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn evaluate<'a>(
        &'a self,
        requirement: &'a Requirement,
        path: &'a [TokenId],
    ) -> BoxFuture<'a, Result<bool>> {
        async move {
            match requirement {
                Requirement::TokenValid(id) => {
                    if path.contains(id) {
                        tracing::error!(token = %id, "tokenValid requirements form a cycle");
                        return Err(HearthError::cycle_detected(id.to_base64()));
                    }
                    if path.len() >= self.ctx.config.max_requirement_depth {
                        return Err(HearthError::chain_too_deep(
                            self.ctx.config.max_requirement_depth,
                        ));
                    }

                    let Some(token) = self.ctx.store.get(id).await? else {
                        tracing::debug!(token = %id, "tokenValid target missing");
                        return Ok(false);
                    };

                    let mut nested_path = path.to_vec();
                    nested_path.push(*id);
                    for nested in &token.requirements {
                        if !self.evaluate(nested, &nested_path).await? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                Requirement::PermissionsHeld {
                    grain_id,
                    identity_id,
                    permissions,
                } => {
                    let current = self
                        .ctx
                        .permissions
                        .permissions_for(grain_id, identity_id)
                        .await?;
                    Ok(current.is_some_and(|held| held.is_superset_of(permissions)))
                }
                Requirement::UserIsAdmin(user_id) => self.ctx.admins.is_admin(user_id).await,
            }
        }
        .boxed()
    }
}
