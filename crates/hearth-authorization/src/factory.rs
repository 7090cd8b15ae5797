//! Capability factory: root kind to live capability

use hearth_core::{CapabilityToken, FrontendRef, HearthError, Requirement, Result, Secret, TokenKind};

use crate::capability::{
    Capability, EmailVerifier, IpInterface, IpNetwork, NotificationHandle, PersistentUiView,
    SaveHandle, VerifiedEmail,
};
use crate::context::CoreContext;

/// Builds the capability a root token denotes
#[derive(Debug, Clone)]
pub struct CapabilityFactory {
    ctx: CoreContext,
}

impl CapabilityFactory {
    /// Factory over `ctx`
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Build the capability for `root`, reached by restoring `original_secret`.
    ///
    /// Synthesized capabilities save as children of `original_secret` carrying
    /// `requirements`. Objects are restored inside their grain, which owns their `save`.
    pub async fn build(
        &self,
        original_secret: &Secret,
        root: CapabilityToken,
        requirements: &[Requirement],
    ) -> Result<Capability> {
        let kind = root
            .kind()
            .cloned()
            .ok_or_else(|| HearthError::invalid(format!("token {} is not a root", root.id)))?;
        let root_id = root.id;
        let save = |root: CapabilityToken| {
            SaveHandle::child(&self.ctx, original_secret.clone(), root, requirements.to_vec())
        };

        let capability = match kind {
            TokenKind::FrontendRef(FrontendRef::NotificationHandle(notification_id)) => {
                Capability::NotificationHandle(NotificationHandle::new(
                    notification_id,
                    true,
                    save(root),
                    self.ctx.clone(),
                ))
            }
            TokenKind::FrontendRef(FrontendRef::IpNetwork) => {
                Capability::IpNetwork(IpNetwork::new(save(root)))
            }
            TokenKind::FrontendRef(FrontendRef::IpInterface) => {
                Capability::IpInterface(IpInterface::new(save(root)))
            }
            TokenKind::FrontendRef(FrontendRef::EmailVerifier { services }) => {
                Capability::EmailVerifier(EmailVerifier::new(
                    save(root),
                    root_id,
                    services,
                    self.ctx.clone(),
                ))
            }
            TokenKind::FrontendRef(FrontendRef::VerifiedEmail { .. }) => {
                Capability::VerifiedEmail(VerifiedEmail::new(save(root)))
            }
            TokenKind::Object {
                grain_id,
                object_id,
            } => {
                let handle = self.ctx.runtime.ensure_active(&grain_id).await?;
                let hosted = self
                    .ctx
                    .runtime
                    .restore(&handle, &object_id, requirements, original_secret)
                    .await?;
                Capability::Hosted(hosted)
            }
            TokenKind::View(_) => Capability::UiView(PersistentUiView::new(save(root))),
        };

        tracing::debug!(root = %root_id, capability = capability.kind_name(), "built capability");
        Ok(capability)
    }
}
