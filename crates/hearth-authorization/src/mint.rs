//! Token minting
//!
//! [`ChildTokenMinter::mint`] is the only sanctioned way to derive a capability from an
//! existing one. Root tokens are minted by whichever entry point first exposes a
//! capability: [`ChildTokenMinter::save_frontend_ref`] for pseudo-capabilities and
//! [`ChildTokenMinter::make_object_token`] for objects exported by a grain.

use hearth_core::effects::ViewRights;
use hearth_core::{
    id_of, CapabilityToken, FrontendRef, GrainId, GrainView, HearthError, ObjectId, Owner,
    PhysicalTime, Requirement, Result, Secret, TokenKind,
};

use crate::context::CoreContext;

/// Optional deadlines on a freshly minted root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootOptions {
    /// Absolute deadline
    pub expires: Option<PhysicalTime>,
    /// Deadline cleared by the first restore
    pub expires_if_unused: Option<PhysicalTime>,
}

impl RootOptions {
    /// Expire at `deadline` regardless of use
    pub fn expires_at(deadline: PhysicalTime) -> Self {
        Self {
            expires: Some(deadline),
            ..Self::default()
        }
    }

    /// Expire at `deadline` unless restored before then
    pub fn expires_if_unused_at(deadline: PhysicalTime) -> Self {
        Self {
            expires_if_unused: Some(deadline),
            ..Self::default()
        }
    }
}

/// Mints root and child tokens
#[derive(Debug, Clone)]
pub struct ChildTokenMinter {
    ctx: CoreContext,
}

impl ChildTokenMinter {
    /// Minter over `ctx`
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Derive a child of the token denoted by `original_secret`, owned by `owner`.
    ///
    /// `parent` is the record whose kind decides how the child is minted; it is looked up by
    /// `id_of(original_secret)` when not supplied. Children of views are minted by the view
    /// subsystem so grain id, petname and title stay denormalized; children of anything else
    /// are stored here and may not be owned by a user. Returns the child's secret.
    #[tracing::instrument(skip_all, fields(owner = owner.kind_name()))]
    pub async fn mint(
        &self,
        original_secret: &Secret,
        owner: Owner,
        requirements: Vec<Requirement>,
        parent: Option<&CapabilityToken>,
    ) -> Result<Secret> {
        let parent_id = id_of(original_secret);
        let fetched;
        let parent = match parent {
            Some(parent) => parent,
            None => {
                fetched = self
                    .ctx
                    .store
                    .get(&parent_id)
                    .await?
                    .ok_or_else(|| HearthError::parent_not_found(parent_id.to_base64()))?;
                &fetched
            }
        };

        if let Some(view) = parent.grain_view() {
            let owner = with_default_title(owner, &parent.owner);
            let secret = self
                .ctx
                .views
                .mint_view_child(
                    original_secret,
                    &view.grain_id,
                    view.petname.as_deref(),
                    ViewRights::AllAccess,
                    owner,
                )
                .await?;
            tracing::info!(parent = %parent_id, grain = %view.grain_id, "minted view child");
            return Ok(secret);
        }

        if owner.is_user() {
            return Err(HearthError::invalid_owner_for_kind(
                "only grains, the frontend or web keys may own non-view capabilities",
            ));
        }

        let secret = self.ctx.fresh_secret().await;
        let child = CapabilityToken::child(
            id_of(&secret),
            parent_id,
            owner,
            requirements,
            self.ctx.now().await?,
        );
        self.ctx.store.insert(&child).await?;
        tracing::info!(parent = %parent_id, child = %child.id, "minted child token");
        Ok(secret)
    }

    /// Mint a root token of any kind
    pub async fn mint_root(
        &self,
        kind: TokenKind,
        owner: Owner,
        requirements: Vec<Requirement>,
        options: RootOptions,
    ) -> Result<Secret> {
        let secret = self.ctx.fresh_secret().await;
        let mut token = CapabilityToken::root(
            id_of(&secret),
            kind,
            owner,
            requirements,
            self.ctx.now().await?,
        );
        token.expires = options.expires;
        token.expires_if_unused = options.expires_if_unused;

        self.ctx.store.insert(&token).await?;
        tracing::info!(
            token = %token.id,
            kind = token.kind().map_or("child", TokenKind::kind_name),
            "minted root token"
        );
        Ok(secret)
    }

    /// Mint a root pseudo-capability
    pub async fn save_frontend_ref(
        &self,
        frontend_ref: FrontendRef,
        owner: Owner,
        requirements: Vec<Requirement>,
        options: RootOptions,
    ) -> Result<Secret> {
        self.mint_root(TokenKind::FrontendRef(frontend_ref), owner, requirements, options)
            .await
    }

    /// Mint a root token for an object exported by `grain_id`
    pub async fn make_object_token(
        &self,
        grain_id: GrainId,
        object_id: ObjectId,
        owner: Owner,
        requirements: Vec<Requirement>,
        options: RootOptions,
    ) -> Result<Secret> {
        self.mint_root(
            TokenKind::Object {
                grain_id,
                object_id,
            },
            owner,
            requirements,
            options,
        )
        .await
    }

    /// Mint a root token for a grain's root interface
    pub async fn make_view_token(
        &self,
        view: GrainView,
        owner: Owner,
        requirements: Vec<Requirement>,
        options: RootOptions,
    ) -> Result<Secret> {
        self.mint_root(TokenKind::View(view), owner, requirements, options)
            .await
    }
}

/// A user owner without a title inherits the title its sharer saw the grain under.
///
/// User-to-user sharing is not a parent/child relation, so the nearest human in the sharing
/// graph is the owner of the parent record itself.
fn with_default_title(owner: Owner, parent_owner: &Owner) -> Owner {
    match owner {
        Owner::User {
            user_id,
            title: None,
        } => {
            let inherited = match parent_owner {
                Owner::User { title, .. } => title.clone(),
                Owner::Grain { save_label, .. } => {
                    save_label.as_ref().map(|label| label.default_text.clone())
                }
                Owner::Frontend | Owner::Webkey => None,
            };
            Owner::User {
                user_id,
                title: inherited,
            }
        }
        other => other,
    }
}
