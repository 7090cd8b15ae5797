//! Capability token data model
//!
//! A [`CapabilityToken`] is the persisted half of a capability. It is keyed by
//! `id = hash(secret)`; the secret itself is never stored. Tokens form singly-linked
//! delegation chains through [`TokenOrigin::Child`], ending at a root whose
//! [`TokenKind`] decides what a restore actually produces.
//!
//! Owner, kind and requirement are explicit sum types so that every dispatch point is an
//! exhaustive `match`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identifiers::{GrainId, IdentityId, NotificationId, TokenId, UserId};
use crate::permissions::PermissionSet;
use crate::time::PhysicalTime;

/// Display text supplied by an application, with its untranslated default.
///
/// Translations and substitution arguments may be stored alongside; only the default text is
/// read here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    /// Text shown when no translation applies
    pub default_text: String,
}

impl LocalizedText {
    /// Text with only a default
    pub fn new(default_text: impl Into<String>) -> Self {
        Self {
            default_text: default_text.into(),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Who may present a token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Owner {
    /// A human user, with the title they see the capability under
    #[serde(rename_all = "camelCase")]
    User {
        /// Owning user
        user_id: UserId,
        /// Display title chosen by (or defaulted for) the user
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// A grain, optionally recording the identity that introduced the capability to it
    #[serde(rename_all = "camelCase")]
    Grain {
        /// Owning grain
        grain_id: GrainId,
        /// Identity whose permissions bound what the grain may do with the capability
        #[serde(default, skip_serializing_if = "Option::is_none")]
        introducer_identity: Option<IdentityId>,
        /// Label the grain saved the capability under
        #[serde(default, skip_serializing_if = "Option::is_none")]
        save_label: Option<LocalizedText>,
    },
    /// The platform frontend itself
    Frontend,
    /// A web key handed out to an external client
    Webkey,
}

impl Owner {
    /// A user owner without a title
    pub fn user(user_id: impl Into<UserId>) -> Self {
        Self::User {
            user_id: user_id.into(),
            title: None,
        }
    }

    /// A user owner with an explicit title
    pub fn titled_user(user_id: impl Into<UserId>, title: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
            title: Some(title.into()),
        }
    }

    /// A grain owner with no introducer
    pub fn grain(grain_id: impl Into<GrainId>) -> Self {
        Self::Grain {
            grain_id: grain_id.into(),
            introducer_identity: None,
            save_label: None,
        }
    }

    /// A grain owner introduced by `identity`
    pub fn introduced_grain(grain_id: impl Into<GrainId>, identity: impl Into<IdentityId>) -> Self {
        Self::Grain {
            grain_id: grain_id.into(),
            introducer_identity: Some(identity.into()),
            save_label: None,
        }
    }

    /// Whether a human user owns the token
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    /// Variant name, for logs and error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Grain { .. } => "grain",
            Self::Frontend => "frontend",
            Self::Webkey => "webkey",
        }
    }
}

/// Structural predicate over [`Owner`] supplied by the party presenting a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerPattern {
    /// Honor any owner
    Any,
    /// Any user-owned token
    AnyUser,
    /// Tokens owned by this user
    User(UserId),
    /// Any grain-owned token
    AnyGrain,
    /// Tokens owned by this grain
    Grain(GrainId),
    /// Tokens owned by the frontend
    Frontend,
    /// Tokens owned by a web key
    Webkey,
}

impl OwnerPattern {
    /// Whether `owner` has the shape this pattern accepts
    pub fn matches(&self, owner: &Owner) -> bool {
        match (self, owner) {
            (Self::Any, _) => true,
            (Self::AnyUser, Owner::User { .. }) => true,
            (Self::User(expected), Owner::User { user_id, .. }) => expected == user_id,
            (Self::AnyGrain, Owner::Grain { .. }) => true,
            (Self::Grain(expected), Owner::Grain { grain_id, .. }) => expected == grain_id,
            (Self::Frontend, Owner::Frontend) => true,
            (Self::Webkey, Owner::Webkey) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OwnerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::AnyUser => f.write_str("user"),
            Self::User(user_id) => write!(f, "user:{user_id}"),
            Self::AnyGrain => f.write_str("grain"),
            Self::Grain(grain_id) => write!(f, "grain:{grain_id}"),
            Self::Frontend => f.write_str("frontend"),
            Self::Webkey => f.write_str("webkey"),
        }
    }
}

/// A membrane requirement: a predicate that must currently hold for a restore to succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Requirement {
    /// The referenced token's own stored requirements must hold
    TokenValid(TokenId),
    /// The identity must currently hold at least these permissions on the grain
    #[serde(rename_all = "camelCase")]
    PermissionsHeld {
        /// Grain the permissions are computed for
        grain_id: GrainId,
        /// Identity whose permissions are computed
        identity_id: IdentityId,
        /// Flags that must all be held
        permissions: PermissionSet,
    },
    /// The user must currently be an administrator
    UserIsAdmin(UserId),
}

impl Requirement {
    /// Every tag a stored requirement may carry
    pub const TAGS: &'static [&'static str] = &["tokenValid", "permissionsHeld", "userIsAdmin"];

    /// Stored tag of this requirement
    pub fn tag(&self) -> &'static str {
        match self {
            Self::TokenValid(_) => "tokenValid",
            Self::PermissionsHeld { .. } => "permissionsHeld",
            Self::UserIsAdmin(_) => "userIsAdmin",
        }
    }
}

/// Locally synthesized pseudo-capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrontendRef {
    /// Handle keeping a notification alive
    NotificationHandle(NotificationId),
    /// Raw IP network access
    IpNetwork,
    /// Raw IP interface (listening) access
    IpInterface,
    /// Verifier that checks presented `VerifiedEmail` capabilities
    EmailVerifier {
        /// Login services this verifier is restricted to; `None` accepts every service
        #[serde(default, skip_serializing_if = "Option::is_none")]
        services: Option<Vec<String>>,
    },
    /// Proof that a user verified an address in a given browser tab
    #[serde(rename_all = "camelCase")]
    VerifiedEmail {
        /// Token id (base64) of the verifier that issued this proof
        verifier_id: String,
        /// Hex id of the tab that performed the verification
        tab_id: String,
        /// Verified address
        address: String,
    },
}

impl FrontendRef {
    /// Every tag a stored frontend ref may carry
    pub const TAGS: &'static [&'static str] = &[
        "notificationHandle",
        "ipNetwork",
        "ipInterface",
        "emailVerifier",
        "verifiedEmail",
    ];
}

/// Object exported by a grain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectId {
    /// Wake lock held on behalf of an ongoing notification
    WakeLockNotification(u32),
    /// Application-defined reference bytes
    AppRef(Vec<u8>),
}

impl ObjectId {
    /// Every tag a stored object id may carry
    pub const TAGS: &'static [&'static str] = &["wakeLockNotification", "appRef"];
}

/// Grain root-interface context, denormalized onto view tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrainView {
    /// Grain whose root interface is denoted
    pub grain_id: GrainId,
    /// Identity the view acts for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_id: Option<IdentityId>,
    /// Petname the holder knows the grain by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub petname: Option<String>,
}

impl GrainView {
    /// A view with no identity context
    pub fn new(grain_id: impl Into<GrainId>) -> Self {
        Self {
            grain_id: grain_id.into(),
            identity_id: None,
            petname: None,
        }
    }
}

/// What a root token denotes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// Pseudo-capability synthesized by the core
    FrontendRef(FrontendRef),
    /// Capability exported by a specific grain
    #[serde(rename_all = "camelCase")]
    Object {
        /// Exporting grain
        grain_id: GrainId,
        /// Object within that grain
        object_id: ObjectId,
    },
    /// A grain's root interface
    View(GrainView),
}

impl TokenKind {
    /// Variant name, for logs and error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::FrontendRef(_) => "frontendRef",
            Self::Object { .. } => "object",
            Self::View(_) => "view",
        }
    }
}

/// How a token relates to the rest of its delegation chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenOrigin {
    /// Terminal record; its kind is what gets restored
    Root(TokenKind),
    /// Derived record, trusted transitively through its parent
    #[serde(rename_all = "camelCase")]
    Child {
        /// Id of the parent record
        parent: TokenId,
        /// View context copied down by the view-minting subsystem
        #[serde(default, skip_serializing_if = "Option::is_none")]
        grain_view: Option<GrainView>,
    },
}

/// The persisted capability record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityToken {
    /// `hash(secret)`
    pub id: TokenId,
    /// Who may present this token
    pub owner: Owner,
    /// Root kind or parent link
    pub origin: TokenOrigin,
    /// Conjunctive membrane requirements
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// Monotonic: never goes back to false
    #[serde(default)]
    pub revoked: bool,
    /// Absolute deadline
    #[serde(default)]
    pub expires: Option<PhysicalTime>,
    /// Deadline cleared by the first successful restore
    #[serde(default)]
    pub expires_if_unused: Option<PhysicalTime>,
    /// Creation stamp
    pub created: PhysicalTime,
}

impl CapabilityToken {
    /// A root token of `kind`
    pub fn root(
        id: TokenId,
        kind: TokenKind,
        owner: Owner,
        requirements: Vec<Requirement>,
        created: PhysicalTime,
    ) -> Self {
        Self {
            id,
            owner,
            origin: TokenOrigin::Root(kind),
            requirements,
            revoked: false,
            expires: None,
            expires_if_unused: None,
            created,
        }
    }

    /// A child token delegating through `parent`
    pub fn child(
        id: TokenId,
        parent: TokenId,
        owner: Owner,
        requirements: Vec<Requirement>,
        created: PhysicalTime,
    ) -> Self {
        Self {
            id,
            owner,
            origin: TokenOrigin::Child {
                parent,
                grain_view: None,
            },
            requirements,
            revoked: false,
            expires: None,
            expires_if_unused: None,
            created,
        }
    }

    /// Set an absolute deadline
    pub fn with_expires(mut self, expires: PhysicalTime) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Set a deadline that the first restore clears
    pub fn with_expires_if_unused(mut self, deadline: PhysicalTime) -> Self {
        self.expires_if_unused = Some(deadline);
        self
    }

    /// Parent id, if this is a child
    pub fn parent(&self) -> Option<TokenId> {
        match &self.origin {
            TokenOrigin::Root(_) => None,
            TokenOrigin::Child { parent, .. } => Some(*parent),
        }
    }

    /// Kind, if this is a root
    pub fn kind(&self) -> Option<&TokenKind> {
        match &self.origin {
            TokenOrigin::Root(kind) => Some(kind),
            TokenOrigin::Child { .. } => None,
        }
    }

    /// Grain root-interface context, either as root kind or as denormalized child fields
    pub fn grain_view(&self) -> Option<&GrainView> {
        match &self.origin {
            TokenOrigin::Root(TokenKind::View(view)) => Some(view),
            TokenOrigin::Root(_) => None,
            TokenOrigin::Child { grain_view, .. } => grain_view.as_ref(),
        }
    }

    /// The notification this token keeps alive, if it is a notification handle root
    pub fn notification_handle(&self) -> Option<&NotificationId> {
        match &self.origin {
            TokenOrigin::Root(TokenKind::FrontendRef(FrontendRef::NotificationHandle(id))) => {
                Some(id)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(seed: u8) -> TokenId {
        TokenId::from_bytes([seed; 32])
    }

    #[test]
    fn test_owner_pattern_matching() {
        let grain_owner = Owner::introduced_grain("g1", "alice-identity");
        assert!(OwnerPattern::Any.matches(&grain_owner));
        assert!(OwnerPattern::AnyGrain.matches(&grain_owner));
        assert!(OwnerPattern::Grain("g1".into()).matches(&grain_owner));
        assert!(!OwnerPattern::Grain("g2".into()).matches(&grain_owner));
        assert!(!OwnerPattern::Frontend.matches(&grain_owner));

        assert!(OwnerPattern::Frontend.matches(&Owner::Frontend));
        assert!(OwnerPattern::User("u1".into()).matches(&Owner::user("u1")));
        assert!(!OwnerPattern::User("u1".into()).matches(&Owner::user("u2")));
        assert!(!OwnerPattern::AnyUser.matches(&Owner::Webkey));
    }

    #[test]
    fn test_save_label_reads_default_text() {
        let owner: Owner = serde_json::from_value(serde_json::json!({
            "grain": {
                "grainId": "g",
                "saveLabel": { "defaultText": "Notes", "localizations": [] }
            }
        }))
        .unwrap();
        assert_matches::assert_matches!(owner, Owner::Grain { save_label: Some(label), .. } => {
            assert_eq!(label.default_text, "Notes");
        });
    }

    #[test]
    fn test_requirement_wire_shape() {
        let requirement = Requirement::UserIsAdmin("admin".into());
        let value = serde_json::to_value(&requirement).unwrap();
        assert_eq!(value, serde_json::json!({ "userIsAdmin": "admin" }));
        assert!(Requirement::TAGS.contains(&requirement.tag()));

        let held = Requirement::PermissionsHeld {
            grain_id: "g".into(),
            identity_id: "i".into(),
            permissions: PermissionSet::from_bits(vec![true]),
        };
        let value = serde_json::to_value(&held).unwrap();
        assert_eq!(value["permissionsHeld"]["grainId"], "g");
    }

    #[test]
    fn test_origin_accessors() {
        let root = CapabilityToken::root(
            id(1),
            TokenKind::View(GrainView::new("g")),
            Owner::user("u"),
            vec![],
            PhysicalTime::from_millis(0),
        );
        assert!(root.parent().is_none());
        assert_eq!(root.grain_view().map(|v| v.grain_id.as_str()), Some("g"));

        let child = CapabilityToken::child(
            id(2),
            id(1),
            Owner::grain("g2"),
            vec![],
            PhysicalTime::from_millis(0),
        );
        assert_eq!(child.parent(), Some(id(1)));
        assert!(child.kind().is_none());
        assert!(child.grain_view().is_none());
    }

    #[test]
    fn test_notification_handle_accessor() {
        let token = CapabilityToken::root(
            id(3),
            TokenKind::FrontendRef(FrontendRef::NotificationHandle("n1".into())),
            Owner::Frontend,
            vec![],
            PhysicalTime::from_millis(0),
        );
        assert_eq!(token.notification_handle().map(|n| n.as_str()), Some("n1"));
    }
}
