//! Persisted token record layout
//!
//! ```text
//! {
//!   "_id": "<base64 sha256(secret)>",
//!   "owner": { "grain": { "grainId": "...", "saveLabel": { "defaultText": "..." } } },
//!   "frontendRef": { "notificationHandle": "..." }        -- frontend root
//!   "frontendRef": { "ipNetwork": true }                  -- flag-style frontend root
//!   "grainId": "...", "objectId": { "appRef": [...] }     -- object root
//!   "grainId": "...", "identityId": "...", "petname": ""  -- view root
//!   "parentToken": "<base64>",                            -- child (may carry view fields)
//!   "requirements": [ { "tokenValid": "<base64>" }, ... ],
//!   "revoked": false,
//!   "expires": 1700000000000, "expiresIfUnused": 1700000000000,
//!   "created": 1700000000000
//! }
//! ```
//!
//! Payload-free variants are written as `{ "<tag>": true }` and also read back from a bare
//! `"<tag>"` string or `{ "<tag>": null }`.
//!
//! Kind and requirement tags are checked against the known sets before decoding, so a
//! record written by a newer version surfaces as `UnknownTokenKind` /
//! `UnknownRequirementKind` instead of a generic serialization failure.

use hearth_core::{
    CapabilityToken, FrontendRef, GrainId, GrainView, HearthError, ObjectId, Owner,
    PhysicalTime, Requirement, Result, TokenId, TokenKind, TokenOrigin,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::document::Document;

/// Field names of the persisted layout
pub mod fields {
    /// Primary key
    pub const ID: &str = "_id";
    /// Owner variant
    pub const OWNER: &str = "owner";
    /// Frontend pseudo-capability payload
    pub const FRONTEND_REF: &str = "frontendRef";
    /// Grain of an object or view
    pub const GRAIN_ID: &str = "grainId";
    /// Exported object
    pub const OBJECT_ID: &str = "objectId";
    /// View identity
    pub const IDENTITY_ID: &str = "identityId";
    /// View petname
    pub const PETNAME: &str = "petname";
    /// Parent link
    pub const PARENT_TOKEN: &str = "parentToken";
    /// Membrane requirements
    pub const REQUIREMENTS: &str = "requirements";
    /// Revocation flag
    pub const REVOKED: &str = "revoked";
    /// Absolute deadline
    pub const EXPIRES: &str = "expires";
    /// One-shot deadline
    pub const EXPIRES_IF_UNUSED: &str = "expiresIfUnused";
    /// Creation stamp
    pub const CREATED: &str = "created";
    /// Path used to find handles of a notification
    pub const NOTIFICATION_HANDLE_PATH: &str = "frontendRef.notificationHandle";
}

/// Encode a record into its stored document
pub fn encode_token(token: &CapabilityToken) -> Result<Document> {
    let mut document = Document::new();
    document.insert(fields::ID.into(), json!(token.id.to_base64()));
    document.insert(fields::OWNER.into(), serde_json::to_value(&token.owner)?);

    match &token.origin {
        TokenOrigin::Root(TokenKind::FrontendRef(frontend_ref)) => {
            document.insert(fields::FRONTEND_REF.into(), encode_frontend_ref(frontend_ref)?);
        }
        TokenOrigin::Root(TokenKind::Object {
            grain_id,
            object_id,
        }) => {
            document.insert(fields::GRAIN_ID.into(), json!(grain_id));
            document.insert(fields::OBJECT_ID.into(), serde_json::to_value(object_id)?);
        }
        TokenOrigin::Root(TokenKind::View(view)) => encode_view(&mut document, view),
        TokenOrigin::Child { parent, grain_view } => {
            document.insert(fields::PARENT_TOKEN.into(), json!(parent.to_base64()));
            if let Some(view) = grain_view {
                encode_view(&mut document, view);
            }
        }
    }

    document.insert(
        fields::REQUIREMENTS.into(),
        serde_json::to_value(&token.requirements)?,
    );
    document.insert(fields::REVOKED.into(), json!(token.revoked));
    if let Some(expires) = token.expires {
        document.insert(fields::EXPIRES.into(), json!(expires.ts_ms));
    }
    if let Some(deadline) = token.expires_if_unused {
        document.insert(fields::EXPIRES_IF_UNUSED.into(), json!(deadline.ts_ms));
    }
    document.insert(fields::CREATED.into(), json!(token.created.ts_ms));
    Ok(document)
}

fn encode_frontend_ref(frontend_ref: &FrontendRef) -> Result<Value> {
    match serde_json::to_value(frontend_ref)? {
        Value::String(tag) => {
            let mut flag = Document::new();
            flag.insert(tag, Value::Bool(true));
            Ok(Value::Object(flag))
        }
        other => Ok(other),
    }
}

fn encode_view(document: &mut Document, view: &GrainView) {
    document.insert(fields::GRAIN_ID.into(), json!(view.grain_id));
    if let Some(identity) = &view.identity_id {
        document.insert(fields::IDENTITY_ID.into(), json!(identity));
    }
    if let Some(petname) = &view.petname {
        document.insert(fields::PETNAME.into(), json!(petname));
    }
}

/// Decode a stored document into a record
pub fn decode_token(document: &Document) -> Result<CapabilityToken> {
    let id = TokenId::from_base64(required_str(document, fields::ID)?)?;
    let owner: Owner = decode_field(document, fields::OWNER)?;
    let origin = decode_origin(document, &id)?;

    let requirements = match document.get(fields::REQUIREMENTS) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(decode_requirement)
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(HearthError::invalid(format!(
                "token {id}: requirements must be an array, got {other}"
            )))
        }
    };

    Ok(CapabilityToken {
        id,
        owner,
        origin,
        requirements,
        revoked: document
            .get(fields::REVOKED)
            .and_then(Value::as_bool)
            .unwrap_or(false),
        expires: optional_time(document, fields::EXPIRES)?,
        expires_if_unused: optional_time(document, fields::EXPIRES_IF_UNUSED)?,
        created: optional_time(document, fields::CREATED)?
            .unwrap_or(PhysicalTime::from_millis(0)),
    })
}

fn decode_origin(document: &Document, id: &TokenId) -> Result<TokenOrigin> {
    if let Some(parent) = document.get(fields::PARENT_TOKEN) {
        let parent = parent
            .as_str()
            .ok_or_else(|| HearthError::invalid(format!("token {id}: parentToken must be a string")))?;
        let grain_view = match document.get(fields::GRAIN_ID) {
            Some(_) => Some(decode_view(document)?),
            None => None,
        };
        return Ok(TokenOrigin::Child {
            parent: TokenId::from_base64(parent)?,
            grain_view,
        });
    }

    if let Some(frontend_ref) = document.get(fields::FRONTEND_REF) {
        let frontend_ref = decode_tagged::<FrontendRef>(frontend_ref, FrontendRef::TAGS)
            .map_err(|tag| HearthError::unknown_token_kind(format!("frontendRef.{tag}")))??;
        return Ok(TokenOrigin::Root(TokenKind::FrontendRef(frontend_ref)));
    }

    if let Some(object_id) = document.get(fields::OBJECT_ID) {
        let object_id = decode_tagged::<ObjectId>(object_id, ObjectId::TAGS)
            .map_err(|tag| HearthError::unknown_token_kind(format!("objectId.{tag}")))??;
        let grain_id: GrainId = decode_field(document, fields::GRAIN_ID)?;
        return Ok(TokenOrigin::Root(TokenKind::Object {
            grain_id,
            object_id,
        }));
    }

    if document.contains_key(fields::GRAIN_ID) {
        return Ok(TokenOrigin::Root(TokenKind::View(decode_view(document)?)));
    }

    Err(HearthError::unknown_token_kind(format!(
        "token {id} has no parentToken, frontendRef, objectId or grainId"
    )))
}

fn decode_view(document: &Document) -> Result<GrainView> {
    Ok(GrainView {
        grain_id: decode_field(document, fields::GRAIN_ID)?,
        identity_id: optional_field(document, fields::IDENTITY_ID)?,
        petname: optional_field(document, fields::PETNAME)?,
    })
}

/// Decode one stored requirement, rejecting unknown tags loudly
pub fn decode_requirement(value: &Value) -> Result<Requirement> {
    decode_tagged(value, Requirement::TAGS).map_err(HearthError::unknown_requirement_kind)?
}

/// Check the single variant tag of an externally tagged value, then decode it.
///
/// The outer `Err` carries an unrecognized tag; the inner result is the decode itself.
fn decode_tagged<T: DeserializeOwned>(
    value: &Value,
    known: &[&str],
) -> std::result::Result<Result<T>, String> {
    let (tag, normalized) = match value {
        Value::String(tag) => (tag.clone(), value.clone()),
        Value::Object(map) if map.len() == 1 => match map.iter().next() {
            Some((tag, Value::Bool(true))) => (tag.clone(), Value::String(tag.clone())),
            Some((tag, _)) => (tag.clone(), value.clone()),
            None => return Err("<empty>".to_string()),
        },
        other => return Err(format!("<malformed: {other}>")),
    };
    if !known.contains(&tag.as_str()) {
        return Err(tag);
    }
    Ok(serde_json::from_value(normalized).map_err(HearthError::from))
}

fn required_str<'a>(document: &'a Document, field: &str) -> Result<&'a str> {
    document
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| HearthError::invalid(format!("missing string field {field}")))
}

fn decode_field<T: DeserializeOwned>(document: &Document, field: &str) -> Result<T> {
    let value = document
        .get(field)
        .ok_or_else(|| HearthError::invalid(format!("missing field {field}")))?;
    Ok(serde_json::from_value(value.clone())?)
}

fn optional_field<T: DeserializeOwned>(document: &Document, field: &str) -> Result<Option<T>> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
    }
}

fn optional_time(document: &Document, field: &str) -> Result<Option<PhysicalTime>> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|ts_ms| Some(PhysicalTime::from_millis(ts_ms)))
            .ok_or_else(|| HearthError::invalid(format!("{field} must be milliseconds"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use hearth_core::PermissionSet;

    fn id(seed: u8) -> TokenId {
        TokenId::from_bytes([seed; 32])
    }

    #[test]
    fn test_object_root_layout() {
        let token = CapabilityToken::root(
            id(1),
            TokenKind::Object {
                grain_id: "g1".into(),
                object_id: ObjectId::WakeLockNotification(7),
            },
            Owner::Frontend,
            vec![Requirement::UserIsAdmin("root".into())],
            PhysicalTime::from_millis(10),
        )
        .with_expires_if_unused(PhysicalTime::from_millis(99));

        let document = encode_token(&token).unwrap();
        assert_eq!(document[fields::GRAIN_ID], json!("g1"));
        assert_eq!(document[fields::OBJECT_ID], json!({ "wakeLockNotification": 7 }));
        assert_eq!(document[fields::EXPIRES_IF_UNUSED], json!(99));
        assert!(!document.contains_key(fields::EXPIRES));
        assert_eq!(decode_token(&document).unwrap(), token);
    }

    #[test]
    fn test_child_with_view_fields() {
        let mut token = CapabilityToken::child(
            id(2),
            id(1),
            Owner::titled_user("u1", "Notes"),
            vec![Requirement::PermissionsHeld {
                grain_id: "g1".into(),
                identity_id: "i1".into(),
                permissions: PermissionSet::from_bits(vec![true, false]),
            }],
            PhysicalTime::from_millis(10),
        );
        token.origin = TokenOrigin::Child {
            parent: id(1),
            grain_view: Some(GrainView {
                grain_id: "g1".into(),
                identity_id: Some("i1".into()),
                petname: Some("my notes".into()),
            }),
        };

        let document = encode_token(&token).unwrap();
        assert_eq!(document[fields::PARENT_TOKEN], json!(id(1).to_base64()));
        assert_eq!(document[fields::PETNAME], json!("my notes"));
        assert_eq!(decode_token(&document).unwrap(), token);
    }

    #[test]
    fn test_unknown_requirement_tag_is_loud() {
        assert_matches!(
            decode_requirement(&json!({ "moonIsFull": true })),
            Err(HearthError::UnknownRequirementKind { tag }) if tag == "moonIsFull"
        );
    }

    #[test]
    fn test_unknown_frontend_ref_is_unknown_kind() {
        let mut document = Document::new();
        document.insert(fields::ID.into(), json!(id(3).to_base64()));
        document.insert(fields::OWNER.into(), json!("frontend"));
        document.insert(fields::FRONTEND_REF.into(), json!({ "teleporter": {} }));
        assert_matches!(
            decode_token(&document),
            Err(HearthError::UnknownTokenKind { message }) if message.contains("teleporter")
        );
    }

    #[test]
    fn test_flag_frontend_refs() {
        let token = CapabilityToken::root(
            id(5),
            TokenKind::FrontendRef(FrontendRef::IpInterface),
            Owner::Webkey,
            Vec::new(),
            PhysicalTime::from_millis(0),
        );
        let document = encode_token(&token).unwrap();
        assert_eq!(document[fields::FRONTEND_REF], json!({ "ipInterface": true }));
        assert_eq!(decode_token(&document).unwrap(), token);

        for stored in [json!({ "ipInterface": null }), json!("ipInterface")] {
            let mut document = document.clone();
            document.insert(fields::FRONTEND_REF.into(), stored);
            assert_eq!(decode_token(&document).unwrap().origin, token.origin);
        }
    }

    #[test]
    fn test_record_without_kind_fields() {
        let mut document = Document::new();
        document.insert(fields::ID.into(), json!(id(4).to_base64()));
        document.insert(fields::OWNER.into(), json!("webkey"));
        assert_matches!(
            decode_token(&document),
            Err(HearthError::UnknownTokenKind { .. })
        );
    }
}
