//! Command implementations over a file-backed token store

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use hearth_authorization::{ChildTokenMinter, CoreContext, DropEngine, RootOptions};
use hearth_core::effects::TokenStore;
use hearth_core::{
    generate_secret, id_of, CapabilityToken, CoreConfig, FrontendRef, Owner, OwnerPattern,
    Secret, TokenKind, TokenOrigin,
};
use hearth_effects::{RealRandomHandler, RealTimeHandler};
use hearth_store::{DocumentTokenStore, FileDocumentStorage};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::effects::OfflineHost;

pub type FileTokenStore = DocumentTokenStore<FileDocumentStorage>;

/// Root pseudo-capabilities an operator can hand to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GrantKind {
    /// Outbound network access
    IpNetwork,
    /// Inbound (listening) network access
    IpInterface,
    /// Unrestricted e-mail verifier
    EmailVerifier,
}

impl GrantKind {
    fn frontend_ref(self) -> FrontendRef {
        match self {
            Self::IpNetwork => FrontendRef::IpNetwork,
            Self::IpInterface => FrontendRef::IpInterface,
            Self::EmailVerifier => FrontendRef::EmailVerifier { services: None },
        }
    }
}

pub fn open_store(path: &Path) -> Result<Arc<FileTokenStore>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let storage = FileDocumentStorage::open(path)
        .with_context(|| format!("opening token file {}", path.display()))?;
    Ok(Arc::new(DocumentTokenStore::new(storage)))
}

/// Engine context over the token file, with real time and randomness and an offline host
pub fn context(store: Arc<FileTokenStore>, config: &CoreConfig) -> Result<CoreContext> {
    let host = Arc::new(OfflineHost::new());
    let context = CoreContext::builder()
        .with_store(store)
        .with_time(Arc::new(RealTimeHandler::new()))
        .with_random(Arc::new(RealRandomHandler::new()))
        .with_permissions(host.clone())
        .with_admins(host.clone())
        .with_runtime(host.clone())
        .with_views(host.clone())
        .with_notifications(host.clone())
        .with_grains(host)
        .with_config(config.clone())
        .build()?;
    Ok(context)
}

fn secret_text(secret: &Secret) -> Result<String> {
    match secret.as_text() {
        Some(text) => Ok(text.to_string()),
        None => bail!("generated secret is not text"),
    }
}

pub async fn new_secret(config: &CoreConfig) -> String {
    let secret = generate_secret(&RealRandomHandler::new(), config.secret_length).await;
    secret.as_text().map(str::to_string).unwrap_or_default()
}

pub fn token_id(secret: &str) -> String {
    id_of(&Secret::from_text(secret)).to_base64()
}

fn describe_owner(owner: &Owner) -> String {
    match owner {
        Owner::User { user_id, title } => match title {
            Some(title) => format!("user {user_id} ({title:?})"),
            None => format!("user {user_id}"),
        },
        Owner::Grain {
            grain_id,
            introducer_identity,
            ..
        } => match introducer_identity {
            Some(identity) => format!("grain {grain_id} via {identity}"),
            None => format!("grain {grain_id}"),
        },
        Owner::Frontend => "frontend".to_string(),
        Owner::Webkey => "webkey".to_string(),
    }
}

fn describe_link(depth: usize, token: &CapabilityToken) -> String {
    let origin = match &token.origin {
        TokenOrigin::Root(TokenKind::FrontendRef(frontend_ref)) => {
            format!("root frontendRef {frontend_ref:?}")
        }
        TokenOrigin::Root(TokenKind::Object {
            grain_id,
            object_id,
        }) => format!("root object {object_id:?} in grain {grain_id}"),
        TokenOrigin::Root(TokenKind::View(view)) => format!("root view of grain {}", view.grain_id),
        TokenOrigin::Child { parent, .. } => format!("child of {parent}"),
    };

    let mut line = format!(
        "{depth}: {} owner={} {origin} requirements={}",
        token.id,
        describe_owner(&token.owner),
        token.requirements.len()
    );
    if token.revoked {
        line.push_str(" REVOKED");
    }
    if let Some(expires) = token.expires {
        line.push_str(&format!(" expires={expires}"));
    }
    if let Some(deadline) = token.expires_if_unused {
        line.push_str(&format!(" expiresIfUnused={deadline}"));
    }
    line
}

/// One line per link, presented token first. Stops at a missing link.
pub async fn inspect(store: &FileTokenStore, config: &CoreConfig, secret: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(id_of(&Secret::from_text(secret)));

    while let Some(id) = next {
        if !visited.insert(id) {
            bail!("parent chain loops back to {id}");
        }
        if visited.len() > config.max_chain_depth + 1 {
            bail!("chain longer than {} links", config.max_chain_depth);
        }
        let Some(token) = store.get(&id).await? else {
            lines.push(format!("{}: {id} missing", lines.len()));
            break;
        };
        lines.push(describe_link(lines.len(), &token));
        next = token.parent();
    }

    Ok(lines)
}

pub async fn grant(
    store: Arc<FileTokenStore>,
    config: &CoreConfig,
    kind: GrantKind,
    user: String,
    title: Option<String>,
) -> Result<String> {
    let owner = Owner::User {
        user_id: user.into(),
        title,
    };
    let secret = ChildTokenMinter::new(context(store, config)?)
        .save_frontend_ref(kind.frontend_ref(), owner, Vec::new(), RootOptions::default())
        .await?;
    tracing::debug!(?kind, "granted root capability");
    secret_text(&secret)
}

/// Revoke whatever `secret` denotes, regardless of owner
pub async fn revoke(store: Arc<FileTokenStore>, config: &CoreConfig, secret: &str) -> Result<()> {
    DropEngine::new(context(store, config)?)
        .revoke(&Secret::from_text(secret), &OwnerPattern::Any)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use hearth_authorization::RestoreEngine;
    use hearth_core::HearthError;

    #[tokio::test]
    async fn test_grant_inspect_revoke() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let config = CoreConfig::default();

        let secret = grant(
            open_store(&path).unwrap(),
            &config,
            GrantKind::IpNetwork,
            "alice".to_string(),
            Some("Network".to_string()),
        )
        .await
        .unwrap();

        let reopened = open_store(&path).unwrap();
        let lines = inspect(&reopened, &config, &secret).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("user alice"));
        assert!(lines[0].contains("IpNetwork"));

        revoke(reopened, &config, &secret).await.unwrap();
        let lines = inspect(&open_store(&path).unwrap(), &config, &secret)
            .await
            .unwrap();
        assert!(lines[0].ends_with("REVOKED"));
    }

    #[tokio::test]
    async fn test_granted_token_restores_until_revoked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let config = CoreConfig::default();
        let store = open_store(&path).unwrap();

        let secret = grant(
            store.clone(),
            &config,
            GrantKind::EmailVerifier,
            "alice".to_string(),
            None,
        )
        .await
        .unwrap();
        let restore = RestoreEngine::new(context(store.clone(), &config).unwrap());
        let alice = OwnerPattern::User("alice".into());

        let restored = restore
            .restore(&Secret::from_text(&secret), &alice, &[])
            .await
            .unwrap();
        assert_eq!(restored.kind_name(), "emailVerifier");
        assert!(matches!(
            restore
                .restore(&Secret::from_text(&secret), &OwnerPattern::AnyGrain, &[])
                .await,
            Err(HearthError::OwnerMismatch { .. })
        ));

        revoke(store, &config, &secret).await.unwrap();
        let reopened = open_store(&path).unwrap();
        assert!(matches!(
            RestoreEngine::new(context(reopened, &config).unwrap())
                .restore(&Secret::from_text(&secret), &alice, &[])
                .await,
            Err(HearthError::Revoked { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_secret() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir.path().join("tokens.json")).unwrap();

        let lines = inspect(&store, &CoreConfig::default(), "nope").await.unwrap();
        assert_eq!(lines, vec![format!("0: {} missing", token_id("nope"))]);
        assert!(revoke(store, &CoreConfig::default(), "nope").await.is_err());
    }

    #[test]
    fn test_token_id_is_stable() {
        assert_eq!(token_id("sturdy"), token_id("sturdy"));
        assert_ne!(token_id("sturdy"), token_id("sturdier"));
    }
}
