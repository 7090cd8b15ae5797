//! The per-grain core: scoped restore/drop, minting, ongoing notifications, e-mail checks

mod common;

use assert_matches::assert_matches;
use hearth_authorization::{Capability, CoreFactory, GrainCore, Persistent};
use hearth_core::effects::TokenStore;
use hearth_core::{
    FrontendRef, HearthError, ObjectId, Owner, PermissionSet, Secret, TokenKind, UserId,
};
use hearth_testkit::{TestEnvironment, TokenFixture};
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn core(env: &TestEnvironment, grain: &str) -> GrainCore {
    CoreFactory::new(common::context(env)).core_for(grain)
}

fn network() -> TokenKind {
    TokenKind::FrontendRef(FrontendRef::IpNetwork)
}

// ============================================================================
// Scoped restore and drop
// ============================================================================

#[tokio::test]
async fn test_grain_restores_only_its_own_tokens() {
    let env = TestEnvironment::new();
    let mine = TokenFixture::root("mine", network(), Owner::grain("g1"))
        .insert_into(env.store.as_ref())
        .await;
    let theirs = TokenFixture::root("theirs", network(), Owner::grain("g2"))
        .insert_into(env.store.as_ref())
        .await;
    let core = core(&env, "g1");

    assert_eq!(core.restore(&mine, None).await.unwrap().kind_name(), "ipNetwork");
    assert_matches!(
        core.restore(&theirs, None).await,
        Err(HearthError::OwnerMismatch { .. })
    );
    assert_matches!(
        core.restore(&Secret::from_text("nothing"), None).await,
        Err(HearthError::NotFound { .. })
    );
}

#[tokio::test]
async fn test_required_permissions_bind_introducer() {
    let env = TestEnvironment::new();
    let secret = TokenFixture::root("net", network(), Owner::introduced_grain("g1", "alice-id"))
        .insert_into(env.store.as_ref())
        .await;
    let core = core(&env, "g1");
    let needed = PermissionSet::with_indices(&[1]);

    assert_matches!(
        core.restore(&secret, Some(needed.clone())).await,
        Err(HearthError::RequirementsNotSatisfied { .. })
    );

    env.permissions
        .grant("g1", "alice-id", PermissionSet::with_indices(&[0, 1]));
    assert!(core.restore(&secret, Some(needed)).await.is_ok());
}

#[tokio::test]
async fn test_required_permissions_ignored_without_introducer() {
    let env = TestEnvironment::new();
    let secret = TokenFixture::root("net", network(), Owner::grain("g1"))
        .insert_into(env.store.as_ref())
        .await;

    let restored = core(&env, "g1")
        .restore(&secret, Some(PermissionSet::with_indices(&[4])))
        .await;
    assert!(restored.is_ok());
    assert_eq!(env.permissions.query_count(), 0);
}

#[tokio::test]
async fn test_grain_drops_only_its_own_tokens() {
    let env = TestEnvironment::new();
    let kind = TokenKind::FrontendRef(FrontendRef::NotificationHandle("n1".into()));
    let mine = TokenFixture::root("mine", kind.clone(), Owner::grain("g1"))
        .insert_into(env.store.as_ref())
        .await;
    let theirs = TokenFixture::root("theirs", kind, Owner::grain("g2"))
        .insert_into(env.store.as_ref())
        .await;
    let core = core(&env, "g1");

    core.drop(&mine).await.unwrap();
    assert!(env.token_for(&mine).await.is_none());
    assert_matches!(
        core.drop(&theirs).await,
        Err(HearthError::OwnerMismatch { .. })
    );
}

// ============================================================================
// Minting
// ============================================================================

#[tokio::test]
async fn test_make_token_roots_an_object_in_this_grain() {
    let env = TestEnvironment::new();
    let secret = core(&env, "g1")
        .make_token(ObjectId::AppRef(b"doc-7".to_vec()), Owner::grain("g2"), Vec::new())
        .await
        .unwrap();

    let stored = env.token_for(&secret).await.unwrap();
    assert_eq!(
        stored.kind(),
        Some(&TokenKind::Object {
            grain_id: "g1".into(),
            object_id: ObjectId::AppRef(b"doc-7".to_vec()),
        })
    );
    assert_eq!(stored.owner, Owner::grain("g2"));

    let restored = core(&env, "g2").restore(&secret, None).await.unwrap();
    assert_matches!(restored, Capability::Hosted(hosted) => {
        assert_eq!(hosted.grain_id().as_str(), "g1");
    });
}

#[tokio::test]
async fn test_make_child_token_delegates() {
    let env = TestEnvironment::new();
    let parent = TokenFixture::root("net", network(), Owner::grain("g1"))
        .insert_into(env.store.as_ref())
        .await;

    let child = core(&env, "g1")
        .make_child_token(&parent, Owner::grain("g2"), Vec::new())
        .await
        .unwrap();

    assert_eq!(
        env.token_for(&child).await.unwrap().parent(),
        Some(parent.token_id())
    );
    assert!(core(&env, "g2").restore(&child, None).await.is_ok());
}

// ============================================================================
// Ongoing notifications
// ============================================================================

#[tokio::test]
async fn test_ongoing_notification_requires_known_grain() {
    let env = TestEnvironment::new();
    let hosted = env.runtime.hosted("g1", ObjectId::WakeLockNotification(0));

    assert_matches!(
        core(&env, "g1")
            .add_ongoing_notification("Syncing", Arc::new(hosted))
            .await,
        Err(HearthError::NotFound { .. })
    );
    assert!(env.notifications.is_empty().await);
}

#[tokio::test]
async fn test_closing_unsaved_handle_dismisses_notification() {
    let env = TestEnvironment::new();
    env.grains.add_grain("g1", "alice");
    let hosted = env.runtime.hosted("g1", ObjectId::WakeLockNotification(1));

    let handle = core(&env, "g1")
        .add_ongoing_notification("Syncing photos", Arc::new(hosted))
        .await
        .unwrap();
    assert!(!handle.is_saved());

    let shown = env.notifications.for_user(&UserId::from("alice")).await;
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].text, "Syncing photos");
    assert_eq!(&shown[0].id, handle.notification_id());
    let wake_lock = shown[0].ongoing.clone().unwrap();
    assert_eq!(env.token_for(&wake_lock).await.unwrap().owner, Owner::Frontend);

    handle.close().await.unwrap();

    assert!(env.notifications.is_empty().await);
    assert_eq!(
        env.runtime.drops(),
        vec![("g1".into(), ObjectId::WakeLockNotification(1))]
    );
    assert_eq!(env.runtime.cancel_count(), 0);
}

#[tokio::test]
async fn test_saved_handle_keeps_notification_until_dropped() {
    let env = TestEnvironment::new();
    env.grains.add_grain("g1", "alice");
    let hosted = env.runtime.hosted("g1", ObjectId::WakeLockNotification(2));
    let core = core(&env, "g1");

    let handle = core
        .add_ongoing_notification("Exporting", Arc::new(hosted))
        .await
        .unwrap();
    let saved = handle.save(Owner::grain("g1")).await.unwrap();
    assert_eq!(
        env.token_for(&saved).await.unwrap().kind(),
        Some(&TokenKind::FrontendRef(FrontendRef::NotificationHandle(
            handle.notification_id().clone()
        )))
    );

    let restored = core.restore(&saved, None).await.unwrap();
    assert_matches!(&restored, Capability::NotificationHandle(again) => {
        assert!(again.is_saved());
        again.close().await.unwrap();
    });
    assert_eq!(env.notifications.len().await, 1);

    core.drop(&saved).await.unwrap();
    assert!(env.notifications.is_empty().await);
    assert_eq!(env.runtime.drops().len(), 1);
}

// ============================================================================
// E-mail verification
// ============================================================================

const TAB: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];

async fn verifier(env: &TestEnvironment, services: Option<Vec<String>>) -> Secret {
    TokenFixture::root(
        "verifier",
        TokenKind::FrontendRef(FrontendRef::EmailVerifier { services }),
        Owner::grain("g1"),
    )
    .insert_into(env.store.as_ref())
    .await
}

async fn proof(env: &TestEnvironment, verifier_id: String, tab: &[u8]) -> Secret {
    let root = TokenFixture::root(
        "proof-root",
        TokenKind::FrontendRef(FrontendRef::VerifiedEmail {
            verifier_id,
            tab_id: hex::encode(tab),
            address: "alice@example.com".to_string(),
        }),
        Owner::Frontend,
    )
    .insert_into(env.store.as_ref())
    .await;
    TokenFixture::child("proof", &root, Owner::grain("g1"))
        .insert_into(env.store.as_ref())
        .await
}

async fn verify(
    env: &TestEnvironment,
    verifier: &Secret,
    proof: &Secret,
    tab: &[u8],
) -> hearth_core::Result<String> {
    let core = core(env, "g1");
    let Capability::EmailVerifier(verifier) = core.restore(verifier, None).await? else {
        panic!("expected an email verifier");
    };
    let verification = core.restore(proof, None).await?;
    verifier.verify_email(tab, &verification).await
}

#[tokio::test]
async fn test_verifier_reads_address_from_proof() {
    let env = TestEnvironment::new();
    let verifier = verifier(&env, None).await;
    let proof = proof(&env, "anything".to_string(), &TAB).await;
    let before = env.store.token_ids().await.unwrap().len();

    let address = verify(&env, &verifier, &proof, &TAB).await.unwrap();

    assert_eq!(address, "alice@example.com");
    assert_eq!(env.store.token_ids().await.unwrap().len(), before);
}

#[tokio::test]
async fn test_verifier_rejects_other_tab() {
    let env = TestEnvironment::new();
    let verifier = verifier(&env, None).await;
    let proof = proof(&env, String::new(), &TAB).await;

    assert_matches!(
        verify(&env, &verifier, &proof, &[0, 0, 0, 0]).await,
        Err(HearthError::Invalid { .. })
    );
}

#[tokio::test]
async fn test_restricted_verifier_requires_its_own_proofs() {
    let env = TestEnvironment::new();
    let verifier = verifier(&env, Some(vec!["github".to_string()])).await;

    let foreign = proof(&env, "someone-else".to_string(), &TAB).await;
    assert_matches!(
        verify(&env, &verifier, &foreign, &TAB).await,
        Err(HearthError::Invalid { .. })
    );

    let own = TokenFixture::root(
        "own-root",
        TokenKind::FrontendRef(FrontendRef::VerifiedEmail {
            verifier_id: verifier.token_id().to_base64(),
            tab_id: hex::encode(TAB),
            address: "bob@example.com".to_string(),
        }),
        Owner::grain("g1"),
    )
    .insert_into(env.store.as_ref())
    .await;

    assert_eq!(
        verify(&env, &verifier, &own, &TAB).await.unwrap(),
        "bob@example.com"
    );
}

#[tokio::test]
async fn test_verifier_rejects_non_proof() {
    let env = TestEnvironment::new();
    let verifier = verifier(&env, None).await;
    let network = TokenFixture::root("net", network(), Owner::grain("g1"))
        .insert_into(env.store.as_ref())
        .await;

    assert_matches!(
        verify(&env, &verifier, &network, &TAB).await,
        Err(HearthError::Invalid { .. })
    );
}

#[tokio::test]
async fn test_broken_proof_chain_names_missing_link() {
    let env = TestEnvironment::new();
    let verifier_secret = verifier(&env, None).await;
    let proof_secret = proof(&env, String::new(), &TAB).await;
    let core = core(&env, "g1");
    let Capability::EmailVerifier(verifier) = core.restore(&verifier_secret, None).await.unwrap()
    else {
        panic!("expected an email verifier");
    };
    let verification = core.restore(&proof_secret, None).await.unwrap();

    let root_id = env.token_for(&proof_secret).await.unwrap().parent().unwrap();
    assert!(env.store.remove(&root_id).await.unwrap());

    assert_matches!(
        verifier.verify_email(&TAB, &verification).await,
        Err(HearthError::NotFound { token }) => assert_eq!(token, root_id.to_base64())
    );
}
