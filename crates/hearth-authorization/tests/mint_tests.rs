//! Root and child minting

mod common;

use assert_matches::assert_matches;
use hearth_authorization::{ChildTokenMinter, RestoreEngine, RootOptions};
use hearth_core::effects::ViewRights;
use hearth_core::{
    FrontendRef, GrainView, HearthError, LocalizedText, Owner, OwnerPattern, Requirement, Secret, TokenKind,
    TokenOrigin,
};
use hearth_testkit::{TestEnvironment, TokenFixture, ViewMintCall};

fn minter(env: &TestEnvironment) -> ChildTokenMinter {
    ChildTokenMinter::new(common::context(env))
}

#[tokio::test]
async fn test_child_of_missing_parent_fails() {
    let env = TestEnvironment::new();
    assert_matches!(
        minter(&env)
            .mint(&Secret::from_text("ghost"), Owner::Frontend, Vec::new(), None)
            .await,
        Err(HearthError::ParentNotFound { .. })
    );
}

#[tokio::test]
async fn test_child_links_to_parent_and_keeps_requirements() {
    let env = TestEnvironment::new();
    let parent = TokenFixture::root(
        "iface",
        TokenKind::FrontendRef(FrontendRef::IpInterface),
        Owner::Frontend,
    )
    .insert_into(env.store.as_ref())
    .await;
    let requirements = vec![Requirement::UserIsAdmin("alice".into())];

    let child = minter(&env)
        .mint(&parent, Owner::grain("g1"), requirements.clone(), None)
        .await
        .unwrap();

    let stored = env.token_for(&child).await.unwrap();
    assert_eq!(stored.parent(), Some(parent.token_id()));
    assert_eq!(stored.owner, Owner::grain("g1"));
    assert_eq!(stored.requirements, requirements);
    assert_eq!(stored.created, env.clock.now());
    assert!(!stored.revoked);
    assert!(env.views.calls().is_empty());
}

#[tokio::test]
async fn test_user_may_not_own_non_view_child() {
    let env = TestEnvironment::new();
    let parent = TokenFixture::root(
        "net",
        TokenKind::FrontendRef(FrontendRef::IpNetwork),
        Owner::Frontend,
    )
    .insert_into(env.store.as_ref())
    .await;

    assert_matches!(
        minter(&env)
            .mint(&parent, Owner::user("bob"), Vec::new(), None)
            .await,
        Err(HearthError::InvalidOwnerForKind { .. })
    );
}

#[tokio::test]
async fn test_view_child_goes_through_view_subsystem() {
    let env = TestEnvironment::new();
    let view = GrainView {
        grain_id: "g1".into(),
        identity_id: Some("alice-id".into()),
        petname: Some("Budget".into()),
    };
    let parent = TokenFixture::root(
        "view",
        TokenKind::View(view),
        Owner::titled_user("alice", "Family budget"),
    )
    .insert_into(env.store.as_ref())
    .await;

    let child = minter(&env)
        .mint(&parent, Owner::user("bob"), Vec::new(), None)
        .await
        .unwrap();

    assert_eq!(
        env.views.calls(),
        vec![ViewMintCall {
            grain_id: "g1".into(),
            petname: Some("Budget".into()),
            rights: ViewRights::AllAccess,
            owner: Owner::titled_user("bob", "Family budget"),
        }]
    );
    let stored = env.token_for(&child).await.unwrap();
    assert_matches!(stored.origin, TokenOrigin::Child { parent: link, grain_view: Some(view) } => {
        assert_eq!(link, parent.token_id());
        assert_eq!(view.identity_id, Some("alice-id".into()));
    });
}

#[tokio::test]
async fn test_user_child_of_grain_held_view_takes_save_label() {
    let env = TestEnvironment::new();
    let parent = TokenFixture::root(
        "view",
        TokenKind::View(GrainView::new("g1")),
        Owner::Grain {
            grain_id: "g2".into(),
            introducer_identity: None,
            save_label: Some(LocalizedText::new("Quarterly report")),
        },
    )
    .insert_into(env.store.as_ref())
    .await;

    minter(&env)
        .mint(&parent, Owner::user("bob"), Vec::new(), None)
        .await
        .unwrap();

    let calls = env.views.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].owner, Owner::titled_user("bob", "Quarterly report"));
}

#[tokio::test]
async fn test_grandchild_of_view_is_still_a_view() {
    let env = TestEnvironment::new();
    let root = TokenFixture::root("view", TokenKind::View(GrainView::new("g1")), Owner::Webkey)
        .insert_into(env.store.as_ref())
        .await;
    let minter = minter(&env);

    let child = minter
        .mint(&root, Owner::grain("g2"), Vec::new(), None)
        .await
        .unwrap();
    minter
        .mint(&child, Owner::user("carol"), Vec::new(), None)
        .await
        .unwrap();

    assert_eq!(env.views.calls().len(), 2);
}

#[tokio::test]
async fn test_root_options_set_deadlines() {
    let env = TestEnvironment::new();
    let deadline = env.clock.now().plus_millis(5_000);
    let minter = minter(&env);

    let hard = minter
        .save_frontend_ref(
            FrontendRef::IpNetwork,
            Owner::Frontend,
            Vec::new(),
            RootOptions::expires_at(deadline),
        )
        .await
        .unwrap();
    let soft = minter
        .make_view_token(
            GrainView::new("g1"),
            Owner::user("alice"),
            Vec::new(),
            RootOptions::expires_if_unused_at(deadline),
        )
        .await
        .unwrap();

    let hard = env.token_for(&hard).await.unwrap();
    assert_eq!(hard.expires, Some(deadline));
    assert_eq!(hard.expires_if_unused, None);
    let soft = env.token_for(&soft).await.unwrap();
    assert_eq!(soft.expires, None);
    assert_eq!(soft.expires_if_unused, Some(deadline));
    assert_eq!(soft.kind(), Some(&TokenKind::View(GrainView::new("g1"))));
}

#[tokio::test]
async fn test_minted_secrets_are_distinct_and_restorable() {
    let env = TestEnvironment::new();
    let minter = minter(&env);
    let first = minter
        .save_frontend_ref(FrontendRef::IpInterface, Owner::Frontend, Vec::new(), RootOptions::default())
        .await
        .unwrap();
    let second = minter
        .save_frontend_ref(FrontendRef::IpInterface, Owner::Frontend, Vec::new(), RootOptions::default())
        .await
        .unwrap();

    assert_ne!(first, second);
    // 32 bytes of entropy as unpadded base64
    assert_eq!(first.as_text().map(str::len), Some(43));
    let restored = RestoreEngine::new(common::context(&env))
        .restore(&first, &OwnerPattern::Frontend, &[])
        .await
        .unwrap();
    assert_eq!(restored.kind_name(), "ipInterface");
}
