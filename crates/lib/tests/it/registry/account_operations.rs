//! Account lifecycle tests: login, canonical usernames, overwrite, and removal.

use fedaccounts::{Error, registry::RegistryError, remote::AuthError};

use crate::helpers::*;

#[tokio::test]
async fn test_first_account_becomes_both_defaults() {
    let t = setup_registry().await;

    t.registry.add_instance("lemmy.ml", false).await.unwrap();
    let username = t
        .registry
        .add_account("lemmy.ml", "alice", PASSWORD)
        .await
        .unwrap();

    assert_eq!(username, "alice");
    assert_eq!(
        t.registry.instances().into_iter().collect::<Vec<_>>(),
        vec!["lemmy.ml".to_string()]
    );
    assert!(!t.registry.is_anonymous_for("lemmy.ml"));
    assert_eq!(t.registry.default_username_for("lemmy.ml").as_deref(), Some("alice"));
    assert_eq!(t.registry.default_username().as_deref(), Some("alice"));
    assert_eq!(t.registry.default_instance().as_deref(), Some("lemmy.ml"));
    assert_eq!(
        t.registry.default_credential(),
        t.registry.credential_for("lemmy.ml", "alice")
    );
    assert_eq!(
        t.registry.default_credential_for("lemmy.ml"),
        t.registry.credential_for("lemmy.ml", "alice")
    );
    assert!(t.registry.has_any_account());
}

#[tokio::test]
async fn test_account_stored_under_canonical_username() {
    let auth = FakeAuthenticator::default().with_alias("alice@mail.example", "alice");
    let t = setup_registry_with(Default::default(), auth).await;
    t.registry.add_instance("lemmy.ml", true).await.unwrap();

    let username = t
        .registry
        .add_account("lemmy.ml", "alice@mail.example", PASSWORD)
        .await
        .unwrap();

    assert_eq!(username, "alice");
    assert_eq!(t.registry.accounts_for("lemmy.ml"), vec!["alice".to_string()]);
}

#[tokio::test]
async fn test_add_account_to_unknown_instance_fails() {
    let t = setup_registry().await;

    let err = t
        .registry
        .add_account("lemmy.ml", "alice", PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Registry(RegistryError::UnknownInstance { .. })
    ));
    assert!(err.is_not_found());
    assert_eq!(t.auth.login_count(), 0, "No login attempted for unknown instance");
}

#[tokio::test]
async fn test_rejected_login_leaves_state_unchanged() {
    let t = setup_registry().await;
    add_instance_with_accounts(&t.registry, "lemmy.ml", &["alice"]).await;
    t.registry.flush().await;
    let before = t.registry.snapshot();
    let writes = t.store.write_count();

    let err = t
        .registry
        .add_account("lemmy.ml", "bob", "wrong")
        .await
        .unwrap_err();

    match err {
        Error::Registry(RegistryError::Auth {
            instance,
            source: AuthError::Rejected { reason },
        }) => {
            assert_eq!(instance, "lemmy.ml");
            assert_eq!(reason, "incorrect_login");
        }
        other => panic!("Expected rejected login, got {other:?}"),
    }
    assert_eq!(t.registry.snapshot(), before);
    t.registry.flush().await;
    assert_eq!(t.store.write_count(), writes);
}

#[tokio::test]
async fn test_failed_profile_fetch_leaves_state_unchanged() {
    let t = setup_registry().await;
    t.registry.add_instance("lemmy.ml", true).await.unwrap();
    t.auth.fail_profile(true);

    let err = t
        .registry
        .add_account("lemmy.ml", "alice", PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Registry(RegistryError::Profile { .. })));
    assert!(err.is_authentication_error());
    assert!(t.registry.is_anonymous_for("lemmy.ml"));
}

#[tokio::test]
async fn test_re_adding_account_overwrites_credential() {
    let t = setup_registry().await;
    add_instance_with_accounts(&t.registry, "lemmy.ml", &["alice"]).await;
    let first = t.registry.credential_for("lemmy.ml", "alice").unwrap();

    t.registry
        .add_account("lemmy.ml", "alice", PASSWORD)
        .await
        .unwrap();
    let second = t.registry.credential_for("lemmy.ml", "alice").unwrap();

    assert_ne!(first, second);
    assert_eq!(t.registry.accounts_for("lemmy.ml").len(), 1);
    assert_eq!(t.registry.default_credential(), Some(second));
}

#[tokio::test]
async fn test_remove_last_account_makes_instance_anonymous() {
    let t = setup_registry().await;
    add_instance_with_accounts(&t.registry, "lemmy.ml", &["alice"]).await;

    t.registry.remove_account("lemmy.ml", "alice").await;

    assert!(t.registry.instances().contains("lemmy.ml"));
    assert!(t.registry.is_anonymous_for("lemmy.ml"));
    assert!(!t.registry.has_any_account());
    assert_eq!(t.registry.default_account(), None);
    assert_eq!(t.registry.default_credential(), None);
    assert_eq!(t.registry.default_credential_for("lemmy.ml"), None);
}

#[tokio::test]
async fn test_remove_unknown_account_is_noop() {
    let t = setup_registry().await;
    add_instance_with_accounts(&t.registry, "lemmy.ml", &["alice"]).await;
    let before = t.registry.snapshot();

    t.registry.remove_account("lemmy.ml", "nobody").await;
    t.registry.remove_account("unknown.example", "alice").await;

    assert_eq!(t.registry.snapshot(), before);
}
