//! Instance lifecycle tests: add, probe, duplicate detection, and removal.

use fedaccounts::{Error, registry::RegistryError};

use crate::helpers::*;

#[tokio::test]
async fn test_add_instance_is_anonymous() {
    let t = setup_registry().await;

    t.registry.add_instance("lemmy.ml", false).await.unwrap();

    assert!(t.registry.instances().contains("lemmy.ml"));
    assert!(t.registry.is_anonymous_for("lemmy.ml"));
    assert!(t.registry.logged_in_instances().is_empty());
    assert!(!t.registry.has_any_account());
    assert_eq!(t.registry.default_username_for("lemmy.ml"), None);
    assert_eq!(t.probe.probe_count(), 1);
}

#[tokio::test]
async fn test_add_instance_skip_probe() {
    let t = setup_registry().await;
    t.probe.mark_unreachable("offline.example");

    t.registry
        .add_instance("offline.example", true)
        .await
        .unwrap();

    assert!(t.registry.instances().contains("offline.example"));
    assert_eq!(t.probe.probe_count(), 0);
}

#[tokio::test]
async fn test_add_unreachable_instance_fails() {
    let t = setup_registry().await;
    t.probe.mark_unreachable("offline.example");

    let err = t
        .registry
        .add_instance("offline.example", false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Registry(RegistryError::UnreachableInstance { .. })
    ));
    assert!(err.is_remote_error());
    assert!(t.registry.instances().is_empty());

    t.registry.flush().await;
    assert_eq!(t.store.write_count(), 0, "Failed mutation must not persist");
}

#[tokio::test]
async fn test_add_duplicate_instance_fails() {
    let t = setup_registry().await;

    t.registry.add_instance("x", false).await.unwrap();
    let after_first = t.registry.snapshot();

    let err = t.registry.add_instance("x", false).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Registry(RegistryError::DuplicateInstance { ref instance }) if instance == "x"
    ));
    assert!(err.is_conflict());
    assert_eq!(t.registry.snapshot(), after_first);
    assert_eq!(t.probe.probe_count(), 1, "Duplicate is rejected before probing");
}

#[tokio::test]
async fn test_instance_urls_are_not_normalized() {
    let t = setup_registry().await;

    t.registry.add_instance("lemmy.ml", true).await.unwrap();
    t.registry
        .add_instance("https://lemmy.ml", true)
        .await
        .unwrap();

    assert_eq!(t.registry.instances().len(), 2);
}

#[tokio::test]
async fn test_remove_instance_drops_accounts() {
    let t = setup_registry().await;
    add_instance_with_accounts(&t.registry, "lemmy.ml", &["alice", "bob"]).await;

    t.registry.remove_instance("lemmy.ml").await;

    assert!(t.registry.instances().is_empty());
    assert!(t.registry.accounts_for("lemmy.ml").is_empty());
    assert_eq!(t.registry.default_account(), None);
    assert_eq!(t.registry.default_username_for("lemmy.ml"), None);
    assert!(t.registry.snapshot().default_accounts.is_empty());
}

#[tokio::test]
async fn test_remove_unknown_instance_is_noop() {
    let t = setup_registry().await;
    add_instance_with_accounts(&t.registry, "lemmy.ml", &["alice"]).await;
    let before = t.registry.snapshot();

    t.registry.remove_instance("never-added.example").await;

    assert_eq!(t.registry.snapshot(), before);
}

#[tokio::test]
async fn test_instance_can_be_re_added_after_removal() {
    let t = setup_registry().await;
    add_instance_with_accounts(&t.registry, "lemmy.ml", &["alice"]).await;

    t.registry.remove_instance("lemmy.ml").await;
    t.registry.add_instance("lemmy.ml", false).await.unwrap();

    assert!(t.registry.is_anonymous_for("lemmy.ml"));
    assert!(t.registry.accounts_for("lemmy.ml").is_empty());
}
