//! Concurrent mutation tests.

use handle_trait::Handle;

use crate::helpers::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mutations_are_serialized_and_persisted_in_order() {
    let t = setup_registry().await;
    for instance in ["a.example", "b.example", "c.example"] {
        t.registry.add_instance(instance, true).await.unwrap();
    }

    let mut tasks = Vec::new();
    for i in 0..30 {
        let registry = t.registry.handle();
        tasks.push(tokio::spawn(async move {
            let instance = ["a.example", "b.example", "c.example"][i % 3];
            registry
                .add_account(instance, &format!("user{i:02}"), PASSWORD)
                .await
                .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(t.registry.snapshot().accounts.values().map(|u| u.len()).sum::<usize>(), 30);
    assert_defaults_consistent(&t.registry);

    t.registry.flush().await;
    let reopened = open_registry(t.store.clone()).await;
    assert_eq!(reopened.snapshot(), t.registry.snapshot());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_add_instance_admits_one() {
    let t = setup_registry().await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let registry = t.registry.handle();
        tasks.push(tokio::spawn(async move {
            registry.add_instance("lemmy.ml", false).await.is_ok()
        }));
    }

    let mut admitted = 0;
    for task in tasks {
        if task.await.unwrap() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(t.probe.probe_count(), 1);
}
