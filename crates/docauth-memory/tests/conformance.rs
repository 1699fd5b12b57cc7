// Runs the adapter conformance suite against the in-memory store, plus
// concurrency checks that only make sense with a shared backend.

use std::sync::Arc;

use docauth::AuthAdapter;
use docauth_core::Adapter;
use docauth_memory::MemoryStore;
use docauth_test_utils::{
    generate_test_session, generate_test_user, generate_test_verification_token, run_all,
};

fn setup_adapter() -> (MemoryStore, Arc<AuthAdapter>) {
    let store = MemoryStore::new();
    let adapter = Arc::new(AuthAdapter::new(store.stores()));
    (store, adapter)
}

#[tokio::test]
async fn test_memory_conformance() {
    let (_store, adapter) = setup_adapter();
    let report = run_all("memory", &*adapter).await.unwrap();
    assert_eq!(report.passed.len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_user_creation() {
    let (_store, adapter) = setup_adapter();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let adapter = adapter.clone();
            tokio::spawn(async move { adapter.create_user(generate_test_user()).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_token_consumers_single_winner() {
    let (store, adapter) = setup_adapter();
    let token = generate_test_verification_token();
    adapter
        .create_verification_token(token.clone())
        .await
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let adapter = adapter.clone();
            let (identifier, value) = (token.identifier.clone(), token.token.clone());
            tokio::spawn(async move { adapter.use_verification_token(&identifier, &value).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(store.verification_token_count().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_duplicate_sessions_single_insert() {
    let (store, adapter) = setup_adapter();
    let user = adapter.create_user(generate_test_user()).await.unwrap();
    let session = generate_test_session(&user.id);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let adapter = adapter.clone();
            let session = session.clone();
            tokio::spawn(async move { adapter.create_session(session).await })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => inserted += 1,
            Err(e) => assert!(e.is_insert_failure(), "unexpected error: {e}"),
        }
    }
    assert_eq!(inserted, 1);
    assert_eq!(store.session_count().await, 1);
}

#[tokio::test]
async fn test_clear_resets_all_tables() {
    let (store, adapter) = setup_adapter();
    let user = adapter.create_user(generate_test_user()).await.unwrap();
    adapter
        .create_session(generate_test_session(&user.id))
        .await
        .unwrap();

    store.clear().await;

    assert_eq!(store.session_count().await, 0);
    assert!(adapter.get_user(&user.id).await.unwrap().is_none());
}
