//! Batch delete: all-or-nothing across ownership and existence failures.

mod common;

use grocery_core::ItemId;
use grocery_server::services::{BatchEngine, ServiceError};

use common::{item_exists, seed_account, seed_items, seed_list};
use grocery_server::db::MemoryStore;

#[tokio::test]
async fn test_foreign_item_aborts_whole_batch() {
    let store = MemoryStore::new();
    let alice = seed_account(&store, "alice").await;
    let bob = seed_account(&store, "bob").await;

    let alices = seed_list(&store, &alice, "Weekly").await;
    let bobs = seed_list(&store, &bob, "Party").await;
    let mine = seed_items(&store, alices.id, &["Milk", "Bread"]).await;
    let theirs = seed_items(&store, bobs.id, &["Chips"]).await;

    let ids = [mine[0].id, mine[1].id, theirs[0].id];
    let result = BatchEngine::new(&store).delete_items(&alice, &ids).await;

    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    for id in ids {
        assert!(item_exists(&store, id).await, "item {id} should survive");
    }
}

#[tokio::test]
async fn test_missing_item_aborts_whole_batch() {
    let store = MemoryStore::new();
    let alice = seed_account(&store, "alice").await;
    let list = seed_list(&store, &alice, "Weekly").await;
    let items = seed_items(&store, list.id, &["Milk", "Bread"]).await;

    let ids = [items[0].id, items[1].id, ItemId::new(99)];
    let result = BatchEngine::new(&store).delete_items(&alice, &ids).await;

    assert!(matches!(result, Err(ServiceError::NotFound(msg)) if msg.contains("99")));
    assert!(item_exists(&store, items[0].id).await);
    assert!(item_exists(&store, items[1].id).await);
}

#[tokio::test]
async fn test_missing_is_reported_before_forbidden() {
    let store = MemoryStore::new();
    let alice = seed_account(&store, "alice").await;
    let bob = seed_account(&store, "bob").await;
    let bobs = seed_list(&store, &bob, "Party").await;
    let theirs = seed_items(&store, bobs.id, &["Chips"]).await;

    let result = BatchEngine::new(&store)
        .delete_items(&alice, &[theirs[0].id, ItemId::new(99)])
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_duplicates_are_collapsed() {
    let store = MemoryStore::new();
    let alice = seed_account(&store, "alice").await;
    let list = seed_list(&store, &alice, "Weekly").await;
    let items = seed_items(&store, list.id, &["Milk", "Bread", "Eggs"]).await;
    let (one, two) = (items[0].id, items[1].id);

    let deleted = BatchEngine::new(&store)
        .delete_items(&alice, &[one, one, two])
        .await
        .unwrap();

    assert_eq!(deleted, 2);
    assert!(!item_exists(&store, one).await);
    assert!(!item_exists(&store, two).await);
    assert!(item_exists(&store, items[2].id).await);
}

#[tokio::test]
async fn test_duplicates_match_deduplicated_outcome() {
    let store = MemoryStore::new();
    let alice = seed_account(&store, "alice").await;
    let list = seed_list(&store, &alice, "Weekly").await;
    let items = seed_items(&store, list.id, &["Milk"]).await;
    let missing = ItemId::new(404);

    let engine = BatchEngine::new(&store);
    let with_dupes = engine
        .delete_items(&alice, &[items[0].id, missing, missing])
        .await;
    let without = engine.delete_items(&alice, &[items[0].id, missing]).await;

    assert!(matches!(with_dupes, Err(ServiceError::NotFound(_))));
    assert!(matches!(without, Err(ServiceError::NotFound(_))));
    assert!(item_exists(&store, items[0].id).await);
}

#[tokio::test]
async fn test_empty_batch_touches_nothing() {
    let store = MemoryStore::new();
    let alice = seed_account(&store, "alice").await;
    let before = store.stats();

    let deleted = BatchEngine::new(&store)
        .delete_items(&alice, &[])
        .await
        .unwrap();

    assert_eq!(deleted, 0);
    assert_eq!(store.stats(), before);
}

#[tokio::test]
async fn test_items_across_own_lists() {
    let store = MemoryStore::new();
    let alice = seed_account(&store, "alice").await;
    let weekly = seed_list(&store, &alice, "Weekly").await;
    let party = seed_list(&store, &alice, "Party").await;
    let a = seed_items(&store, weekly.id, &["Milk"]).await;
    let b = seed_items(&store, party.id, &["Chips"]).await;

    let deleted = BatchEngine::new(&store)
        .delete_items(&alice, &[b[0].id, a[0].id])
        .await
        .unwrap();

    assert_eq!(deleted, 2);
    assert!(!item_exists(&store, a[0].id).await);
    assert!(!item_exists(&store, b[0].id).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_overlapping_concurrent_deletes() {
    let store = MemoryStore::new();
    let alice = seed_account(&store, "alice").await;
    let list = seed_list(&store, &alice, "Weekly").await;
    let items = seed_items(&store, list.id, &["Milk", "Bread", "Eggs"]).await;
    let [milk, bread, eggs] = [items[0].id, items[1].id, items[2].id];

    let spawn_delete = |ids: Vec<ItemId>| {
        let store = store.clone();
        let alice = alice.clone();
        tokio::spawn(async move { BatchEngine::new(&store).delete_items(&alice, &ids).await })
    };
    let first = spawn_delete(vec![milk, bread]);
    let second = spawn_delete(vec![bread, eggs]);
    let (first, second) = (first.await.unwrap(), second.await.unwrap());

    assert!(!item_exists(&store, bread).await);
    match (first, second) {
        (Ok(2), Err(ServiceError::NotFound(msg))) => {
            assert!(msg.contains(&bread.to_string()), "{msg}");
            assert!(!item_exists(&store, milk).await);
            assert!(item_exists(&store, eggs).await);
        }
        (Err(ServiceError::NotFound(msg)), Ok(2)) => {
            assert!(msg.contains(&bread.to_string()), "{msg}");
            assert!(item_exists(&store, milk).await);
            assert!(!item_exists(&store, eggs).await);
        }
        other => panic!("expected exactly one batch to win, got {other:?}"),
    }
}
