//! Shared fixtures for service and HTTP tests.
//!
//! Everything runs against `MemoryStore`, so no database is needed.

#![allow(dead_code, clippy::unwrap_used)]

use secrecy::SecretString;

use grocery_core::{
    AccountIdentity, DisplayName, Email, GroceryList, Item, ItemId, ListId, Name, NewAccount,
    NewItem, NewList, Quantity,
};
use grocery_server::auth::{DEFAULT_TOKEN_TTL, TokenAuthenticator};
use grocery_server::db::{MemoryStore, OwnershipStore};

pub const TOKEN_SECRET: &str = "k3Y9#vQ2$wE7!rT5^yU1&iO8*pA4@sD6";

pub fn tokens() -> TokenAuthenticator {
    TokenAuthenticator::new(&SecretString::from(TOKEN_SECRET), DEFAULT_TOKEN_TTL)
}

/// Insert an account directly, skipping password hashing.
pub async fn seed_account(store: &MemoryStore, name: &str) -> AccountIdentity {
    let mut tx = store.begin().await.unwrap();
    let account = tx
        .insert_account(NewAccount {
            name: DisplayName::parse(name).unwrap(),
            email: Email::parse(&format!("{name}@example.com")).unwrap(),
            password_hash: "unused".to_string(),
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    account.identity()
}

pub async fn seed_list(store: &MemoryStore, owner: &AccountIdentity, name: &str) -> GroceryList {
    let mut tx = store.begin().await.unwrap();
    let list = tx
        .insert_list(NewList {
            name: Name::parse(name).unwrap(),
            owner_id: owner.id,
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    list
}

pub async fn seed_items(store: &MemoryStore, list_id: ListId, names: &[&str]) -> Vec<Item> {
    let mut tx = store.begin().await.unwrap();
    let items = tx
        .insert_items(
            names
                .iter()
                .map(|n| NewItem::pending(Name::parse(n).unwrap(), Quantity::DEFAULT, list_id))
                .collect(),
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();
    items
}

pub async fn item_exists(store: &MemoryStore, id: ItemId) -> bool {
    let mut tx = store.begin().await.unwrap();
    tx.get_item(id).await.unwrap().is_some()
}

pub async fn list_exists(store: &MemoryStore, id: ListId) -> bool {
    let mut tx = store.begin().await.unwrap();
    tx.get_list(id).await.unwrap().is_some()
}

pub async fn items_on(store: &MemoryStore, list_id: ListId) -> Vec<Item> {
    let mut tx = store.begin().await.unwrap();
    tx.items_by_list(list_id).await.unwrap()
}
