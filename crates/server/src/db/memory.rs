//! In-memory ownership store.
//!
//! Entities live in `BTreeMap` arenas keyed by ID. A transaction takes the
//! store-wide lock for its whole lifetime and works on a staged copy of the
//! state; `commit` swaps the copy in. Transactions are therefore fully
//! serialized, and an uncommitted transaction leaves no trace.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::instrument;

use grocery_core::{
    Account, AccountId, DisplayName, Email, GroceryList, Item, ItemId, ListId, Name, NewAccount,
    NewItem, NewList,
};

use super::{AccountChanges, OwnershipStore, RepositoryError, StoreTx};

#[derive(Debug, Clone)]
struct AccountRecord {
    account: Account,
    password_hash: String,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    accounts: BTreeMap<AccountId, AccountRecord>,
    lists: BTreeMap<ListId, GroceryList>,
    items: BTreeMap<ItemId, Item>,
    last_account_id: i64,
    last_list_id: i64,
    last_item_id: i64,
}

impl MemoryState {
    fn name_taken(&self, name: &DisplayName, except: Option<AccountId>) -> bool {
        self.accounts
            .values()
            .any(|r| &r.account.name == name && Some(r.account.id) != except)
    }

    fn email_taken(&self, email: &Email, except: Option<AccountId>) -> bool {
        self.accounts
            .values()
            .any(|r| &r.account.email == email && Some(r.account.id) != except)
    }

    fn remove_list_cascade(&mut self, id: ListId) -> bool {
        if self.lists.remove(&id).is_none() {
            return false;
        }
        self.items.retain(|_, item| item.list_id != id);
        true
    }
}

#[derive(Debug, Default)]
struct Counters {
    transactions: AtomicU64,
    commits: AtomicU64,
}

/// Snapshot of how a [`MemoryStore`] has been used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    /// Transactions opened.
    pub transactions: u64,
    /// Transactions committed.
    pub commits: u64,
}

/// Serializable in-memory implementation of [`OwnershipStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    counters: Arc<Counters>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Usage counters, for asserting that an operation wrote nothing.
    #[must_use]
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            transactions: self.counters.transactions.load(Ordering::SeqCst),
            commits: self.counters.commits.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl OwnershipStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, RepositoryError> {
        let committed = Arc::clone(&self.state).lock_owned().await;
        let staged = committed.clone();
        self.counters.transactions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryTx {
            committed,
            staged,
            counters: Arc::clone(&self.counters),
        }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

struct MemoryTx {
    committed: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    counters: Arc<Counters>,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn get_account(&mut self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.staged.accounts.get(&id).map(|r| r.account.clone()))
    }

    async fn find_account_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        Ok(self
            .staged
            .accounts
            .values()
            .find(|r| &r.account.email == email)
            .map(|r| (r.account.clone(), r.password_hash.clone())))
    }

    async fn account_name_exists(&mut self, name: &DisplayName) -> Result<bool, RepositoryError> {
        Ok(self.staged.name_taken(name, None))
    }

    async fn account_email_exists(&mut self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self.staged.email_taken(email, None))
    }

    async fn insert_account(&mut self, account: NewAccount) -> Result<Account, RepositoryError> {
        if self.staged.name_taken(&account.name, None) {
            return Err(RepositoryError::Conflict("name already exists".to_owned()));
        }
        if self.staged.email_taken(&account.email, None) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        self.staged.last_account_id += 1;
        let created = Account {
            id: AccountId::new(self.staged.last_account_id),
            name: account.name,
            email: account.email,
            created_at: Utc::now(),
        };
        self.staged.accounts.insert(
            created.id,
            AccountRecord {
                account: created.clone(),
                password_hash: account.password_hash,
            },
        );
        Ok(created)
    }

    async fn update_account(
        &mut self,
        changes: AccountChanges,
    ) -> Result<Account, RepositoryError> {
        if self.staged.name_taken(&changes.name, Some(changes.id)) {
            return Err(RepositoryError::Conflict("name already exists".to_owned()));
        }
        if self.staged.email_taken(&changes.email, Some(changes.id)) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let record = self
            .staged
            .accounts
            .get_mut(&changes.id)
            .ok_or(RepositoryError::NotFound)?;
        record.account.name = changes.name;
        record.account.email = changes.email;
        if let Some(hash) = changes.password_hash {
            record.password_hash = hash;
        }
        Ok(record.account.clone())
    }

    #[instrument(skip(self))]
    async fn delete_account(&mut self, id: AccountId) -> Result<bool, RepositoryError> {
        if self.staged.accounts.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<ListId> = self
            .staged
            .lists
            .values()
            .filter(|l| l.owner_id == id)
            .map(|l| l.id)
            .collect();
        for list_id in owned {
            self.staged.remove_list_cascade(list_id);
        }
        Ok(true)
    }

    async fn get_list(&mut self, id: ListId) -> Result<Option<GroceryList>, RepositoryError> {
        Ok(self.staged.lists.get(&id).cloned())
    }

    async fn lists_by_owner(
        &mut self,
        owner_id: AccountId,
    ) -> Result<Vec<GroceryList>, RepositoryError> {
        Ok(self
            .staged
            .lists
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_list(&mut self, list: NewList) -> Result<GroceryList, RepositoryError> {
        if !self.staged.accounts.contains_key(&list.owner_id) {
            return Err(RepositoryError::MissingParent(format!(
                "account {} does not exist",
                list.owner_id
            )));
        }

        self.staged.last_list_id += 1;
        let created = GroceryList {
            id: ListId::new(self.staged.last_list_id),
            name: list.name,
            owner_id: list.owner_id,
            created_at: Utc::now(),
        };
        self.staged.lists.insert(created.id, created.clone());
        Ok(created)
    }

    async fn rename_list(
        &mut self,
        id: ListId,
        name: &Name,
    ) -> Result<GroceryList, RepositoryError> {
        let list = self
            .staged
            .lists
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        list.name = name.clone();
        Ok(list.clone())
    }

    async fn delete_list(&mut self, id: ListId) -> Result<bool, RepositoryError> {
        Ok(self.staged.remove_list_cascade(id))
    }

    async fn get_item(&mut self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        Ok(self.staged.items.get(&id).cloned())
    }

    async fn items_by_list(&mut self, list_id: ListId) -> Result<Vec<Item>, RepositoryError> {
        Ok(self
            .staged
            .items
            .values()
            .filter(|i| i.list_id == list_id)
            .cloned()
            .collect())
    }

    async fn items_by_ids(&mut self, ids: &[ItemId]) -> Result<Vec<Item>, RepositoryError> {
        let mut found: Vec<Item> = ids
            .iter()
            .filter_map(|id| self.staged.items.get(id).cloned())
            .collect();
        found.sort_by_key(|i| i.id);
        found.dedup_by_key(|i| i.id);
        Ok(found)
    }

    async fn insert_items(&mut self, items: Vec<NewItem>) -> Result<Vec<Item>, RepositoryError> {
        if let Some(orphan) = items
            .iter()
            .find(|i| !self.staged.lists.contains_key(&i.list_id))
        {
            return Err(RepositoryError::MissingParent(format!(
                "list {} does not exist",
                orphan.list_id
            )));
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(items.len());
        for new in items {
            self.staged.last_item_id += 1;
            let item = Item {
                id: ItemId::new(self.staged.last_item_id),
                name: new.name,
                completed: new.completed,
                quantity: new.quantity,
                list_id: new.list_id,
                created_at: now,
            };
            self.staged.items.insert(item.id, item.clone());
            created.push(item);
        }
        Ok(created)
    }

    async fn update_item(&mut self, item: &Item) -> Result<Item, RepositoryError> {
        let stored = self
            .staged
            .items
            .get_mut(&item.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.name = item.name.clone();
        stored.completed = item.completed;
        stored.quantity = item.quantity;
        Ok(stored.clone())
    }

    async fn delete_items(&mut self, ids: &[ItemId]) -> Result<u64, RepositoryError> {
        let mut removed = 0;
        for id in ids {
            if self.staged.items.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let Self {
            mut committed,
            staged,
            counters,
        } = *self;
        *committed = staged;
        counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grocery_core::Quantity;

    use super::*;

    async fn seed_account(tx: &mut Box<dyn StoreTx>, name: &str) -> Account {
        tx.insert_account(NewAccount {
            name: DisplayName::parse(name).unwrap(),
            email: Email::parse(&format!("{name}@example.com")).unwrap(),
            password_hash: "hash".to_owned(),
        })
        .await
        .unwrap()
    }

    async fn seed_list(tx: &mut Box<dyn StoreTx>, owner: AccountId) -> GroceryList {
        tx.insert_list(NewList {
            name: Name::parse("Weekly").unwrap(),
            owner_id: owner,
        })
        .await
        .unwrap()
    }

    fn new_item(name: &str, list_id: ListId) -> NewItem {
        NewItem::pending(Name::parse(name).unwrap(), Quantity::DEFAULT, list_id)
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_discarded() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        seed_account(&mut tx, "alice").await;
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.get_account(AccountId::new(1)).await.unwrap().is_none());
        assert_eq!(store.stats().commits, 0);
    }

    #[tokio::test]
    async fn test_committed_writes_are_visible() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let alice = seed_account(&mut tx, "alice").await;
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.get_account(alice.id).await.unwrap(), Some(alice));
        assert_eq!(
            store.stats(),
            MemoryStats {
                transactions: 2,
                commits: 1
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_account_is_conflict() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        seed_account(&mut tx, "alice").await;

        let err = tx
            .insert_account(NewAccount {
                name: DisplayName::parse("alice").unwrap(),
                email: Email::parse("other@example.com").unwrap(),
                password_hash: "hash".to_owned(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_orphans_are_rejected() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let err = tx
            .insert_list(NewList {
                name: Name::parse("Weekly").unwrap(),
                owner_id: AccountId::new(404),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingParent(_)));

        let alice = seed_account(&mut tx, "alice").await;
        let list = seed_list(&mut tx, alice.id).await;
        let err = tx
            .insert_items(vec![
                new_item("Milk", list.id),
                new_item("Ghost", ListId::new(404)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingParent(_)));
        assert!(tx.items_by_list(list.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_account_cascades() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let alice = seed_account(&mut tx, "alice").await;
        let bob = seed_account(&mut tx, "bob").await;
        let alices = seed_list(&mut tx, alice.id).await;
        let bobs = seed_list(&mut tx, bob.id).await;
        tx.insert_items(vec![new_item("Milk", alices.id), new_item("Eggs", bobs.id)])
            .await
            .unwrap();

        assert!(tx.delete_account(alice.id).await.unwrap());

        assert!(tx.get_list(alices.id).await.unwrap().is_none());
        assert!(tx.items_by_list(alices.id).await.unwrap().is_empty());
        assert_eq!(tx.items_by_list(bobs.id).await.unwrap().len(), 1);
        assert!(!tx.delete_account(alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_items_by_ids_skips_missing_and_duplicates() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let alice = seed_account(&mut tx, "alice").await;
        let list = seed_list(&mut tx, alice.id).await;
        let created = tx
            .insert_items(vec![new_item("Milk", list.id), new_item("Bread", list.id)])
            .await
            .unwrap();

        let ids = [created[1].id, ItemId::new(99), created[0].id, created[1].id];
        let found = tx.items_by_ids(&ids).await.unwrap();
        assert_eq!(
            found.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![created[0].id, created[1].id]
        );
    }
}
