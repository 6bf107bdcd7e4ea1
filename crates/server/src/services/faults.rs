//! Store wrapper that injects faults the in-memory backend never produces.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;

use grocery_core::{
    Account, AccountId, AccountIdentity, DisplayName, Email, GroceryList, Item, ItemId, ListId,
    Name, NewAccount, NewItem, NewList, Quantity,
};

use crate::db::{AccountChanges, MemoryStore, OwnershipStore, RepositoryError, StoreTx};

/// Which faults a [`FaultyStore`] transaction injects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// `get_list` reports this list as gone, leaving its items dangling.
    pub hidden_list: Option<ListId>,
    /// `delete_items` behaves as if another writer removed the first ID
    /// between the fetch and the delete.
    pub lose_delete_race: bool,
}

#[derive(Debug, Clone)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub faults: Faults,
}

impl FaultyStore {
    /// A store holding one account that owns one list with `items` on it.
    pub async fn seeded(items: &[&str]) -> (Self, AccountIdentity, GroceryList, Vec<Item>) {
        let inner = MemoryStore::new();
        let mut tx = inner.begin().await.unwrap();
        let account = tx
            .insert_account(NewAccount {
                name: DisplayName::parse("alice").unwrap(),
                email: Email::parse("alice@example.com").unwrap(),
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap();
        let list = tx
            .insert_list(NewList {
                name: Name::parse("Weekly").unwrap(),
                owner_id: account.id,
            })
            .await
            .unwrap();
        let items = tx
            .insert_items(
                items
                    .iter()
                    .map(|n| NewItem::pending(Name::parse(n).unwrap(), Quantity::DEFAULT, list.id))
                    .collect(),
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let store = Self {
            inner,
            faults: Faults::default(),
        };
        (store, account.identity(), list, items)
    }

    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }
}

#[async_trait]
impl OwnershipStore for FaultyStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, RepositoryError> {
        Ok(Box::new(FaultyTx {
            inner: self.inner.begin().await?,
            faults: self.faults,
        }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.ping().await
    }
}

struct FaultyTx {
    inner: Box<dyn StoreTx>,
    faults: Faults,
}

#[async_trait]
impl StoreTx for FaultyTx {
    async fn get_account(&mut self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        self.inner.get_account(id).await
    }

    async fn find_account_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        self.inner.find_account_by_email(email).await
    }

    async fn account_name_exists(&mut self, name: &DisplayName) -> Result<bool, RepositoryError> {
        self.inner.account_name_exists(name).await
    }

    async fn account_email_exists(&mut self, email: &Email) -> Result<bool, RepositoryError> {
        self.inner.account_email_exists(email).await
    }

    async fn insert_account(&mut self, account: NewAccount) -> Result<Account, RepositoryError> {
        self.inner.insert_account(account).await
    }

    async fn update_account(
        &mut self,
        changes: AccountChanges,
    ) -> Result<Account, RepositoryError> {
        self.inner.update_account(changes).await
    }

    async fn delete_account(&mut self, id: AccountId) -> Result<bool, RepositoryError> {
        self.inner.delete_account(id).await
    }

    async fn get_list(&mut self, id: ListId) -> Result<Option<GroceryList>, RepositoryError> {
        if self.faults.hidden_list == Some(id) {
            return Ok(None);
        }
        self.inner.get_list(id).await
    }

    async fn lists_by_owner(
        &mut self,
        owner_id: AccountId,
    ) -> Result<Vec<GroceryList>, RepositoryError> {
        self.inner.lists_by_owner(owner_id).await
    }

    async fn insert_list(&mut self, list: NewList) -> Result<GroceryList, RepositoryError> {
        self.inner.insert_list(list).await
    }

    async fn rename_list(
        &mut self,
        id: ListId,
        name: &Name,
    ) -> Result<GroceryList, RepositoryError> {
        self.inner.rename_list(id, name).await
    }

    async fn delete_list(&mut self, id: ListId) -> Result<bool, RepositoryError> {
        self.inner.delete_list(id).await
    }

    async fn get_item(&mut self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        self.inner.get_item(id).await
    }

    async fn items_by_list(&mut self, list_id: ListId) -> Result<Vec<Item>, RepositoryError> {
        self.inner.items_by_list(list_id).await
    }

    async fn items_by_ids(&mut self, ids: &[ItemId]) -> Result<Vec<Item>, RepositoryError> {
        self.inner.items_by_ids(ids).await
    }

    async fn insert_items(&mut self, items: Vec<NewItem>) -> Result<Vec<Item>, RepositoryError> {
        self.inner.insert_items(items).await
    }

    async fn update_item(&mut self, item: &Item) -> Result<Item, RepositoryError> {
        self.inner.update_item(item).await
    }

    async fn delete_items(&mut self, ids: &[ItemId]) -> Result<u64, RepositoryError> {
        if self.faults.lose_delete_race
            && let Some(first) = ids.first()
        {
            self.inner.delete_items(&[*first]).await?;
        }
        self.inner.delete_items(ids).await
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.inner.commit().await
    }
}
