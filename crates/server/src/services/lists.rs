//! Grocery list operations.

use tracing::instrument;

use grocery_core::authz::authorize_account;
use grocery_core::{AccountId, AccountIdentity, GroceryList, ListId, Name, NewList};

use super::{ServiceError, guard};
use crate::db::OwnershipStore;

/// Owner-scoped list CRUD.
pub struct ListService<'a> {
    store: &'a dyn OwnershipStore,
}

impl<'a> ListService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn OwnershipStore) -> Self {
        Self { store }
    }

    /// Create a list owned by `identity`.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank name.
    #[instrument(skip(self, identity, name), fields(account_id = %identity.id))]
    pub async fn create(
        &self,
        identity: &AccountIdentity,
        name: &str,
    ) -> Result<GroceryList, ServiceError> {
        let name = Name::parse(name)?;

        let mut tx = self.store.begin().await?;
        let list = tx
            .insert_list(NewList {
                name,
                owner_id: identity.id,
            })
            .await?;
        tx.commit().await?;

        tracing::info!(list_id = %list.id, "list created");
        Ok(list)
    }

    /// # Errors
    ///
    /// `NotFound` or `Forbidden` per the ownership guard.
    pub async fn get(
        &self,
        identity: &AccountIdentity,
        list_id: ListId,
    ) -> Result<GroceryList, ServiceError> {
        let mut tx = self.store.begin().await?;
        guard::load_owned_list(&mut *tx, identity, list_id).await
    }

    /// Every list owned by the caller, in creation order.
    ///
    /// # Errors
    ///
    /// Only storage failures.
    pub async fn lists_for_identity(
        &self,
        identity: &AccountIdentity,
    ) -> Result<Vec<GroceryList>, ServiceError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.lists_by_owner(identity.id).await?)
    }

    /// Every list owned by `owner_id`. Callers may only query themselves.
    ///
    /// # Errors
    ///
    /// `NotFound` if the account does not exist, `Forbidden` if it is not the
    /// caller.
    pub async fn lists_for_owner(
        &self,
        identity: &AccountIdentity,
        owner_id: AccountId,
    ) -> Result<Vec<GroceryList>, ServiceError> {
        let mut tx = self.store.begin().await?;

        if tx.get_account(owner_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("account {owner_id}")));
        }
        if !authorize_account(identity, owner_id).is_allowed() {
            tracing::warn!(account_id = %identity.id, owner_id = %owner_id, "list listing denied");
            return Err(ServiceError::Forbidden(format!("lists of account {owner_id}")));
        }

        Ok(tx.lists_by_owner(owner_id).await?)
    }

    /// Rename a list. The owner never changes.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, or `Validation` for a blank name.
    #[instrument(skip(self, identity, name), fields(account_id = %identity.id, list_id = %list_id))]
    pub async fn rename(
        &self,
        identity: &AccountIdentity,
        list_id: ListId,
        name: &str,
    ) -> Result<GroceryList, ServiceError> {
        let mut tx = self.store.begin().await?;
        guard::load_owned_list(&mut *tx, identity, list_id).await?;

        let name = Name::parse(name)?;
        let list = tx.rename_list(list_id, &name).await?;
        tx.commit().await?;

        tracing::info!("list renamed");
        Ok(list)
    }

    /// Delete a list and every item on it.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Forbidden` per the ownership guard.
    #[instrument(skip(self, identity), fields(account_id = %identity.id, list_id = %list_id))]
    pub async fn delete(
        &self,
        identity: &AccountIdentity,
        list_id: ListId,
    ) -> Result<(), ServiceError> {
        let mut tx = self.store.begin().await?;
        guard::load_owned_list(&mut *tx, identity, list_id).await?;

        if !tx.delete_list(list_id).await? {
            return Err(ServiceError::NotFound(format!("list {list_id}")));
        }
        tx.commit().await?;

        tracing::info!("list deleted");
        Ok(())
    }
}
