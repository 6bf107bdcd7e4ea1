//! Single-item operations.

use tracing::instrument;

use grocery_core::{AccountIdentity, Item, ItemId, ListId, Name, NewItem, Quantity};

use super::{ServiceError, guard};
use crate::db::OwnershipStore;

/// Input for [`ItemService::create`].
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub name: String,
    /// Defaults to `false`.
    pub completed: Option<bool>,
    /// Defaults to 1.
    pub quantity: Option<i64>,
}

/// Partial update for [`ItemService::update`]. `None` leaves a field as is.
///
/// The parent list cannot be changed.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub completed: Option<bool>,
    pub quantity: Option<i64>,
}

/// Item CRUD, authorized through the parent list.
pub struct ItemService<'a> {
    store: &'a dyn OwnershipStore,
}

impl<'a> ItemService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn OwnershipStore) -> Self {
        Self { store }
    }

    /// Add an item to a list the caller owns.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Forbidden` for the list, then `Validation` for the
    /// draft.
    #[instrument(skip(self, identity, draft), fields(account_id = %identity.id, list_id = %list_id))]
    pub async fn create(
        &self,
        identity: &AccountIdentity,
        list_id: ListId,
        draft: ItemDraft,
    ) -> Result<Item, ServiceError> {
        let mut tx = self.store.begin().await?;
        let list = guard::load_owned_list(&mut *tx, identity, list_id).await?;

        let name = Name::parse(&draft.name)?;
        let quantity = draft.quantity.map_or(Ok(Quantity::DEFAULT), Quantity::new)?;
        let new_item = NewItem {
            name,
            completed: draft.completed.unwrap_or(false),
            quantity,
            list_id: list.id,
        };

        let item = tx
            .insert_items(vec![new_item])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("list {list_id}")))?;
        tx.commit().await?;

        tracing::info!(item_id = %item.id, "item created");
        Ok(item)
    }

    /// # Errors
    ///
    /// `NotFound` or `Forbidden` per the ownership guard.
    pub async fn get(&self, identity: &AccountIdentity, item_id: ItemId) -> Result<Item, ServiceError> {
        let mut tx = self.store.begin().await?;
        let (item, _) = guard::load_owned_item(&mut *tx, identity, item_id).await?;
        Ok(item)
    }

    /// Items on a list the caller owns, in creation order.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Forbidden` for the list.
    pub async fn items_for_list(
        &self,
        identity: &AccountIdentity,
        list_id: ListId,
    ) -> Result<Vec<Item>, ServiceError> {
        let mut tx = self.store.begin().await?;
        guard::load_owned_list(&mut *tx, identity, list_id).await?;
        Ok(tx.items_by_list(list_id).await?)
    }

    /// Apply `patch` to an item the caller owns.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Forbidden`, then `Validation` for the new values.
    #[instrument(skip(self, identity, patch), fields(account_id = %identity.id, item_id = %item_id))]
    pub async fn update(
        &self,
        identity: &AccountIdentity,
        item_id: ItemId,
        patch: ItemPatch,
    ) -> Result<Item, ServiceError> {
        let mut tx = self.store.begin().await?;
        let (mut item, _) = guard::load_owned_item(&mut *tx, identity, item_id).await?;

        if let Some(name) = patch.name {
            item.name = Name::parse(&name)?;
        }
        if let Some(completed) = patch.completed {
            item.completed = completed;
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = Quantity::new(quantity)?;
        }

        let updated = tx.update_item(&item).await?;
        tx.commit().await?;

        tracing::info!("item updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// `NotFound` or `Forbidden` per the ownership guard.
    #[instrument(skip(self, identity), fields(account_id = %identity.id, item_id = %item_id))]
    pub async fn delete(&self, identity: &AccountIdentity, item_id: ItemId) -> Result<(), ServiceError> {
        let mut tx = self.store.begin().await?;
        guard::load_owned_item(&mut *tx, identity, item_id).await?;

        if tx.delete_items(&[item_id]).await? == 0 {
            return Err(ServiceError::NotFound(format!("item {item_id}")));
        }
        tx.commit().await?;

        tracing::info!("item deleted");
        Ok(())
    }
}
