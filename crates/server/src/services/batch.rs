//! Batch mutation engine.
//!
//! Both operations run in a single store transaction that commits only after
//! every check has passed. Any failure drops the transaction, so a caller
//! never observes a partially applied batch.

use std::collections::{BTreeSet, HashMap};

use tracing::instrument;

use grocery_core::{AccountIdentity, GroceryList, Item, ItemId, ListId, Name, NewItem, Quantity};

use super::{ServiceError, guard};
use crate::db::OwnershipStore;

/// Multi-item create and delete, scoped to one acting identity.
pub struct BatchEngine<'a> {
    store: &'a dyn OwnershipStore,
}

impl<'a> BatchEngine<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn OwnershipStore) -> Self {
        Self { store }
    }

    /// Delete every item in `ids`, or none of them.
    ///
    /// Duplicate IDs are collapsed. Items are checked in ascending ID order
    /// and the first one owned by another account aborts the batch. An
    /// empty request succeeds without opening a transaction.
    ///
    /// Returns the number of items deleted.
    ///
    /// # Errors
    ///
    /// `NotFound` if any ID does not exist or an item's list is gone,
    /// `Forbidden` if any item belongs to another account.
    #[instrument(skip(self, identity, ids), fields(account_id = %identity.id, requested = ids.len()))]
    pub async fn delete_items(
        &self,
        identity: &AccountIdentity,
        ids: &[ItemId],
    ) -> Result<u64, ServiceError> {
        let unique: Vec<ItemId> = ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if unique.is_empty() {
            return Ok(0);
        }

        let mut tx = self.store.begin().await?;

        let items = tx.items_by_ids(&unique).await?;
        if items.len() < unique.len() {
            let missing = first_missing(&unique, &items);
            tracing::warn!(missing = ?missing, "batch delete references missing items");
            return Err(ServiceError::NotFound(match missing {
                Some(id) => format!("item {id}"),
                None => "items".to_string(),
            }));
        }

        let mut parents: HashMap<ListId, GroceryList> = HashMap::new();
        for item in &items {
            if !parents.contains_key(&item.list_id) {
                let parent = guard::parent_of(&mut *tx, item).await?;
                parents.insert(item.list_id, parent);
            }
            let parent = parents
                .get(&item.list_id)
                .ok_or_else(|| ServiceError::NotFound(format!("list {}", item.list_id)))?;
            guard::check_item(identity, item, parent)?;
        }

        let deleted = tx.delete_items(&unique).await?;
        if usize::try_from(deleted).ok() != Some(unique.len()) {
            // Another writer removed some rows after they were fetched.
            return Err(ServiceError::NotFound("items".to_string()));
        }

        tx.commit().await?;
        tracing::info!(deleted, "batch delete committed");
        Ok(deleted)
    }

    /// Create one item per name on `list_id`, or none at all.
    ///
    /// Every item starts not completed with `default_quantity` (1 if
    /// omitted). An empty name list succeeds without writing anything.
    ///
    /// # Errors
    ///
    /// `NotFound` if the list does not exist, `Forbidden` if it belongs to
    /// another account, `Validation` for a blank name or a quantity below 1.
    #[instrument(skip(self, identity, names), fields(account_id = %identity.id, list_id = %list_id, count = names.len()))]
    pub async fn create_items(
        &self,
        identity: &AccountIdentity,
        list_id: ListId,
        names: &[String],
        default_quantity: Option<i64>,
    ) -> Result<Vec<Item>, ServiceError> {
        let mut tx = self.store.begin().await?;

        guard::load_owned_list(&mut *tx, identity, list_id).await?;

        let quantity = default_quantity.map_or(Ok(Quantity::DEFAULT), Quantity::new)?;
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let new_items = names
            .iter()
            .enumerate()
            .map(|(position, raw)| {
                Name::parse(raw)
                    .map(|name| NewItem::pending(name, quantity, list_id))
                    .map_err(|e| ServiceError::Validation(format!("name at position {position}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let created = tx.insert_items(new_items).await?;
        tx.commit().await?;

        tracing::info!(created = created.len(), "batch create committed");
        Ok(created)
    }
}

/// The smallest requested ID absent from `found`. Both are sorted by ID.
fn first_missing(requested: &[ItemId], found: &[Item]) -> Option<ItemId> {
    let present: BTreeSet<ItemId> = found.iter().map(|item| item.id).collect();
    requested.iter().copied().find(|id| !present.contains(id))
}
