//! Authorization guard.
//!
//! Loads a resource, then asks [`grocery_core::authz`] whether the acting
//! identity may touch it. Existence is always checked before ownership, so a
//! missing resource is `NotFound` and someone else's resource is `Forbidden`.
//! Both run inside the caller's transaction so the decision and the
//! mutation that follows see the same state.

use grocery_core::authz::{authorize_item, authorize_list};
use grocery_core::{AccountIdentity, GroceryList, Item, ItemId, ListId};

use super::ServiceError;
use crate::db::StoreTx;

/// Load a list and require that `identity` owns it.
///
/// # Errors
///
/// `NotFound` if the list does not exist, `Forbidden` if it belongs to
/// another account.
pub async fn load_owned_list(
    tx: &mut dyn StoreTx,
    identity: &AccountIdentity,
    list_id: ListId,
) -> Result<GroceryList, ServiceError> {
    let list = tx
        .get_list(list_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("list {list_id}")))?;

    if !authorize_list(identity, &list).is_allowed() {
        tracing::warn!(account_id = %identity.id, list_id = %list_id, "list access denied");
        return Err(ServiceError::Forbidden(format!("list {list_id}")));
    }

    Ok(list)
}

/// Load an item and its parent list, and require that `identity` owns the list.
///
/// # Errors
///
/// `NotFound` if the item or its parent list does not exist, `Forbidden` if
/// the list belongs to another account.
pub async fn load_owned_item(
    tx: &mut dyn StoreTx,
    identity: &AccountIdentity,
    item_id: ItemId,
) -> Result<(Item, GroceryList), ServiceError> {
    let item = tx
        .get_item(item_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("item {item_id}")))?;

    let parent = parent_of(tx, &item).await?;
    check_item(identity, &item, &parent)?;

    Ok((item, parent))
}

/// Resolve the list an item points at. A dangling reference is `NotFound`.
pub(crate) async fn parent_of(
    tx: &mut dyn StoreTx,
    item: &Item,
) -> Result<GroceryList, ServiceError> {
    tx.get_list(item.list_id).await?.ok_or_else(|| {
        ServiceError::NotFound(format!("list {} of item {}", item.list_id, item.id))
    })
}

pub(crate) fn check_item(
    identity: &AccountIdentity,
    item: &Item,
    parent: &GroceryList,
) -> Result<(), ServiceError> {
    if authorize_item(identity, item, parent).is_allowed() {
        return Ok(());
    }
    tracing::warn!(account_id = %identity.id, item_id = %item.id, "item access denied");
    Err(ServiceError::Forbidden(format!("item {}", item.id)))
}
