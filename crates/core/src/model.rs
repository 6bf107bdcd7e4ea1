//! Domain entities.
//!
//! The three entity kinds form a strict hierarchy, Account → `GroceryList` →
//! Item. Every child refers to its parent by ID only; there are no back
//! references. An item's effective owner is always its list's `owner_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, DisplayName, Email, ItemId, ListId, Name, Quantity};

/// A registered account.
///
/// The password hash is not part of this type; it stays inside
/// the store and the authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Unique public display name.
    pub name: DisplayName,
    /// Unique contact address, also the login handle.
    pub email: Email,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The identity this account acts as.
    #[must_use]
    pub fn identity(&self) -> AccountIdentity {
        AccountIdentity {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// A grocery list. Ownership never transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryList {
    /// Unique list ID.
    pub id: ListId,
    /// List name.
    pub name: Name,
    /// Owning account.
    pub owner_id: AccountId,
    /// When the list was created.
    pub created_at: DateTime<Utc>,
}

/// An item on a grocery list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item ID.
    pub id: ItemId,
    /// Item name.
    pub name: Name,
    /// Whether the item has been picked up.
    pub completed: bool,
    /// How many to buy.
    pub quantity: Quantity,
    /// Owning list.
    pub list_id: ListId,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
}

/// The account on whose behalf an operation runs.
///
/// Only the identity resolver constructs this from a verified credential;
/// every service operation takes it as an explicit argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    /// Account ID used for every ownership check.
    pub id: AccountId,
    /// Display name at resolution time.
    pub name: DisplayName,
}

/// Insert form of an [`Account`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: DisplayName,
    pub email: Email,
    pub password_hash: String,
}

/// Insert form of a [`GroceryList`].
#[derive(Debug, Clone)]
pub struct NewList {
    pub name: Name,
    pub owner_id: AccountId,
}

/// Insert form of an [`Item`].
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: Name,
    pub completed: bool,
    pub quantity: Quantity,
    pub list_id: ListId,
}

impl NewItem {
    /// A fresh, not yet completed item on `list_id`.
    #[must_use]
    pub const fn pending(name: Name, quantity: Quantity, list_id: ListId) -> Self {
        Self {
            name,
            completed: false,
            quantity,
            list_id,
        }
    }
}
