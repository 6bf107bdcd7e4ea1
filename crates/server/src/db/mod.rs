//! Ownership store: persistence for accounts, lists, and items.
//!
//! # Backends
//!
//! - [`postgres::PgStore`] - `PostgreSQL` via `sqlx`, used by the binary
//! - [`memory::MemoryStore`] - in-process arena, used by tests and local runs
//!
//! # Tables (`grocery` schema)
//!
//! - `account` - display name and email are unique
//! - `grocery_list` - `owner_id` references `account`
//! - `item` - `list_id` references `grocery_list`, `quantity >= 1`
//!
//! # Transactions
//!
//! Every read and write goes through a [`StoreTx`]. Dropping a transaction
//! without calling [`StoreTx::commit`] discards every write made through it,
//! which is what makes the batch operations all-or-nothing. Deleting a parent
//! explicitly deletes its dependents inside the same transaction.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p grocery-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use grocery_core::{
    Account, AccountId, DisplayName, Email, GroceryList, Item, ItemId, ListId, Name, NewAccount,
    NewItem, NewList,
};

pub use memory::{MemoryStats, MemoryStore};
pub use postgres::PgStore;

/// Errors from the ownership store.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Referenced parent row does not exist.
    #[error("missing parent: {0}")]
    MissingParent(String),
}

/// Full replacement of an account's mutable fields.
///
/// `password_hash` of `None` keeps the stored hash.
#[derive(Debug, Clone)]
pub struct AccountChanges {
    pub id: AccountId,
    pub name: DisplayName,
    pub email: Email,
    pub password_hash: Option<String>,
}

/// A persistence backend that can open transactions.
#[async_trait]
pub trait OwnershipStore: Send + Sync + 'static {
    /// Open a transaction. All reads in it see one consistent state.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, RepositoryError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// An open transaction against an [`OwnershipStore`].
#[async_trait]
pub trait StoreTx: Send {
    // Accounts

    async fn get_account(&mut self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Look up an account and its password hash by contact address.
    async fn find_account_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError>;

    async fn account_name_exists(&mut self, name: &DisplayName) -> Result<bool, RepositoryError>;

    async fn account_email_exists(&mut self, email: &Email) -> Result<bool, RepositoryError>;

    /// Returns `RepositoryError::Conflict` on a duplicate name or email.
    async fn insert_account(&mut self, account: NewAccount) -> Result<Account, RepositoryError>;

    /// Returns `RepositoryError::NotFound` if the account does not exist and
    /// `RepositoryError::Conflict` on a duplicate name or email.
    async fn update_account(&mut self, changes: AccountChanges)
    -> Result<Account, RepositoryError>;

    /// Delete an account with all of its lists and their items.
    ///
    /// Returns `false` if the account did not exist.
    async fn delete_account(&mut self, id: AccountId) -> Result<bool, RepositoryError>;

    // Lists

    async fn get_list(&mut self, id: ListId) -> Result<Option<GroceryList>, RepositoryError>;

    async fn lists_by_owner(
        &mut self,
        owner_id: AccountId,
    ) -> Result<Vec<GroceryList>, RepositoryError>;

    /// Returns `RepositoryError::MissingParent` if the owner does not exist.
    async fn insert_list(&mut self, list: NewList) -> Result<GroceryList, RepositoryError>;

    /// Returns `RepositoryError::NotFound` if the list does not exist.
    async fn rename_list(&mut self, id: ListId, name: &Name)
    -> Result<GroceryList, RepositoryError>;

    /// Delete a list with all of its items.
    ///
    /// Returns `false` if the list did not exist.
    async fn delete_list(&mut self, id: ListId) -> Result<bool, RepositoryError>;

    // Items

    async fn get_item(&mut self, id: ItemId) -> Result<Option<Item>, RepositoryError>;

    async fn items_by_list(&mut self, list_id: ListId) -> Result<Vec<Item>, RepositoryError>;

    /// Fetch every existing item among `ids` in one round trip, ordered by ID.
    ///
    /// Missing IDs are silently absent from the result. Backends that lock
    /// rows lock the returned ones until the transaction ends.
    async fn items_by_ids(&mut self, ids: &[ItemId]) -> Result<Vec<Item>, RepositoryError>;

    /// Insert all items in one write, returned in input order.
    ///
    /// Returns `RepositoryError::MissingParent` if any referenced list does
    /// not exist; nothing is inserted in that case.
    async fn insert_items(&mut self, items: Vec<NewItem>) -> Result<Vec<Item>, RepositoryError>;

    /// Persist the mutable fields of `item` (name, completed, quantity).
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    async fn update_item(&mut self, item: &Item) -> Result<Item, RepositoryError>;

    /// Delete all items among `ids` in one write and return how many rows went.
    async fn delete_items(&mut self, ids: &[ItemId]) -> Result<u64, RepositoryError>;

    /// Make every write in this transaction visible.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
