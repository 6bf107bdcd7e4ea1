//! `PostgreSQL` ownership store.
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate builds
//! without a live database. Rows are decoded into plain row structs and then
//! validated into domain types; a value the domain rejects is reported as
//! `RepositoryError::DataCorruption`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use grocery_core::{
    Account, AccountId, DisplayName, Email, GroceryList, Item, ItemId, ListId, Name, NewAccount,
    NewItem, NewList, Quantity,
};

use super::{AccountChanges, OwnershipStore, RepositoryError, StoreTx};

const ACCOUNT_COLUMNS: &str = "id, name, email, created_at";
const LIST_COLUMNS: &str = "id, name, owner_id, created_at";
const ITEM_COLUMNS: &str = "id, name, completed, quantity, list_id, created_at";

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: AccountId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AccountWithHashRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

#[derive(sqlx::FromRow)]
struct ListRow {
    id: ListId,
    name: String,
    owner_id: AccountId,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: ItemId,
    name: String,
    completed: bool,
    quantity: i32,
    list_id: ListId,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let name = DisplayName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid account name in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            name,
            email,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<ListRow> for GroceryList {
    type Error = RepositoryError;

    fn try_from(row: ListRow) -> Result<Self, Self::Error> {
        let name = Name::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid list name in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            name,
            owner_id: row.owner_id,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let name = Name::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid item name in database: {e}"))
        })?;
        let quantity = Quantity::new(i64::from(row.quantity)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid quantity in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            name,
            completed: row.completed,
            quantity,
            list_id: row.list_id,
            created_at: row.created_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Map constraint violations on writes to their repository meaning.
fn map_write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(c) if c.contains("email") => "email",
                Some(c) if c.contains("name") => "name",
                _ => what,
            };
            return RepositoryError::Conflict(format!("{field} already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::MissingParent(format!("{what} references a missing row"));
        }
    }
    RepositoryError::Database(e)
}

fn raw_ids(ids: &[ItemId]) -> Vec<i64> {
    ids.iter().map(ItemId::as_i64).collect()
}

/// [`OwnershipStore`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnershipStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn get_account(&mut self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM grocery.account WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_account_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountWithHashRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS}, password_hash FROM grocery.account WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some((Account::try_from(row.account)?, row.password_hash)))
    }

    async fn account_name_exists(&mut self, name: &DisplayName) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM grocery.account WHERE name = $1)")
                .bind(name.as_str())
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(exists)
    }

    async fn account_email_exists(&mut self, email: &Email) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM grocery.account WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(exists)
    }

    async fn insert_account(&mut self, account: NewAccount) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO grocery.account (name, email, password_hash) \
             VALUES ($1, $2, $3) RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(account.name.as_str())
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, "account"))?;

        Account::try_from(row)
    }

    async fn update_account(
        &mut self,
        changes: AccountChanges,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE grocery.account \
             SET name = $2, email = $3, password_hash = COALESCE($4, password_hash) \
             WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(changes.id)
        .bind(changes.name.as_str())
        .bind(changes.email.as_str())
        .bind(changes.password_hash)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, "account"))?
        .ok_or(RepositoryError::NotFound)?;

        Account::try_from(row)
    }

    async fn delete_account(&mut self, id: AccountId) -> Result<bool, RepositoryError> {
        sqlx::query(
            "DELETE FROM grocery.item WHERE list_id IN \
             (SELECT id FROM grocery.grocery_list WHERE owner_id = $1)",
        )
        .bind(id)
        .execute(&mut *self.tx)
        .await?;

        sqlx::query("DELETE FROM grocery.grocery_list WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        let result = sqlx::query("DELETE FROM grocery.account WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_list(&mut self, id: ListId) -> Result<Option<GroceryList>, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(&format!(
            "SELECT {LIST_COLUMNS} FROM grocery.grocery_list WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(GroceryList::try_from).transpose()
    }

    async fn lists_by_owner(
        &mut self,
        owner_id: AccountId,
    ) -> Result<Vec<GroceryList>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListRow>(&format!(
            "SELECT {LIST_COLUMNS} FROM grocery.grocery_list WHERE owner_id = $1 ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&mut *self.tx)
        .await?;

        convert_all(rows)
    }

    async fn insert_list(&mut self, list: NewList) -> Result<GroceryList, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(&format!(
            "INSERT INTO grocery.grocery_list (name, owner_id) VALUES ($1, $2) \
             RETURNING {LIST_COLUMNS}"
        ))
        .bind(list.name.as_str())
        .bind(list.owner_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, "list"))?;

        GroceryList::try_from(row)
    }

    async fn rename_list(
        &mut self,
        id: ListId,
        name: &Name,
    ) -> Result<GroceryList, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(&format!(
            "UPDATE grocery.grocery_list SET name = $2 WHERE id = $1 RETURNING {LIST_COLUMNS}"
        ))
        .bind(id)
        .bind(name.as_str())
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        GroceryList::try_from(row)
    }

    async fn delete_list(&mut self, id: ListId) -> Result<bool, RepositoryError> {
        sqlx::query("DELETE FROM grocery.item WHERE list_id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        let result = sqlx::query("DELETE FROM grocery.grocery_list WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_item(&mut self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM grocery.item WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(Item::try_from).transpose()
    }

    async fn items_by_list(&mut self, list_id: ListId) -> Result<Vec<Item>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM grocery.item WHERE list_id = $1 ORDER BY id"
        ))
        .bind(list_id)
        .fetch_all(&mut *self.tx)
        .await?;

        convert_all(rows)
    }

    async fn items_by_ids(&mut self, ids: &[ItemId]) -> Result<Vec<Item>, RepositoryError> {
        // Rows are locked in ID order so concurrent batches cannot deadlock.
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM grocery.item WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(raw_ids(ids))
        .fetch_all(&mut *self.tx)
        .await?;

        convert_all(rows)
    }

    async fn insert_items(&mut self, items: Vec<NewItem>) -> Result<Vec<Item>, RepositoryError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut names = Vec::with_capacity(items.len());
        let mut completed = Vec::with_capacity(items.len());
        let mut quantities = Vec::with_capacity(items.len());
        let mut list_ids = Vec::with_capacity(items.len());
        for item in items {
            names.push(String::from(item.name));
            completed.push(item.completed);
            quantities.push(item.quantity.get());
            list_ids.push(item.list_id.as_i64());
        }

        let mut rows = sqlx::query_as::<_, ItemRow>(&format!(
            "INSERT INTO grocery.item (name, completed, quantity, list_id) \
             SELECT * FROM UNNEST($1::text[], $2::bool[], $3::int4[], $4::int8[]) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(names)
        .bind(completed)
        .bind(quantities)
        .bind(list_ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, "item"))?;

        // IDs are drawn from the sequence in input order.
        rows.sort_by_key(|r| r.id);
        convert_all(rows)
    }

    async fn update_item(&mut self, item: &Item) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE grocery.item SET name = $2, completed = $3, quantity = $4 \
             WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(item.id)
        .bind(item.name.as_str())
        .bind(item.completed)
        .bind(item.quantity.get())
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Item::try_from(row)
    }

    async fn delete_items(&mut self, ids: &[ItemId]) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM grocery.item WHERE id = ANY($1)")
            .bind(raw_ids(ids))
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
