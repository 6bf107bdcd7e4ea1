//! Registration, login, and self-service profile management.

use tracing::instrument;

use grocery_core::authz::authorize_account;
use grocery_core::{Account, AccountId, AccountIdentity, DisplayName, Email, NewAccount};

use super::ServiceError;
use crate::auth::{self, IssuedToken, TokenAuthenticator};
use crate::db::{AccountChanges, OwnershipStore, StoreTx};

/// Input for [`AccountService::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input for [`AccountService::update`]. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Account lifecycle. Profile changes are self-only.
pub struct AccountService<'a> {
    store: &'a dyn OwnershipStore,
    tokens: &'a TokenAuthenticator,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn OwnershipStore, tokens: &'a TokenAuthenticator) -> Self {
        Self { store, tokens }
    }

    /// Register a new account.
    ///
    /// The password is hashed before the transaction opens. Name and email
    /// uniqueness are checked before the insert, inside the transaction.
    ///
    /// # Errors
    ///
    /// `Validation` for a bad name, email, or password; `Conflict` if the
    /// name or email is taken.
    #[instrument(skip_all)]
    pub async fn register(&self, registration: Registration) -> Result<Account, ServiceError> {
        let name = DisplayName::parse(&registration.name)?;
        let email = Email::parse(&registration.email)?;
        auth::validate_password(&registration.password)?;
        let password_hash = auth::hash_password(&registration.password)?;

        let mut tx = self.store.begin().await?;
        ensure_name_free(&mut *tx, &name).await?;
        ensure_email_free(&mut *tx, &email).await?;

        let account = tx
            .insert_account(NewAccount {
                name,
                email,
                password_hash,
            })
            .await?;
        tx.commit().await?;

        tracing::info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Exchange an email and password for a bearer token.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for an unknown email or a wrong password. The two
    /// cases are indistinguishable to the caller.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Account, IssuedToken), ServiceError> {
        let Ok(email) = Email::parse(email) else {
            return Err(ServiceError::Unauthenticated);
        };

        let mut tx = self.store.begin().await?;
        let Some((account, password_hash)) = tx.find_account_by_email(&email).await? else {
            tracing::warn!("login for unknown email");
            return Err(ServiceError::Unauthenticated);
        };
        drop(tx);

        auth::verify_password(password, &password_hash).inspect_err(|_| {
            tracing::warn!(account_id = %account.id, "login with wrong password");
        })?;

        let token = self.tokens.issue(&account)?;
        tracing::info!(account_id = %account.id, "login succeeded");
        Ok((account, token))
    }

    /// The caller's own account.
    ///
    /// # Errors
    ///
    /// `NotFound` if the account was deleted after the identity resolved.
    pub async fn get_self(&self, identity: &AccountIdentity) -> Result<Account, ServiceError> {
        let mut tx = self.store.begin().await?;
        tx.get_account(identity.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("account {}", identity.id)))
    }

    /// Change the caller's display name, email, or password.
    ///
    /// Uniqueness is only checked for a value that actually changes.
    ///
    /// # Errors
    ///
    /// `NotFound` if the account does not exist, `Forbidden` if it is not
    /// the caller, `Validation` for bad values, `Conflict` for a taken name
    /// or email.
    #[instrument(skip(self, identity, update), fields(account_id = %identity.id, target = %account_id))]
    pub async fn update(
        &self,
        identity: &AccountIdentity,
        account_id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, ServiceError> {
        // Argon2 runs before the transaction opens. Its error is reported
        // only after the ownership check.
        let password_hash = update.password.map(|password| {
            auth::validate_password(&password)?;
            auth::hash_password(&password)
        });

        let mut tx = self.store.begin().await?;
        let current = load_self(&mut *tx, identity, account_id).await?;

        let name = match update.name {
            Some(raw) => DisplayName::parse(&raw)?,
            None => current.name.clone(),
        };
        let email = match update.email {
            Some(raw) => Email::parse(&raw)?,
            None => current.email.clone(),
        };
        let password_hash = password_hash.transpose()?;

        if name != current.name {
            ensure_name_free(&mut *tx, &name).await?;
        }
        if email != current.email {
            ensure_email_free(&mut *tx, &email).await?;
        }

        let account = tx
            .update_account(AccountChanges {
                id: account_id,
                name,
                email,
                password_hash,
            })
            .await?;
        tx.commit().await?;

        tracing::info!("account updated");
        Ok(account)
    }

    /// Delete the caller's account with all of its lists and items.
    ///
    /// # Errors
    ///
    /// `NotFound` if the account does not exist, `Forbidden` if it is not
    /// the caller.
    #[instrument(skip(self, identity), fields(account_id = %identity.id, target = %account_id))]
    pub async fn delete(
        &self,
        identity: &AccountIdentity,
        account_id: AccountId,
    ) -> Result<(), ServiceError> {
        let mut tx = self.store.begin().await?;
        load_self(&mut *tx, identity, account_id).await?;

        if !tx.delete_account(account_id).await? {
            return Err(ServiceError::NotFound(format!("account {account_id}")));
        }
        tx.commit().await?;

        tracing::info!("account deleted");
        Ok(())
    }
}

async fn load_self(
    tx: &mut dyn StoreTx,
    identity: &AccountIdentity,
    account_id: AccountId,
) -> Result<Account, ServiceError> {
    let account = tx
        .get_account(account_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("account {account_id}")))?;

    if !authorize_account(identity, account_id).is_allowed() {
        tracing::warn!(account_id = %identity.id, target = %account_id, "account access denied");
        return Err(ServiceError::Forbidden(format!("account {account_id}")));
    }

    Ok(account)
}

async fn ensure_name_free(tx: &mut dyn StoreTx, name: &DisplayName) -> Result<(), ServiceError> {
    if tx.account_name_exists(name).await? {
        return Err(ServiceError::Conflict("display name already taken".to_string()));
    }
    Ok(())
}

async fn ensure_email_free(tx: &mut dyn StoreTx, email: &Email) -> Result<(), ServiceError> {
    if tx.account_email_exists(email).await? {
        return Err(ServiceError::Conflict("email already registered".to_string()));
    }
    Ok(())
}
