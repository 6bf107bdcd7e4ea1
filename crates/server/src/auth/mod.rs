//! Identity resolution.
//!
//! A request carries an opaque bearer token. [`IdentityResolver`] verifies it
//! with the [`TokenAuthenticator`] and then loads the account it names from
//! the store, so a token for a deleted account stops working immediately.
//! Nothing here is cached between requests.

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::{MIN_PASSWORD_LENGTH, hash_password, validate_password, verify_password};
pub use token::{Claims, DEFAULT_TOKEN_TTL, IssuedToken, TokenAuthenticator, VerifiedToken};

use grocery_core::AccountIdentity;

use crate::db::OwnershipStore;

/// Turns a presented credential into the acting identity.
pub struct IdentityResolver<'a> {
    store: &'a dyn OwnershipStore,
    tokens: &'a TokenAuthenticator,
}

impl<'a> IdentityResolver<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn OwnershipStore, tokens: &'a TokenAuthenticator) -> Self {
        Self { store, tokens }
    }

    /// Resolve `credential` to an [`AccountIdentity`].
    ///
    /// Read-only: the transaction is dropped without committing.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` if the token does not verify or
    /// the account no longer exists, and `AuthError::Repository` if the store
    /// cannot be read.
    pub async fn resolve(&self, credential: &str) -> Result<AccountIdentity, AuthError> {
        let verified = self.tokens.verify(credential)?;

        let mut tx = self.store.begin().await?;
        let account = tx
            .get_account(verified.account_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        Ok(account.identity())
    }
}
