//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{IdentityResolver, TokenAuthenticator};
use crate::config::ServerConfig;
use crate::db::OwnershipStore;
use crate::services::{AccountService, BatchEngine, ItemService, ListService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Services borrow from it and
/// are built per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn OwnershipStore>,
    tokens: TokenAuthenticator,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn OwnershipStore>) -> Self {
        let tokens = TokenAuthenticator::new(&config.token_secret, config.token_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the ownership store.
    #[must_use]
    pub fn store(&self) -> &dyn OwnershipStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the token authenticator.
    #[must_use]
    pub fn tokens(&self) -> &TokenAuthenticator {
        &self.inner.tokens
    }

    #[must_use]
    pub fn identities(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(self.store(), self.tokens())
    }

    #[must_use]
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(self.store(), self.tokens())
    }

    #[must_use]
    pub fn lists(&self) -> ListService<'_> {
        ListService::new(self.store())
    }

    #[must_use]
    pub fn items(&self) -> ItemService<'_> {
        ItemService::new(self.store())
    }

    #[must_use]
    pub fn batch(&self) -> BatchEngine<'_> {
        BatchEngine::new(self.store())
    }
}
