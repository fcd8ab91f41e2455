//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::{ItemRepository, ItemStore, UserRepository, UserStore};
use crate::services::auth::AuthService;
use crate::services::token::TokenService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the stores and the token service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    users: Arc<dyn UserStore>,
    items: Arc<dyn ItemStore>,
    tokens: TokenService,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create application state backed by `PostgreSQL`.
    #[must_use]
    pub fn new(config: &ApiConfig, pool: PgPool) -> Self {
        let users = Arc::new(UserRepository::new(pool.clone()));
        let items = Arc::new(ItemRepository::new(pool.clone()));
        Self::build(config, users, items, Some(pool))
    }

    /// Create application state over arbitrary stores.
    ///
    /// Without a pool the readiness probe always reports ready.
    #[must_use]
    pub fn with_stores(
        config: &ApiConfig,
        users: Arc<dyn UserStore>,
        items: Arc<dyn ItemStore>,
    ) -> Self {
        Self::build(config, users, items, None)
    }

    fn build(
        config: &ApiConfig,
        users: Arc<dyn UserStore>,
        items: Arc<dyn ItemStore>,
        pool: Option<PgPool>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                users,
                items,
                tokens,
                pool,
            }),
        }
    }

    /// Get the credential store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Get the item repository.
    #[must_use]
    pub fn items(&self) -> &dyn ItemStore {
        self.inner.items.as_ref()
    }

    /// Get the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get the database pool, if the state is backed by `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Authentication service borrowing this state's stores.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.users(), self.tokens())
    }
}
