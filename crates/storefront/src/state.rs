//! Process-wide state handed to every handler.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::catalog::CatalogCache;
use crate::services::identity::IdentityClient;

/// Shared handles: config, database pool, the catalog cache, and the
/// identity provider client. Clones are cheap (one `Arc`).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: CatalogCache,
    identity: IdentityClient,
}

impl AppState {
    /// Build the state, wiring the catalog cache and identity client
    /// from the given config and pool.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = CatalogCache::new(pool.clone());
        let identity = IdentityClient::new(&config.identity, config.oauth_redirect_uri());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                identity,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Cached catalog reads (products and active pricing).
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }

    /// Client for the hosted identity provider.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }
}
