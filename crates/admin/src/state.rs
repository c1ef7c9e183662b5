//! What every request handler can reach.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::woocommerce::WooClient;

/// Everything the handlers share, behind one cheap `Clone`.
///
/// Carries both pools: accounts, media and run history live in the admin
/// database while catalog, order and review management run against the
/// shop database.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    admin_pool: PgPool,
    shop_pool: PgPool,
    woo: WooClient,
}

impl AppState {
    /// Assemble the state, building the WooCommerce client from config.
    #[must_use]
    pub fn new(config: AdminConfig, admin_pool: PgPool, shop_pool: PgPool) -> Self {
        let woo = WooClient::new(&config.woocommerce);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                admin_pool,
                shop_pool,
                woo,
            }),
        }
    }

    /// Admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Pool for the admin database.
    #[must_use]
    pub fn admin_pool(&self) -> &PgPool {
        &self.inner.admin_pool
    }

    /// Pool for the shop database.
    #[must_use]
    pub fn shop_pool(&self) -> &PgPool {
        &self.inner.shop_pool
    }

    /// Shared WooCommerce client.
    #[must_use]
    pub fn woo(&self) -> &WooClient {
        &self.inner.woo
    }
}
