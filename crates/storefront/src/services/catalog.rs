//! Cached catalog reads.
//!
//! Wraps the product and pricing repositories with an in-memory `moka`
//! cache (5-minute TTL) so catalog pages don't hit the database on every
//! request. Writes happen in the back office, so short staleness is fine.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use tracing::debug;

use roastline_core::ProductId;

use crate::db::pricing::Pricing;
use crate::db::products::Product;
use crate::db::{PricingRepository, ProductRepository, RepositoryError};

/// One page of the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
}

/// What a cache slot can hold.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Page(ProductPage),
    Pricing(Option<Pricing>),
}

/// Read-through cache over the catalog tables.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<CatalogCacheInner>,
}

struct CatalogCacheInner {
    pool: PgPool,
    cache: Cache<String, CacheValue>,
}

impl CatalogCache {
    /// Create a new catalog cache over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogCacheInner { pool, cache }),
        }
    }

    /// Get an active product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!(key = %cache_key, "Catalog cache hit");
            return Ok(Some(*product));
        }

        let product = ProductRepository::new(&self.inner.pool).get_active(id).await?;

        if let Some(ref product) = product {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// Get one page of active products with the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    pub async fn products(&self, limit: i64, offset: i64) -> Result<ProductPage, RepositoryError> {
        let cache_key = format!("products:{limit}:{offset}");

        if let Some(CacheValue::Page(page)) = self.inner.cache.get(&cache_key).await {
            debug!(key = %cache_key, "Catalog cache hit");
            return Ok(page);
        }

        let repo = ProductRepository::new(&self.inner.pool);
        let products = repo.list_active(limit, offset).await?;
        let total = repo.count_active().await?;
        let page = ProductPage { products, total };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Page(page.clone()))
            .await;

        Ok(page)
    }

    /// Get the active blend pricing row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    pub async fn active_pricing(&self) -> Result<Option<Pricing>, RepositoryError> {
        let cache_key = "pricing:active".to_string();

        if let Some(CacheValue::Pricing(pricing)) = self.inner.cache.get(&cache_key).await {
            debug!(key = %cache_key, "Catalog cache hit");
            return Ok(pricing);
        }

        let pricing = PricingRepository::new(&self.inner.pool).get_active().await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Pricing(pricing.clone()))
            .await;

        Ok(pricing)
    }
}
