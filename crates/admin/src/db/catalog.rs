//! Catalog repository with full write access.
//!
//! Unlike the storefront, the back office sees inactive products and the
//! WooCommerce linkage (`woo_id`). All writes to `shop.product` go through
//! here: manual CRUD, pull synchronization, and webhook-applied changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{CurrencyCode, Price, ProductId};

use super::RepositoryError;

/// A catalog product as seen by the back office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    /// Remote WooCommerce product ID, once linked by a sync run.
    pub woo_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub origin: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub origin: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub origin: Option<String>,
    pub price: Option<Price>,
    pub image_url: Option<String>,
}

/// Database row for `shop.product`.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    woo_id: Option<i64>,
    name: String,
    description: String,
    origin: Option<String>,
    price: Decimal,
    currency: String,
    image_url: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let currency = row.currency.parse::<CurrencyCode>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid currency in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            woo_id: row.woo_id,
            name: row.name,
            description: row.description,
            origin: row.origin,
            price: Price::new(row.price, currency),
            image_url: row.image_url,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for catalog management.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, active or not, ordered by name.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT id, woo_id, name, description, origin, price, currency,
                   image_url, active, created_at, updated_at
            FROM shop.product
            ORDER BY name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get one product by ID.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, woo_id, name, description, origin, price, currency,
                   image_url, active, created_at, updated_at
            FROM shop.product
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Get one product by its remote WooCommerce ID.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn get_by_woo_id(&self, woo_id: i64) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, woo_id, name, description, origin, price, currency,
                   image_url, active, created_at, updated_at
            FROM shop.product
            WHERE woo_id = $1
            ",
        )
        .bind(woo_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Find a product by case-insensitive name match.
    ///
    /// Used as the fallback when linking remote products that have no
    /// recorded `woo_id` yet.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn find_by_name_ci(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, woo_id, name, description, origin, price, currency,
                   image_url, active, created_at, updated_at
            FROM shop.product
            WHERE LOWER(name) = LOWER($1)
            LIMIT 1
            ",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Create a product. New products start inactive until explicitly
    /// activated.
    ///
    /// # Errors
    ///
    /// Surfaces insert failures as `RepositoryError::Database`.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(
            r"
            INSERT INTO shop.product (name, description, origin, price, currency, image_url, active)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING id, woo_id, name, description, origin, price, currency,
                      image_url, active, created_at, updated_at
            ",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.origin.as_deref())
        .bind(new.price.amount)
        .bind(new.price.currency_code.as_str())
        .bind(new.image_url.as_deref())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            UPDATE shop.product
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                origin = COALESCE($4, origin),
                price = COALESCE($5, price),
                currency = COALESCE($6, currency),
                image_url = COALESCE($7, image_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, woo_id, name, description, origin, price, currency,
                      image_url, active, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.origin.as_deref())
        .bind(changes.price.as_ref().map(|p| p.amount))
        .bind(changes.price.as_ref().map(|p| p.currency_code.as_str()))
        .bind(changes.image_url.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Show or hide a product in the storefront.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    pub async fn set_active(
        &self,
        id: ProductId,
        active: bool,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            UPDATE shop.product
            SET active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, woo_id, name, description, origin, price, currency,
                      image_url, active, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(active)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Drop the product row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Overwrite a product's synced fields from the remote copy and record
    /// the remote ID.
    ///
    /// A remote price that could not be parsed is passed as `None` and
    /// leaves the local price untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    pub async fn sync_from_remote(
        &self,
        id: ProductId,
        woo_id: i64,
        name: &str,
        description: &str,
        price: Option<Decimal>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.product
            SET woo_id = $2, name = $3, description = $4,
                price = COALESCE($5, price), updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(woo_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Insert a product discovered on the remote store.
    ///
    /// # Errors
    ///
    /// Surfaces insert failures as `RepositoryError::Database`.
    #[instrument(skip(self, name, description), fields(woo_id))]
    pub async fn insert_from_remote(
        &self,
        woo_id: i64,
        name: &str,
        description: &str,
        price: Decimal,
        currency: CurrencyCode,
        active: bool,
    ) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(
            r"
            INSERT INTO shop.product (woo_id, name, description, price, currency, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, woo_id, name, description, origin, price, currency,
                      image_url, active, created_at, updated_at
            ",
        )
        .bind(woo_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(currency.as_str())
        .bind(active)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Record the remote ID on a local product (after a push created it
    /// remotely, or a name match linked it).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    pub async fn set_woo_id(&self, id: ProductId, woo_id: i64) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE shop.product SET woo_id = $2, updated_at = NOW() WHERE id = $1")
                .bind(id.as_i32())
                .bind(woo_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete the product linked to a remote ID, if any.
    ///
    /// Returns whether a row was deleted; webhook deletes for products we
    /// never tracked are not an error.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn delete_by_woo_id(&self, woo_id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE woo_id = $1")
            .bind(woo_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
