//! Blend pricing repository.
//!
//! A partial unique index on `shop.pricing` lets at most one row be active;
//! activation deactivates the rest inside one transaction so the constraint
//! never trips.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{CurrencyCode, Price, PricingId};

use super::RepositoryError;

/// A per-unit pricing scheme for custom blends.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub id: PricingId,
    pub name: String,
    pub unit_price: Price,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Database row for `shop.pricing`.
#[derive(Debug, sqlx::FromRow)]
struct PricingRow {
    id: i32,
    name: String,
    unit_price: Decimal,
    currency: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<PricingRow> for Pricing {
    type Error = RepositoryError;

    fn try_from(row: PricingRow) -> Result<Self, Self::Error> {
        let currency = row.currency.parse::<CurrencyCode>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid currency in database: {e}"))
        })?;

        Ok(Self {
            id: PricingId::new(row.id),
            name: row.name,
            unit_price: Price::new(row.unit_price, currency),
            active: row.active,
            created_at: row.created_at,
        })
    }
}

/// Repository for pricing schemes.
pub struct PricingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PricingRepository<'a> {
    /// Create a new pricing repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all pricing schemes, newest first.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn list_all(&self) -> Result<Vec<Pricing>, RepositoryError> {
        let rows: Vec<PricingRow> = sqlx::query_as(
            r"
            SELECT id, name, unit_price, currency, active, created_at
            FROM shop.pricing
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Pricing::try_from).collect()
    }

    /// Create a pricing scheme. New schemes start inactive.
    ///
    /// # Errors
    ///
    /// Surfaces insert failures as `RepositoryError::Database`.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn create(&self, name: &str, unit_price: Price) -> Result<Pricing, RepositoryError> {
        let row: PricingRow = sqlx::query_as(
            r"
            INSERT INTO shop.pricing (name, unit_price, currency, active)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id, name, unit_price, currency, active, created_at
            ",
        )
        .bind(name)
        .bind(unit_price.amount)
        .bind(unit_price.currency_code.as_str())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Update a scheme's name or unit price; `None` fields are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the scheme doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    pub async fn update(
        &self,
        id: PricingId,
        name: Option<&str>,
        unit_price: Option<Price>,
    ) -> Result<Pricing, RepositoryError> {
        let row: Option<PricingRow> = sqlx::query_as(
            r"
            UPDATE shop.pricing
            SET name = COALESCE($2, name),
                unit_price = COALESCE($3, unit_price),
                currency = COALESCE($4, currency)
            WHERE id = $1
            RETURNING id, name, unit_price, currency, active, created_at
            ",
        )
        .bind(id.as_i32())
        .bind(name)
        .bind(unit_price.as_ref().map(|p| p.amount))
        .bind(unit_price.as_ref().map(|p| p.currency_code.as_str()))
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Make one scheme the active one, deactivating every other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the scheme doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    #[instrument(skip(self), fields(pricing_id = %id))]
    pub async fn activate(&self, id: PricingId) -> Result<Pricing, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE shop.pricing SET active = FALSE WHERE active")
            .execute(&mut *tx)
            .await?;

        let row: Option<PricingRow> = sqlx::query_as(
            r"
            UPDATE shop.pricing
            SET active = TRUE
            WHERE id = $1
            RETURNING id, name, unit_price, currency, active, created_at
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        row.try_into()
    }
}
