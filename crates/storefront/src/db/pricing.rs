//! Blend pricing repository (read-only).
//!
//! Custom blends are priced from the single active `shop.pricing` row. The
//! admin binary manages the rows; the storefront only reads the active one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use roastline_core::{CurrencyCode, Price, PricingId};

use super::RepositoryError;

/// A pricing configuration row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub id: PricingId,
    /// Label, e.g. "250g bag 2026".
    pub name: String,
    /// Price per bag of a custom blend.
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

/// Repository for pricing reads.
pub struct PricingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PricingRepository<'a> {
    /// Create a new pricing repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the active pricing row, if one is configured.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn get_active(&self) -> Result<Option<Pricing>, RepositoryError> {
        let row: Option<PricingRow> = sqlx::query_as(
            r"
            SELECT id, name, unit_price, currency, active, created_at
            FROM shop.pricing
            WHERE active = TRUE
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        row.map(Pricing::try_from).transpose()
    }
}
