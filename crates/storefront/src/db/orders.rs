//! Order repository: checkout and order history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{
    CurrencyCode, OrderId, OrderItemId, OrderStatus, Price, TasteProfile, UserId,
};

use super::RepositoryError;
use crate::models::cart::Cart;

/// An order placed through checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Price,
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of an order.
///
/// `profile` is the blend snapshot taken at checkout; imported orders from
/// the external store have no profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub name: String,
    pub profile: Option<TasteProfile>,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Database row for `shop.order`.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    status: String,
    currency: String,
    total: Decimal,
    placed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;
        let currency = row.currency.parse::<CurrencyCode>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid currency in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            status,
            total: Price::new(row.total, currency),
            placed_at: row.placed_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for `shop.order_item`.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    name: String,
    profile: Option<String>,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
}

fn item_from_row(row: OrderItemRow, currency: CurrencyCode) -> Result<OrderItem, RepositoryError> {
    let profile = row
        .profile
        .as_deref()
        .map(serde_json::from_str::<TasteProfile>)
        .transpose()
        .map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid blend snapshot in database: {e}"))
        })?;
    let quantity = u32::try_from(row.quantity).map_err(|_| {
        RepositoryError::DataCorruption(format!("negative quantity in database: {}", row.quantity))
    })?;

    Ok(OrderItem {
        id: OrderItemId::new(row.id),
        name: row.name,
        profile,
        quantity,
        unit_price: Price::new(row.unit_price, currency),
        line_total: Price::new(row.line_total, currency),
    })
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order from the session cart in a single transaction.
    ///
    /// The total is computed server-side from the cart's captured unit
    /// prices; each line's blend is snapshotted as JSON on the item row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    #[instrument(skip(self, cart), fields(user_id = %user_id, lines = cart.lines.len()))]
    pub async fn create_from_cart(
        &self,
        user_id: UserId,
        cart: &Cart,
        currency: CurrencyCode,
    ) -> Result<Order, RepositoryError> {
        let total = cart.subtotal();

        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(
            r"
            INSERT INTO shop.order (user_id, status, currency, total)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, status, currency, total, placed_at, updated_at
            ",
        )
        .bind(user_id.as_i32())
        .bind(OrderStatus::Pending.to_string())
        .bind(currency.as_str())
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        for line in &cart.lines {
            let snapshot = serde_json::to_string(&line.profile).map_err(|e| {
                RepositoryError::DataCorruption(format!("failed to serialize blend: {e}"))
            })?;
            let name = format!("Custom blend ({})", line.profile.flavour);
            let quantity = i32::try_from(line.quantity).unwrap_or(i32::MAX);

            sqlx::query::<sqlx::Postgres>(
                r"
                INSERT INTO shop.order_item
                    (order_id, name, profile, quantity, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(row.id)
            .bind(&name)
            .bind(&snapshot)
            .bind(quantity)
            .bind(line.unit_price.amount)
            .bind(line.line_total().amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Order::try_from(row)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r"
            SELECT id, user_id, status, currency, total, placed_at, updated_at
            FROM shop.order
            WHERE user_id = $1
            ORDER BY placed_at DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Get one of the user's orders with its items.
    ///
    /// Returns `None` when the order doesn't exist or belongs to someone
    /// else; callers can't tell the difference.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT id, user_id, status, currency, total, placed_at, updated_at
            FROM shop.order
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order = Order::try_from(row)?;
        let currency = order.total.currency_code;

        let item_rows: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT id, name, profile, quantity, unit_price, line_total
            FROM shop.order_item
            WHERE order_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let items = item_rows
            .into_iter()
            .map(|r| item_from_row(r, currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some((order, items)))
    }
}
