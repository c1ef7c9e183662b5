//! Order repository for fulfilment and the dashboard.
//!
//! The back-office view joins the customer's email onto each order and
//! exposes the WooCommerce linkage. Status changes from here drive the
//! fulfilment pipeline the storefront displays.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{
    CurrencyCode, OrderId, OrderItemId, OrderStatus, Price, TasteProfile, UserId,
};

use super::RepositoryError;

/// An order with its customer's email joined in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Remote WooCommerce order ID for imported orders.
    pub woo_id: Option<i64>,
    pub user_id: UserId,
    pub customer_email: String,
    pub status: OrderStatus,
    pub total: Price,
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of an order.
///
/// `profile` is the blend snapshot taken at checkout; imported orders have
/// none.
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

/// How many orders sit in one status, for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// One line of an order being imported from WooCommerce.
#[derive(Debug, Clone)]
pub struct ImportedOrderItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Database row for `shop.order` joined with the customer's email.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    woo_id: Option<i64>,
    user_id: i32,
    email: String,
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
            woo_id: row.woo_id,
            user_id: UserId::new(row.user_id),
            customer_email: row.email,
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

/// Repository for back-office order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r"
            SELECT o.id, o.woo_id, o.user_id, u.email, o.status, o.currency,
                   o.total, o.placed_at, o.updated_at
            FROM shop.order o
            JOIN shop.user u ON u.id = o.user_id
            WHERE ($1::VARCHAR IS NULL OR o.status = $1)
            ORDER BY o.placed_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(status.map(|s| s.to_string()))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Get one order with its items.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn get_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT o.id, o.woo_id, o.user_id, u.email, o.status, o.currency,
                   o.total, o.placed_at, o.updated_at
            FROM shop.order o
            JOIN shop.user u ON u.id = o.user_id
            WHERE o.id = $1
            ",
        )
        .bind(id.as_i32())
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

    /// Set an order's status. Callers validate the transition first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            UPDATE shop.order o
            SET status = $2, updated_at = NOW()
            FROM shop.user u
            WHERE o.id = $1 AND u.id = o.user_id
            RETURNING o.id, o.woo_id, o.user_id, u.email, o.status, o.currency,
                      o.total, o.placed_at, o.updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(status.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Total number of orders ever placed.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn count_all(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.order")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Revenue across all non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn revenue(&self) -> Result<Decimal, RepositoryError> {
        let total: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(total), 0) FROM shop.order WHERE status <> $1")
                .bind(OrderStatus::Cancelled.to_string())
                .fetch_one(self.pool)
                .await?;

        Ok(total)
    }

    /// Order counts grouped by status.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn status_breakdown(&self) -> Result<Vec<StatusCount>, RepositoryError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r"
            SELECT status, COUNT(*)
            FROM shop.order
            GROUP BY status
            ORDER BY status ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(status, count)| {
                let status = status.parse::<OrderStatus>().map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "invalid order status in database: {e}"
                    ))
                })?;
                Ok(StatusCount { status, count })
            })
            .collect()
    }

    /// The most recently placed orders, for the dashboard.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        self.list(None, limit, 0).await
    }

    /// Whether an order with this remote ID has already been imported.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn exists_by_woo_id(&self, woo_id: i64) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shop.order WHERE woo_id = $1)")
                .bind(woo_id)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Insert a remote order and its lines in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the remote ID was imported
    /// concurrently. Returns `RepositoryError::Database` for other
    /// database errors.
    #[instrument(skip(self, items), fields(woo_id, user_id = %user_id, lines = items.len()))]
    pub async fn insert_imported(
        &self,
        woo_id: i64,
        user_id: UserId,
        status: OrderStatus,
        total: Price,
        placed_at: DateTime<Utc>,
        items: &[ImportedOrderItem],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(
            r"
            INSERT INTO shop.order (woo_id, user_id, status, currency, total, placed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, woo_id, user_id,
                      (SELECT email FROM shop.user WHERE id = $2) AS email,
                      status, currency, total, placed_at, updated_at
            ",
        )
        .bind(woo_id)
        .bind(user_id.as_i32())
        .bind(status.to_string())
        .bind(total.currency_code.as_str())
        .bind(total.amount)
        .bind(placed_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("order already imported".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        for item in items {
            let quantity = i32::try_from(item.quantity).unwrap_or(i32::MAX);

            sqlx::query::<sqlx::Postgres>(
                r"
                INSERT INTO shop.order_item
                    (order_id, name, profile, quantity, unit_price, line_total)
                VALUES ($1, $2, NULL, $3, $4, $5)
                ",
            )
            .bind(row.id)
            .bind(&item.name)
            .bind(quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Order::try_from(row)
    }
}
