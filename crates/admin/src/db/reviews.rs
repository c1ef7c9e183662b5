//! Review moderation repository.
//!
//! Joins the product name and reviewer email onto each review so the
//! moderation queue is readable without extra lookups.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{ProductId, ReviewId, ReviewStatus, UserId};

use super::RepositoryError;

/// A review in the moderation queue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub product_name: String,
    pub user_id: UserId,
    pub user_email: String,
    pub rating: u8,
    pub title: Option<String>,
    pub body: String,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for `shop.review` joined with product and reviewer.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    product_id: i32,
    product_name: String,
    user_id: i32,
    user_email: String,
    rating: i16,
    title: Option<String>,
    body: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating).map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid rating in database: {}", row.rating))
        })?;
        let status = row.status.parse::<ReviewStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid review status in database: {e}"))
        })?;

        Ok(Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            user_id: UserId::new(row.user_id),
            user_email: row.user_email,
            rating,
            title: row.title,
            body: row.body,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for review moderation.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List reviews in one status, oldest first so the queue is FIFO.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn list_by_status(
        &self,
        status: ReviewStatus,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r"
            SELECT r.id, r.product_id, p.name AS product_name, r.user_id,
                   u.email AS user_email, r.rating, r.title, r.body, r.status,
                   r.created_at, r.updated_at
            FROM shop.review r
            JOIN shop.product p ON p.id = r.product_id
            JOIN shop.user u ON u.id = r.user_id
            WHERE r.status = $1
            ORDER BY r.created_at ASC
            ",
        )
        .bind(status.to_string())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    /// Move a review to another moderation status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    #[instrument(skip(self), fields(review_id = %id, status = %status))]
    pub async fn set_status(
        &self,
        id: ReviewId,
        status: ReviewStatus,
    ) -> Result<Review, RepositoryError> {
        let row: Option<ReviewRow> = sqlx::query_as(
            r"
            UPDATE shop.review r
            SET status = $2, updated_at = NOW()
            FROM shop.product p, shop.user u
            WHERE r.id = $1 AND p.id = r.product_id AND u.id = r.user_id
            RETURNING r.id, r.product_id, p.name AS product_name, r.user_id,
                      u.email AS user_email, r.rating, r.title, r.body, r.status,
                      r.created_at, r.updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(status.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete a review outright.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.review WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Count reviews in one status, for the dashboard.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn count_by_status(&self, status: ReviewStatus) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.review WHERE status = $1")
            .bind(status.to_string())
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
