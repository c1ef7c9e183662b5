//! Review repository.
//!
//! Customers submit reviews which start out pending; only approved
//! reviews are shown on the catalog.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{ProductId, ReviewId, ReviewStatus, UserId};

use super::RepositoryError;

/// A product review as shown on the storefront.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub rating: u8,
    pub title: Option<String>,
    pub body: String,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database row for `shop.review` joined with the author's display name.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    product_id: i32,
    rating: i16,
    title: Option<String>,
    body: String,
    author_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating).map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid rating in database: {}", row.rating))
        })?;

        Ok(Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            rating,
            title: row.title,
            body: row.body,
            author_name: row.author_name,
            created_at: row.created_at,
        })
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List approved reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn list_approved_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r"
            SELECT r.id, r.product_id, r.rating, r.title, r.body,
                   u.display_name AS author_name, r.created_at
            FROM shop.review r
            JOIN shop.user u ON u.id = r.user_id
            WHERE r.product_id = $1 AND r.status = $2
            ORDER BY r.created_at DESC
            ",
        )
        .bind(product_id.as_i32())
        .bind(ReviewStatus::Approved.to_string())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    /// Submit a review. It is stored as pending and not returned by
    /// [`Self::list_approved_for_product`] until moderated.
    ///
    /// # Errors
    ///
    /// Surfaces insert failures as `RepositoryError::Database`.
    #[instrument(skip(self, title, body), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn submit(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: u8,
        title: Option<&str>,
        body: &str,
    ) -> Result<ReviewId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.review (product_id, user_id, rating, title, body, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .bind(i16::from(rating))
        .bind(title)
        .bind(body)
        .bind(ReviewStatus::Pending.to_string())
        .fetch_one(self.pool)
        .await?;

        Ok(ReviewId::new(id))
    }
}
