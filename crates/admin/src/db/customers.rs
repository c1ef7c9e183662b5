//! Read-only lookups against storefront customer accounts.

use sqlx::PgPool;

use roastline_core::UserId;

use super::RepositoryError;

/// Repository for the handful of customer queries the back office needs.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Total number of registered customers.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.user")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Look up a customer ID by email, case-insensitively.
    ///
    /// Used to attach imported WooCommerce orders to local accounts.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn find_id_by_email(&self, email: &str) -> Result<Option<UserId>, RepositoryError> {
        let id: Option<i32> =
            sqlx::query_scalar("SELECT id FROM shop.user WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(self.pool)
                .await?;

        Ok(id.map(UserId::new))
    }
}
