//! Terms and conditions repository.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use roastline_core::TermsVersionId;

use super::RepositoryError;

/// A published terms and conditions document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsVersion {
    pub id: TermsVersionId,
    pub version: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Database row for `shop.terms_version`.
#[derive(Debug, sqlx::FromRow)]
struct TermsVersionRow {
    id: i32,
    version: String,
    body: String,
    published_at: Option<DateTime<Utc>>,
}

impl From<TermsVersionRow> for TermsVersion {
    fn from(row: TermsVersionRow) -> Self {
        Self {
            id: TermsVersionId::new(row.id),
            version: row.version,
            body: row.body,
            published_at: row.published_at,
        }
    }
}

/// Repository for terms and conditions lookups.
pub struct TermsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TermsRepository<'a> {
    /// Create a new terms repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the active terms document, if one has been published.
    ///
    /// At most one version is active at a time; activation is handled by
    /// the back office.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn get_active(&self) -> Result<Option<TermsVersion>, RepositoryError> {
        let row: Option<TermsVersionRow> = sqlx::query_as(
            r"
            SELECT id, version, body, published_at
            FROM shop.terms_version
            WHERE active = TRUE
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(TermsVersion::from))
    }
}
