//! Terms-and-conditions version repository.
//!
//! Versions are drafted here and published by activation; the storefront
//! only ever reads the single active version.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::TermsVersionId;

use super::RepositoryError;

/// One version of the terms and conditions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsVersion {
    pub id: TermsVersionId,
    pub version: String,
    pub body: String,
    pub active: bool,
    /// Set the first time the version is activated.
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Database row for `shop.terms_version`.
#[derive(Debug, sqlx::FromRow)]
struct TermsVersionRow {
    id: i32,
    version: String,
    body: String,
    active: bool,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<TermsVersionRow> for TermsVersion {
    fn from(row: TermsVersionRow) -> Self {
        Self {
            id: TermsVersionId::new(row.id),
            version: row.version,
            body: row.body,
            active: row.active,
            published_at: row.published_at,
            created_at: row.created_at,
        }
    }
}

/// Repository for terms versions.
pub struct TermsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TermsRepository<'a> {
    /// Create a new terms repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every version, newest first.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn list_all(&self) -> Result<Vec<TermsVersion>, RepositoryError> {
        let rows: Vec<TermsVersionRow> = sqlx::query_as(
            r"
            SELECT id, version, body, active, published_at, created_at
            FROM shop.terms_version
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(TermsVersion::from).collect())
    }

    /// Draft a new version. Drafts are inactive until activated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the version label is taken.
    /// Anything else surfaces as `RepositoryError::Database`.
    #[instrument(skip(self, body), fields(version = %version))]
    pub async fn create_draft(
        &self,
        version: &str,
        body: &str,
    ) -> Result<TermsVersion, RepositoryError> {
        let row: TermsVersionRow = sqlx::query_as(
            r"
            INSERT INTO shop.terms_version (version, body, active)
            VALUES ($1, $2, FALSE)
            RETURNING id, version, body, active, published_at, created_at
            ",
        )
        .bind(version)
        .bind(body)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("version label already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Activate one version, deactivating every other, and stamp its first
    /// publication time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the version doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    #[instrument(skip(self), fields(terms_id = %id))]
    pub async fn activate(&self, id: TermsVersionId) -> Result<TermsVersion, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE shop.terms_version SET active = FALSE WHERE active")
            .execute(&mut *tx)
            .await?;

        let row: Option<TermsVersionRow> = sqlx::query_as(
            r"
            UPDATE shop.terms_version
            SET active = TRUE, published_at = COALESCE(published_at, NOW())
            WHERE id = $1
            RETURNING id, version, body, active, published_at, created_at
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(row.into())
    }
}
