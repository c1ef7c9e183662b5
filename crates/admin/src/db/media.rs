//! Media asset metadata repository.
//!
//! Files live on disk under the configured media directory; this table
//! only records what was uploaded, by whom, and under which stored name.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{AdminUserId, MediaAssetId};

use super::RepositoryError;

/// Metadata for one uploaded file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: MediaAssetId,
    /// Stored name on disk, unique per upload.
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Admin who uploaded it; `NULL` once that account is deleted.
    pub uploaded_by: Option<AdminUserId>,
    pub created_at: DateTime<Utc>,
}

/// Database row for `admin.media_asset`.
#[derive(Debug, sqlx::FromRow)]
struct MediaAssetRow {
    id: i32,
    file_name: String,
    content_type: String,
    size_bytes: i64,
    uploaded_by: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<MediaAssetRow> for MediaAsset {
    fn from(row: MediaAssetRow) -> Self {
        Self {
            id: MediaAssetId::new(row.id),
            file_name: row.file_name,
            content_type: row.content_type,
            size_bytes: row.size_bytes,
            uploaded_by: row.uploaded_by.map(AdminUserId::new),
            created_at: row.created_at,
        }
    }
}

/// Repository for media asset metadata.
pub struct MediaRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MediaRepository<'a> {
    /// Create a new media repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record an upload.
    ///
    /// # Errors
    ///
    /// Surfaces insert failures as `RepositoryError::Database`.
    #[instrument(skip(self), fields(file_name = %file_name, size_bytes))]
    pub async fn create(
        &self,
        file_name: &str,
        content_type: &str,
        size_bytes: i64,
        uploaded_by: AdminUserId,
    ) -> Result<MediaAsset, RepositoryError> {
        let row: MediaAssetRow = sqlx::query_as(
            r"
            INSERT INTO admin.media_asset (file_name, content_type, size_bytes, uploaded_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, file_name, content_type, size_bytes, uploaded_by, created_at
            ",
        )
        .bind(file_name)
        .bind(content_type)
        .bind(size_bytes)
        .bind(uploaded_by.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List every asset, newest first.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn list_all(&self) -> Result<Vec<MediaAsset>, RepositoryError> {
        let rows: Vec<MediaAssetRow> = sqlx::query_as(
            r"
            SELECT id, file_name, content_type, size_bytes, uploaded_by, created_at
            FROM admin.media_asset
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaAsset::from).collect())
    }

    /// Delete an asset's metadata, returning it so the caller can remove
    /// the file from disk.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the asset doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    pub async fn delete(&self, id: MediaAssetId) -> Result<MediaAsset, RepositoryError> {
        let row: Option<MediaAssetRow> = sqlx::query_as(
            r"
            DELETE FROM admin.media_asset
            WHERE id = $1
            RETURNING id, file_name, content_type, size_bytes, uploaded_by, created_at
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(MediaAsset::from).ok_or(RepositoryError::NotFound)
    }
}
