//! Sync run history repository.
//!
//! Every WooCommerce sync, manual or scheduled, writes one row here so
//! operators can see what ran, what it touched, and how it ended.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{SyncDirection, SyncRunId, SyncStatus};

use super::RepositoryError;

/// One recorded synchronization run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRun {
    pub id: SyncRunId,
    pub direction: SyncDirection,
    pub status: SyncStatus,
    pub created: i32,
    pub updated: i32,
    pub skipped: i32,
    pub failed: i32,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Per-record tallies accumulated while a sync runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncCounts {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
}

/// Database row for `admin.sync_run`.
#[derive(Debug, sqlx::FromRow)]
struct SyncRunRow {
    id: i32,
    direction: String,
    status: String,
    created_count: i32,
    updated_count: i32,
    skipped_count: i32,
    failed_count: i32,
    error: Option<String>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl TryFrom<SyncRunRow> for SyncRun {
    type Error = RepositoryError;

    fn try_from(row: SyncRunRow) -> Result<Self, Self::Error> {
        let direction = row.direction.parse::<SyncDirection>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid sync direction in database: {e}"))
        })?;
        let status = row.status.parse::<SyncStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid sync status in database: {e}"))
        })?;

        Ok(Self {
            id: SyncRunId::new(row.id),
            direction,
            status,
            created: row.created_count,
            updated: row.updated_count,
            skipped: row.skipped_count,
            failed: row.failed_count,
            error: row.error,
            started_at: row.started_at,
            finished_at: row.finished_at,
        })
    }
}

fn count_to_i32(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Repository for sync run records.
pub struct SyncRunRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SyncRunRepository<'a> {
    /// Create a new sync run repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record the start of a run.
    ///
    /// # Errors
    ///
    /// Surfaces insert failures as `RepositoryError::Database`.
    #[instrument(skip(self), fields(direction = %direction))]
    pub async fn start(&self, direction: SyncDirection) -> Result<SyncRun, RepositoryError> {
        let row: SyncRunRow = sqlx::query_as(
            r"
            INSERT INTO admin.sync_run (direction, status)
            VALUES ($1, $2)
            RETURNING id, direction, status, created_count, updated_count,
                      skipped_count, failed_count, error, started_at, finished_at
            ",
        )
        .bind(direction.to_string())
        .bind(SyncStatus::Running.to_string())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Record a run's outcome and tallies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the run doesn't exist.
    /// Anything else surfaces as `RepositoryError::Database`.
    #[instrument(skip(self, counts), fields(run_id = %id, status = %status))]
    pub async fn finish(
        &self,
        id: SyncRunId,
        status: SyncStatus,
        counts: SyncCounts,
        error: Option<&str>,
    ) -> Result<SyncRun, RepositoryError> {
        let row: Option<SyncRunRow> = sqlx::query_as(
            r"
            UPDATE admin.sync_run
            SET status = $2, created_count = $3, updated_count = $4,
                skipped_count = $5, failed_count = $6, error = $7,
                finished_at = NOW()
            WHERE id = $1
            RETURNING id, direction, status, created_count, updated_count,
                      skipped_count, failed_count, error, started_at, finished_at
            ",
        )
        .bind(id.as_i32())
        .bind(status.to_string())
        .bind(count_to_i32(counts.created))
        .bind(count_to_i32(counts.updated))
        .bind(count_to_i32(counts.skipped))
        .bind(count_to_i32(counts.failed))
        .bind(error)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// List the most recent runs, newest first.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<SyncRun>, RepositoryError> {
        let rows: Vec<SyncRunRow> = sqlx::query_as(
            r"
            SELECT id, direction, status, created_count, updated_count,
                   skipped_count, failed_count, error, started_at, finished_at
            FROM admin.sync_run
            ORDER BY started_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SyncRun::try_from).collect()
    }
}
