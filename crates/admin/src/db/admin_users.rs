//! Admin user repository.
//!
//! Back-office accounts live in the admin database. Every admin account has
//! a password (there is no OAuth in the back office), so the Argon2 hash sits
//! directly on the row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{AdminRole, AdminUserId, Email};

use super::RepositoryError;
use crate::models::admin_user::AdminUser;

/// Database row for `admin.admin_user`.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    email: String,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("stored email no longer parses: {e}"))
        })?;
        let role = row.role.parse::<AdminRole>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid admin role in database: {e}"))
        })?;

        Ok(Self {
            id: AdminUserId::new(row.id),
            email,
            name: row.name,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Queries against `admin.admin_user`.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Build a repository borrowing the admin pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every admin account, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure, `DataCorruption` when a stored
    /// email or role does not parse.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows: Vec<AdminUserRow> = sqlx::query_as(
            r"
            SELECT id, email, name, role, created_at, updated_at
            FROM admin.admin_user
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AdminUser::try_from).collect()
    }

    /// Look up a single admin account.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure, `DataCorruption` when a stored
    /// email or role does not parse.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row: Option<AdminUserRow> = sqlx::query_as(
            r"
            SELECT id, email, name, role, created_at, updated_at
            FROM admin.admin_user
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(AdminUser::try_from).transpose()
    }

    /// Fetch an account and its Argon2 hash for a login check.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure, `DataCorruption` when a stored
    /// email or role does not parse.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct RowWithHash {
            #[sqlx(flatten)]
            user: AdminUserRow,
            password_hash: String,
        }

        let row: Option<RowWithHash> = sqlx::query_as(
            r"
            SELECT id, email, name, role, password_hash, created_at, updated_at
            FROM admin.admin_user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((AdminUser::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    /// Insert a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the email is already registered, `Database`
    /// for any other database error.
    #[instrument(skip(self, password_hash), fields(email = %email, role = %role))]
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        role: AdminRole,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let row: AdminUserRow = sqlx::query_as(
            r"
            INSERT INTO admin.admin_user (email, name, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, role, created_at, updated_at
            ",
        )
        .bind(email.as_str())
        .bind(name)
        .bind(role.to_string())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email is already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Change an account's role.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no such account exists, `Database` for any
    /// other database error.
    pub async fn update_role(
        &self,
        id: AdminUserId,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let row: Option<AdminUserRow> = sqlx::query_as(
            r"
            UPDATE admin.admin_user
            SET role = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, email, name, role, created_at, updated_at
            ",
        )
        .bind(role.to_string())
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Remove an admin account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no such account exists, `Database` for any
    /// other database error.
    pub async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM admin.admin_user
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Number of accounts currently holding `role`.
    ///
    /// The role guards in the routes use this to keep the last super admin
    /// in place.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn count_by_role(&self, role: AdminRole) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM admin.admin_user
            WHERE role = $1
            ",
        )
        .bind(role.to_string())
        .fetch_one(self.pool)
        .await?;

        Ok(count.0)
    }
}
