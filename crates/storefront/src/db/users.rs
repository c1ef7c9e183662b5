//! Customer account repository.
//!
//! Covers accounts and their password credentials. Queries use the
//! runtime API with `FromRow` structs so the crate builds without a live
//! database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{Email, UserId};

use super::RepositoryError;
use crate::models::user::User;

/// Database row for `shop.user`.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    display_name: Option<String>,
    marketing_opt_in: bool,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("stored email no longer parses: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            display_name: row.display_name,
            marketing_opt_in: row.marketing_opt_in,
            email_verified: row.email_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Queries against `shop.user` and `shop.user_password`.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Build a repository borrowing the shop pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up an account by email.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure, `DataCorruption` when the
    /// stored email does not parse.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, email, display_name, marketing_opt_in, email_verified,
                   created_at, updated_at
            FROM shop.user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure, `DataCorruption` when the
    /// stored email does not parse.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, email, display_name, marketing_opt_in, email_verified,
                   created_at, updated_at
            FROM shop.user
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Insert an account together with its password credential.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the email is already registered, `Database`
    /// for any other database error.
    #[instrument(skip(self, password_hash), fields(email = %email))]
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO shop.user (email)
            VALUES ($1)
            RETURNING id, email, display_name, marketing_opt_in, email_verified,
                      created_at, updated_at
            ",
        )
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email is already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let user = User::try_from(row)?;

        sqlx::query::<sqlx::Postgres>(
            "INSERT INTO shop.user_password (user_id, password_hash) VALUES ($1, $2)",
        )
        .bind(user.id.as_i32())
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Fetch an account and its Argon2 hash for a login check.
    ///
    /// `None` covers both unknown emails and OAuth-only accounts that
    /// never set a password.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure, `DataCorruption` when the
    /// stored email does not parse.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UserPasswordRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: Option<String>,
        }

        let row: Option<UserPasswordRow> = sqlx::query_as(
            r"
            SELECT u.id, u.email, u.display_name, u.marketing_opt_in, u.email_verified,
                   u.created_at, u.updated_at, p.password_hash
            FROM shop.user u
            LEFT JOIN shop.user_password p ON u.id = p.user_id
            WHERE u.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let Some(password_hash) = r.password_hash else {
            return Ok(None);
        };

        Ok(Some((User::try_from(r.user)?, password_hash)))
    }

    /// Find or create a user from a hosted-identity login.
    ///
    /// Matches by email; records the provider subject on first OAuth login
    /// and marks the email verified (the provider vouches for it).
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure, `DataCorruption` when the
    /// stored email does not parse.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn upsert_oauth_user(
        &self,
        email: &Email,
        subject: &str,
        display_name: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO shop.user (email, external_subject, display_name, email_verified)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (email) DO UPDATE
            SET external_subject = EXCLUDED.external_subject,
                display_name = COALESCE(shop.user.display_name, EXCLUDED.display_name),
                email_verified = TRUE,
                updated_at = now()
            RETURNING id, email, display_name, marketing_opt_in, email_verified,
                      created_at, updated_at
            ",
        )
        .bind(email.as_str())
        .bind(subject)
        .bind(display_name)
        .fetch_one(self.pool)
        .await?;

        User::try_from(row)
    }

    /// Update display name and marketing opt-in.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no such account exists, `Database` for any
    /// other database error.
    pub async fn update_profile(
        &self,
        id: UserId,
        display_name: Option<&str>,
        marketing_opt_in: bool,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            UPDATE shop.user
            SET display_name = $2, marketing_opt_in = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, email, display_name, marketing_opt_in, email_verified,
                      created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(display_name)
        .bind(marketing_opt_in)
        .fetch_optional(self.pool)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), User::try_from)
    }
}
