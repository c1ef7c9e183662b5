//! Failure modes of admin login and account creation.

use thiserror::Error;

use crate::db::RepositoryError;

/// What went wrong while authenticating or creating an admin.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email failed structural validation.
    #[error("email rejected: {0}")]
    InvalidEmail(#[from] roastline_core::EmailError),

    /// Wrong password or unknown email.
    #[error("credentials do not match")]
    InvalidCredentials,

    /// An admin account with this email already exists.
    #[error("email already taken")]
    EmailTaken,

    /// Password too short.
    #[error("password rejected: {0}")]
    WeakPassword(String),

    /// Underlying repository failure.
    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),

    /// Argon2 could not hash the password.
    #[error("could not hash password")]
    PasswordHash,
}
