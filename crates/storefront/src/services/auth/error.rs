//! Customer authentication errors.

use thiserror::Error;

use crate::db::RepositoryError;

/// What went wrong during registration, login, or token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email failed structural validation.
    #[error("email rejected: {0}")]
    InvalidEmail(#[from] roastline_core::EmailError),

    /// Password too short.
    #[error("password rejected: {0}")]
    WeakPassword(String),

    /// Wrong password, unknown email, or an OAuth-only account.
    #[error("credentials do not match")]
    InvalidCredentials,

    /// No account with this ID.
    #[error("no such account")]
    UserNotFound,

    /// The email is already registered.
    #[error("account already exists")]
    UserAlreadyExists,

    /// Session state missing or stale (an interrupted OAuth flow).
    #[error("session state unusable")]
    InvalidSessionState,

    /// Bearer token missing, malformed, or expired.
    #[error("bearer token rejected")]
    InvalidToken,

    /// Token could not be signed.
    #[error("token issuance failed")]
    TokenIssuance,

    /// Underlying repository failure.
    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),

    /// Argon2 could not hash the password.
    #[error("could not hash password")]
    PasswordHash,
}
