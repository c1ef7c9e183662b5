//! Request error type for the admin API.
//!
//! Handlers return [`Result<T>`] and lean on the `From` conversions; the
//! `IntoResponse` impl reports server faults to Sentry and keeps internal
//! detail out of response bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::sync::SyncError;
use crate::woocommerce::WooError;

/// Everything an admin handler can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    /// Forwarded repository failure.
    #[error("storage: {0}")]
    Database(#[from] RepositoryError),

    /// The WooCommerce API misbehaved or rejected us.
    #[error("woocommerce: {0}")]
    WooCommerce(#[from] WooError),

    /// Login or account-creation failure.
    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    /// The request named something that doesn't exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// No authenticated admin on the request.
    #[error("access denied: {0}")]
    Unauthorized(String),

    /// The client sent something unusable.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request contradicts current state (e.g. an illegal
    /// status transition).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A fault on our side with no finer classification.
    #[error("internal: {0}")]
    Internal(String),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Repository(e) => Self::Database(e),
            SyncError::Woo(e) => Self::WooCommerce(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry; expected repository outcomes
        // (not found, conflict) are client errors and stay out of it.
        let is_server_error = match &self {
            Self::Database(err) => matches!(
                err,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
            ),
            Self::WooCommerce(_) | Self::Internal(_) => true,
            _ => false,
        };
        if is_server_error {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request failed"
            );
        }

        let status = match &self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::WooCommerce(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        // Server faults collapse to a generic line in the body
        let message = match &self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                _ => "Internal server error".to_string(),
            },
            Self::Internal(_) => "Internal server error".to_string(),
            Self::WooCommerce(_) => "WooCommerce request failed".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::EmailTaken => "An admin with this email already exists".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Email address is not valid".to_string(),
                _ => "Could not authenticate".to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Handler result with [`AppError`] as the failure type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the signed-in admin to the Sentry scope.
pub fn set_sentry_user(admin_user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Detach the admin from the Sentry scope on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("order".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("login first".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Conflict("duplicate".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_errors_map_to_client_statuses() {
        let response = AppError::Database(RepositoryError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            AppError::Database(RepositoryError::Conflict("email already exists".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_auth_error_statuses() {
        let response = AppError::Auth(AuthError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AppError::Auth(AuthError::EmailTaken).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
