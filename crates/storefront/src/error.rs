//! Request error type and Sentry helpers.
//!
//! Handlers return [`Result<T>`]; conversions from the repository, auth and
//! identity errors let `?` do the plumbing. The response body never carries
//! internal detail, and only genuine server faults are sent to Sentry.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::identity::IdentityError;

/// Everything a storefront handler can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    /// Forwarded repository failure.
    #[error("storage: {0}")]
    Database(#[from] RepositoryError),

    /// The identity provider misbehaved or rejected us.
    #[error("identity provider: {0}")]
    Identity(#[from] IdentityError),

    /// Login, registration, or token failure.
    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    /// The request named something that doesn't exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// No authenticated customer on the request.
    #[error("access denied: {0}")]
    Unauthorized(String),

    /// The client sent something unusable.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A fault on our side with no finer classification.
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code and client-safe message for this error.
    fn response_parts(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
                RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            },
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            Self::Identity(_) => (
                StatusCode::BAD_GATEWAY,
                "Identity provider unavailable".to_string(),
            ),
            Self::Auth(err) => auth_response_parts(err),
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => {
                let status = match self {
                    Self::NotFound(_) => StatusCode::NOT_FOUND,
                    Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, self.to_string())
            }
        }
    }

    /// Whether this is a fault on our side rather than bad client input.
    fn is_server_fault(&self) -> bool {
        match self {
            Self::Database(err) => matches!(
                err,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
            ),
            Self::Identity(_) | Self::Internal(_) => true,
            Self::Auth(err) => {
                matches!(err, AuthError::Repository(_) | AuthError::PasswordHash)
            }
            _ => false,
        }
    }
}

/// Map auth failures to client-facing responses.
///
/// Wrong-password and no-such-account collapse into the same 401 so the
/// login endpoint can't be used to probe which emails have accounts.
fn auth_response_parts(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials | AuthError::UserNotFound => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
        }
        AuthError::InvalidToken => (
            StatusCode::UNAUTHORIZED,
            "Invalid or expired token".to_string(),
        ),
        AuthError::InvalidSessionState => (
            StatusCode::UNAUTHORIZED,
            "Session expired, please try again".to_string(),
        ),
        AuthError::UserAlreadyExists => (
            StatusCode::CONFLICT,
            "An account with this email already exists".to_string(),
        ),
        AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AuthError::InvalidEmail(_) => {
            (StatusCode::BAD_REQUEST, "Email address is not valid".to_string())
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not authenticate".to_string(),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request failed"
            );
        }

        let (status, message) = self.response_parts();
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Handler result with [`AppError`] as the failure type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the signed-in customer to the Sentry scope.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Detach the customer from the Sentry scope on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a customer action as a Sentry breadcrumb.
///
/// Breadcrumbs show the trail leading up to a captured error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_plain_variants_map_to_their_statuses() {
        assert_eq!(
            status_of(AppError::NotFound("product 123".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("login first".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::BadRequest("invalid input".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_expected_repository_outcomes_are_client_errors() {
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::Conflict(
                "already exists".to_string()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let (wrong_password, msg_a) = auth_response_parts(&AuthError::InvalidCredentials);
        let (no_account, msg_b) = auth_response_parts(&AuthError::UserNotFound);

        assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
        assert_eq!(no_account, StatusCode::UNAUTHORIZED);
        assert_eq!(msg_a, msg_b);
    }

    #[test]
    fn test_auth_conflict_and_token_statuses() {
        assert_eq!(
            status_of(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidToken)),
            StatusCode::UNAUTHORIZED
        );
    }
}
