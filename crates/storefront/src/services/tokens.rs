//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the storefront token secret. They
//! carry just enough to resolve the caller (user id and email) and are
//! honoured by the same extractors as the session cookie.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use roastline_core::{Email, UserId};

use crate::models::session::CurrentUser;
use crate::services::auth::AuthError;

/// Claims carried in a storefront bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    /// User email at issuance time.
    pub email: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    /// Resolve the claims to the authenticated-user type used by handlers.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the embedded email doesn't
    /// parse (a token minted before an email change, for example).
    pub fn into_current_user(self) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(&self.email).map_err(|_| AuthError::InvalidToken)?;

        Ok(CurrentUser {
            id: UserId::new(self.sub),
            email,
        })
    }
}

/// Sign a bearer token for the given user.
///
/// # Errors
///
/// Returns `AuthError::TokenIssuance` if signing fails.
pub fn issue(
    user: &CurrentUser,
    secret: &SecretString,
    ttl_seconds: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
    let exp = now + Duration::seconds(ttl);

    let claims = Claims {
        sub: user.id.as_i32(),
        email: user.email.as_str().to_owned(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenIssuance)
}

/// Verify a bearer token and return its claims.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if the token is malformed, has a bad
/// signature, or is expired.
pub fn verify(token: &str, secret: &SecretString) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(42),
            email: Email::parse("bean@example.com").unwrap(),
        }
    }

    fn test_secret() -> SecretString {
        SecretString::from("a-test-only-signing-secret-string")
    }

    #[test]
    fn test_issue_then_verify_roundtrip() {
        let secret = test_secret();
        let token = issue(&test_user(), &secret, 28_800).unwrap();

        let claims = verify(&token, &secret).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "bean@example.com");
        assert_eq!(claims.exp - claims.iat, 28_800);

        let user = claims.into_current_user().unwrap();
        assert_eq!(user.id, UserId::new(42));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = issue(&test_user(), &test_secret(), 3600).unwrap();

        let result = verify(&token, &SecretString::from("a-different-secret-entirely"));
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let result = verify("not.a.jwt", &test_secret());
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let secret = test_secret();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 42,
            email: "bean@example.com".to_owned(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        )
        .unwrap();

        let result = verify(&token, &secret);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
