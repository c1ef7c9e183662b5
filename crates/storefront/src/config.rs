//! Environment-driven configuration for the storefront.
//!
//! # Environment
//!
//! Required:
//! - `STOREFRONT_DATABASE_URL` - where the shop schema lives (the generic
//!   `DATABASE_URL` also works)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront API
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (32+ chars, random)
//! - `STOREFRONT_TOKEN_SECRET` - HS256 signing secret for mobile bearer tokens
//! - `IDENTITY_ISSUER_URL` - Base URL of the hosted identity provider
//! - `IDENTITY_CLIENT_ID` - OAuth client ID registered with the identity provider
//! - `IDENTITY_CLIENT_SECRET` - OAuth client secret
//!
//! Optional:
//! - `STOREFRONT_HOST` - Interface to bind (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - TCP port (default: 3000)
//! - `STOREFRONT_CURRENCY` - ISO 4217 currency for the catalog (default: USD)
//! - `STOREFRONT_TOKEN_TTL_SECONDS` - Bearer token lifetime (default: 28800)
//! - `SENTRY_DSN` - Error reporting DSN; unset leaves Sentry off
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)
//!
//! Secrets are checked against a placeholder blocklist and a Shannon
//! entropy floor so a copy-pasted `.env.example` fails at startup instead
//! of shipping.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use roastline_core::CurrencyCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Common placeholder fragments (matched case-insensitively).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Why `from_env` refused to produce a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),
    #[error("cannot parse {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("refusing weak secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Everything the storefront binary needs at startup.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` connection URL (contains the password).
    pub database_url: SecretString,
    /// Bind address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Public base URL, used for cookie security and the OAuth redirect.
    pub base_url: String,
    /// Session signing secret.
    pub session_secret: SecretString,
    /// HS256 signing secret for mobile bearer tokens.
    pub token_secret: SecretString,
    /// Bearer token lifetime in seconds.
    pub token_ttl_seconds: u64,
    /// Catalog currency.
    pub currency: CurrencyCode,
    /// Hosted identity provider settings.
    pub identity: IdentityConfig,
    /// Sentry DSN; Sentry stays off without one.
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag.
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate.
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate.
    pub sentry_traces_sample_rate: f32,
}

/// Hosted identity provider (OAuth 2.0) settings.
///
/// `Debug` is hand-written to redact the client secret.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Base URL of the provider, e.g. `https://auth.roastline.coffee`
    pub issuer_url: String,
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("issuer_url", &self.issuer_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from the environment, reading `.env` first if
    /// one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing, a value
    /// doesn't parse, or a secret fails the strength checks.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let session_secret = require_strong_secret("STOREFRONT_SESSION_SECRET")?;
        enforce_secret_length(&session_secret, "STOREFRONT_SESSION_SECRET")?;
        let token_secret = require_strong_secret("STOREFRONT_TOKEN_SECRET")?;
        enforce_secret_length(&token_secret, "STOREFRONT_TOKEN_SECRET")?;

        Ok(Self {
            database_url: require_database_url("STOREFRONT_DATABASE_URL")?,
            host: parse_env("STOREFRONT_HOST", "127.0.0.1")?,
            port: parse_env("STOREFRONT_PORT", "3000")?,
            base_url: require_env("STOREFRONT_BASE_URL")?,
            session_secret,
            token_secret,
            token_ttl_seconds: parse_env("STOREFRONT_TOKEN_TTL_SECONDS", "28800")?,
            currency: parse_env("STOREFRONT_CURRENCY", "USD")?,
            identity: IdentityConfig::from_env()?,
            sentry_dsn: optional_env("SENTRY_DSN"),
            sentry_environment: optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Bind address and port as one `SocketAddr`.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The redirect URI registered with the identity provider.
    #[must_use]
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/auth/oauth/callback", self.base_url.trim_end_matches('/'))
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            issuer_url: require_env("IDENTITY_ISSUER_URL")?,
            client_id: require_env("IDENTITY_CLIENT_ID")?,
            client_secret: require_strong_secret("IDENTITY_CLIENT_SECRET")?,
        })
    }
}

/// Required variable, `MissingEnvVar` when absent.
fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Optional variable, `None` when unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Read an environment variable (or its default) and parse it.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Connection URL, falling back to the platform-provided `DATABASE_URL`
/// when the service-specific variable is unset.
fn require_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Enforce the minimum length for signing secrets.
fn enforce_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "needs at least {} characters, got {}",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // Secret lengths are far below f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholders and low-entropy strings.
fn check_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("looks like a placeholder (matched '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy {entropy:.2} bits/char is under the {MIN_ENTROPY_BITS_PER_CHAR:.1} floor; generate a random value"
            ),
        ));
    }

    Ok(())
}

/// Load a secret from the environment and run the strength checks.
fn require_strong_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = require_env(key)?;
    check_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_of_degenerate_strings() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        // Two symbols at 50/50 is exactly one bit per character
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_entropy_of_random_looking_string_clears_floor() {
        assert!(shannon_entropy("q8W@e3R$t6Y^u1I!") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_placeholder_secrets_rejected() {
        for bad in ["your-api-key-here", "changeme-now-7", "example-value-42"] {
            assert!(
                matches!(
                    check_secret_strength(bad, "ANY_SECRET"),
                    Err(ConfigError::InsecureSecret(_, _))
                ),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        let result = check_secret_strength(&"a".repeat(40), "ANY_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_strong_secret_accepted() {
        assert!(check_secret_strength("kQ7#wD2$vN9@yR4!mB8%jF3^tZ6&hL1*", "ANY_SECRET").is_ok());
    }

    #[test]
    fn test_session_secret_length_floor() {
        let short = SecretString::from("short");
        assert!(enforce_secret_length(&short, "ANY_SECRET").is_err());

        let long_enough = SecretString::from("a".repeat(32));
        assert!(enforce_secret_length(&long_enough, "ANY_SECRET").is_ok());
    }

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/roastline_shop_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            token_secret: SecretString::from("y".repeat(32)),
            token_ttl_seconds: 28_800,
            currency: CurrencyCode::USD,
            identity: IdentityConfig {
                issuer_url: "https://auth.test".to_string(),
                client_id: "storefront-spa".to_string(),
                client_secret: SecretString::from("oauth-secret-sentinel"),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_oauth_redirect_uri_strips_trailing_slash() {
        let mut config = test_config();
        config.base_url = "http://localhost:3000/".to_string();
        assert_eq!(
            config.oauth_redirect_uri(),
            "http://localhost:3000/auth/oauth/callback"
        );
    }

    #[test]
    fn test_identity_config_debug_redacts_secrets() {
        let debug_output = format!("{:?}", test_config().identity);

        assert!(debug_output.contains("https://auth.test"));
        assert!(debug_output.contains("storefront-spa"));
        assert!(debug_output.contains("<redacted>"));
        assert!(!debug_output.contains("oauth-secret-sentinel"));
    }
}
