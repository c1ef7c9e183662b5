//! Environment-driven configuration for the admin binary.
//!
//! # Environment
//!
//! Required:
//! - `ADMIN_DATABASE_URL` - where the admin schema lives (the generic
//!   `DATABASE_URL` also works)
//! - `STOREFRONT_DATABASE_URL` - shop database the second pool connects to
//! - `ADMIN_BASE_URL` - URL the admin API is reached at
//! - `ADMIN_SESSION_SECRET` - Session signing secret (32+ chars, random)
//! - `WOO_STORE_URL` - Base URL of the WooCommerce store
//! - `WOO_CONSUMER_KEY` - WooCommerce REST API consumer key
//! - `WOO_CONSUMER_SECRET` - WooCommerce REST API consumer secret
//! - `WOO_WEBHOOK_SECRET` - Shared secret for webhook signature verification
//!
//! Optional:
//! - `ADMIN_HOST` - Interface to bind (default: 127.0.0.1)
//! - `ADMIN_PORT` - TCP port (default: 3001)
//! - `ADMIN_MEDIA_DIR` - Directory for uploaded media files (default: media)
//! - `ADMIN_CURRENCY` - ISO 4217 currency for pull-created products (default: USD)
//! - `WOO_SYNC_INTERVAL_SECONDS` - Background catalog pull interval (disabled when unset)
//! - `SENTRY_DSN` - Error reporting DSN; unset leaves Sentry off
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)
//!
//! Secret values go through the same placeholder and entropy screening as
//! the storefront so a stale `.env.example` can't boot the admin API.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use roastline_core::CurrencyCode;

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

/// Everything the admin binary needs at startup.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Admin `PostgreSQL` connection URL (admin users, media, sync runs).
    pub database_url: SecretString,
    /// Shop `PostgreSQL` connection URL (catalog, orders, reviews, pricing, terms).
    pub shop_database_url: SecretString,
    /// Bind address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
    /// URL the admin API is reached at.
    pub base_url: String,
    /// Session signing secret.
    pub session_secret: SecretString,
    /// Directory uploaded media files are written to.
    pub media_dir: PathBuf,
    /// Currency assigned to products created by catalog pulls.
    pub currency: CurrencyCode,
    /// WooCommerce store connection.
    pub woocommerce: WooCommerceConfig,
    /// Sentry DSN; Sentry stays off without one.
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag.
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate.
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate.
    pub sentry_traces_sample_rate: f32,
}

/// WooCommerce store settings.
///
/// `Debug` is hand-written to redact the consumer and webhook secrets.
#[derive(Clone)]
pub struct WooCommerceConfig {
    /// Base URL of the store, e.g. `https://shop.roastline.coffee`
    pub store_url: String,
    /// REST API consumer key (acts as the username).
    pub consumer_key: String,
    /// REST API consumer secret.
    pub consumer_secret: SecretString,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: SecretString,
    /// Background catalog pull interval; `None` disables the scheduler.
    pub sync_interval_seconds: Option<u64>,
}

impl std::fmt::Debug for WooCommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceConfig")
            .field("store_url", &self.store_url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("webhook_secret", &"<redacted>")
            .field("sync_interval_seconds", &self.sync_interval_seconds)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from the environment, reading `.env` first if
    /// one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing, a value
    /// doesn't parse, or a secret fails the strength checks.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let session_secret = require_strong_secret("ADMIN_SESSION_SECRET")?;
        enforce_secret_length(&session_secret, "ADMIN_SESSION_SECRET")?;

        Ok(Self {
            database_url: require_database_url("ADMIN_DATABASE_URL")?,
            // No generic fallback here: pointing the admin binary's shop pool
            // at the wrong database must fail loudly.
            shop_database_url: SecretString::from(require_env("STOREFRONT_DATABASE_URL")?),
            host: parse_env("ADMIN_HOST", "127.0.0.1")?,
            port: parse_env("ADMIN_PORT", "3001")?,
            base_url: require_env("ADMIN_BASE_URL")?,
            session_secret,
            media_dir: PathBuf::from(env_or_default("ADMIN_MEDIA_DIR", "media")),
            currency: parse_env("ADMIN_CURRENCY", "USD")?,
            woocommerce: WooCommerceConfig::from_env()?,
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
}

impl WooCommerceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let sync_interval_seconds = optional_env("WOO_SYNC_INTERVAL_SECONDS")
            .map(|value| {
                value.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "WOO_SYNC_INTERVAL_SECONDS".to_string(),
                        e.to_string(),
                    )
                })
            })
            .transpose()?;

        Ok(Self {
            store_url: require_env("WOO_STORE_URL")?,
            consumer_key: require_env("WOO_CONSUMER_KEY")?,
            consumer_secret: require_strong_secret("WOO_CONSUMER_SECRET")?,
            webhook_secret: require_strong_secret("WOO_WEBHOOK_SECRET")?,
            sync_interval_seconds,
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

/// Variable value, or `default` when unset.
fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable (or its default) and parse it.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or_default(key, default)
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

    fn test_config() -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/roastline_admin"),
            shop_database_url: SecretString::from("postgres://localhost/roastline_shop"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            media_dir: PathBuf::from("media"),
            currency: CurrencyCode::USD,
            woocommerce: WooCommerceConfig {
                store_url: "https://shop.test".to_string(),
                consumer_key: "ck_visible_key_value".to_string(),
                consumer_secret: SecretString::from("cs_hidden_consumer_value"),
                webhook_secret: SecretString::from("whsec_hidden_hook_value"),
                sync_interval_seconds: Some(900),
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
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_woocommerce_config_debug_redacts_secrets() {
        let debug_output = format!("{:?}", test_config().woocommerce);

        assert!(debug_output.contains("https://shop.test"));
        assert!(debug_output.contains("ck_visible_key_value"));

        assert!(debug_output.contains("<redacted>"));
        assert!(!debug_output.contains("cs_hidden_consumer_value"));
        assert!(!debug_output.contains("whsec_hidden_hook_value"));
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let result = check_secret_strength("changeme-now-7", "ANY_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        let result = check_secret_strength(&"a".repeat(40), "ANY_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_strong_secret_accepted() {
        let result = check_secret_strength("kQ7#wD2$vN9@yR4!mB8%jF3^tZ6&hL1*", "ANY_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn test_session_secret_length_floor() {
        let secret = SecretString::from("short");
        assert!(enforce_secret_length(&secret, "ANY_SECRET").is_err());
    }
}
