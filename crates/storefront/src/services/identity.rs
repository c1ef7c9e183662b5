//! Hosted identity provider client.
//!
//! Storefront sign-in can also go through a hosted OAuth 2.0 provider
//! (an OIDC authorization-code flow against `/oauth2/*` endpoints).
//!
//! The round trip: [`IdentityClient::authorize_url`] builds the redirect to
//! the provider's login page, the provider calls back with a one-time code,
//! [`IdentityClient::exchange_code`] trades the code for tokens, and
//! [`IdentityClient::fetch_userinfo`] resolves the account behind them.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::IdentityConfig;

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP transport error.
    #[error("identity request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("oauth error: {0}")]
    OAuth(String),
}

/// Tokens returned by the provider's token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    /// Unix timestamp when the tokens were obtained.
    pub obtained_at: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

/// The provider's view of the signed-in account.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    pub email: String,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
}

/// Client for the hosted identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    issuer_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl IdentityClient {
    /// Build a client from the issuer configuration.
    #[must_use]
    pub fn new(config: &IdentityConfig, redirect_uri: String) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                issuer_url: config.issuer_url.trim_end_matches('/').to_string(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
                redirect_uri,
            }),
        }
    }

    /// URL the browser is sent to for provider login.
    ///
    /// `state` must be a random value held in the caller's session; the
    /// callback handler checks the provider's echo of it before trusting
    /// the code.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/oauth2/authorize?\
            client_id={}&\
            response_type=code&\
            scope=openid%20email%20profile&\
            redirect_uri={}&\
            state={}",
            self.inner.issuer_url,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// URL that signs the customer out at the provider, then lands the
    /// browser back on `post_logout_redirect_uri`.
    #[must_use]
    pub fn logout_url(&self, post_logout_redirect_uri: &str) -> String {
        format!(
            "{}/logout?client_id={}&logout_uri={}",
            self.inner.issuer_url,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(post_logout_redirect_uri)
        )
    }

    /// Trade the callback code for a token set.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::OAuth` if the provider rejects the code.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, IdentityError> {
        let url = format!("{}/oauth2/token", self.inner.issuer_url);

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", &self.inner.redirect_uri),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IdentityError::OAuth(format!("token exchange failed: {text}")));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(TokenSet {
            access_token: token_response.access_token,
            id_token: token_response.id_token,
            refresh_token: token_response.refresh_token,
            expires_in: token_response.expires_in,
            obtained_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Ask the provider who the access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::OAuth` if the access token is rejected.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfo, IdentityError> {
        let url = format!("{}/oauth2/userInfo", self.inner.issuer_url);

        let response = self
            .inner
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(IdentityError::OAuth(format!(
                "userinfo request failed ({status}): {text}"
            )));
        }

        Ok(response.json().await?)
    }
}
