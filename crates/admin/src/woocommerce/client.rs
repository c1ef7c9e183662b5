//! WooCommerce REST API client.
//!
//! Wraps `/wp-json/wc/v3` with Basic authentication. List endpoints are
//! paginated by WooCommerce, so the client walks pages until a short page
//! signals the end.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::WooCommerceConfig;

use super::{WooError, WooOrder, WooProduct, WooProductPayload};

/// API path prefix under the store URL.
const API_PREFIX: &str = "/wp-json/wc/v3";

/// Page size for list endpoints (WooCommerce caps this at 100).
const PER_PAGE: usize = 100;

/// WooCommerce REST API client.
///
/// Cheap to clone; the HTTP client and credentials sit behind an `Arc`.
#[derive(Clone)]
pub struct WooClient {
    inner: Arc<WooClientInner>,
}

struct WooClientInner {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: SecretString,
}

impl WooClient {
    /// Build a client for the configured store.
    ///
    /// # Panics
    ///
    /// Panics if reqwest cannot assemble the underlying TLS client.
    #[must_use]
    pub fn new(config: &WooCommerceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client construction failed");

        Self {
            inner: Arc::new(WooClientInner {
                client,
                base_url: config.store_url.trim_end_matches('/').to_owned(),
                consumer_key: config.consumer_key.clone(),
                consumer_secret: config.consumer_secret.clone(),
            }),
        }
    }

    /// Fetch every product on the remote store.
    ///
    /// # Errors
    ///
    /// Returns `WooError` if any page request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<WooProduct>, WooError> {
        self.list_all("products").await
    }

    /// Fetch every order on the remote store.
    ///
    /// # Errors
    ///
    /// Returns `WooError` if any page request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<WooOrder>, WooError> {
        self.list_all("orders").await
    }

    /// Create a product on the remote store.
    ///
    /// # Errors
    ///
    /// Returns `WooError` if the request fails or the API rejects it.
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create_product(
        &self,
        payload: &WooProductPayload,
    ) -> Result<WooProduct, WooError> {
        let url = format!("{}{API_PREFIX}/products", self.inner.base_url);
        let response = self
            .request(self.inner.client.post(&url))
            .json(payload)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Update a product on the remote store.
    ///
    /// # Errors
    ///
    /// Returns `WooError` if the request fails or the API rejects it.
    #[instrument(skip(self, payload), fields(woo_id = id, name = %payload.name))]
    pub async fn update_product(
        &self,
        id: i64,
        payload: &WooProductPayload,
    ) -> Result<WooProduct, WooError> {
        let url = format!("{}{API_PREFIX}/products/{id}", self.inner.base_url);
        let response = self
            .request(self.inner.client.put(&url))
            .json(payload)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Walk a paginated list endpoint to the end.
    async fn list_all<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>, WooError> {
        let url = format!("{}{API_PREFIX}/{resource}", self.inner.base_url);
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .request(self.inner.client.get(&url))
                .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())])
                .send()
                .await?;

            let batch: Vec<T> = handle_response(response).await?;
            let full_page = batch.len() >= PER_PAGE;
            all.extend(batch);

            if !full_page {
                return Ok(all);
            }
            page += 1;
        }
    }

    /// Attach Basic authentication to a request.
    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(
            &self.inner.consumer_key,
            Some(self.inner.consumer_secret.expose_secret()),
        )
    }
}

/// Parse a response, turning non-success statuses into `WooError::Api`.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, WooError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_owned());

    Err(WooError::Api {
        status: status.as_u16(),
        message,
    })
}
