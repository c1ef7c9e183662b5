//! WooCommerce REST API integration.
//!
//! The client talks to `/wp-json/wc/v3` with Basic authentication using the
//! store's consumer key and secret. Sync services and the webhook handler
//! share the wire types defined here.

mod client;
mod types;

pub use client::WooClient;
pub use types::{WooBilling, WooLineItem, WooOrder, WooProduct, WooProductPayload};

use thiserror::Error;

/// Errors from the WooCommerce API.
#[derive(Debug, Error)]
pub enum WooError {
    /// Request failed at the HTTP level.
    #[error("woocommerce http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("woocommerce api error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the store.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },
}
