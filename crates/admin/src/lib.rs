//! Back-office API: catalog and order management, review moderation,
//! pricing, terms, media, admin accounts, and WooCommerce sync.
//!
//! The binary in `main.rs` declares the same module tree; this library
//! surface exists so integration tests can reach the router and types.
//!
//! The crate holds the WooCommerce credentials and opens pools to both
//! databases. Only deploy it on VPN-protected infrastructure.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod woocommerce;
