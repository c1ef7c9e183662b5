//! Customer-facing shop API: catalog, blend builder, cart, checkout,
//! accounts, saved taste profiles, and reviews.
//!
//! The binary in `main.rs` declares the same module tree; this library
//! surface exists so integration tests can reach the router and types.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
