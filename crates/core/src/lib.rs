//! Domain types shared by the storefront, the admin API, and the CLI.
//!
//! Everything here is plain data: validated newtypes (IDs, emails, money),
//! the taste-profile model, and the status enums with their transition
//! rules. No I/O, no HTTP, no queries; the optional `postgres` feature
//! only adds sqlx column mappings for the newtypes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
