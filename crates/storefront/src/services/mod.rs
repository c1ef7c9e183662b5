//! Business logic between the routes and the repositories:
//!
//! - `auth` - password registration and login
//! - `catalog` - cached catalog and pricing reads
//! - `identity` - hosted identity provider (OAuth) client
//! - `tokens` - bearer token issuance and verification

pub mod auth;
pub mod catalog;
pub mod identity;
pub mod tokens;
