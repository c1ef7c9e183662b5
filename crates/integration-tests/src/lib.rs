//! Integration tests for Roastline.
//!
//! # Running
//!
//! ```bash
//! # Run migrations and start both servers first
//! cargo run -p roastline-cli -- migrate all
//! cargo run -p roastline-storefront &
//! cargo run -p roastline-admin &
//!
//! # Integration tests are ignored by default; opt in explicitly
//! cargo test -p roastline-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` - Storefront base URL (default `http://localhost:3000`)
//! - `ADMIN_BASE_URL` - Admin base URL (default `http://localhost:3001`)
//! - `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD` - Credentials for a seeded
//!   admin account with write access (`roastline admin create`)
//!
//! # Suites
//!
//! - `storefront_catalog` - Catalog browsing, blend pricing and the cart
//! - `storefront_account` - Signup, login, taste profiles and checkout
//! - `admin_catalog` - Product management, pricing and review moderation
//! - `admin_orders` - Dashboard stats and order status flow
//! - `admin_sync` - WooCommerce sync endpoints and webhook auth
//!
//! Tests mutate the databases they run against; point them at a disposable
//! environment, never production.
