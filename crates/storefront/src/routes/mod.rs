//! The storefront's HTTP surface.
//!
//! All handlers speak JSON; the SPA and mobile apps consume them directly.
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Catalog
//! GET  /products               - Paginated catalog
//! GET  /products/{id}          - Product detail
//! GET  /products/{id}/reviews  - Approved reviews for a product
//! POST /products/{id}/reviews  - Submit a review (auth, lands in moderation)
//!
//! # Cart (session-backed)
//! GET  /cart                   - Cart summary with line totals
//! POST /cart/add               - Add a configured blend
//! POST /cart/update            - Change a line's quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Item count badge
//!
//! # Checkout (signed-in customers)
//! POST /checkout               - Place an order from the session cart
//!
//! # Account (signed-in customers)
//! GET    /account/profile              - Profile details
//! PATCH  /account/profile              - Update display name / marketing opt-in
//! GET    /account/orders               - Order history
//! GET    /account/orders/{id}          - Order detail with blend snapshots
//! GET    /account/taste-profiles       - Saved blend profiles
//! POST   /account/taste-profiles       - Save a profile (dedupe + cap)
//! DELETE /account/taste-profiles/{id}  - Delete a saved profile
//!
//! # Auth (rate limited)
//! POST /auth/register          - Email + password signup
//! POST /auth/login             - Session login
//! POST /auth/logout            - Session logout
//! POST /auth/token             - Password grant returning a bearer token
//!
//! # Hosted identity OAuth
//! GET  /auth/oauth/login       - Redirect to the provider's authorization page
//! GET  /auth/oauth/callback    - Validate state, exchange code, sign in
//! POST /auth/oauth/logout      - Clear session and end the hosted session
//!
//! # Terms
//! GET  /terms                  - Active terms and conditions
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod oauth;
pub mod products;
pub mod reviews;
pub mod taste_profiles;
pub mod terms;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Router under `/auth`.
///
/// Password endpoints carry the strict rate limiter; the OAuth redirect
/// flow is driven by the identity provider and stays unmetered.
pub fn auth_routes() -> Router<AppState> {
    let password_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/token", post(auth::token))
        .layer(auth_rate_limiter());

    Router::new()
        .merge(password_routes)
        // Hosted identity OAuth
        .route("/oauth/login", get(oauth::login))
        .route("/oauth/callback", get(oauth::callback))
        .route("/oauth/logout", post(oauth::logout))
}

/// Router under `/products`.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", get(reviews::index).post(reviews::submit))
}

/// Router under `/cart`.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Router under `/account`; every handler in it requires a signed-in
/// customer.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::profile).patch(account::update_profile),
        )
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order_detail))
        .route(
            "/taste-profiles",
            get(taste_profiles::index).post(taste_profiles::save),
        )
        .route("/taste-profiles/{id}", delete(taste_profiles::delete))
}

/// The assembled storefront router, minus the health probes that
/// `main.rs` adds on top.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .route("/terms", get(terms::show))
}
