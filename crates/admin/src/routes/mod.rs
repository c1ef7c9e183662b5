//! HTTP route handlers for the admin API.
//!
//! All handlers speak JSON; the back-office SPA consumes them directly.
//! Reads require a session (`RequireAdminAuth`), mutations additionally
//! require a writing role (`RequireWriteAccess`), and admin-user
//! management requires `RequireSuperAdmin`. The WooCommerce webhook is
//! the one unauthenticated endpoint; it carries its own HMAC signature.
//!
//! # Endpoints
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (both database pools)
//!
//! # Auth
//! POST /auth/login                 - Email + password session login
//! POST /auth/logout                - Session logout
//! GET  /auth/me                    - Current admin from the session
//!
//! # Dashboard (read-only)
//! GET  /dashboard/stats            - Order, revenue, customer and review totals
//!
//! # Products (write access to mutate)
//! GET    /products                 - Full catalog, inactive included
//! POST   /products                 - Create (starts inactive)
//! GET    /products/{id}            - Product detail
//! PUT    /products/{id}            - Partial update
//! POST   /products/{id}/activate   - Make visible to the storefront
//! POST   /products/{id}/deactivate - Hide from the storefront
//! DELETE /products/{id}            - Delete
//!
//! # Orders
//! GET  /orders                     - Paginated listing, optional ?status=
//! GET  /orders/{id}                - Detail with line items
//! POST /orders/{id}/status         - Advance along the fulfillment chain
//! POST /orders/{id}/cancel         - Cancel (terminal orders rejected)
//!
//! # Reviews (moderation queue)
//! GET    /reviews                  - Queue, optional ?status= (default pending)
//! POST   /reviews/{id}/approve     - Publish to the storefront
//! POST   /reviews/{id}/hide        - Keep permanently off the storefront
//! DELETE /reviews/{id}             - Delete
//!
//! # Pricing (per-gram blend pricing)
//! GET  /pricing                    - All rows, newest first
//! POST /pricing                    - Create (starts inactive)
//! PATCH /pricing/{id}              - Rename / reprice
//! POST /pricing/{id}/activate      - Make this the single active row
//!
//! # Terms and conditions
//! GET  /terms                      - All versions, newest first
//! POST /terms                      - Create draft
//! POST /terms/{id}/activate        - Publish, deactivating the rest
//!
//! # Admin users (super admin only)
//! GET    /admin-users              - List accounts
//! POST   /admin-users              - Create account
//! PATCH  /admin-users/{id}/role    - Change role
//! DELETE /admin-users/{id}         - Delete account
//!
//! # Media
//! GET    /media                    - Uploaded assets, newest first
//! POST   /media                    - Multipart upload
//! DELETE /media/{id}               - Delete row and file
//! GET    /media/files/{name}       - Static file serving (wired in main)
//!
//! # WooCommerce (write access)
//! POST /sync/woocommerce/pull      - Remote catalog into local
//! POST /sync/woocommerce/push      - Local active catalog to remote
//! POST /sync/woocommerce/orders    - Import remote orders
//! GET  /sync/woocommerce/runs      - Recent run history
//! POST /webhooks/woocommerce       - Signed product webhooks (no session)
//! ```

pub mod admin_users;
pub mod auth;
pub mod dashboard;
pub mod media;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod reviews;
pub mod sync;
pub mod terms;
pub mod webhooks;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Router under `/auth`.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Router under `/products`.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/{id}/activate", post(products::activate))
        .route("/{id}/deactivate", post(products::deactivate))
}

/// Router under `/orders`.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Router under `/reviews`.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::index))
        .route("/{id}", delete(reviews::remove))
        .route("/{id}/approve", post(reviews::approve))
        .route("/{id}/hide", post(reviews::hide))
}

/// Router under `/pricing`.
pub fn pricing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pricing::index).post(pricing::create))
        .route("/{id}", patch(pricing::update))
        .route("/{id}/activate", post(pricing::activate))
}

/// Router under `/terms`.
pub fn terms_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(terms::index).post(terms::create))
        .route("/{id}/activate", post(terms::activate))
}

/// Router under `/admin-users`.
pub fn admin_user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_users::index).post(admin_users::create))
        .route("/{id}", delete(admin_users::remove))
        .route("/{id}/role", patch(admin_users::update_role))
}

/// Router under `/media`.
pub fn media_routes() -> Router<AppState> {
    // Multipart framing overhead sits on top of the file cap itself
    Router::new()
        .route("/", get(media::index).post(media::upload))
        .route("/{id}", delete(media::remove))
        .layer(DefaultBodyLimit::max(media::MAX_UPLOAD_BYTES + 1024))
}

/// Router under `/sync`.
pub fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/woocommerce/pull", post(sync::pull))
        .route("/woocommerce/push", post(sync::push))
        .route("/woocommerce/orders", post(sync::import_orders))
        .route("/woocommerce/runs", get(sync::runs))
}

/// The full admin router, health probes excluded.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/dashboard/stats", get(dashboard::stats))
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/reviews", review_routes())
        .nest("/pricing", pricing_routes())
        .nest("/terms", terms_routes())
        .nest("/admin-users", admin_user_routes())
        .nest("/media", media_routes())
        .nest("/sync", sync_routes())
        // Signature-authenticated; no session involved
        .route("/webhooks/woocommerce", post(webhooks::woocommerce))
}
