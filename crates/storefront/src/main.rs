//! Roastline Storefront - Public shop API.
//!
//! This binary serves the customer-facing JSON API on port 3000:
//!
//! - Axum handlers returning JSON to the SPA and mobile apps
//! - Session-backed cart and login (tower-sessions on `PostgreSQL`)
//! - Hosted identity provider for OAuth sign-in
//! - `PostgreSQL` for catalog, orders, profiles, and reviews
//!
//! The process holds credentials for the shop database (`roastline_shop`)
//! and the hosted identity provider, and nothing else. The admin database
//! and the WooCommerce API keys belong to the admin binary; compromising
//! this process exposes neither.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Set up Sentry and the tracing subscriber.
///
/// Sentry only activates when a DSN is configured; the returned guard has
/// to stay alive for the life of the process. Errors and warnings become
/// Sentry events, info and debug become breadcrumbs.
fn init_telemetry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    fn event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
        match *metadata.level() {
            tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
            tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
            _ => sentry_tracing::EventFilter::Ignore,
        }
    }

    let guard = config.sentry_dsn.as_ref().map(|dsn| {
        let options = sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        };
        sentry::init((dsn.as_str(), options))
    });

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roastline_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(event_filter))
        .init();

    if guard.is_some() {
        tracing::info!("Sentry reporting enabled");
    }

    guard
}

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Invalid storefront configuration");

    let _sentry_guard = init_telemetry(&config);

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("shop database unreachable");
    tracing::info!("Connected to the shop database");

    // Migrations are NOT applied here; run `roastline migrate storefront`.

    let state = AppState::new(config.clone(), pool);
    let session_layer = middleware::create_session_layer(state.pool(), state.config());

    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(session_layer)
        .with_state(state)
        // Sentry layers sit outermost so they see the whole request
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("listener bind failed");
    tracing::info!(%addr, "Storefront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server exited with an error");
}

/// Liveness probe. Answers as long as the process is up.
async fn health() -> &'static str {
    "ok"
}

/// Readiness probe. 503 until the database answers.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if sqlx::query("SELECT 1").fetch_one(state.pool()).await.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Resolve on Ctrl+C or SIGTERM so axum can drain in-flight requests.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("ctrl-c handler installation failed");
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("SIGTERM handler installation failed");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
