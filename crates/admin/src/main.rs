//! Roastline Admin - Internal back-office API.
//!
//! This binary serves the back-office JSON API on port 3001:
//!
//! - Axum handlers returning JSON to the back-office SPA
//! - Session-authenticated admin accounts with roles
//! - WooCommerce REST API for catalog/order synchronization
//! - `PostgreSQL` for admin accounts, media metadata, and sync history
//!
//! **Run it on VPN-protected infrastructure only.** The process holds the
//! WooCommerce consumer key/secret and opens pools to BOTH `PostgreSQL`
//! databases (`roastline_admin` and `roastline_shop`), so its network
//! exposure has to stay internal.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
mod woocommerce;

use config::AdminConfig;
use middleware::create_session_layer;
use sentry::integrations::tracing as sentry_tracing;
use services::SyncService;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Set up Sentry and the tracing subscriber.
///
/// Sentry only activates when a DSN is configured; the returned guard has
/// to stay alive for the life of the process. Errors and warnings become
/// Sentry events, info and debug become breadcrumbs. `LOG_FORMAT=json`
/// switches to structured output for log shippers.
fn init_telemetry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
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
            // Staff-only service; events may name the acting admin
            send_default_pii: true,
            ..Default::default()
        };
        sentry::init((dsn.as_str(), options))
    });

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roastline_admin=info,tower_http=debug".into());

    let wants_json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer =
        wants_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!wants_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(event_filter))
        .init();

    if guard.is_some() {
        tracing::info!("Sentry reporting enabled");
    }

    guard
}

/// Spawn the periodic catalog pull when an interval is configured.
fn spawn_scheduled_pull(state: AppState, interval_seconds: u64) {
    tracing::info!(interval_seconds, "Scheduled catalog pull enabled");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so startup stays quiet
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let service = SyncService::new(
                state.shop_pool(),
                state.admin_pool(),
                state.woo(),
                state.config().currency,
            );

            match service.pull_products().await {
                Ok(run) => {
                    tracing::info!(run_id = %run.id, status = %run.status, "Scheduled catalog pull finished");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Scheduled catalog pull failed");
                }
            }
        }
    });
}

#[tokio::main]
async fn main() {
    let config = AdminConfig::from_env().expect("Invalid admin configuration");

    let _sentry_guard = init_telemetry(&config);

    // Admin pool: admin users, sessions, media metadata, sync history
    let admin_pool = db::create_pool(&config.database_url)
        .await
        .expect("admin database unreachable");

    // Shop pool: the storefront's database, managed here but never migrated here
    let shop_pool = db::create_pool(&config.shop_database_url)
        .await
        .expect("shop database unreachable");
    tracing::info!("Connected to both databases");

    // Migrations are NOT applied here; run `roastline migrate admin`.

    let session_layer = create_session_layer(&admin_pool, &config);
    let state = AppState::new(config.clone(), admin_pool, shop_pool);

    if let Some(interval_seconds) = config.woocommerce.sync_interval_seconds {
        spawn_scheduled_pull(state.clone(), interval_seconds);
    }

    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/media/files", ServeDir::new(&config.media_dir))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers sit outermost so they see the whole request
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Reachable over the VPN only; the bind address stays private
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("listener bind failed");
    tracing::info!(%addr, "Admin API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server exited with an error");
}

/// Liveness probe. Answers as long as the process is up.
async fn health() -> &'static str {
    "ok"
}

/// Readiness probe. 503 until both databases answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let admin_ok = sqlx::query("SELECT 1")
        .fetch_one(state.admin_pool())
        .await
        .is_ok();
    let shop_ok = sqlx::query("SELECT 1")
        .fetch_one(state.shop_pool())
        .await
        .is_ok();

    if admin_ok && shop_ok {
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
