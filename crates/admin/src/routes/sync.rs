//! WooCommerce synchronization route handlers.
//!
//! Each trigger runs synchronously and responds with the finished run
//! record; per-record failures show up in its counts rather than in the
//! HTTP status.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::SyncRunRepository;
use crate::db::sync_runs::SyncRun;
use crate::error::Result;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::services::SyncService;
use crate::state::AppState;

/// How many runs the history endpoint returns.
const RUN_HISTORY: i64 = 50;

fn sync_service(state: &AppState) -> SyncService<'_> {
    SyncService::new(
        state.shop_pool(),
        state.admin_pool(),
        state.woo(),
        state.config().currency,
    )
}

/// Pull the remote catalog into the local one.
///
/// POST /sync/woocommerce/pull
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn pull(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
) -> Result<Json<SyncRun>> {
    let run = sync_service(&state).pull_products().await?;

    Ok(Json(run))
}

/// Push the local active catalog to the remote store.
///
/// POST /sync/woocommerce/push
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn push(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
) -> Result<Json<SyncRun>> {
    let run = sync_service(&state).push_products().await?;

    Ok(Json(run))
}

/// Import remote orders that have no local counterpart.
///
/// POST /sync/woocommerce/orders
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn import_orders(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
) -> Result<Json<SyncRun>> {
    let run = sync_service(&state).import_orders().await?;

    Ok(Json(run))
}

/// Recent run history, newest first.
///
/// GET /sync/woocommerce/runs
#[instrument(skip(_admin, state))]
pub async fn runs(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<SyncRun>>> {
    let runs = SyncRunRepository::new(state.admin_pool())
        .list_recent(RUN_HISTORY)
        .await?;

    Ok(Json(runs))
}
