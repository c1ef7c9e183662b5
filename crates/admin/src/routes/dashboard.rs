//! The stats endpoint behind the back-office landing page.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use roastline_core::ReviewStatus;

use crate::db::{CustomerRepository, OrderRepository, ReviewRepository};
use crate::db::orders::{Order, StatusCount};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// How many recent orders the dashboard shows.
const RECENT_ORDERS: i64 = 5;

/// Dashboard overview numbers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: i64,
    /// Lifetime revenue over non-cancelled orders.
    pub revenue: Decimal,
    pub status_breakdown: Vec<StatusCount>,
    pub customers: i64,
    pub pending_reviews: i64,
    pub recent_orders: Vec<Order>,
}

/// Dashboard overview.
///
/// GET /dashboard/stats
#[instrument(skip(_admin, state))]
pub async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    let orders = OrderRepository::new(state.shop_pool());
    let customers = CustomerRepository::new(state.shop_pool());
    let reviews = ReviewRepository::new(state.shop_pool());

    let (total_orders, revenue, status_breakdown, customer_count, pending_reviews, recent_orders) =
        tokio::try_join!(
            orders.count_all(),
            orders.revenue(),
            orders.status_breakdown(),
            customers.count(),
            reviews.count_by_status(ReviewStatus::Pending),
            orders.recent(RECENT_ORDERS),
        )?;

    Ok(Json(DashboardStats {
        total_orders,
        revenue,
        status_breakdown,
        customers: customer_count,
        pending_reviews,
        recent_orders,
    }))
}
