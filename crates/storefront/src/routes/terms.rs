//! Terms and conditions route handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::TermsRepository;
use crate::db::terms::TermsVersion;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Return the currently active terms and conditions document.
///
/// GET /terms
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<TermsVersion>> {
    let terms = TermsRepository::new(state.pool())
        .get_active()
        .await?
        .ok_or_else(|| AppError::NotFound("terms and conditions".to_string()))?;

    Ok(Json(terms))
}
