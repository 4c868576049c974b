//! Owner dashboard endpoint handler.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::OwnerAuth;
use domain::models::analytics::OwnerDashboard;

/// Totals across all of the caller's surveys.
///
/// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    owner: OwnerAuth,
) -> Result<Json<OwnerDashboard>, ApiError> {
    let dashboard = state.service.dashboard(owner.user_id, Utc::now()).await?;
    Ok(Json(dashboard))
}
