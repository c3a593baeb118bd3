use axum::{extract::State, Json};
use std::sync::Arc;

use super::AppError;
use crate::services::stats::{CategoryStats, DashboardSummary, RiskStats};
use crate::services::AppState;

pub async fn risk_stats(State(state): State<Arc<AppState>>) -> Result<Json<RiskStats>, AppError> {
    Ok(Json(state.stats.risk_stats().await?))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSummary>, AppError> {
    Ok(Json(state.stats.dashboard().await?))
}

pub async fn category_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryStats>>, AppError> {
    Ok(Json(state.stats.category_stats().await?))
}
