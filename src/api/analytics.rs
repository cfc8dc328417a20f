use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require_admin;
use super::{ApiError, ApiResponse, AppState};
use crate::services::analytics::{ActivityPoint, DailyRevenuePoint, RevenueKpis};

/// Inclusive date bounds for every dashboard endpoint; either side may be
/// open.
#[derive(Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /analytics/kpis (admin)
pub async fn revenue_kpis(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ApiResponse<RevenueKpis>>, ApiError> {
    require_admin(&session).await?;

    let kpis = state
        .analytics()
        .revenue_kpis(range.start_date.as_deref(), range.end_date.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(kpis)))
}

/// GET /analytics/daily-revenue (admin)
pub async fn daily_revenue(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<DailyRevenuePoint>>>, ApiError> {
    require_admin(&session).await?;

    let series = state
        .analytics()
        .daily_revenue(range.start_date.as_deref(), range.end_date.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(series)))
}

/// GET /analytics/capacity-distribution (admin)
pub async fn capacity_distribution(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ApiResponse<BTreeMap<String, u64>>>, ApiError> {
    require_admin(&session).await?;

    let dist = state
        .analytics()
        .capacity_distribution(range.start_date.as_deref(), range.end_date.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(dist)))
}

/// GET /analytics/phase-split (admin)
pub async fn phase_split(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ApiResponse<BTreeMap<String, u64>>>, ApiError> {
    require_admin(&session).await?;

    let split = state
        .analytics()
        .phase_split(range.start_date.as_deref(), range.end_date.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(split)))
}

/// GET /analytics/staff-performance (admin)
pub async fn staff_performance(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ApiResponse<BTreeMap<String, f64>>>, ApiError> {
    require_admin(&session).await?;

    let perf = state
        .analytics()
        .staff_performance(range.start_date.as_deref(), range.end_date.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(perf)))
}

/// GET /analytics/activity-timeline (admin)
pub async fn activity_timeline(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityPoint>>>, ApiError> {
    require_admin(&session).await?;

    let timeline = state
        .analytics()
        .activity_timeline(range.start_date.as_deref(), range.end_date.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(timeline)))
}
