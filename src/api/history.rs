use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::get_session_identity;
use super::types::HistoryResponse;
use super::{ApiError, ApiResponse, AppState};
use crate::entities::{agreements, invoices};
use crate::services::document_service::{calculate_agreement_totals, calculate_invoice_totals};

fn default_page() -> u64 {
    1
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
}

/// GET /invoices
/// Paginated invoice history; staff only see their own rows.
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<HistoryResponse<invoices::Model>>>, ApiError> {
    let identity = get_session_identity(&session).await?;
    let page = query.page.max(1);

    let history = state
        .documents()
        .fetch_invoices(&identity, query.search.as_deref(), page)
        .await?;

    let totals = calculate_invoice_totals(&history.data);

    Ok(Json(ApiResponse::success(HistoryResponse::new(
        page, history, totals,
    ))))
}

/// GET /agreements
/// Paginated agreement history; staff only see their own rows.
pub async fn list_agreements(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<HistoryResponse<agreements::Model>>>, ApiError> {
    let identity = get_session_identity(&session).await?;
    let page = query.page.max(1);

    let history = state
        .documents()
        .fetch_agreements(&identity, query.search.as_deref(), page)
        .await?;

    let totals = calculate_agreement_totals(&history.data);

    Ok(Json(ApiResponse::success(HistoryResponse::new(
        page, history, totals,
    ))))
}
