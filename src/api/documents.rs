use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::get_session_identity;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{DocumentInput, GeneratedDocuments};

#[derive(Serialize)]
pub struct NextRefsResponse {
    pub invoice_ref: String,
    pub agreement_no: String,
}

/// GET /documents/next-refs
/// Preview the references the next generation would take. Not a reservation;
/// the numbers are allocated again at generation time.
pub async fn next_refs(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<NextRefsResponse>>, ApiError> {
    get_session_identity(&session).await?;

    let invoice_ref = state.documents().next_invoice_ref().await?;
    let agreement_no = state.documents().next_agreement_no().await?;

    Ok(Json(ApiResponse::success(NextRefsResponse {
        invoice_ref,
        agreement_no,
    })))
}

/// POST /documents
/// Generate the invoice/agreement pair from one form submission.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<DocumentInput>,
) -> Result<Json<ApiResponse<GeneratedDocuments>>, ApiError> {
    let identity = get_session_identity(&session).await?;

    let generated = state.documents().generate(&identity, payload).await?;

    Ok(Json(ApiResponse::success(generated)))
}
