use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::services::Identity;

const SESSION_IDENTITY_KEY: &str = "identity";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub username: String,
    pub role: crate::entities::enums::Role,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware: a serialized [`Identity`] in the session cookie
/// is the only accepted credential.
pub async fn auth_middleware(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(identity)) = session.get::<Identity>(SESSION_IDENTITY_KEY).await {
        tracing::Span::current().record("user_id", identity.username.as_str());
        return Ok(next.run(request).await);
    }

    let response = (StatusCode::UNAUTHORIZED, "Unauthorized");
    Ok(response.into_response())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with username and password; on success the identity is stored
/// in the session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let identity = state
        .auth()
        .validate_login(&payload.username, &payload.password)
        .await?;

    session
        .insert(SESSION_IDENTITY_KEY, &identity)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(MeResponse {
        username: identity.username,
        role: identity.role,
    })))
}

/// POST /auth/logout
/// Stamp the logout and invalidate the session. Always succeeds from the
/// caller's point of view.
pub async fn logout(State(state): State<Arc<AppState>>, session: Session) -> impl IntoResponse {
    if let Ok(Some(identity)) = session.get::<Identity>(SESSION_IDENTITY_KEY).await {
        state.auth().record_logout(&identity.username).await;
    }

    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
/// Get the current caller identity (requires authentication)
pub async fn get_current_user(session: Session) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let identity = get_session_identity(&session).await?;

    Ok(Json(ApiResponse::success(MeResponse {
        username: identity.username,
        role: identity.role,
    })))
}

// ============================================================================
// Helpers
// ============================================================================

/// Get the caller identity from the session, error if not authenticated
pub async fn get_session_identity(session: &Session) -> Result<Identity, ApiError> {
    session
        .get::<Identity>(SESSION_IDENTITY_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

/// Like [`get_session_identity`] but also requires the admin role.
pub async fn require_admin(session: &Session) -> Result<Identity, ApiError> {
    let identity = get_session_identity(session).await?;
    if identity.role.is_admin() {
        Ok(identity)
    } else {
        Err(ApiError::forbidden("Admin access required"))
    }
}
