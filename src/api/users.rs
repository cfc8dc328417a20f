use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require_admin;
use super::types::UserDto;
use super::{ApiError, ApiResponse, AppState};
use crate::entities::enums::Role;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

const fn default_role() -> Role {
    Role::Staff
}

/// GET /users (admin)
/// Every account with its lock state, for the security page.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    require_admin(&session).await?;

    let users = state.auth().list_users().await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// POST /users (admin)
/// Provision a new account.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let identity = require_admin(&session).await?;

    let user = state
        .auth()
        .create_user(&identity, &payload.username, &payload.password, payload.role)
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /users/{id}/unlock (admin)
/// Clear the lock and failure counter for an account.
pub async fn unlock_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let identity = require_admin(&session).await?;

    let user = state.auth().unlock_user(&identity, user_id).await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}
