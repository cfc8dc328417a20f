//! Domain service for authentication and account security.
//!
//! Handles login with lockout bookkeeping, logout stamping, user provisioning,
//! and admin unlock.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::User;
use crate::entities::enums::Role;

/// Errors specific to authentication operations.
///
/// Bad password, unknown username, locked, and inactive all collapse into
/// [`AuthError::InvalidCredentials`] so responses never leak which one it was.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Authenticated caller identity, carried in the session cookie and passed
/// explicitly into every call that needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

/// Domain service trait for authentication and account security.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the caller identity.
    ///
    /// Fails closed: an unknown username, a locked or deactivated account, and
    /// a wrong password all return [`AuthError::InvalidCredentials`]. A wrong
    /// password increments the failure counter and locks the account at the
    /// configured threshold; a correct one resets the counter and stamps
    /// `last_login`.
    async fn validate_login(&self, username: &str, password: &str) -> Result<Identity, AuthError>;

    /// Stamps `last_logout` and writes the audit entry. Best-effort: failures
    /// are logged and swallowed so logout never blocks.
    async fn record_logout(&self, username: &str);

    /// Clears the lock and failure counter for a user. Admin operation; the
    /// acting admin is recorded in the audit trail.
    async fn unlock_user(&self, actor: &Identity, user_id: i32) -> Result<User, AuthError>;

    /// Lists every account for the security page.
    async fn list_users(&self) -> Result<Vec<User>, AuthError>;

    /// Provisions a new account. Admin operation.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for an empty username, a short
    /// password, or a username that is already taken.
    async fn create_user(
        &self,
        actor: &Identity,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError>;
}
