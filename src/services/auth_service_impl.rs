//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::warn;

use crate::config::SecurityConfig;
use crate::constants::categories;
use crate::db::{Store, User};
use crate::entities::enums::Role;
use crate::services::auth_service::{AuthError, AuthService, Identity};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn validate_login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let Some((user, password_hash)) = self
            .store
            .get_user_by_username_with_password(username)
            .await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        // Locked and deactivated accounts fail before the password is checked
        if user.locked || !user.active {
            return Err(AuthError::InvalidCredentials);
        }

        let is_valid = self
            .store
            .verify_password_hash(password, &password_hash)
            .await?;

        if !is_valid {
            let now_locked = self
                .store
                .record_login_failure(user.id, self.security.lockout_threshold)
                .await?;

            if now_locked {
                warn!("Account locked after repeated failed logins: {username}");
            }

            return Err(AuthError::InvalidCredentials);
        }

        self.store.record_login_success(user.id).await?;
        self.store
            .log_activity(username, "Logged in", categories::AUTH)
            .await?;

        Ok(Identity {
            username: user.username,
            role: user.role,
        })
    }

    async fn record_logout(&self, username: &str) {
        if let Err(e) = self.store.stamp_logout(username).await {
            warn!("Failed to stamp logout for {username}: {e}");
        }

        if let Err(e) = self
            .store
            .log_activity(username, "Logged out", categories::AUTH)
            .await
        {
            warn!("Failed to record logout activity for {username}: {e}");
        }
    }

    async fn unlock_user(&self, actor: &Identity, user_id: i32) -> Result<User, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.store.unlock_user(user_id).await?;
        self.store
            .log_activity(
                &actor.username,
                &format!("Unlocked {}", user.username),
                categories::SECURITY,
            )
            .await?;

        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.store.list_users().await?)
    }

    async fn create_user(
        &self,
        actor: &Identity,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }

        if password.len() < 8 {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.store.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::Validation(format!(
                "Username already taken: {username}"
            )));
        }

        let user = self
            .store
            .create_user(username, password, role, &self.security)
            .await?;

        self.store
            .log_activity(
                &actor.username,
                &format!("Created account {username}"),
                categories::SECURITY,
            )
            .await?;

        Ok(user)
    }
}
