use serde::Serialize;

use crate::db::User;
use crate::entities::enums::Role;
use crate::services::document_service::{HistoryPage, PageTotals};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Account row for the security page. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub active: bool,
    pub failed_attempts: i32,
    pub locked: bool,
    pub last_login: Option<String>,
    pub last_logout: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            active: user.active,
            failed_attempts: user.failed_attempts,
            locked: user.locked,
            last_login: user.last_login,
            last_logout: user.last_logout,
        }
    }
}

/// History page plus the slice totals the table footer shows.
#[derive(Debug, Serialize)]
pub struct HistoryResponse<T> {
    pub data: Vec<T>,
    pub total_count: u64,
    pub page: u64,
    pub totals: PageTotals,
}

impl<T> HistoryResponse<T> {
    pub fn new(page: u64, history: HistoryPage<T>, totals: PageTotals) -> Self {
        Self {
            data: history.data,
            total_count: history.total_count,
            page,
            totals,
        }
    }
}
