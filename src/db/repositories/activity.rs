use crate::entities::{activity_logs, prelude::*};
use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, username: &str, action: &str, category: &str) -> Result<()> {
        let active_model = activity_logs::ActiveModel {
            username: Set(username.to_string()),
            action: Set(action.to_string()),
            category: Set(category.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        ActivityLogs::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert activity log entry")?;
        Ok(())
    }

    /// Entries with `created_at` inside the inclusive bounds. Either bound
    /// may be open.
    pub async fn in_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<activity_logs::Model>> {
        let mut query = ActivityLogs::find();

        if let Some(start) = start {
            query = query.filter(activity_logs::Column::CreatedAt.gte(start));
        }

        if let Some(end) = end {
            query = query.filter(activity_logs::Column::CreatedAt.lte(end));
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to fetch activity log range")
    }
}
