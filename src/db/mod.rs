use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{activity_logs, agreements, enums::Role, invoices};

pub mod migrator;
pub mod repositories;

pub use repositories::document::NewDocument;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let is_memory = db_url.contains(":memory:");

        if !is_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // In-memory SQLite gives every pooled connection its own database, so
        // the pool must stay at a single connection there.
        let max_connections = if is_memory { 1 } else { max_connections };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn document_repo(&self) -> repositories::document::DocumentRepository {
        repositories::document::DocumentRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity::ActivityRepository {
        repositories::activity::ActivityRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo()
            .get_by_username_with_password(username)
            .await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        config: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(username, password, role, config)
            .await
    }

    pub async fn record_login_success(&self, id: i32) -> Result<()> {
        self.user_repo().record_login_success(id).await
    }

    pub async fn record_login_failure(&self, id: i32, lockout_threshold: i32) -> Result<bool> {
        self.user_repo()
            .record_login_failure(id, lockout_threshold)
            .await
    }

    pub async fn unlock_user(&self, id: i32) -> Result<()> {
        self.user_repo().unlock(id).await
    }

    pub async fn stamp_logout(&self, username: &str) -> Result<()> {
        self.user_repo().stamp_logout(username).await
    }

    pub async fn verify_password_hash(&self, password: &str, password_hash: &str) -> Result<bool> {
        self.user_repo()
            .verify_password_hash(password, password_hash)
            .await
    }

    // ========== Documents ==========

    pub async fn insert_invoice(
        &self,
        invoice_ref: &str,
        doc: &NewDocument,
    ) -> Result<invoices::Model> {
        self.document_repo().insert_invoice(invoice_ref, doc).await
    }

    pub async fn insert_agreement(
        &self,
        agreement_no: &str,
        doc: &NewDocument,
    ) -> Result<agreements::Model> {
        self.document_repo()
            .insert_agreement(agreement_no, doc)
            .await
    }

    pub async fn invoice_refs_for_period(&self, period: &str) -> Result<Vec<String>> {
        self.document_repo().invoice_refs_for_period(period).await
    }

    pub async fn agreement_nos_for_period(&self, period: &str) -> Result<Vec<String>> {
        self.document_repo().agreement_nos_for_period(period).await
    }

    pub async fn search_invoices(
        &self,
        created_by: Option<&str>,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<invoices::Model>, u64)> {
        self.document_repo()
            .search_invoices(created_by, search, limit, offset)
            .await
    }

    pub async fn search_agreements(
        &self,
        created_by: Option<&str>,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<agreements::Model>, u64)> {
        self.document_repo()
            .search_agreements(created_by, search, limit, offset)
            .await
    }

    pub async fn invoices_in_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<invoices::Model>> {
        self.document_repo().invoices_in_range(start, end).await
    }

    // ========== Activity log ==========

    pub async fn log_activity(&self, username: &str, action: &str, category: &str) -> Result<()> {
        self.activity_repo().add(username, action, category).await
    }

    pub async fn activity_in_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<activity_logs::Model>> {
        self.activity_repo().in_range(start, end).await
    }
}
