use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AnalyticsService, AuthService, DocumentService, SeaOrmAuthService, SeaOrmDocumentService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub document_service: Arc<dyn DocumentService>,

    pub analytics: Arc<AnalyticsService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::new(&config.general.database_path).await?;

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        ));

        let document_service: Arc<dyn DocumentService> = Arc::new(SeaOrmDocumentService::new(
            store.clone(),
            config.documents.clone(),
        ));

        let analytics = Arc::new(AnalyticsService::new(store.clone()));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            document_service,
            analytics,
        })
    }
}
