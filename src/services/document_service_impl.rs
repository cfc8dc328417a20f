//! `SeaORM` implementation of the `DocumentService` trait.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::config::DocumentsConfig;
use crate::constants::categories;
use crate::db::{NewDocument, Store};
use crate::entities::{agreements, enums::Phase, invoices};
use crate::services::auth_service::Identity;
use crate::services::document_service::{
    DocumentError, DocumentInput, DocumentService, GeneratedDocuments, HistoryPage,
    agreement_period_key, format_reference, invoice_period_key, next_sequence,
};

pub struct SeaOrmDocumentService {
    store: Store,
    config: DocumentsConfig,

    /// Serializes allocate+insert so two concurrent generations in the same
    /// period cannot compute the same next number.
    allocation_lock: Mutex<()>,
}

impl SeaOrmDocumentService {
    #[must_use]
    pub fn new(store: Store, config: DocumentsConfig) -> Self {
        Self {
            store,
            config,
            allocation_lock: Mutex::new(()),
        }
    }

    async fn allocate_invoice_ref(&self) -> Result<String, DocumentError> {
        let period = invoice_period_key(&Utc::now());
        let existing = self.store.invoice_refs_for_period(&period).await?;
        let sequence = next_sequence(&existing);
        Ok(format_reference(
            &self.config.invoice_prefix,
            &period,
            sequence,
        ))
    }

    async fn allocate_agreement_no(&self) -> Result<String, DocumentError> {
        let period = agreement_period_key(&Utc::now());
        let existing = self.store.agreement_nos_for_period(&period).await?;
        let sequence = next_sequence(&existing);
        Ok(format_reference(
            &self.config.agreement_prefix,
            &period,
            sequence,
        ))
    }

    fn page_window(&self, page: u64) -> (u64, u64) {
        let limit = self.config.rows_per_page;
        let offset = page.saturating_sub(1) * limit;
        (limit, offset)
    }
}

/// Staff queries are pinned to their own rows; admins see everything.
fn history_scope<'a>(identity: &'a Identity) -> Option<&'a str> {
    if identity.role.is_admin() {
        None
    } else {
        Some(identity.username.as_str())
    }
}

fn normalize_search(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

#[async_trait]
impl DocumentService for SeaOrmDocumentService {
    async fn next_invoice_ref(&self) -> Result<String, DocumentError> {
        self.allocate_invoice_ref().await
    }

    async fn next_agreement_no(&self) -> Result<String, DocumentError> {
        self.allocate_agreement_no().await
    }

    async fn generate(
        &self,
        identity: &Identity,
        input: DocumentInput,
    ) -> Result<GeneratedDocuments, DocumentError> {
        if input.customer_name.trim().is_empty() {
            return Err(DocumentError::Validation(
                "Customer name is required".to_string(),
            ));
        }
        if input.phone.trim().is_empty() {
            return Err(DocumentError::Validation(
                "Phone number is required".to_string(),
            ));
        }
        if input.capacity <= 0.0 {
            return Err(DocumentError::Validation(
                "Capacity must be positive".to_string(),
            ));
        }

        let _guard = self.allocation_lock.lock().await;

        let invoice_ref = self.allocate_invoice_ref().await?;
        let agreement_no = self.allocate_agreement_no().await?;

        let phase = Phase::from_capacity(input.capacity);
        let amount = (input.capacity * self.config.rate_per_kw).round();

        let doc = NewDocument {
            customer_name: input.customer_name,
            phone: input.phone,
            address: input.address,
            consumer_no: input.consumer_no,
            subdivision: input.subdivision,
            capacity: input.capacity,
            phase,
            amount,
            created_by: identity.username.clone(),
            created_at: Utc::now().to_rfc3339(),
        };

        // Write-path failures propagate; a consumed-but-unwritten number only
        // leaves a gap in the sequence.
        self.store.insert_invoice(&invoice_ref, &doc).await?;
        self.store.insert_agreement(&agreement_no, &doc).await?;

        self.store
            .log_activity(
                &identity.username,
                &format!("Generated {invoice_ref} & {agreement_no}"),
                categories::GENERATE,
            )
            .await?;

        Ok(GeneratedDocuments {
            invoice_ref,
            agreement_no,
            phase,
            amount,
        })
    }

    async fn fetch_invoices(
        &self,
        identity: &Identity,
        search: Option<&str>,
        page: u64,
    ) -> Result<HistoryPage<invoices::Model>, DocumentError> {
        let (limit, offset) = self.page_window(page);
        let (data, total_count) = self
            .store
            .search_invoices(history_scope(identity), normalize_search(search), limit, offset)
            .await?;

        Ok(HistoryPage { data, total_count })
    }

    async fn fetch_agreements(
        &self,
        identity: &Identity,
        search: Option<&str>,
        page: u64,
    ) -> Result<HistoryPage<agreements::Model>, DocumentError> {
        let (limit, offset) = self.page_window(page);
        let (data, total_count) = self
            .store
            .search_agreements(history_scope(identity), normalize_search(search), limit, offset)
            .await?;

        Ok(HistoryPage { data, total_count })
    }
}
